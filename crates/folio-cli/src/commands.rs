//! Command implementations.

use crate::formatter::Formatter;
use folio_core::catalog::SchemaBundle;
use folio_core::schema::{CategoryGroupManager, ResolvedLayout, SeedOutcome};
use folio_core::{MigrationError, MigrationRunner, MigrationStep, RunnerConfig, SchemaStore};
use serde::Serialize;

/// Sections and entry types as shown by `folio schema`.
#[derive(Debug, Serialize)]
pub struct SchemaSummary {
    pub version: u64,
    pub sections: Vec<SectionSummary>,
    pub entry_types: Vec<EntryTypeSummary>,
}

#[derive(Debug, Serialize)]
pub struct SectionSummary {
    pub handle: String,
    pub name: String,
    pub kind: String,
    pub max_levels: Option<u32>,
    pub entry_types: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EntryTypeSummary {
    pub handle: String,
    pub name: String,
    /// Tabs with the handles of their live fields.
    pub tabs: Vec<(String, Vec<String>)>,
    /// Elements whose field was deleted.
    pub dangling: usize,
}

/// Apply pending steps. Returns whether the run passed.
pub fn migrate(
    store: &SchemaStore,
    steps: &[Box<dyn MigrationStep>],
    keep_going: bool,
    formatter: &dyn Formatter,
) -> Result<bool, MigrationError> {
    let runner = MigrationRunner::new(
        store,
        RunnerConfig {
            halt_on_failure: !keep_going,
        },
    )?;
    let report = runner.run(steps)?;
    println!("{}", formatter.format_run(&report));
    Ok(report.passed)
}

/// Print the recorded status of every step.
pub fn status(store: &SchemaStore, steps: &[Box<dyn MigrationStep>], formatter: &dyn Formatter) -> Result<bool, MigrationError> {
    let runner = MigrationRunner::new(store, RunnerConfig::default())?;
    let records = runner.status(steps)?;
    println!("{}", formatter.format_status(&records));
    Ok(true)
}

/// Attempt a revert. Steps are one-way, so this reports failure.
pub fn revert(
    store: &SchemaStore,
    steps: &[Box<dyn MigrationStep>],
    step_id: &str,
    formatter: &dyn Formatter,
) -> Result<bool, MigrationError> {
    let runner = MigrationRunner::new(store, RunnerConfig::default())?;
    match runner.revert(steps, step_id) {
        Ok(()) => Ok(true),
        Err(e @ MigrationError::RevertUnsupported { .. }) => {
            eprintln!("{}", formatter.format_error(&e.to_string()));
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Print sections and resolved entry type layouts, of the current schema or
/// of an earlier version.
pub fn schema(store: &SchemaStore, at: Option<u64>, formatter: &dyn Formatter) -> Result<bool, MigrationError> {
    let schema = match at {
        None => store.snapshot(),
        Some(version) => match store.schema_at_version(version)? {
            Some(schema) => schema,
            None => {
                let known = store.list_versions()?;
                let latest = known.last().copied().unwrap_or(0);
                eprintln!("{}", formatter.format_error(&format!("no schema version {version} (latest is {latest})")));
                return Ok(false);
            }
        },
    };
    println!("{}", formatter.format_schema(&summarize(&schema)));
    Ok(true)
}

/// Create one category idempotently.
pub fn seed_category(
    store: &SchemaStore,
    group: &str,
    title: &str,
    parent: Option<&str>,
    formatter: &dyn Formatter,
) -> Result<bool, MigrationError> {
    let groups = CategoryGroupManager::new(store);
    let group = groups.get_by_handle(group)?;
    let parent = parent
        .map(|p| groups.find_by_group_and_title(group.uid, p))
        .transpose()?;

    let report = groups.seed(group.uid, &[title], parent)?;
    let message = match report.outcomes.first().map(|(_, outcome)| outcome) {
        Some(SeedOutcome::Created(uid)) => format!("created category `{title}` ({uid})"),
        Some(SeedOutcome::Skipped(uid)) => format!("category `{title}` already exists ({uid})"),
        Some(SeedOutcome::Failed(error)) => {
            eprintln!("{}", formatter.format_error(error));
            return Ok(false);
        }
        None => return Ok(false),
    };
    println!("{}", formatter.format_message(&message));
    Ok(true)
}

fn summarize(schema: &SchemaBundle) -> SchemaSummary {
    let sections = schema
        .sections
        .iter()
        .map(|s| SectionSummary {
            handle: s.handle.clone(),
            name: s.name.clone(),
            kind: s.kind.to_string(),
            max_levels: s.max_levels,
            entry_types: schema
                .entry_types_of_section(s.uid)
                .into_iter()
                .map(|e| e.handle.clone())
                .collect(),
        })
        .collect();

    let entry_types = schema
        .entry_types
        .iter()
        .map(|e| {
            let resolved = e.layout.as_ref().map(|l| ResolvedLayout::against(schema, l));
            let tabs = resolved
                .as_ref()
                .map(|r| {
                    r.layout
                        .tabs
                        .iter()
                        .map(|t| {
                            let fields = t
                                .elements
                                .iter()
                                .filter_map(|el| schema.field(el.field))
                                .map(|f| f.handle.clone())
                                .collect();
                            (t.name.clone(), fields)
                        })
                        .collect()
                })
                .unwrap_or_default();
            EntryTypeSummary {
                handle: e.handle.clone(),
                name: e.name.clone(),
                tabs,
                dangling: resolved.map_or(0, |r| r.dangling),
            }
        })
        .collect();

    SchemaSummary {
        version: schema.version,
        sections,
        entry_types,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::catalog::{
        EntryTypeDef, FieldDef, FieldKind, FieldLayout, LayoutOwner, LayoutTab, SectionDef, SiteSettings, Uid,
    };

    #[test]
    fn test_summarize_skips_dangling_elements() {
        let mut schema = SchemaBundle::new(4);
        let description = FieldDef::new("description", "Description", FieldKind::multiline_text(4));
        let mut album = EntryTypeDef::new("Album", "album");
        album.layout = Some(
            FieldLayout::new(LayoutOwner::Entry)
                .with_tab(LayoutTab::new("Content", 1).with_fields([Uid::generate(), description.uid])),
        );
        let photography = SectionDef::structure("Photography", "photography", Some(3))
            .with_entry_types([album.uid])
            .with_site(SiteSettings::routed("default", "photography/{slug}", "photography/_entry"));
        schema.fields.push(description);
        schema.entry_types.push(album);
        schema.entry_types.push(EntryTypeDef::new("Photo", "photo"));
        schema.sections.push(photography);

        let summary = summarize(&schema);
        assert_eq!(summary.version, 4);

        let section = &summary.sections[0];
        assert_eq!(section.kind, "structure");
        assert_eq!(section.max_levels, Some(3));
        assert_eq!(section.entry_types, vec!["album"]);

        let album = &summary.entry_types[0];
        assert_eq!(album.tabs, vec![("Content".to_string(), vec!["description".to_string()])]);
        assert_eq!(album.dangling, 1);

        let photo = &summary.entry_types[1];
        assert!(photo.tabs.is_empty());
        assert_eq!(photo.dangling, 0);
    }
}
