//! Relationship graph builder.
//!
//! Relationship fields point at one section or category group by identifier,
//! so they survive a handle rename. Once defined they are threaded into the
//! layouts of each consuming entry type independently: every entry type owns
//! its own layout, even when several are conceptually parallel.

use super::entry_types::entry_type_mut;
use super::error::{EntityKind, Result, SchemaError};
use super::fields::FieldRegistry;
use super::layouts::field_uid;
use crate::catalog::{FieldKind, LayoutTab, RelationTarget, SchemaBundle, Uid, ValidationErrors};
use crate::store::SchemaStore;
use tracing::{debug, info};

/// Tab relationship fields are threaded into by default.
pub const RELATED_CONTENT_TAB: &str = "Related Content";

/// How a field was threaded into one layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadOutcome {
    /// Appended as the last element of an existing tab.
    AppendedToTab,
    /// Placed alone on a new trailing tab.
    CreatedTab,
    /// The entry type has no layout or no tabs yet; nothing changed.
    SkippedEmptyLayout,
    /// The layout already places the field; nothing changed.
    AlreadyPresent,
}

impl ThreadOutcome {
    /// Check if the layout was modified.
    pub fn changed(self) -> bool {
        matches!(self, ThreadOutcome::AppendedToTab | ThreadOutcome::CreatedTab)
    }
}

/// Defines relationship fields and threads them into layouts.
pub struct RelationshipGraph<'a> {
    store: &'a SchemaStore,
}

impl<'a> RelationshipGraph<'a> {
    pub fn new(store: &'a SchemaStore) -> Self {
        Self { store }
    }

    /// Define an entries or categories field restricted to `target`.
    pub fn define_relationship_field(&self, name: &str, handle: &str, target: RelationTarget) -> Result<Uid> {
        self.store.read(|schema| target_exists(schema, target))?;
        FieldRegistry::new(self.store).define_field(FieldKind::relation(target), handle, name)
    }

    /// Thread a relationship field into one entry type's layout.
    ///
    /// The field goes to the end of the tab named `tab` (default
    /// `Related Content`); if the layout has no such tab, a new trailing tab is
    /// created for it. A layout without tabs is left alone.
    pub fn thread_into_layout(&self, entry_type: Uid, field_handle: &str, tab: Option<&str>) -> Result<ThreadOutcome> {
        let tab = tab.unwrap_or(RELATED_CONTENT_TAB);
        let outcome = self.store.update(|schema| -> Result<ThreadOutcome> {
            let field = relation_field(schema, field_handle)?;
            let target = entry_type_mut(schema, entry_type)?;
            let layout = match target.layout.as_mut() {
                Some(layout) if !layout.is_empty() => layout,
                _ => return Ok(ThreadOutcome::SkippedEmptyLayout),
            };
            if layout.contains_field(field) {
                return Ok(ThreadOutcome::AlreadyPresent);
            }
            match layout.tab_mut(tab) {
                Some(existing) => {
                    existing.push(field);
                    Ok(ThreadOutcome::AppendedToTab)
                }
                None => {
                    let sort_order = layout.next_sort_order();
                    layout.push_tab(LayoutTab::new(tab, sort_order).with_fields([field]));
                    Ok(ThreadOutcome::CreatedTab)
                }
            }
        })?;

        debug!(%entry_type, field = field_handle, tab, ?outcome, "threaded relationship field");
        Ok(outcome)
    }

    /// Thread a relationship field into every entry type of a section.
    ///
    /// Each entry type is handled on its own; a failure for one does not stop
    /// the others.
    pub fn thread_into_section(
        &self,
        section_handle: &str,
        field_handle: &str,
        tab: Option<&str>,
    ) -> Result<Vec<(String, Result<ThreadOutcome>)>> {
        let entry_types: Vec<(Uid, String)> = self.store.read(|schema| {
            let section = schema
                .section_by_handle(section_handle)
                .ok_or_else(|| SchemaError::not_found(EntityKind::Section, section_handle))?;
            Ok::<_, SchemaError>(
                schema
                    .entry_types_of_section(section.uid)
                    .into_iter()
                    .map(|e| (e.uid, e.handle.clone()))
                    .collect(),
            )
        })?;

        let results: Vec<_> = entry_types
            .into_iter()
            .map(|(uid, handle)| (handle, self.thread_into_layout(uid, field_handle, tab)))
            .collect();
        info!(section = section_handle, field = field_handle, entry_types = results.len(), "threaded relationship into section");
        Ok(results)
    }

    /// Append a field to the first tab of an entry type's layout.
    ///
    /// A missing or tab-less layout is left alone.
    pub fn append_to_first_tab(&self, entry_type: Uid, field_handle: &str) -> Result<ThreadOutcome> {
        self.store.update(|schema| {
            let field = field_uid(schema, field_handle)?;
            if let Some(def) = schema.field(field) {
                for target in def.kind.relation_targets() {
                    target_exists(schema, target)?;
                }
            }
            let target = entry_type_mut(schema, entry_type)?;
            let Some(first) = target.layout.as_mut().and_then(|l| l.first_tab_mut()) else {
                return Ok(ThreadOutcome::SkippedEmptyLayout);
            };
            if first.contains(field) {
                return Ok(ThreadOutcome::AlreadyPresent);
            }
            first.push(field);
            Ok(ThreadOutcome::AppendedToTab)
        })
    }
}

/// Resolve a relationship field whose targets all still exist.
fn relation_field(schema: &SchemaBundle, handle: &str) -> Result<Uid> {
    let field = schema
        .field_by_handle(handle)
        .ok_or_else(|| SchemaError::not_found(EntityKind::Field, handle))?;
    if !field.kind.is_relation() {
        let mut errors = ValidationErrors::new();
        errors.add("kind", "Only relationship fields can be threaded into related content.");
        return Err(SchemaError::validation(EntityKind::Field, handle, errors));
    }
    for target in field.kind.relation_targets() {
        target_exists(schema, target)?;
    }
    Ok(field.uid)
}

fn target_exists(schema: &SchemaBundle, target: RelationTarget) -> Result<()> {
    match target {
        RelationTarget::Section(uid) if schema.section(uid).is_none() => {
            Err(SchemaError::not_found(EntityKind::Section, uid))
        }
        RelationTarget::CategoryGroup(uid) if schema.category_group(uid).is_none() => {
            Err(SchemaError::not_found(EntityKind::CategoryGroup, uid))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{LayoutOwner, SectionDef, Site, SiteSettings, DEFAULT_TAB};
    use crate::schema::{EntryTypeManager, LayoutBuilder, SectionManager, SiteRegistry};

    struct Fixture {
        store: SchemaStore,
    }

    impl Fixture {
        fn new() -> Self {
            let store = SchemaStore::temporary().unwrap();
            SiteRegistry::new(&store)
                .add_site(Site::new("default", "Default", "en-US").primary())
                .unwrap();
            let fields = FieldRegistry::new(&store);
            fields.define_field(FieldKind::images(Some(1)), "featuredImage", "Featured Image").unwrap();
            fields.define_field(FieldKind::multiline_text(6), "description", "Description").unwrap();
            Self { store }
        }

        fn section(&self, handle: &str, types: &[&str]) -> Uid {
            let entry_types = EntryTypeManager::new(&self.store);
            let builder = LayoutBuilder::new(&self.store);
            let mut uids = Vec::new();
            for t in types {
                let uid = entry_types.create(t, t).unwrap();
                let layout = builder.content(LayoutOwner::Entry, &["featuredImage", "description"]).layout;
                entry_types.attach_layout(uid, layout).unwrap();
                uids.push(uid);
            }
            SectionManager::new(&self.store)
                .create(
                    SectionDef::channel(handle, handle)
                        .with_entry_types(uids)
                        .with_site(SiteSettings::routed("default", format!("{handle}/{{slug}}"), format!("{handle}/_entry"))),
                )
                .unwrap()
        }
    }

    #[test]
    fn test_define_requires_target() {
        let fx = Fixture::new();
        let graph = RelationshipGraph::new(&fx.store);
        let err = graph
            .define_relationship_field("Related", "related", RelationTarget::Section(Uid::generate()))
            .unwrap_err();
        assert!(err.is_not_found());

        let travels = fx.section("travels", &["travelEntry"]);
        let uid = graph
            .define_relationship_field("Related Travels", "relatedTravels", RelationTarget::Section(travels))
            .unwrap();
        let field = FieldRegistry::new(&fx.store).get("relatedTravels").unwrap();
        assert_eq!(field.uid, uid);
        assert_eq!(field.kind.relation_targets(), vec![RelationTarget::Section(travels)]);
    }

    #[test]
    fn test_thread_appends_or_creates_tab() {
        let fx = Fixture::new();
        let target = fx.section("photography", &["album"]);
        fx.section("consumers", &["first", "second", "third"]);
        let graph = RelationshipGraph::new(&fx.store);
        let types = EntryTypeManager::new(&fx.store);

        // only "second" already has a Related Content tab
        let travels = fx.section("travels", &["travelEntry"]);
        graph
            .define_relationship_field("Related Travels", "relatedTravels", RelationTarget::Section(travels))
            .unwrap();
        let second = types.get_by_handle("second").unwrap().uid;
        assert_eq!(graph.thread_into_layout(second, "relatedTravels", None).unwrap(), ThreadOutcome::CreatedTab);

        graph
            .define_relationship_field("Related Albums", "relatedPhotographyAlbums", RelationTarget::Section(target))
            .unwrap();
        let results = graph
            .thread_into_section("consumers", "relatedPhotographyAlbums", None)
            .unwrap();
        let outcomes: Vec<(String, ThreadOutcome)> = results.into_iter().map(|(h, r)| (h, r.unwrap())).collect();
        assert_eq!(
            outcomes,
            vec![
                ("first".to_string(), ThreadOutcome::CreatedTab),
                ("second".to_string(), ThreadOutcome::AppendedToTab),
                ("third".to_string(), ThreadOutcome::CreatedTab),
            ]
        );

        let albums = FieldRegistry::new(&fx.store).lookup_by_handle("relatedPhotographyAlbums").unwrap();
        let related_travels = FieldRegistry::new(&fx.store).lookup_by_handle("relatedTravels").unwrap();
        let second_layout = types.get(second).unwrap().layout.unwrap();
        assert_eq!(second_layout.tabs.len(), 2);
        assert_eq!(second_layout.tabs[1].field_uids(), vec![related_travels, albums]);

        let first_layout = types.get_by_handle("first").unwrap().layout.unwrap();
        let names: Vec<&str> = first_layout.tabs.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec![DEFAULT_TAB, RELATED_CONTENT_TAB]);
        assert_eq!(first_layout.tabs[1].sort_order, 2);
        assert_eq!(first_layout.tabs[1].field_uids(), vec![albums]);
        assert_eq!(first_layout.tabs[0].elements.len(), 2);
    }

    #[test]
    fn test_thread_twice_is_noop() {
        let fx = Fixture::new();
        let travels = fx.section("travels", &["travelEntry"]);
        fx.section("thoughts", &["blogPost"]);
        let graph = RelationshipGraph::new(&fx.store);
        graph
            .define_relationship_field("Related Travels", "relatedTravels", RelationTarget::Section(travels))
            .unwrap();
        let post = EntryTypeManager::new(&fx.store).get_by_handle("blogPost").unwrap().uid;

        assert!(graph.thread_into_layout(post, "relatedTravels", None).unwrap().changed());
        let version = fx.store.current_version();
        assert_eq!(graph.thread_into_layout(post, "relatedTravels", None).unwrap(), ThreadOutcome::AlreadyPresent);
        assert_eq!(fx.store.current_version(), version);
    }

    #[test]
    fn test_empty_layout_is_skipped() {
        let fx = Fixture::new();
        let travels = fx.section("travels", &["travelEntry"]);
        let graph = RelationshipGraph::new(&fx.store);
        graph
            .define_relationship_field("Related Travels", "relatedTravels", RelationTarget::Section(travels))
            .unwrap();
        let bare = EntryTypeManager::new(&fx.store).create("Bare", "bare").unwrap();

        assert_eq!(graph.thread_into_layout(bare, "relatedTravels", None).unwrap(), ThreadOutcome::SkippedEmptyLayout);
        assert_eq!(graph.append_to_first_tab(bare, "relatedTravels").unwrap(), ThreadOutcome::SkippedEmptyLayout);
        assert!(EntryTypeManager::new(&fx.store).get(bare).unwrap().layout.is_none());
    }

    #[test]
    fn test_non_relation_and_deleted_target() {
        let fx = Fixture::new();
        let travels = fx.section("travels", &["travelEntry"]);
        fx.section("thoughts", &["blogPost"]);
        let graph = RelationshipGraph::new(&fx.store);
        let post = EntryTypeManager::new(&fx.store).get_by_handle("blogPost").unwrap().uid;

        let err = graph.thread_into_layout(post, "description", None).unwrap_err();
        assert!(err.validation_errors().unwrap().has("kind"));

        graph
            .define_relationship_field("Related Travels", "relatedTravels", RelationTarget::Section(travels))
            .unwrap();
        SectionManager::new(&fx.store).delete(travels).unwrap();
        assert!(graph.thread_into_layout(post, "relatedTravels", None).unwrap_err().is_not_found());
    }

    #[test]
    fn test_append_to_first_tab() {
        let fx = Fixture::new();
        fx.section("thoughts", &["blogPost"]);
        let graph = RelationshipGraph::new(&fx.store);
        let post = EntryTypeManager::new(&fx.store).get_by_handle("blogPost").unwrap().uid;

        assert_eq!(graph.append_to_first_tab(post, "description").unwrap(), ThreadOutcome::AlreadyPresent);
        FieldRegistry::new(&fx.store).define_field(FieldKind::plain_text(), "camera", "Camera").unwrap();
        assert_eq!(graph.append_to_first_tab(post, "camera").unwrap(), ThreadOutcome::AppendedToTab);
        let layout = EntryTypeManager::new(&fx.store).get(post).unwrap().layout.unwrap();
        assert_eq!(layout.tabs[0].elements.len(), 3);
    }
}
