//! Helpers shared by the site's migration steps.
//!
//! Every helper logs what it did to the step's progress log. Helpers that
//! return a `Result` also hand the error back so the step can decide whether
//! the failure is fatal.
//!
//! The `ensure_*` helpers back the creations a step cannot continue without.
//! They reuse an entity with the same handle, so a step that failed after
//! creating some of them can be run again.

use folio_core::catalog::{CategoryGroupDef, FieldKind, LayoutOwner, SectionDef, SiteSettings, Uid};
use folio_core::schema::{EntityKind, SchemaError, ThreadOutcome};
use folio_core::{MigrationError, StepContext};

/// An entry type and the fields of its Content tab.
pub(crate) struct EntryTypeSpec {
    pub name: &'static str,
    pub handle: &'static str,
    pub fields: &'static [&'static str],
}

impl EntryTypeSpec {
    pub const fn new(name: &'static str, handle: &'static str, fields: &'static [&'static str]) -> Self {
        Self { name, handle, fields }
    }
}

/// Handle of the primary site.
pub(crate) fn primary_site(ctx: &StepContext<'_>) -> Result<String, MigrationError> {
    Ok(ctx.sites().primary()?.handle)
}

/// Routing settings `{base}/{slug}` rendered with `{base}/_entry`.
pub(crate) fn entry_routing(site: &str, base: &str) -> SiteSettings {
    SiteSettings::routed(site, format!("{base}/{{slug}}"), format!("{base}/_entry"))
}

/// Define fields one by one; a failed field does not stop the others.
pub(crate) fn define_fields(ctx: &mut StepContext<'_>, fields: Vec<(FieldKind, &str, &str)>) {
    for (kind, handle, name) in fields {
        let result = ctx.fields().define_field(kind, handle, name);
        ctx.log().record(EntityKind::Field, handle, result);
    }
}

/// Define a categories field restricted to the group `group`.
pub(crate) fn define_category_field(ctx: &mut StepContext<'_>, group: &str, handle: &str, name: &str) -> Result<Uid, SchemaError> {
    let result = ctx
        .category_groups()
        .get_by_handle(group)
        .and_then(|g| ctx.fields().define_field(FieldKind::categories(g.uid), handle, name));
    log_result(ctx, EntityKind::Field, handle, result)
}

/// Create an entry type and attach its Content layout.
pub(crate) fn create_entry_type(ctx: &mut StepContext<'_>, spec: &EntryTypeSpec) -> Result<Uid, SchemaError> {
    let result = ctx.entry_types().create(spec.name, spec.handle);
    let uid = log_result(ctx, EntityKind::EntryType, spec.handle, result)?;
    if !spec.fields.is_empty() {
        attach_content_layout(ctx, uid, spec.handle, spec.fields)?;
    }
    Ok(uid)
}

/// Create an entry type, or reuse the one with the same handle.
///
/// A reused entry type without a layout gets its Content layout.
pub(crate) fn ensure_entry_type(ctx: &mut StepContext<'_>, spec: &EntryTypeSpec) -> Result<Uid, SchemaError> {
    let Some(existing) = ctx.entry_types().find_by_handle(spec.handle) else {
        return create_entry_type(ctx, spec);
    };
    ctx.log().skipped(EntityKind::EntryType, spec.handle, "already exists");
    if existing.layout.is_none() && !spec.fields.is_empty() {
        attach_content_layout(ctx, existing.uid, spec.handle, spec.fields)?;
    }
    Ok(existing.uid)
}

/// Create each entry type, leaving out the ones that fail.
pub(crate) fn create_entry_types(ctx: &mut StepContext<'_>, specs: &[EntryTypeSpec]) -> Vec<Uid> {
    specs
        .iter()
        .filter_map(|spec| create_entry_type(ctx, spec).ok())
        .collect()
}

/// Replace an entry type's layout with a single Content tab.
pub(crate) fn attach_content_layout(
    ctx: &mut StepContext<'_>,
    entry_type: Uid,
    label: &str,
    handles: &[&str],
) -> Result<(), SchemaError> {
    let build = ctx.layouts().content(LayoutOwner::Entry, handles);
    if let Err(e) = ctx.entry_types().attach_layout(entry_type, build.layout) {
        ctx.log().failed(EntityKind::EntryType, label, &e);
        return Err(e);
    }
    let detail = if build.dropped.is_empty() {
        "added field layout".to_string()
    } else {
        format!("added field layout without {}", build.dropped.join(", "))
    };
    ctx.log().updated(EntityKind::EntryType, label, detail);
    Ok(())
}

/// Create a category group.
pub(crate) fn create_category_group(ctx: &mut StepContext<'_>, group: CategoryGroupDef) -> Result<Uid, SchemaError> {
    let handle = group.handle.clone();
    let result = ctx.category_groups().create(group);
    log_result(ctx, EntityKind::CategoryGroup, &handle, result)
}

/// Create a section.
pub(crate) fn create_section(ctx: &mut StepContext<'_>, section: SectionDef) -> Result<Uid, SchemaError> {
    let handle = section.handle.clone();
    let result = ctx.sections().create(section);
    log_result(ctx, EntityKind::Section, &handle, result)
}

/// Create a category group, or reuse the one with the same handle.
pub(crate) fn ensure_category_group(ctx: &mut StepContext<'_>, group: CategoryGroupDef) -> Result<Uid, SchemaError> {
    match ctx.category_groups().find_by_handle(&group.handle) {
        Some(existing) => {
            ctx.log().skipped(EntityKind::CategoryGroup, group.handle, "already exists");
            Ok(existing.uid)
        }
        None => create_category_group(ctx, group),
    }
}

/// Create a section, or reuse the one with the same handle.
///
/// Entry types of `section` the existing one lacks are attached to it.
pub(crate) fn ensure_section(ctx: &mut StepContext<'_>, section: SectionDef) -> Result<Uid, SchemaError> {
    let Some(existing) = ctx.sections().find_by_handle(&section.handle) else {
        return create_section(ctx, section);
    };
    ctx.log().skipped(EntityKind::Section, &section.handle, "already exists");
    for entry_type in section.entry_types {
        if existing.entry_types.contains(&entry_type) {
            continue;
        }
        if let Err(e) = ctx.sections().add_entry_type(existing.uid, entry_type) {
            ctx.log().failed(EntityKind::Section, &section.handle, &e);
            return Err(e);
        }
        ctx.log().updated(EntityKind::Section, &section.handle, format!("attached entry type {entry_type}"));
    }
    Ok(existing.uid)
}

/// Define a categories field, or reuse the field with the same handle.
pub(crate) fn ensure_category_field(ctx: &mut StepContext<'_>, group: &str, handle: &str, name: &str) -> Result<Uid, SchemaError> {
    match ctx.fields().lookup_by_handle(handle) {
        Ok(existing) => {
            ctx.log().skipped(EntityKind::Field, handle, "already exists");
            Ok(existing)
        }
        Err(_) => define_category_field(ctx, group, handle, name),
    }
}

/// Thread a relationship field into the Related Content tab of every entry
/// type of a section.
pub(crate) fn thread_into_section(ctx: &mut StepContext<'_>, section: &str, field: &str) {
    let results = match ctx.relations().thread_into_section(section, field, None) {
        Ok(results) => results,
        Err(e) => {
            ctx.log().failed(EntityKind::Section, section, e);
            return;
        }
    };
    for (entry_type, result) in results {
        match result {
            Ok(outcome) if outcome.changed() => {
                ctx.log().updated(EntityKind::EntryType, entry_type, format!("added `{field}` to related content"))
            }
            Ok(ThreadOutcome::AlreadyPresent) => {
                ctx.log().skipped(EntityKind::EntryType, entry_type, format!("`{field}` is already in the layout"))
            }
            Ok(_) => ctx.log().skipped(EntityKind::EntryType, entry_type, "layout has no tabs"),
            Err(e) => ctx.log().failed(EntityKind::EntryType, entry_type, e),
        }
    }
}

/// Append a field to the first tab of one entry type of a section.
///
/// A missing section or entry type is skipped.
pub(crate) fn append_to_first_tab(ctx: &mut StepContext<'_>, section: &str, entry_type: &str, field: &str) {
    let Some(target) = find_in_section(ctx, section, entry_type) else {
        ctx.log().skipped(EntityKind::EntryType, entry_type, format!("not found in `{section}`"));
        return;
    };
    match ctx.relations().append_to_first_tab(target, field) {
        Ok(ThreadOutcome::AppendedToTab) => {
            ctx.log().updated(EntityKind::EntryType, entry_type, format!("added `{field}`"))
        }
        Ok(ThreadOutcome::AlreadyPresent) => {
            ctx.log().skipped(EntityKind::EntryType, entry_type, format!("`{field}` is already in the layout"))
        }
        Ok(_) => ctx.log().skipped(EntityKind::EntryType, entry_type, "layout has no tabs"),
        Err(e) => ctx.log().failed(EntityKind::EntryType, entry_type, e),
    }
}

/// Identifier of the entry type `handle` if the section `section` has it.
pub(crate) fn find_in_section(ctx: &StepContext<'_>, section: &str, handle: &str) -> Option<Uid> {
    let section = ctx.sections().find_by_handle(section)?;
    ctx.entry_types()
        .for_section(section.uid)
        .ok()?
        .into_iter()
        .find(|e| e.handle == handle)
        .map(|e| e.uid)
}

fn log_result<T>(ctx: &mut StepContext<'_>, kind: EntityKind, label: &str, result: Result<T, SchemaError>) -> Result<T, SchemaError> {
    match result {
        Ok(value) => {
            ctx.log().created(kind, label);
            Ok(value)
        }
        Err(e) => {
            ctx.log().failed(kind, label, &e);
            Err(e)
        }
    }
}
