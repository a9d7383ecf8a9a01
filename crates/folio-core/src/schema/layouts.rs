//! Field layout builder.
//!
//! Layouts are composed from field handles. Resolution is lenient: handles
//! that do not name a registered field are dropped and reported in the
//! [`LayoutBuild`] so callers can decide whether that is acceptable.

use super::error::{EntityKind, Result, SchemaError};
use crate::catalog::{
    FieldLayout, LayoutOwner, LayoutTab, SchemaBundle, Uid, ValidationErrors, DEFAULT_TAB,
};
use crate::store::SchemaStore;
use tracing::{debug, warn};

/// Result of building a layout from handles.
#[derive(Debug, Clone)]
pub struct LayoutBuild {
    /// The layout with every resolvable element, in the requested order.
    pub layout: FieldLayout,
    /// Handles that did not resolve.
    pub dropped: Vec<String>,
}

impl LayoutBuild {
    /// Check if every handle resolved.
    pub fn is_complete(&self) -> bool {
        self.dropped.is_empty()
    }

    /// The layout, or `UnresolvedFields` if anything was dropped.
    pub fn into_strict(self) -> Result<FieldLayout> {
        if self.dropped.is_empty() {
            Ok(self.layout)
        } else {
            Err(SchemaError::UnresolvedFields {
                handles: self.dropped,
            })
        }
    }
}

/// A layout as it reads after filtering out elements of deleted fields.
#[derive(Debug, Clone)]
pub struct ResolvedLayout {
    pub layout: FieldLayout,
    /// Elements skipped because their field no longer exists.
    pub dangling: usize,
}

impl ResolvedLayout {
    /// Resolve `layout` against a schema snapshot, such as an older version.
    pub fn against(schema: &SchemaBundle, layout: &FieldLayout) -> Self {
        resolve_in(schema, layout)
    }

    pub fn is_complete(&self) -> bool {
        self.dangling == 0
    }
}

/// Builds new layouts and mutates persisted ones in place.
pub struct LayoutBuilder<'a> {
    store: &'a SchemaStore,
}

impl<'a> LayoutBuilder<'a> {
    pub fn new(store: &'a SchemaStore) -> Self {
        Self { store }
    }

    /// Build a layout from `(tab name, field handles)` pairs.
    ///
    /// Tabs get sort orders 1, 2, ... in the given order.
    pub fn build(&self, owner: LayoutOwner, tabs: &[(&str, &[&str])]) -> LayoutBuild {
        self.store.read(|schema| build_in(schema, owner, tabs))
    }

    /// Build a layout with a single `Content` tab.
    pub fn content(&self, owner: LayoutOwner, handles: &[&str]) -> LayoutBuild {
        self.build(owner, &[(DEFAULT_TAB, handles)])
    }

    /// Get a persisted layout by its identifier.
    pub fn get(&self, layout: Uid) -> Result<FieldLayout> {
        self.store
            .read(|schema| schema.layouts().find(|(_, l)| l.uid == layout).map(|(_, l)| l.clone()))
            .ok_or_else(|| SchemaError::not_found(EntityKind::FieldLayout, layout))
    }

    /// Append a field to the tab named `tab` of a persisted layout.
    ///
    /// Fails with `TabNotFound` when no tab has that exact name; the layout is
    /// left unchanged. Returns `false` without changing anything when the
    /// layout already places the field.
    pub fn append_to_tab(&self, layout: Uid, tab: &str, handle: &str) -> Result<bool> {
        let appended = self.store.update(|schema| {
            let field = field_uid(schema, handle)?;
            let target = layout_mut(schema, layout)?;
            append_to_tab_in(target, tab, field)
        })?;
        debug!(%layout, tab, handle, appended, "appended field to tab");
        Ok(appended)
    }

    /// Append a new tab to a persisted layout.
    ///
    /// `sort_order` defaults to after all existing tabs. Fields the layout
    /// already places are left where they are. Returns the handles that did
    /// not resolve.
    pub fn append_tab(
        &self,
        layout: Uid,
        tab: &str,
        handles: &[&str],
        sort_order: Option<u32>,
    ) -> Result<Vec<String>> {
        let dropped = self.store.update(|schema| {
            let (fields, dropped) = resolve_handles(schema, handles);
            let target = layout_mut(schema, layout)?;
            append_tab_in(target, tab, fields, sort_order)?;
            Ok::<_, SchemaError>(dropped)
        })?;
        if !dropped.is_empty() {
            warn!(%layout, tab, dropped = ?dropped, "skipped unknown fields");
        }
        Ok(dropped)
    }

    /// Filter out elements whose field no longer exists.
    pub fn resolve(&self, layout: &FieldLayout) -> ResolvedLayout {
        self.store.read(|schema| resolve_in(schema, layout))
    }
}

/// Resolve handles in order, splitting them into found identifiers and misses.
pub(crate) fn resolve_handles(schema: &SchemaBundle, handles: &[&str]) -> (Vec<Uid>, Vec<String>) {
    let mut found = Vec::with_capacity(handles.len());
    let mut dropped = Vec::new();
    for handle in handles {
        match schema.field_by_handle(handle) {
            Some(field) => found.push(field.uid),
            None => dropped.push(handle.to_string()),
        }
    }
    (found, dropped)
}

pub(crate) fn build_in(schema: &SchemaBundle, owner: LayoutOwner, tabs: &[(&str, &[&str])]) -> LayoutBuild {
    let mut layout = FieldLayout::new(owner);
    let mut dropped = Vec::new();
    for (i, (name, handles)) in tabs.iter().enumerate() {
        let (mut fields, missing) = resolve_handles(schema, handles);
        // a field is placed once, where it first appears
        let placed = layout.field_uids();
        let mut seen = Vec::with_capacity(fields.len());
        fields.retain(|uid| {
            let fresh = !placed.contains(uid) && !seen.contains(uid);
            seen.push(*uid);
            fresh
        });
        layout.push_tab(LayoutTab::new(*name, i as u32 + 1).with_fields(fields));
        dropped.extend(missing);
    }
    LayoutBuild { layout, dropped }
}

pub(crate) fn resolve_in(schema: &SchemaBundle, layout: &FieldLayout) -> ResolvedLayout {
    let mut layout = layout.clone();
    let dangling = layout.retain_fields(|uid| schema.field(uid).is_some());
    ResolvedLayout { layout, dangling }
}

pub(crate) fn field_uid(schema: &SchemaBundle, handle: &str) -> Result<Uid> {
    schema
        .field_by_handle(handle)
        .map(|f| f.uid)
        .ok_or_else(|| SchemaError::not_found(EntityKind::Field, handle))
}

/// Handle of the entry type or category group other than `owner` whose layout
/// has the identifier `layout`.
pub(crate) fn layout_owned_elsewhere(schema: &SchemaBundle, layout: Uid, owner: Uid) -> Option<String> {
    let owns = |candidate: Option<&FieldLayout>| candidate.is_some_and(|l| l.uid == layout);
    schema
        .entry_types
        .iter()
        .find(|e| e.uid != owner && owns(e.layout.as_ref()))
        .map(|e| e.handle.clone())
        .or_else(|| {
            schema
                .category_groups
                .iter()
                .find(|g| g.uid != owner && owns(g.layout.as_ref()))
                .map(|g| g.handle.clone())
        })
}

fn layout_mut(schema: &mut SchemaBundle, layout: Uid) -> Result<&mut FieldLayout> {
    schema
        .layouts_mut()
        .find(|l| l.uid == layout)
        .ok_or_else(|| SchemaError::not_found(EntityKind::FieldLayout, layout))
}

pub(crate) fn append_to_tab_in(layout: &mut FieldLayout, tab: &str, field: Uid) -> Result<bool> {
    let present = layout.contains_field(field);
    let target = layout
        .tab_mut(tab)
        .ok_or_else(|| SchemaError::TabNotFound { tab: tab.to_string() })?;
    if present {
        return Ok(false);
    }
    target.push(field);
    Ok(true)
}

pub(crate) fn append_tab_in(
    layout: &mut FieldLayout,
    tab: &str,
    fields: Vec<Uid>,
    sort_order: Option<u32>,
) -> Result<()> {
    if layout.tab(tab).is_some() {
        let mut errors = ValidationErrors::new();
        errors.add("tabs", format!("Tab `{tab}` already exists."));
        return Err(SchemaError::validation(EntityKind::FieldLayout, tab, errors));
    }
    let mut placed = layout.field_uids();
    let fields: Vec<Uid> = fields
        .into_iter()
        .filter(|uid| {
            let fresh = !placed.contains(uid);
            placed.push(*uid);
            fresh
        })
        .collect();
    let sort_order = sort_order.unwrap_or_else(|| layout.next_sort_order());
    layout.push_tab(LayoutTab::new(tab, sort_order).with_fields(fields));
    Ok(())
}
