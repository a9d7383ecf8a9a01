//! Entry type manager.

use super::error::{EntityKind, Result, SchemaError};
use super::layouts::{layout_owned_elsewhere, resolve_in, ResolvedLayout};
use crate::catalog::{
    is_valid_handle, EntryTypeDef, FieldLayout, LayoutOwner, SchemaBundle, Uid, ValidationErrors,
};
use crate::store::SchemaStore;
use tracing::{debug, info};

/// Creates entry types and manages their layouts.
pub struct EntryTypeManager<'a> {
    store: &'a SchemaStore,
}

impl<'a> EntryTypeManager<'a> {
    pub fn new(store: &'a SchemaStore) -> Self {
        Self { store }
    }

    /// Create and persist an entry type without a layout.
    pub fn create(&self, name: &str, handle: &str) -> Result<Uid> {
        let entry_type = EntryTypeDef::new(name, handle);
        let errors = validate_identity(name, handle);
        if !errors.is_empty() {
            return Err(SchemaError::validation(EntityKind::EntryType, handle, errors));
        }

        let uid = self.store.update(|schema| {
            if schema.entry_type_by_handle(handle).is_some() {
                return Err(SchemaError::duplicate(EntityKind::EntryType, handle));
            }
            let uid = entry_type.uid;
            schema.entry_types.push(entry_type);
            Ok(uid)
        })?;

        info!(handle, "created entry type");
        Ok(uid)
    }

    /// Attach (or replace) the entry type's layout.
    ///
    /// Elements whose field does not exist are dropped before saving. Returns
    /// how many were dropped. A layout belongs to one owner: attaching one that
    /// another entry type or category group already has is a validation error.
    pub fn attach_layout(&self, entry_type: Uid, mut layout: FieldLayout) -> Result<usize> {
        if layout.owner != LayoutOwner::Entry {
            let mut errors = ValidationErrors::new();
            errors.add("fieldLayout", "Entry types need an entry layout.");
            return Err(SchemaError::validation(EntityKind::EntryType, entry_type.to_string(), errors));
        }

        let dropped = self.store.update(|schema| {
            if let Some(owner) = layout_owned_elsewhere(schema, layout.uid, entry_type) {
                let mut errors = ValidationErrors::new();
                errors.add("fieldLayout", format!("Layout `{}` already belongs to `{owner}`.", layout.uid));
                return Err(SchemaError::validation(EntityKind::EntryType, entry_type.to_string(), errors));
            }
            let dropped = layout.retain_fields(|uid| schema.field(uid).is_some());
            let target = entry_type_mut(schema, entry_type)?;
            target.layout = Some(layout);
            Ok::<_, SchemaError>(dropped)
        })?;

        debug!(%entry_type, dropped, "attached layout");
        Ok(dropped)
    }

    /// Read-modify-write the entry type's layout.
    ///
    /// Returns `None` without committing when no layout is attached.
    pub fn update_layout<T>(
        &self,
        entry_type: Uid,
        f: impl FnOnce(&mut FieldLayout) -> Result<T>,
    ) -> Result<Option<T>> {
        let has_layout = self
            .store
            .read(|schema| schema.entry_type(entry_type).map(|e| e.layout.is_some()))
            .ok_or_else(|| SchemaError::not_found(EntityKind::EntryType, entry_type))?;
        if !has_layout {
            return Ok(None);
        }

        self.store.update(|schema| {
            let target = entry_type_mut(schema, entry_type)?;
            match target.layout.as_mut() {
                Some(layout) => f(layout).map(Some),
                None => Ok(None),
            }
        })
    }

    /// Get an entry type by identifier.
    pub fn get(&self, entry_type: Uid) -> Result<EntryTypeDef> {
        self.store
            .read(|schema| schema.entry_type(entry_type).cloned())
            .ok_or_else(|| SchemaError::not_found(EntityKind::EntryType, entry_type))
    }

    /// Get an entry type by handle.
    pub fn get_by_handle(&self, handle: &str) -> Result<EntryTypeDef> {
        self.find_by_handle(handle)
            .ok_or_else(|| SchemaError::not_found(EntityKind::EntryType, handle))
    }

    pub fn find_by_handle(&self, handle: &str) -> Option<EntryTypeDef> {
        self.store.read(|schema| schema.entry_type_by_handle(handle).cloned())
    }

    /// Entry types attached to a section, in attachment order.
    pub fn for_section(&self, section: Uid) -> Result<Vec<EntryTypeDef>> {
        self.store.read(|schema| {
            if schema.section(section).is_none() {
                return Err(SchemaError::not_found(EntityKind::Section, section));
            }
            Ok(schema
                .entry_types_of_section(section)
                .into_iter()
                .cloned()
                .collect())
        })
    }

    /// Change an entry type's name and handle.
    pub fn rename(&self, entry_type: Uid, name: &str, handle: &str) -> Result<()> {
        let errors = validate_identity(name, handle);
        if !errors.is_empty() {
            return Err(SchemaError::validation(EntityKind::EntryType, handle, errors));
        }

        let old = self.store.update(|schema| {
            if schema
                .entry_types
                .iter()
                .any(|e| e.handle == handle && e.uid != entry_type)
            {
                return Err(SchemaError::duplicate(EntityKind::EntryType, handle));
            }
            let target = entry_type_mut(schema, entry_type)?;
            let old = std::mem::replace(&mut target.handle, handle.to_string());
            target.name = name.to_string();
            Ok(old)
        })?;

        info!(from = %old, to = handle, "renamed entry type");
        Ok(())
    }

    /// Delete an entry type and detach it from every section.
    pub fn delete(&self, entry_type: Uid) -> Result<()> {
        let handle = self.store.update(|schema| delete_in(schema, entry_type))?;
        info!(handle = %handle, "deleted entry type");
        Ok(())
    }

    /// The entry type's layout with dangling elements filtered out.
    pub fn resolved_layout(&self, entry_type: Uid) -> Result<Option<ResolvedLayout>> {
        self.store.read(|schema| {
            let def = schema
                .entry_type(entry_type)
                .ok_or_else(|| SchemaError::not_found(EntityKind::EntryType, entry_type))?;
            Ok(def.layout.as_ref().map(|layout| resolve_in(schema, layout)))
        })
    }
}

fn validate_identity(name: &str, handle: &str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if name.trim().is_empty() {
        errors.add("name", "Name cannot be blank.");
    }
    if !is_valid_handle(handle) {
        errors.add("handle", "Handle is not a valid identifier.");
    }
    errors
}

pub(crate) fn entry_type_mut(schema: &mut SchemaBundle, entry_type: Uid) -> Result<&mut EntryTypeDef> {
    schema
        .entry_type_mut(entry_type)
        .ok_or_else(|| SchemaError::not_found(EntityKind::EntryType, entry_type))
}

/// Remove an entry type from the schema and from every section's list.
pub(crate) fn delete_in(schema: &mut SchemaBundle, entry_type: Uid) -> Result<String> {
    let index = schema
        .entry_types
        .iter()
        .position(|e| e.uid == entry_type)
        .ok_or_else(|| SchemaError::not_found(EntityKind::EntryType, entry_type))?;
    let removed = schema.entry_types.remove(index);
    for section in &mut schema.sections {
        section.entry_types.retain(|uid| *uid != entry_type);
    }
    Ok(removed.handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FieldKind, LayoutTab, SectionDef, Site, SiteSettings, DEFAULT_TAB};
    use crate::schema::{FieldRegistry, LayoutBuilder, SectionManager, SiteRegistry};

    fn setup() -> SchemaStore {
        let store = SchemaStore::temporary().unwrap();
        SiteRegistry::new(&store)
            .add_site(Site::new("default", "Default", "en-US").primary())
            .unwrap();
        store
    }

    #[test]
    fn test_create_duplicate() {
        let store = setup();
        let types = EntryTypeManager::new(&store);
        let uid = types.create("Blog Post", "blogPost").unwrap();
        assert_eq!(types.get_by_handle("blogPost").unwrap().uid, uid);
        assert!(types.create("Another", "blogPost").unwrap_err().is_duplicate());
    }

    #[test]
    fn test_attach_layout_prunes_unknown_fields() {
        let store = setup();
        let fields = FieldRegistry::new(&store);
        let description = fields
            .define_field(FieldKind::multiline_text(6), "description", "Description")
            .unwrap();
        let types = EntryTypeManager::new(&store);
        let post = types.create("Blog Post", "blogPost").unwrap();

        let layout = FieldLayout::new(LayoutOwner::Entry)
            .with_tab(LayoutTab::new(DEFAULT_TAB, 1).with_fields([description, Uid::generate()]));
        assert_eq!(types.attach_layout(post, layout).unwrap(), 1);

        let saved = types.get(post).unwrap().layout.unwrap();
        assert_eq!(saved.field_uids(), vec![description]);

        let wrong_owner = FieldLayout::new(LayoutOwner::Category);
        assert!(types.attach_layout(post, wrong_owner).is_err());
    }

    #[test]
    fn test_layout_has_one_owner() {
        let store = setup();
        FieldRegistry::new(&store)
            .define_field(FieldKind::plain_text(), "a", "A")
            .unwrap();
        let types = EntryTypeManager::new(&store);
        let x = types.create("X", "x").unwrap();
        let y = types.create("Y", "y").unwrap();
        let layout = LayoutBuilder::new(&store).content(LayoutOwner::Entry, &["a"]).layout;

        types.attach_layout(x, layout.clone()).unwrap();
        let err = types.attach_layout(y, layout.clone()).unwrap_err();
        assert!(err.validation_errors().unwrap().has("fieldLayout"));
        assert!(types.get(y).unwrap().layout.is_none());

        // replacing an owner's layout with itself is fine
        assert!(types.attach_layout(x, layout).is_ok());
    }

    #[test]
    fn test_update_layout_without_layout() {
        let store = setup();
        let types = EntryTypeManager::new(&store);
        let post = types.create("Blog Post", "blogPost").unwrap();
        let version = store.current_version();

        let touched = types.update_layout(post, |_| Ok(())).unwrap();
        assert!(touched.is_none());
        assert_eq!(store.current_version(), version);
        assert!(types.update_layout(Uid::generate(), |_| Ok(())).unwrap_err().is_not_found());
    }

    #[test]
    fn test_rename() {
        let store = setup();
        let types = EntryTypeManager::new(&store);
        let category = types.create("Category", "category").unwrap();
        types.create("Album", "album").unwrap();

        assert!(types.rename(category, "Album", "album").unwrap_err().is_duplicate());
        types.rename(category, "Genre", "genre").unwrap();

        let renamed = types.get(category).unwrap();
        assert_eq!(renamed.name, "Genre");
        assert_eq!(renamed.handle, "genre");
        assert!(types.find_by_handle("category").is_none());
        assert!(types.rename(Uid::generate(), "X", "x").unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_detaches_from_sections() {
        let store = setup();
        let types = EntryTypeManager::new(&store);
        let website = types.create("Website Project", "websiteProject").unwrap();
        let photo = types.create("Photography Project", "photographyProject").unwrap();
        let sections = SectionManager::new(&store);
        let creative = sections
            .create(
                SectionDef::channel("Creative Projects", "creativeProjects")
                    .with_entry_types([photo, website])
                    .with_site(SiteSettings::routed("default", "creative/{slug}", "creative/_entry")),
            )
            .unwrap();

        types.delete(photo).unwrap();
        let remaining: Vec<String> = types
            .for_section(creative)
            .unwrap()
            .into_iter()
            .map(|e| e.handle)
            .collect();
        assert_eq!(remaining, vec!["websiteProject"]);
        assert!(types.delete(photo).unwrap_err().is_not_found());
    }

    #[test]
    fn test_resolved_layout() {
        let store = setup();
        let fields = FieldRegistry::new(&store);
        fields.define_field(FieldKind::plain_text(), "lens", "Lens").unwrap();
        fields.define_field(FieldKind::plain_text(), "iso", "ISO").unwrap();
        let types = EntryTypeManager::new(&store);
        let photo = types.create("Photo", "photo").unwrap();
        let layout = LayoutBuilder::new(&store)
            .content(LayoutOwner::Entry, &["lens", "iso"])
            .layout;
        types.attach_layout(photo, layout).unwrap();

        fields.delete_field("lens").unwrap();
        let resolved = types.resolved_layout(photo).unwrap().unwrap();
        assert_eq!(resolved.dangling, 1);
        assert_eq!(resolved.layout.element_count(), 1);
        assert_eq!(types.get(photo).unwrap().layout.unwrap().element_count(), 2);
    }
}
