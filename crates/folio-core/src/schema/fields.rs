//! Field registry: define, look up and delete field definitions.

use super::error::{EntityKind, Result, SchemaError};
use crate::catalog::{FieldDef, FieldKind, RelationTarget, SchemaBundle, Uid, ValidationErrors};
use crate::store::SchemaStore;
use tracing::{debug, info};

/// Field definitions keyed by handle.
pub struct FieldRegistry<'a> {
    store: &'a SchemaStore,
}

impl<'a> FieldRegistry<'a> {
    pub fn new(store: &'a SchemaStore) -> Self {
        Self { store }
    }

    /// Define a new field.
    ///
    /// A handle that is already registered fails with `DuplicateHandle` and
    /// leaves the existing field untouched.
    pub fn define_field(&self, kind: FieldKind, handle: &str, name: &str) -> Result<Uid> {
        let field = FieldDef::new(handle, name, kind);
        let label = field.kind.label();
        let errors = field.validate();
        if !errors.is_empty() {
            return Err(SchemaError::validation(EntityKind::Field, handle, errors));
        }

        let uid = self.store.update(|schema| {
            if schema.field_by_handle(handle).is_some() {
                return Err(SchemaError::duplicate(EntityKind::Field, handle));
            }
            let errors = check_relation_targets(schema, &field.kind);
            if !errors.is_empty() {
                return Err(SchemaError::validation(EntityKind::Field, handle, errors));
            }
            let uid = field.uid;
            schema.fields.push(field);
            Ok(uid)
        })?;

        info!(handle, kind = label, "defined field");
        Ok(uid)
    }

    /// Resolve a handle to the field's identifier.
    pub fn lookup_by_handle(&self, handle: &str) -> Result<Uid> {
        self.store
            .read(|schema| schema.field_by_handle(handle).map(|f| f.uid))
            .ok_or_else(|| SchemaError::not_found(EntityKind::Field, handle))
    }

    /// Get a field definition by handle.
    pub fn get(&self, handle: &str) -> Result<FieldDef> {
        self.store
            .read(|schema| schema.field_by_handle(handle).cloned())
            .ok_or_else(|| SchemaError::not_found(EntityKind::Field, handle))
    }

    /// Check if a field with the handle exists.
    pub fn exists(&self, handle: &str) -> bool {
        self.store.read(|schema| schema.field_by_handle(handle).is_some())
    }

    /// Delete a field.
    ///
    /// Layouts that still place the field keep a dangling element; reads skip it.
    pub fn delete_field(&self, handle: &str) -> Result<Uid> {
        let uid = self.store.update(|schema| {
            let index = schema
                .fields
                .iter()
                .position(|f| f.handle == handle)
                .ok_or_else(|| SchemaError::not_found(EntityKind::Field, handle))?;
            Ok::<_, SchemaError>(schema.fields.remove(index).uid)
        })?;

        info!(handle, "deleted field");
        Ok(uid)
    }

    /// Delete a field only if no layout places it.
    pub fn delete_unused_field(&self, handle: &str) -> Result<Uid> {
        let layouts = self.layouts_referencing(handle)?;
        if !layouts.is_empty() {
            return Err(SchemaError::FieldInUse {
                handle: handle.to_string(),
                layouts,
            });
        }
        self.delete_field(handle)
    }

    /// Handles of the entry types and category groups whose layouts place the field.
    pub fn layouts_referencing(&self, handle: &str) -> Result<Vec<String>> {
        let uid = self.lookup_by_handle(handle)?;
        Ok(self.store.read(|schema| {
            schema
                .layouts()
                .filter(|(_, layout)| layout.contains_field(uid))
                .map(|(owner, _)| owner.to_string())
                .collect()
        }))
    }

    /// All fields in definition order.
    pub fn all(&self) -> Vec<FieldDef> {
        self.store.read(|schema| schema.fields.clone())
    }
}

/// Relationship fields must point at containers that exist.
pub(crate) fn check_relation_targets(schema: &SchemaBundle, kind: &FieldKind) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    for target in kind.relation_targets() {
        match target {
            RelationTarget::Section(uid) if schema.section(uid).is_none() => {
                debug!(%uid, "relationship source section missing");
                errors.add("sources", format!("Section `{uid}` does not exist."));
            }
            RelationTarget::CategoryGroup(uid) if schema.category_group(uid).is_none() => {
                debug!(%uid, "relationship source group missing");
                errors.add("source", format!("Category group `{uid}` does not exist."));
            }
            _ => {}
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DropdownOption, FieldLayout, LayoutOwner, LayoutTab};

    #[test]
    fn test_define_and_lookup() {
        let store = SchemaStore::temporary().unwrap();
        let fields = FieldRegistry::new(&store);

        let uid = fields
            .define_field(FieldKind::multiline_text(6), "description", "Description")
            .unwrap();
        assert_eq!(fields.lookup_by_handle("description").unwrap(), uid);
        assert_eq!(fields.get("description").unwrap().name, "Description");
    }

    #[test]
    fn test_duplicate_handle_does_not_mutate() {
        let store = SchemaStore::temporary().unwrap();
        let fields = FieldRegistry::new(&store);

        let uid = fields.define_field(FieldKind::plain_text(), "camera", "Camera").unwrap();
        let version = store.current_version();

        let err = fields
            .define_field(FieldKind::date(), "camera", "Camera Date")
            .unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(store.current_version(), version);

        let field = fields.get("camera").unwrap();
        assert_eq!(field.uid, uid);
        assert_eq!(field.name, "Camera");
        assert_eq!(field.kind, FieldKind::plain_text());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let store = SchemaStore::temporary().unwrap();
        let fields = FieldRegistry::new(&store);

        let err = fields
            .define_field(FieldKind::dropdown(vec![]), "travelType", "Travel Type")
            .unwrap_err();
        assert!(err.validation_errors().unwrap().has("options"));

        let err = fields
            .define_field(FieldKind::plain_text(), "2bad", "Bad")
            .unwrap_err();
        assert!(err.validation_errors().unwrap().has("handle"));

        let options = vec![DropdownOption::new("Work Travel", "work")];
        assert!(fields
            .define_field(FieldKind::dropdown(options), "travelType", "Travel Type")
            .is_ok());
    }

    #[test]
    fn test_relation_to_missing_section_rejected() {
        let store = SchemaStore::temporary().unwrap();
        let fields = FieldRegistry::new(&store);

        let err = fields
            .define_field(FieldKind::entries(Uid::generate()), "related", "Related")
            .unwrap_err();
        assert!(err.validation_errors().unwrap().has("sources"));
        assert!(!fields.exists("related"));
    }

    #[test]
    fn test_delete_leaves_dangling_reference() {
        let store = SchemaStore::temporary().unwrap();
        let fields = FieldRegistry::new(&store);
        let uid = fields.define_field(FieldKind::plain_text(), "lens", "Lens").unwrap();

        store
            .update(|schema| -> Result<()> {
                let mut photo = crate::catalog::EntryTypeDef::new("Photo", "photo");
                photo.layout = Some(
                    FieldLayout::new(LayoutOwner::Entry)
                        .with_tab(LayoutTab::new("Content", 1).with_fields([uid])),
                );
                schema.entry_types.push(photo);
                Ok(())
            })
            .unwrap();

        assert_eq!(fields.layouts_referencing("lens").unwrap(), vec!["photo"]);
        assert!(matches!(
            fields.delete_unused_field("lens"),
            Err(SchemaError::FieldInUse { .. })
        ));

        fields.delete_field("lens").unwrap();
        assert!(fields.lookup_by_handle("lens").unwrap_err().is_not_found());
        let layout = store.read(|s| s.entry_type_by_handle("photo").unwrap().layout.clone());
        assert!(layout.unwrap().contains_field(uid));
    }

    #[test]
    fn test_delete_missing_field() {
        let store = SchemaStore::temporary().unwrap();
        let fields = FieldRegistry::new(&store);
        assert!(fields.delete_field("nope").unwrap_err().is_not_found());
    }
}
