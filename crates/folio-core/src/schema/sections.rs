//! Hierarchical section manager.
//!
//! Sections come in three kinds. Singles hold exactly one entry type, channels
//! and structures hold one or more. Structures bound their tree depth with
//! `max_levels`, which may be raised but never lowered. Which entry type is
//! used at which level is left to authors.

use super::entry_types::delete_in as delete_entry_type_in;
use super::error::{EntityKind, Result, SchemaError};
use super::sites::check_site_settings;
use crate::catalog::{check_widening, SchemaBundle, SectionDef, SectionKind, Uid, ValidationErrors};
use crate::store::SchemaStore;
use tracing::{debug, info};

/// Creates and evolves sections.
pub struct SectionManager<'a> {
    store: &'a SchemaStore,
}

impl<'a> SectionManager<'a> {
    pub fn new(store: &'a SchemaStore) -> Self {
        Self { store }
    }

    /// Create a section.
    ///
    /// Every listed entry type must already be saved, and every site setting
    /// must name a configured site.
    pub fn create(&self, section: SectionDef) -> Result<Uid> {
        let mut errors = section.validate();
        if !errors.is_empty() {
            return Err(SchemaError::validation(EntityKind::Section, section.handle, errors));
        }

        let handle = section.handle.clone();
        let uid = self.store.update(|schema| {
            if schema.section_by_handle(&section.handle).is_some() {
                return Err(SchemaError::duplicate(EntityKind::Section, section.handle));
            }
            for entry_type in &section.entry_types {
                if schema.entry_type(*entry_type).is_none() {
                    errors.add("entryTypes", format!("Entry type `{entry_type}` has not been saved."));
                }
            }
            check_site_settings(schema, &section.site_settings, &mut errors);
            if !errors.is_empty() {
                return Err(SchemaError::validation(EntityKind::Section, section.handle, errors));
            }
            let uid = section.uid;
            schema.sections.push(section);
            Ok(uid)
        })?;

        info!(handle = %handle, "created section");
        Ok(uid)
    }

    /// Attach a saved entry type. Attaching one that is already present is a no-op.
    pub fn add_entry_type(&self, section: Uid, entry_type: Uid) -> Result<()> {
        let added = self.store.update(|schema| {
            if schema.entry_type(entry_type).is_none() {
                return Err(SchemaError::not_found(EntityKind::EntryType, entry_type));
            }
            let target = section_mut(schema, section)?;
            if target.entry_types.contains(&entry_type) {
                return Ok(false);
            }
            if target.kind == SectionKind::Single {
                let mut errors = ValidationErrors::new();
                errors.add("entryTypes", "Single sections must have exactly one entry type.");
                return Err(SchemaError::validation(EntityKind::Section, target.handle.clone(), errors));
            }
            target.entry_types.push(entry_type);
            Ok(true)
        })?;

        debug!(%section, %entry_type, added, "attached entry type");
        Ok(())
    }

    /// Detach an entry type without deleting it. A section keeps at least one.
    pub fn remove_entry_type(&self, section: Uid, entry_type: Uid) -> Result<()> {
        self.store.update(|schema| {
            let target = section_mut(schema, section)?;
            let index = target
                .entry_types
                .iter()
                .position(|uid| *uid == entry_type)
                .ok_or_else(|| SchemaError::not_found(EntityKind::EntryType, entry_type))?;
            if target.entry_types.len() == 1 {
                let mut errors = ValidationErrors::new();
                errors.add("entryTypes", "At least one entry type is required.");
                return Err(SchemaError::validation(EntityKind::Section, target.handle.clone(), errors));
            }
            target.entry_types.remove(index);
            Ok(())
        })?;

        debug!(%section, %entry_type, "detached entry type");
        Ok(())
    }

    /// Change a structure's maximum depth. Only widening is accepted.
    pub fn update_max_levels(&self, section: Uid, max_levels: Option<u32>) -> Result<()> {
        self.store.update(|schema| {
            let target = section_mut(schema, section)?;
            let mut errors = ValidationErrors::new();
            if target.kind != SectionKind::Structure {
                errors.add("maxLevels", "Only structure sections have a maximum level count.");
            } else if let Err(message) = check_widening(target.max_levels, max_levels) {
                errors.add("maxLevels", message);
            }
            if !errors.is_empty() {
                return Err(SchemaError::validation(EntityKind::Section, target.handle.clone(), errors));
            }
            target.max_levels = max_levels;
            Ok(())
        })?;

        info!(%section, ?max_levels, "updated max levels");
        Ok(())
    }

    /// Delete a section.
    ///
    /// Entry types used by no other section are deleted with it, taking their
    /// layouts along; entry types shared with other sections are only detached.
    /// Returns the handles of the deleted entry types.
    pub fn delete(&self, section: Uid) -> Result<Vec<String>> {
        let (handle, deleted) = self.store.update(|schema| delete_in(schema, section))?;
        info!(handle = %handle, entry_types = ?deleted, "deleted section");
        Ok(deleted)
    }

    pub fn get(&self, section: Uid) -> Result<SectionDef> {
        self.store
            .read(|schema| schema.section(section).cloned())
            .ok_or_else(|| SchemaError::not_found(EntityKind::Section, section))
    }

    pub fn get_by_handle(&self, handle: &str) -> Result<SectionDef> {
        self.find_by_handle(handle)
            .ok_or_else(|| SchemaError::not_found(EntityKind::Section, handle))
    }

    pub fn find_by_handle(&self, handle: &str) -> Option<SectionDef> {
        self.store.read(|schema| schema.section_by_handle(handle).cloned())
    }

    /// All sections in creation order.
    pub fn all(&self) -> Vec<SectionDef> {
        self.store.read(|schema| schema.sections.clone())
    }
}

fn section_mut(schema: &mut SchemaBundle, section: Uid) -> Result<&mut SectionDef> {
    schema
        .section_mut(section)
        .ok_or_else(|| SchemaError::not_found(EntityKind::Section, section))
}

fn delete_in(schema: &mut SchemaBundle, section: Uid) -> Result<(String, Vec<String>)> {
    let index = schema
        .sections
        .iter()
        .position(|s| s.uid == section)
        .ok_or_else(|| SchemaError::not_found(EntityKind::Section, section))?;
    let removed = schema.sections.remove(index);

    let mut deleted = Vec::new();
    for entry_type in removed.entry_types {
        let shared = schema
            .sections
            .iter()
            .any(|s| s.entry_types.contains(&entry_type));
        if !shared && schema.entry_type(entry_type).is_some() {
            deleted.push(delete_entry_type_in(schema, entry_type)?);
        }
    }
    Ok((removed.handle, deleted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PropagationMethod, Site, SiteSettings, HOME_URI};
    use crate::schema::{EntryTypeManager, SiteRegistry};

    fn setup() -> SchemaStore {
        let store = SchemaStore::temporary().unwrap();
        SiteRegistry::new(&store)
            .add_site(Site::new("default", "Default", "en-US").primary())
            .unwrap();
        store
    }

    fn routed(prefix: &str) -> SiteSettings {
        SiteSettings::routed("default", format!("{prefix}/{{slug}}"), format!("{prefix}/_entry"))
    }

    #[test]
    fn test_create_single() {
        let store = setup();
        let home = EntryTypeManager::new(&store).create("Home", "home").unwrap();
        let sections = SectionManager::new(&store);
        let uid = sections
            .create(
                SectionDef::single("Home", "home")
                    .with_entry_types([home])
                    .with_site(SiteSettings::routed("default", HOME_URI, "home/index")),
            )
            .unwrap();
        let section = sections.get_by_handle("home").unwrap();
        assert_eq!(section.uid, uid);
        assert_eq!(section.kind, SectionKind::Single);

        let err = sections.add_entry_type(uid, EntryTypeManager::new(&store).create("About", "about").unwrap());
        assert!(err.unwrap_err().validation_errors().unwrap().has("entryTypes"));
    }

    #[test]
    fn test_propagation_persists() {
        let store = setup();
        let album = EntryTypeManager::new(&store).create("Album", "album").unwrap();
        let sections = SectionManager::new(&store);
        sections
            .create(
                SectionDef::structure("Photography", "photography", Some(2))
                    .with_entry_types([album])
                    .with_site(routed("photography"))
                    .with_propagation(PropagationMethod::Language),
            )
            .unwrap();
        let section = sections.get_by_handle("photography").unwrap();
        assert_eq!(section.propagation, PropagationMethod::Language);
    }

    #[test]
    fn test_entry_type_listed_twice_rejected() {
        let store = setup();
        let post = EntryTypeManager::new(&store).create("Blog Post", "blogPost").unwrap();
        let sections = SectionManager::new(&store);
        let err = sections
            .create(
                SectionDef::channel("Thoughts", "thoughts")
                    .with_entry_types([post, post])
                    .with_site(routed("thoughts")),
            )
            .unwrap_err();
        assert!(err.validation_errors().unwrap().has("entryTypes"));
        assert!(sections.find_by_handle("thoughts").is_none());
    }

    #[test]
    fn test_unsaved_entry_type_rejected() {
        let store = setup();
        let sections = SectionManager::new(&store);
        let err = sections
            .create(
                SectionDef::channel("Travels", "travels")
                    .with_entry_types([Uid::generate()])
                    .with_site(routed("travels")),
            )
            .unwrap_err();
        assert!(err.validation_errors().unwrap().has("entryTypes"));
        assert!(sections.find_by_handle("travels").is_none());
    }

    #[test]
    fn test_missing_template_and_unknown_site() {
        let store = setup();
        let travel = EntryTypeManager::new(&store).create("Travel Entry", "travelEntry").unwrap();
        let sections = SectionManager::new(&store);

        let mut settings = routed("travels");
        settings.template = None;
        let err = sections
            .create(SectionDef::channel("Travels", "travels").with_entry_types([travel]).with_site(settings))
            .unwrap_err();
        assert!(err.validation_errors().unwrap().has("template"));

        let mut settings = routed("travels");
        settings.site = "mars".into();
        let err = sections
            .create(SectionDef::channel("Travels", "travels").with_entry_types([travel]).with_site(settings))
            .unwrap_err();
        assert!(err.validation_errors().unwrap().has("siteSettings"));
    }

    #[test]
    fn test_duplicate_handle() {
        let store = setup();
        let a = EntryTypeManager::new(&store).create("A", "a").unwrap();
        let sections = SectionManager::new(&store);
        let section = || SectionDef::channel("Thoughts", "thoughts").with_entry_types([a]).with_site(routed("thoughts"));
        sections.create(section()).unwrap();
        assert!(sections.create(section()).unwrap_err().is_duplicate());
    }

    #[test]
    fn test_raise_max_levels_preserves_entry_types() {
        let store = setup();
        let types = EntryTypeManager::new(&store);
        let album = types.create("Album", "album").unwrap();
        let photo = types.create("Photo", "photo").unwrap();
        let sections = SectionManager::new(&store);
        let photography = sections
            .create(
                SectionDef::structure("Photography", "photography", Some(2))
                    .with_entry_types([album, photo])
                    .with_site(routed("photography")),
            )
            .unwrap();

        let category = types.create("Category", "category").unwrap();
        sections.add_entry_type(photography, category).unwrap();
        sections.add_entry_type(photography, category).unwrap();
        sections.update_max_levels(photography, Some(3)).unwrap();

        let section = sections.get(photography).unwrap();
        assert_eq!(section.max_levels, Some(3));
        assert_eq!(section.entry_types, vec![album, photo, category]);

        let err = sections.update_max_levels(photography, Some(2)).unwrap_err();
        assert!(err.validation_errors().unwrap().has("maxLevels"));
        assert_eq!(sections.get(photography).unwrap().max_levels, Some(3));
    }

    #[test]
    fn test_max_levels_only_on_structures() {
        let store = setup();
        let post = EntryTypeManager::new(&store).create("Blog Post", "blogPost").unwrap();
        let sections = SectionManager::new(&store);
        let thoughts = sections
            .create(SectionDef::channel("Thoughts", "thoughts").with_entry_types([post]).with_site(routed("thoughts")))
            .unwrap();
        assert!(sections.update_max_levels(thoughts, Some(2)).is_err());
    }

    #[test]
    fn test_remove_entry_type_keeps_one() {
        let store = setup();
        let types = EntryTypeManager::new(&store);
        let website = types.create("Website Project", "websiteProject").unwrap();
        let other = types.create("Other", "other").unwrap();
        let sections = SectionManager::new(&store);
        let creative = sections
            .create(
                SectionDef::channel("Creative Projects", "creativeProjects")
                    .with_entry_types([website, other])
                    .with_site(routed("creative")),
            )
            .unwrap();

        sections.remove_entry_type(creative, website).unwrap();
        assert!(types.get(website).is_ok());
        assert!(sections.remove_entry_type(creative, other).is_err());
        assert!(sections.remove_entry_type(creative, website).unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_cascades_to_unshared_entry_types() {
        let store = setup();
        let types = EntryTypeManager::new(&store);
        let own = types.create("Website Project", "websiteProject").unwrap();
        let shared = types.create("Shared", "shared").unwrap();
        let sections = SectionManager::new(&store);
        let creative = sections
            .create(
                SectionDef::channel("Creative Projects", "creativeProjects")
                    .with_entry_types([own, shared])
                    .with_site(routed("creative")),
            )
            .unwrap();
        sections
            .create(SectionDef::channel("Other", "otherWork").with_entry_types([shared]).with_site(routed("other")))
            .unwrap();

        let deleted = sections.delete(creative).unwrap();
        assert_eq!(deleted, vec!["websiteProject"]);
        assert!(types.get(own).unwrap_err().is_not_found());
        assert!(types.get(shared).is_ok());
        assert!(sections.find_by_handle("creativeProjects").is_none());
        assert!(sections.delete(creative).unwrap_err().is_not_found());
    }
}
