//! Category group manager and category tree nodes.

use super::error::{EntityKind, Result, SchemaError};
use super::layouts::layout_owned_elsewhere;
use super::sites::check_site_settings;
use crate::catalog::{
    check_widening, level_allowed, CategoryDef, CategoryGroupDef, SchemaBundle, Uid, ValidationErrors,
};
use crate::store::SchemaStore;
use tracing::{debug, info, warn};

/// What happened to one title during [`CategoryGroupManager::seed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    Created(Uid),
    /// A category with the same title already existed in the group.
    Skipped(Uid),
    Failed(String),
}

/// Per-title outcomes of a bulk seed, in input order.
#[derive(Debug, Clone, Default)]
pub struct SeedReport {
    pub outcomes: Vec<(String, SeedOutcome)>,
}

impl SeedReport {
    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, SeedOutcome::Created(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, SeedOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, SeedOutcome::Failed(_)))
    }

    fn count(&self, f: impl Fn(&SeedOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| f(o)).count()
    }
}

/// Creates category groups and the categories inside them.
pub struct CategoryGroupManager<'a> {
    store: &'a SchemaStore,
}

impl<'a> CategoryGroupManager<'a> {
    pub fn new(store: &'a SchemaStore) -> Self {
        Self { store }
    }

    /// Create a category group.
    pub fn create(&self, mut group: CategoryGroupDef) -> Result<Uid> {
        let mut errors = group.validate();
        if !errors.is_empty() {
            return Err(SchemaError::validation(EntityKind::CategoryGroup, group.handle, errors));
        }

        let handle = group.handle.clone();
        let uid = self.store.update(|schema| {
            if schema.category_group_by_handle(&group.handle).is_some() {
                return Err(SchemaError::duplicate(EntityKind::CategoryGroup, group.handle));
            }
            check_site_settings(schema, &group.site_settings, &mut errors);
            if let Some(owner) = group
                .layout
                .as_ref()
                .and_then(|l| layout_owned_elsewhere(schema, l.uid, group.uid))
            {
                errors.add("fieldLayout", format!("Layout already belongs to `{owner}`."));
            }
            if !errors.is_empty() {
                return Err(SchemaError::validation(EntityKind::CategoryGroup, group.handle, errors));
            }
            if let Some(layout) = group.layout.as_mut() {
                layout.retain_fields(|uid| schema.field(uid).is_some());
            }
            let uid = group.uid;
            schema.category_groups.push(group);
            Ok(uid)
        })?;

        info!(handle = %handle, "created category group");
        Ok(uid)
    }

    pub fn get(&self, group: Uid) -> Result<CategoryGroupDef> {
        self.store
            .read(|schema| schema.category_group(group).cloned())
            .ok_or_else(|| SchemaError::not_found(EntityKind::CategoryGroup, group))
    }

    pub fn get_by_handle(&self, handle: &str) -> Result<CategoryGroupDef> {
        self.find_by_handle(handle)
            .ok_or_else(|| SchemaError::not_found(EntityKind::CategoryGroup, handle))
    }

    pub fn find_by_handle(&self, handle: &str) -> Option<CategoryGroupDef> {
        self.store
            .read(|schema| schema.category_group_by_handle(handle).cloned())
    }

    pub fn all(&self) -> Vec<CategoryGroupDef> {
        self.store.read(|schema| schema.category_groups.clone())
    }

    /// Change the group's maximum depth. Only widening is accepted.
    pub fn update_max_levels(&self, group: Uid, max_levels: Option<u32>) -> Result<()> {
        self.store.update(|schema| {
            let target = group_mut(schema, group)?;
            if let Err(message) = check_widening(target.max_levels, max_levels) {
                let mut errors = ValidationErrors::new();
                errors.add("maxLevels", message);
                return Err(SchemaError::validation(EntityKind::CategoryGroup, target.handle.clone(), errors));
            }
            target.max_levels = max_levels;
            Ok(())
        })?;
        info!(%group, ?max_levels, "updated max levels");
        Ok(())
    }

    /// Delete a group and all of its categories. Returns how many categories went with it.
    pub fn delete_group(&self, group: Uid) -> Result<usize> {
        let (handle, removed) = self.store.update(|schema| {
            let index = schema
                .category_groups
                .iter()
                .position(|g| g.uid == group)
                .ok_or_else(|| SchemaError::not_found(EntityKind::CategoryGroup, group))?;
            let removed = schema.category_groups.remove(index);
            let before = schema.categories.len();
            schema.categories.retain(|c| c.group != group);
            Ok::<_, SchemaError>((removed.handle, before - schema.categories.len()))
        })?;
        info!(handle = %handle, categories = removed, "deleted category group");
        Ok(removed)
    }

    /// Create a category, optionally under a parent of the same group.
    pub fn create_category(&self, group: Uid, title: &str, parent: Option<Uid>) -> Result<Uid> {
        let uid = self.store.update(|schema| create_category_in(schema, group, title, parent))?;
        debug!(%group, title, "created category");
        Ok(uid)
    }

    /// Find a category by exact title anywhere in the group.
    pub fn find_by_group_and_title(&self, group: Uid, title: &str) -> Result<Uid> {
        self.store.read(|schema| {
            if schema.category_group(group).is_none() {
                return Err(SchemaError::not_found(EntityKind::CategoryGroup, group));
            }
            schema
                .categories_in(group)
                .find(|c| c.title == title)
                .map(|c| c.uid)
                .ok_or_else(|| SchemaError::not_found(EntityKind::Category, title))
        })
    }

    /// Categories of a group in creation order.
    pub fn categories(&self, group: Uid) -> Vec<CategoryDef> {
        self.store
            .read(|schema| schema.categories_in(group).cloned().collect())
    }

    pub fn category(&self, category: Uid) -> Result<CategoryDef> {
        self.store
            .read(|schema| schema.category(category).cloned())
            .ok_or_else(|| SchemaError::not_found(EntityKind::Category, category))
    }

    /// Create each title under `parent` unless the group already has it.
    ///
    /// Existing titles (including ones earlier in `titles`) are reported as
    /// skipped; per-title failures are recorded and seeding continues.
    pub fn seed(&self, group: Uid, titles: &[&str], parent: Option<Uid>) -> Result<SeedReport> {
        self.get(group)?;
        let mut report = SeedReport::default();
        for title in titles {
            let outcome = match self.find_by_group_and_title(group, title) {
                Ok(existing) => SeedOutcome::Skipped(existing),
                Err(SchemaError::NotFound { .. }) => match self.create_category(group, title, parent) {
                    Ok(uid) => SeedOutcome::Created(uid),
                    Err(e) => {
                        warn!(title, error = %e, "failed to seed category");
                        SeedOutcome::Failed(e.to_string())
                    }
                },
                Err(e) => return Err(e),
            };
            report.outcomes.push((title.to_string(), outcome));
        }
        Ok(report)
    }
}

fn group_mut(schema: &mut SchemaBundle, group: Uid) -> Result<&mut CategoryGroupDef> {
    schema
        .category_group_mut(group)
        .ok_or_else(|| SchemaError::not_found(EntityKind::CategoryGroup, group))
}

fn create_category_in(schema: &mut SchemaBundle, group: Uid, title: &str, parent: Option<Uid>) -> Result<Uid> {
    let def = schema
        .category_group(group)
        .ok_or_else(|| SchemaError::not_found(EntityKind::CategoryGroup, group))?;

    let mut errors = ValidationErrors::new();
    if title.trim().is_empty() {
        errors.add("title", "Title cannot be blank.");
    }

    let mut category = CategoryDef::new(group, title);
    if let Some(parent) = parent {
        match schema.category(parent) {
            Some(p) if p.group == group => {
                category.parent = Some(parent);
                category.level = p.level + 1;
            }
            Some(_) => errors.add("parent", "Parent belongs to a different group."),
            None => return Err(SchemaError::not_found(EntityKind::Category, parent)),
        }
    }
    if !level_allowed(category.level, def.max_levels) {
        errors.add(
            "level",
            format!("Categories in `{}` cannot be nested deeper than {} levels.", def.handle, def.max_levels.unwrap_or_default()),
        );
    }
    if !errors.is_empty() {
        return Err(SchemaError::validation(EntityKind::Category, title, errors));
    }

    let uid = category.uid;
    schema.categories.push(category);
    Ok(uid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FieldLayout, LayoutOwner, LayoutTab, Site, SiteSettings, DEFAULT_TAB};
    use crate::schema::{EntryTypeManager, SiteRegistry};

    fn setup() -> (SchemaStore, Uid) {
        let store = SchemaStore::temporary().unwrap();
        SiteRegistry::new(&store)
            .add_site(Site::new("default", "Default", "en-US").primary())
            .unwrap();
        let group = CategoryGroupManager::new(&store)
            .create(
                CategoryGroupDef::new("Locations", "locations")
                    .with_max_levels(3)
                    .with_site(SiteSettings::routed("default", "locations/{slug}", "locations/_category"))
                    .with_layout(FieldLayout::new(LayoutOwner::Category).with_tab(LayoutTab::new(DEFAULT_TAB, 1))),
            )
            .unwrap();
        (store, group)
    }

    #[test]
    fn test_create_group() {
        let (store, group) = setup();
        let groups = CategoryGroupManager::new(&store);
        let def = groups.get_by_handle("locations").unwrap();
        assert_eq!(def.uid, group);
        assert_eq!(def.layout.unwrap().tabs.len(), 1);
        assert!(groups
            .create(CategoryGroupDef::new("Locations", "locations").with_site(SiteSettings::new("default")))
            .unwrap_err()
            .is_duplicate());
    }

    #[test]
    fn test_group_cannot_take_an_owned_layout() {
        let (store, _) = setup();
        let groups = CategoryGroupManager::new(&store);
        let locations = groups.get_by_handle("locations").unwrap().layout.unwrap();

        let err = groups
            .create(
                CategoryGroupDef::new("Regions", "regions")
                    .with_site(SiteSettings::new("default"))
                    .with_layout(locations),
            )
            .unwrap_err();
        assert!(err.validation_errors().unwrap().has("fieldLayout"));
        assert!(groups.find_by_handle("regions").is_none());

        let types = EntryTypeManager::new(&store);
        let post = types.create("Blog Post", "blogPost").unwrap();
        let layout = FieldLayout::new(LayoutOwner::Category).with_tab(LayoutTab::new(DEFAULT_TAB, 1));
        let shared = FieldLayout {
            owner: LayoutOwner::Entry,
            ..layout.clone()
        };
        types.attach_layout(post, shared).unwrap();
        let err = groups
            .create(
                CategoryGroupDef::new("Regions", "regions")
                    .with_site(SiteSettings::new("default"))
                    .with_layout(layout),
            )
            .unwrap_err();
        assert!(err.validation_errors().unwrap().has("fieldLayout"));
    }

    #[test]
    fn test_tree_depth_enforced() {
        let (store, group) = setup();
        let groups = CategoryGroupManager::new(&store);
        let usa = groups.create_category(group, "USA", None).unwrap();
        let state = groups.create_category(group, "Massachusetts", Some(usa)).unwrap();
        let city = groups.create_category(group, "Boston", Some(state)).unwrap();
        assert_eq!(groups.category(city).unwrap().level, 3);

        let err = groups.create_category(group, "Back Bay", Some(city)).unwrap_err();
        assert!(err.validation_errors().unwrap().has("level"));

        groups.update_max_levels(group, Some(4)).unwrap();
        assert!(groups.create_category(group, "Back Bay", Some(city)).is_ok());
        assert!(groups.update_max_levels(group, Some(2)).is_err());
    }

    #[test]
    fn test_parent_from_other_group() {
        let (store, group) = setup();
        let groups = CategoryGroupManager::new(&store);
        let blog = groups
            .create(CategoryGroupDef::new("Blog Categories", "blogCategories").with_site(SiteSettings::new("default")))
            .unwrap();
        let foreign = groups.create_category(blog, "Essays", None).unwrap();
        let err = groups.create_category(group, "USA", Some(foreign)).unwrap_err();
        assert!(err.validation_errors().unwrap().has("parent"));
    }

    #[test]
    fn test_seed_skips_existing_titles() {
        let (store, group) = setup();
        let groups = CategoryGroupManager::new(&store);
        let usa = groups.create_category(group, "USA", None).unwrap();

        let report = groups.seed(group, &["A", "B", "A"], Some(usa)).unwrap();
        assert_eq!(report.created(), 2);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 0);

        let a = groups.find_by_group_and_title(group, "A").unwrap();
        assert_eq!(report.outcomes[2], ("A".to_string(), SeedOutcome::Skipped(a)));
        assert_eq!(groups.categories(group).iter().filter(|c| c.title == "A").count(), 1);
        assert_eq!(groups.category(a).unwrap().parent, Some(usa));
    }

    #[test]
    fn test_seed_reports_failures() {
        let (store, group) = setup();
        let groups = CategoryGroupManager::new(&store);
        let report = groups.seed(group, &["Ohio", " "], None).unwrap();
        assert_eq!(report.created(), 1);
        assert_eq!(report.failed(), 1);
        assert!(groups.seed(Uid::generate(), &["Ohio"], None).unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_group_cascades() {
        let (store, group) = setup();
        let groups = CategoryGroupManager::new(&store);
        let usa = groups.create_category(group, "USA", None).unwrap();
        groups.create_category(group, "Texas", Some(usa)).unwrap();

        assert_eq!(groups.delete_group(group).unwrap(), 2);
        assert!(groups.find_by_handle("locations").is_none());
        assert!(groups.categories(group).is_empty());
    }
}
