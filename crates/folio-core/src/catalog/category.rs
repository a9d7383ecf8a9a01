//! Category groups and the category tree nodes inside them.

use super::ids::{is_valid_handle, Uid};
use super::layout::{FieldLayout, LayoutOwner};
use super::section::{validate_site_settings, SiteSettings};
use super::validation::ValidationErrors;
use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// A tree-shaped taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub struct CategoryGroupDef {
    /// Stable identifier.
    pub uid: Uid,
    /// Display name.
    pub name: String,
    /// Machine name, unique among category groups.
    pub handle: String,
    /// Maximum tree depth; `None` means unlimited.
    pub max_levels: Option<u32>,
    /// Routing settings per site.
    pub site_settings: Vec<SiteSettings>,
    /// Layout applied to every category of the group.
    pub layout: Option<FieldLayout>,
}

impl CategoryGroupDef {
    /// Create a group without depth bound or layout.
    pub fn new(name: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            uid: Uid::generate(),
            name: name.into(),
            handle: handle.into(),
            max_levels: None,
            site_settings: Vec::new(),
            layout: None,
        }
    }

    /// Bound the tree depth.
    pub fn with_max_levels(mut self, max_levels: u32) -> Self {
        self.max_levels = Some(max_levels);
        self
    }

    /// Add routing settings for a site.
    pub fn with_site(mut self, settings: SiteSettings) -> Self {
        self.site_settings.push(settings);
        self
    }

    /// Attach a category layout.
    pub fn with_layout(mut self, layout: FieldLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Check the definition in isolation.
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "Name cannot be blank.");
        }
        if !is_valid_handle(&self.handle) {
            errors.add("handle", "Handle is not a valid identifier.");
        }
        if self.max_levels == Some(0) {
            errors.add("maxLevels", "Max levels must be at least 1.");
        }
        if self.layout.as_ref().is_some_and(|l| l.owner != LayoutOwner::Category) {
            errors.add("fieldLayout", "Category groups need a category layout.");
        }
        validate_site_settings(&self.site_settings, &mut errors);
        errors
    }
}

/// A node in a category group's tree.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub struct CategoryDef {
    /// Stable identifier.
    pub uid: Uid,
    /// Owning group.
    pub group: Uid,
    /// Title; not required to be unique.
    pub title: String,
    /// URL slug derived from the title.
    pub slug: String,
    /// Parent node within the same group.
    pub parent: Option<Uid>,
    /// Depth in the tree (roots are level 1).
    pub level: u32,
}

impl CategoryDef {
    /// Create a root-level category.
    pub fn new(group: Uid, title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            uid: Uid::generate(),
            group,
            slug: slugify(&title),
            title,
            parent: None,
            level: 1,
        }
    }
}

/// Lowercase, hyphen-separated slug of a title.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("New Hampshire"), "new-hampshire");
        assert_eq!(slugify("  USA "), "usa");
        assert_eq!(slugify("Rock & Roll!"), "rock-roll");
    }

    #[test]
    fn test_group_validation() {
        let group = CategoryGroupDef::new("Locations", "locations")
            .with_max_levels(3)
            .with_site(SiteSettings::routed("default", "locations/{slug}", "locations/_category"))
            .with_layout(FieldLayout::new(LayoutOwner::Category));
        assert!(group.validate().is_empty());

        let wrong_owner = CategoryGroupDef::new("Locations", "locations")
            .with_site(SiteSettings::new("default"))
            .with_layout(FieldLayout::new(LayoutOwner::Entry));
        assert!(wrong_owner.validate().has("fieldLayout"));
    }

    #[test]
    fn test_new_category_is_root() {
        let category = CategoryDef::new(Uid::generate(), "North Holland");
        assert_eq!(category.level, 1);
        assert!(category.parent.is_none());
        assert_eq!(category.slug, "north-holland");
    }
}
