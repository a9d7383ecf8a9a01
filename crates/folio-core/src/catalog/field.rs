//! Field definitions.

use super::ids::{is_valid_handle, Uid};
use super::validation::ValidationErrors;
use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// One selectable option of a dropdown field.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub struct DropdownOption {
    /// Label shown to authors.
    pub label: String,
    /// Stored value.
    pub value: String,
    /// Whether this option is preselected.
    pub default: bool,
}

impl DropdownOption {
    /// Create a non-default option.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            default: false,
        }
    }

    /// Mark this option as the default.
    pub fn as_default(mut self) -> Self {
        self.default = true;
        self
    }
}

/// The container a relationship field may point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
#[serde(tag = "kind", content = "uid", rename_all = "snake_case")]
pub enum RelationTarget {
    /// Entries of a section.
    Section(Uid),
    /// Categories of a category group.
    CategoryGroup(Uid),
}

/// Field kinds and their kind-specific configuration.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// Single or multi-line text.
    PlainText {
        /// Render as a multi-line text area.
        multiline: bool,
        /// Initial visible rows for multi-line text.
        initial_rows: Option<u32>,
    },
    /// Date (and optional time).
    Date,
    /// Single selection from fixed options.
    Dropdown {
        /// Available options, in display order.
        options: Vec<DropdownOption>,
    },
    /// Reference to uploaded assets.
    Assets {
        /// Allowed file kinds; empty means any kind.
        allowed_kinds: Vec<String>,
        /// Maximum number of related assets.
        limit: Option<u32>,
    },
    /// Reference to entries of specific sections.
    Entries {
        /// Sections whose entries may be selected.
        sources: Vec<Uid>,
        /// Maximum number of related entries.
        limit: Option<u32>,
    },
    /// Reference to categories of one group.
    Categories {
        /// Category group whose categories may be selected.
        source: Uid,
        /// Maximum number of selected branches.
        branch_limit: Option<u32>,
    },
}

impl FieldKind {
    /// Single-line text.
    pub fn plain_text() -> Self {
        FieldKind::PlainText {
            multiline: false,
            initial_rows: None,
        }
    }

    /// Multi-line text with the given initial row count.
    pub fn multiline_text(initial_rows: u32) -> Self {
        FieldKind::PlainText {
            multiline: true,
            initial_rows: Some(initial_rows),
        }
    }

    /// Date field.
    pub fn date() -> Self {
        FieldKind::Date
    }

    /// Dropdown with the given options.
    pub fn dropdown(options: Vec<DropdownOption>) -> Self {
        FieldKind::Dropdown { options }
    }

    /// Unrestricted assets field.
    pub fn assets() -> Self {
        FieldKind::Assets {
            allowed_kinds: Vec::new(),
            limit: None,
        }
    }

    /// Image-only assets field with an optional limit.
    pub fn images(limit: Option<u32>) -> Self {
        FieldKind::Assets {
            allowed_kinds: vec!["image".to_string()],
            limit,
        }
    }

    /// Entries field restricted to one section.
    pub fn entries(section: Uid) -> Self {
        FieldKind::Entries {
            sources: vec![section],
            limit: None,
        }
    }

    /// Categories field restricted to one group.
    pub fn categories(group: Uid) -> Self {
        FieldKind::Categories {
            source: group,
            branch_limit: None,
        }
    }

    /// Relationship field for the given target.
    pub fn relation(target: RelationTarget) -> Self {
        match target {
            RelationTarget::Section(uid) => Self::entries(uid),
            RelationTarget::CategoryGroup(uid) => Self::categories(uid),
        }
    }

    /// Short machine name of the kind.
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::PlainText { multiline: false, .. } => "plain_text",
            FieldKind::PlainText { multiline: true, .. } => "multiline_text",
            FieldKind::Date => "date",
            FieldKind::Dropdown { .. } => "dropdown",
            FieldKind::Assets { .. } => "assets",
            FieldKind::Entries { .. } => "entries",
            FieldKind::Categories { .. } => "categories",
        }
    }

    /// Check if this kind references other content.
    pub fn is_relation(&self) -> bool {
        matches!(self, FieldKind::Entries { .. } | FieldKind::Categories { .. })
    }

    /// Containers this kind may point at.
    pub fn relation_targets(&self) -> Vec<RelationTarget> {
        match self {
            FieldKind::Entries { sources, .. } => {
                sources.iter().copied().map(RelationTarget::Section).collect()
            }
            FieldKind::Categories { source, .. } => vec![RelationTarget::CategoryGroup(*source)],
            _ => Vec::new(),
        }
    }

    /// Check the kind-specific configuration.
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        match self {
            FieldKind::PlainText {
                multiline: false,
                initial_rows: Some(_),
            } => errors.add("initialRows", "Initial rows only apply to multi-line text."),
            FieldKind::Dropdown { options } => {
                if options.is_empty() {
                    errors.add("options", "Dropdown fields need at least one option.");
                }
                if options.iter().filter(|o| o.default).count() > 1 {
                    errors.add("options", "Only one option can be the default.");
                }
                for (i, option) in options.iter().enumerate() {
                    if options[..i].iter().any(|o| o.value == option.value) {
                        errors.add("options", format!("Option value `{}` is used twice.", option.value));
                    }
                }
            }
            FieldKind::Assets { limit: Some(0), .. } | FieldKind::Entries { limit: Some(0), .. } => {
                errors.add("limit", "Limit must be at least 1.")
            }
            FieldKind::Categories {
                branch_limit: Some(0),
                ..
            } => errors.add("branchLimit", "Branch limit must be at least 1."),
            _ => {}
        }
        if let FieldKind::Entries { sources, .. } = self {
            if sources.is_empty() {
                errors.add("sources", "Entries fields need at least one source section.");
            }
        }
        errors
    }
}

/// A reusable field definition.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub struct FieldDef {
    /// Stable identifier.
    pub uid: Uid,
    /// Machine name, unique among fields.
    pub handle: String,
    /// Display name.
    pub name: String,
    /// Kind and configuration.
    pub kind: FieldKind,
}

impl FieldDef {
    /// Create a field definition with a fresh identifier.
    pub fn new(handle: impl Into<String>, name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            uid: Uid::generate(),
            handle: handle.into(),
            name: name.into(),
            kind,
        }
    }

    /// Check the definition in isolation (not against other fields).
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "Name cannot be blank.");
        }
        if !is_valid_handle(&self.handle) {
            errors.add("handle", "Handle is not a valid identifier.");
        }
        errors.merge(self.kind.validate());
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        assert_eq!(FieldKind::plain_text().label(), "plain_text");
        assert_eq!(FieldKind::multiline_text(4).label(), "multiline_text");
        assert_eq!(FieldKind::images(Some(1)).label(), "assets");
        assert!(FieldKind::entries(Uid::generate()).is_relation());
        assert!(!FieldKind::date().is_relation());
    }

    #[test]
    fn test_dropdown_validation() {
        let ok = FieldKind::dropdown(vec![
            DropdownOption::new("Family Vacation", "family"),
            DropdownOption::new("Work Travel", "work"),
        ]);
        assert!(ok.validate().is_empty());

        let empty = FieldKind::dropdown(Vec::new());
        assert!(empty.validate().has("options"));

        let two_defaults = FieldKind::dropdown(vec![
            DropdownOption::new("A", "a").as_default(),
            DropdownOption::new("B", "b").as_default(),
        ]);
        assert!(two_defaults.validate().has("options"));

        let dup = FieldKind::dropdown(vec![
            DropdownOption::new("A", "a"),
            DropdownOption::new("Also A", "a"),
        ]);
        assert_eq!(dup.validate().get("options").len(), 1);
    }

    #[test]
    fn test_field_validation() {
        let field = FieldDef::new("dateTaken", "Date Taken", FieldKind::date());
        assert!(field.validate().is_empty());

        let bad = FieldDef::new("date taken", " ", FieldKind::images(Some(0)));
        let errors = bad.validate();
        assert!(errors.has("handle"));
        assert!(errors.has("name"));
        assert!(errors.has("limit"));
    }

    #[test]
    fn test_relation_targets() {
        let section = Uid::generate();
        let group = Uid::generate();
        assert_eq!(
            FieldKind::relation(RelationTarget::Section(section)).relation_targets(),
            vec![RelationTarget::Section(section)]
        );
        assert_eq!(
            FieldKind::relation(RelationTarget::CategoryGroup(group)).relation_targets(),
            vec![RelationTarget::CategoryGroup(group)]
        );
        assert!(FieldKind::date().relation_targets().is_empty());
    }
}
