//! Field layouts: ordered tabs of field elements bound to one type.

use super::ids::Uid;
use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// Name of the tab layouts are built with by default.
pub const DEFAULT_TAB: &str = "Content";

/// The kind of element a layout is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutOwner {
    /// Layout of an entry type.
    Entry,
    /// Layout shared by all categories of a group.
    Category,
}

/// One field placed on a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub struct LayoutElement {
    /// Referenced field.
    pub field: Uid,
    /// Whether authors must fill the field.
    pub required: bool,
}

impl LayoutElement {
    /// Optional element for a field.
    pub fn new(field: Uid) -> Self {
        Self {
            field,
            required: false,
        }
    }
}

/// A named tab of layout elements.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub struct LayoutTab {
    /// Display name; also the lookup key for later appends.
    pub name: String,
    /// Explicit sort order (1-based).
    pub sort_order: u32,
    /// Elements in display order.
    pub elements: Vec<LayoutElement>,
}

impl LayoutTab {
    /// Create an empty tab.
    pub fn new(name: impl Into<String>, sort_order: u32) -> Self {
        Self {
            name: name.into(),
            sort_order,
            elements: Vec::new(),
        }
    }

    /// Add elements for the given fields.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = Uid>) -> Self {
        self.elements.extend(fields.into_iter().map(LayoutElement::new));
        self
    }

    /// Append one field as the last element.
    pub fn push(&mut self, field: Uid) {
        self.elements.push(LayoutElement::new(field));
    }

    /// Check if the tab contains a field.
    pub fn contains(&self, field: Uid) -> bool {
        self.elements.iter().any(|e| e.field == field)
    }

    /// Field identifiers in element order.
    pub fn field_uids(&self) -> Vec<Uid> {
        self.elements.iter().map(|e| e.field).collect()
    }
}

/// An ordered sequence of tabs owned by one entry type or category group.
///
/// Tabs are looked up by name but kept in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub struct FieldLayout {
    /// Stable identifier.
    pub uid: Uid,
    /// Element type the layout is for.
    pub owner: LayoutOwner,
    /// Tabs in display order.
    pub tabs: Vec<LayoutTab>,
}

impl FieldLayout {
    /// Create a layout without tabs.
    pub fn new(owner: LayoutOwner) -> Self {
        Self {
            uid: Uid::generate(),
            owner,
            tabs: Vec::new(),
        }
    }

    /// Add a tab.
    pub fn with_tab(mut self, tab: LayoutTab) -> Self {
        self.tabs.push(tab);
        self
    }

    /// Check if the layout has no tabs.
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Find a tab by exact name.
    pub fn tab(&self, name: &str) -> Option<&LayoutTab> {
        self.tabs.iter().find(|t| t.name == name)
    }

    /// Find a tab by exact name (mutable).
    pub fn tab_mut(&mut self, name: &str) -> Option<&mut LayoutTab> {
        self.tabs.iter_mut().find(|t| t.name == name)
    }

    /// The first tab, if any.
    pub fn first_tab_mut(&mut self) -> Option<&mut LayoutTab> {
        self.tabs.first_mut()
    }

    /// Sort order for a tab appended after all existing tabs.
    pub fn next_sort_order(&self) -> u32 {
        self.tabs.len() as u32 + 1
    }

    /// Append a tab after the existing ones.
    pub fn push_tab(&mut self, tab: LayoutTab) {
        self.tabs.push(tab);
    }

    /// Check if any tab contains a field.
    pub fn contains_field(&self, field: Uid) -> bool {
        self.tabs.iter().any(|t| t.contains(field))
    }

    /// All referenced fields in display order.
    pub fn field_uids(&self) -> Vec<Uid> {
        self.tabs.iter().flat_map(|t| t.field_uids()).collect()
    }

    /// Total number of elements across tabs.
    pub fn element_count(&self) -> usize {
        self.tabs.iter().map(|t| t.elements.len()).sum()
    }

    /// Drop elements whose field fails the predicate. Returns how many were dropped.
    pub fn retain_fields(&mut self, mut keep: impl FnMut(Uid) -> bool) -> usize {
        let before = self.element_count();
        for tab in &mut self.tabs {
            tab.elements.retain(|e| keep(e.field));
        }
        before - self.element_count()
    }
}
