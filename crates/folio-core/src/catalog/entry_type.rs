//! Entry type definitions.

use super::ids::Uid;
use super::layout::FieldLayout;
use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// A named type of entry, with its own field layout.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub struct EntryTypeDef {
    /// Stable identifier.
    pub uid: Uid,
    /// Display name.
    pub name: String,
    /// Machine name, unique among all entry types.
    pub handle: String,
    /// Field layout, once one has been attached.
    pub layout: Option<FieldLayout>,
}

impl EntryTypeDef {
    /// Create an entry type without a layout.
    pub fn new(name: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            uid: Uid::generate(),
            name: name.into(),
            handle: handle.into(),
            layout: None,
        }
    }

    /// Check if a layout with at least one tab is attached.
    pub fn has_tabs(&self) -> bool {
        self.layout.as_ref().is_some_and(|l| !l.is_empty())
    }
}
