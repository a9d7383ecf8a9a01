//! Versioned snapshot of the whole content schema.

use super::category::{CategoryDef, CategoryGroupDef};
use super::entry_type::EntryTypeDef;
use super::field::FieldDef;
use super::ids::Uid;
use super::layout::FieldLayout;
use super::section::SectionDef;
use super::site::Site;
use crate::error::Error;
use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// Every schema entity at one version.
///
/// Collections keep insertion order so listings and reports are stable.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub struct SchemaBundle {
    /// Schema version this bundle was committed as.
    pub version: u64,
    /// Commit time in milliseconds since the epoch.
    pub created_at: u64,
    /// Configured sites.
    pub sites: Vec<Site>,
    /// Field definitions.
    pub fields: Vec<FieldDef>,
    /// Entry types with their layouts.
    pub entry_types: Vec<EntryTypeDef>,
    /// Sections.
    pub sections: Vec<SectionDef>,
    /// Category groups with their layouts.
    pub category_groups: Vec<CategoryGroupDef>,
    /// Category tree nodes of every group.
    pub categories: Vec<CategoryDef>,
}

impl SchemaBundle {
    /// Create an empty bundle.
    pub fn new(version: u64) -> Self {
        Self {
            version,
            created_at: 0,
            sites: Vec::new(),
            fields: Vec::new(),
            entry_types: Vec::new(),
            sections: Vec::new(),
            category_groups: Vec::new(),
            categories: Vec::new(),
        }
    }

    pub fn field(&self, uid: Uid) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.uid == uid)
    }

    pub fn field_by_handle(&self, handle: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.handle == handle)
    }

    pub fn entry_type(&self, uid: Uid) -> Option<&EntryTypeDef> {
        self.entry_types.iter().find(|e| e.uid == uid)
    }

    pub fn entry_type_mut(&mut self, uid: Uid) -> Option<&mut EntryTypeDef> {
        self.entry_types.iter_mut().find(|e| e.uid == uid)
    }

    pub fn entry_type_by_handle(&self, handle: &str) -> Option<&EntryTypeDef> {
        self.entry_types.iter().find(|e| e.handle == handle)
    }

    pub fn section(&self, uid: Uid) -> Option<&SectionDef> {
        self.sections.iter().find(|s| s.uid == uid)
    }

    pub fn section_mut(&mut self, uid: Uid) -> Option<&mut SectionDef> {
        self.sections.iter_mut().find(|s| s.uid == uid)
    }

    pub fn section_by_handle(&self, handle: &str) -> Option<&SectionDef> {
        self.sections.iter().find(|s| s.handle == handle)
    }

    pub fn category_group(&self, uid: Uid) -> Option<&CategoryGroupDef> {
        self.category_groups.iter().find(|g| g.uid == uid)
    }

    pub fn category_group_mut(&mut self, uid: Uid) -> Option<&mut CategoryGroupDef> {
        self.category_groups.iter_mut().find(|g| g.uid == uid)
    }

    pub fn category_group_by_handle(&self, handle: &str) -> Option<&CategoryGroupDef> {
        self.category_groups.iter().find(|g| g.handle == handle)
    }

    pub fn category(&self, uid: Uid) -> Option<&CategoryDef> {
        self.categories.iter().find(|c| c.uid == uid)
    }

    /// Categories of a group in creation order.
    pub fn categories_in(&self, group: Uid) -> impl Iterator<Item = &CategoryDef> {
        self.categories.iter().filter(move |c| c.group == group)
    }

    /// Entry types attached to a section, in attachment order.
    pub fn entry_types_of_section(&self, section: Uid) -> Vec<&EntryTypeDef> {
        self.section(section)
            .map(|s| s.entry_types.iter().filter_map(|uid| self.entry_type(*uid)).collect())
            .unwrap_or_default()
    }

    /// Sections an entry type is attached to.
    pub fn sections_using_entry_type(&self, entry_type: Uid) -> Vec<&SectionDef> {
        self.sections
            .iter()
            .filter(|s| s.entry_types.contains(&entry_type))
            .collect()
    }

    /// Every layout in the schema, labelled with its owner's handle.
    pub fn layouts(&self) -> impl Iterator<Item = (&str, &FieldLayout)> {
        let entry_layouts = self
            .entry_types
            .iter()
            .filter_map(|e| e.layout.as_ref().map(|l| (e.handle.as_str(), l)));
        let group_layouts = self
            .category_groups
            .iter()
            .filter_map(|g| g.layout.as_ref().map(|l| (g.handle.as_str(), l)));
        entry_layouts.chain(group_layouts)
    }

    /// Mutable access to every layout.
    pub fn layouts_mut(&mut self) -> impl Iterator<Item = &mut FieldLayout> {
        let entry_layouts = self.entry_types.iter_mut().filter_map(|e| e.layout.as_mut());
        let group_layouts = self.category_groups.iter_mut().filter_map(|g| g.layout.as_mut());
        entry_layouts.chain(group_layouts)
    }

    pub fn primary_site(&self) -> Option<&Site> {
        self.sites.iter().find(|s| s.primary)
    }

    pub fn site(&self, handle: &str) -> Option<&Site> {
        self.sites.iter().find(|s| s.handle == handle)
    }

    /// Serialize the bundle to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|v| v.to_vec())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a bundle from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(bytes)
            .map_err(|e| Error::Deserialization(e.to_string()))
    }
}

impl Default for SchemaBundle {
    fn default() -> Self {
        Self::new(0)
    }
}
