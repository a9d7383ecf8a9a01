//! The migration step contract.

use super::error::MigrationError;
use super::log::ProgressLog;
use crate::catalog::SchemaBundle;
use crate::schema::{
    CategoryGroupManager, EntityKind, EntryTypeManager, FieldRegistry, LayoutBuilder,
    RelationshipGraph, SectionManager, SiteRegistry,
};
use crate::store::SchemaStore;
use std::fmt;

/// Something that must exist before a step may run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    Section(String),
    Field(String),
    CategoryGroup(String),
    EntryType(String),
    /// A category with this title in the group.
    Category { group: String, title: String },
    PrimarySite,
}

impl Precondition {
    pub fn section(handle: impl Into<String>) -> Self {
        Precondition::Section(handle.into())
    }

    pub fn field(handle: impl Into<String>) -> Self {
        Precondition::Field(handle.into())
    }

    pub fn category_group(handle: impl Into<String>) -> Self {
        Precondition::CategoryGroup(handle.into())
    }

    pub fn entry_type(handle: impl Into<String>) -> Self {
        Precondition::EntryType(handle.into())
    }

    pub fn category(group: impl Into<String>, title: impl Into<String>) -> Self {
        Precondition::Category {
            group: group.into(),
            title: title.into(),
        }
    }

    /// Kind of entity the precondition is about.
    pub fn kind(&self) -> EntityKind {
        match self {
            Precondition::Section(_) => EntityKind::Section,
            Precondition::Field(_) => EntityKind::Field,
            Precondition::CategoryGroup(_) => EntityKind::CategoryGroup,
            Precondition::EntryType(_) => EntityKind::EntryType,
            Precondition::Category { .. } => EntityKind::Category,
            Precondition::PrimarySite => EntityKind::Site,
        }
    }

    /// Handle or title the precondition names.
    pub fn label(&self) -> &str {
        match self {
            Precondition::Section(handle)
            | Precondition::Field(handle)
            | Precondition::CategoryGroup(handle)
            | Precondition::EntryType(handle) => handle,
            Precondition::Category { title, .. } => title,
            Precondition::PrimarySite => "primary",
        }
    }

    /// Check if the precondition holds.
    pub fn holds(&self, schema: &SchemaBundle) -> bool {
        match self {
            Precondition::Section(handle) => schema.section_by_handle(handle).is_some(),
            Precondition::Field(handle) => schema.field_by_handle(handle).is_some(),
            Precondition::CategoryGroup(handle) => schema.category_group_by_handle(handle).is_some(),
            Precondition::EntryType(handle) => schema.entry_type_by_handle(handle).is_some(),
            Precondition::Category { group, title } => schema
                .category_group_by_handle(group)
                .is_some_and(|g| schema.categories_in(g.uid).any(|c| &c.title == title)),
            Precondition::PrimarySite => schema.primary_site().is_some(),
        }
    }
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precondition::Section(handle) => write!(f, "section `{handle}` exists"),
            Precondition::Field(handle) => write!(f, "field `{handle}` exists"),
            Precondition::CategoryGroup(handle) => write!(f, "category group `{handle}` exists"),
            Precondition::EntryType(handle) => write!(f, "entry type `{handle}` exists"),
            Precondition::Category { group, title } => {
                write!(f, "category `{title}` exists in `{group}`")
            }
            Precondition::PrimarySite => write!(f, "a primary site is configured"),
        }
    }
}

/// Result of asking a step to undo itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum RevertOutcome {
    /// The step is one-way.
    Unsupported,
}

/// What a step gets to work with.
pub struct StepContext<'a> {
    store: &'a SchemaStore,
    log: ProgressLog,
}

impl<'a> StepContext<'a> {
    pub fn new(store: &'a SchemaStore, step_id: &str) -> Self {
        Self {
            store,
            log: ProgressLog::new(step_id),
        }
    }

    pub fn store(&self) -> &'a SchemaStore {
        self.store
    }

    pub fn fields(&self) -> FieldRegistry<'a> {
        FieldRegistry::new(self.store)
    }

    pub fn layouts(&self) -> LayoutBuilder<'a> {
        LayoutBuilder::new(self.store)
    }

    pub fn entry_types(&self) -> EntryTypeManager<'a> {
        EntryTypeManager::new(self.store)
    }

    pub fn sections(&self) -> SectionManager<'a> {
        SectionManager::new(self.store)
    }

    pub fn category_groups(&self) -> CategoryGroupManager<'a> {
        CategoryGroupManager::new(self.store)
    }

    pub fn relations(&self) -> RelationshipGraph<'a> {
        RelationshipGraph::new(self.store)
    }

    pub fn sites(&self) -> SiteRegistry<'a> {
        SiteRegistry::new(self.store)
    }

    /// The step's progress log.
    pub fn log(&mut self) -> &mut ProgressLog {
        &mut self.log
    }

    pub(crate) fn into_log(self) -> ProgressLog {
        self.log
    }
}

/// A named, one-way unit of schema evolution.
///
/// Steps run in ascending [`id`](MigrationStep::id) order, each at most once.
/// `apply` should keep going after independent entity-level failures (logging
/// them) and return `Err` only when the rest of the step cannot proceed.
pub trait MigrationStep {
    /// Timestamp-prefixed identifier, e.g. `m251018_095600_setup_content_architecture`.
    fn id(&self) -> &'static str;

    /// One-line summary.
    fn description(&self) -> &'static str;

    /// Entities that must exist before `apply` runs.
    fn preconditions(&self) -> Vec<Precondition> {
        Vec::new()
    }

    /// Perform the step.
    fn apply(&self, ctx: &mut StepContext<'_>) -> Result<(), MigrationError>;

    /// Steps cannot be undone.
    fn revert(&self) -> RevertOutcome {
        RevertOutcome::Unsupported
    }
}
