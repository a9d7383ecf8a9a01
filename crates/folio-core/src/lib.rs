//! Folio Core - content schema catalog, schema store, and migration runner.
//!
//! This crate provides the schema model (fields, field layouts, entry types,
//! sections, category groups), the sled-backed store that persists it, the
//! managers that evolve it, and the runner that applies ordered, one-way
//! migration steps against it.

pub mod catalog;
pub mod error;
pub mod migration;
pub mod schema;
pub mod store;

pub use catalog::{
    CategoryDef, CategoryGroupDef, DropdownOption, EntryTypeDef, FieldDef, FieldKind,
    FieldLayout, LayoutElement, LayoutOwner, LayoutTab, PropagationMethod, RelationTarget,
    SchemaBundle, SectionDef, SectionKind, Site, SiteSettings, Uid, ValidationErrors,
};
pub use error::Error;
pub use migration::{
    LogCounts, LogEntry, MigrationError, MigrationRunner, MigrationStateStore, MigrationStep,
    Outcome, Precondition, ProgressLog, RevertOutcome, RunReport, RunStatus, RunnerConfig,
    StepContext, StepRecord, StepReport, StepStatus,
};
pub use schema::{
    CategoryGroupManager, EntityKind, EntryTypeManager, FieldRegistry, LayoutBuild,
    LayoutBuilder, RelationshipGraph, ResolvedLayout, SchemaError, SectionManager, SeedOutcome,
    SeedReport, SiteRegistry, ThreadOutcome, RELATED_CONTENT_TAB,
};
pub use store::{SchemaStore, StoreConfig};
