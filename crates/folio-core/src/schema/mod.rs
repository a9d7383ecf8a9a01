//! Schema managers.
//!
//! Each manager borrows the [`SchemaStore`](crate::store::SchemaStore) and
//! commits one snapshot version per successful save. Managers are cheap to
//! construct; build one where it is needed.

mod categories;
mod entry_types;
mod error;
mod fields;
mod layouts;
mod relations;
mod sections;
mod sites;

pub use categories::{CategoryGroupManager, SeedOutcome, SeedReport};
pub use entry_types::EntryTypeManager;
pub use error::{EntityKind, Result, SchemaError};
pub use fields::FieldRegistry;
pub use layouts::{LayoutBuild, LayoutBuilder, ResolvedLayout};
pub use relations::{RelationshipGraph, ThreadOutcome, RELATED_CONTENT_TAB};
pub use sections::SectionManager;
pub use sites::SiteRegistry;
