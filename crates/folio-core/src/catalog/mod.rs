//! Content schema catalog for folio.
//!
//! The catalog holds the definitions that make up a content schema: fields,
//! field layouts, entry types, sections, category groups, categories and the
//! sites they are routed for. [`SchemaBundle`] is a complete snapshot of them.

mod bundle;
mod category;
mod entry_type;
mod field;
mod ids;
mod layout;
mod section;
mod site;
mod tree;
mod validation;

pub use bundle::SchemaBundle;
pub use category::{slugify, CategoryDef, CategoryGroupDef};
pub use entry_type::EntryTypeDef;
pub use field::{DropdownOption, FieldDef, FieldKind, RelationTarget};
pub use ids::{is_valid_handle, Uid};
pub use layout::{FieldLayout, LayoutElement, LayoutOwner, LayoutTab, DEFAULT_TAB};
pub use section::{PropagationMethod, SectionDef, SectionKind, SiteSettings, HOME_URI};
pub use site::Site;
pub use tree::{check_widening, level_allowed};
pub use validation::ValidationErrors;
