//! Folio Site - the personal website's content schema.
//!
//! The schema is built by seven one-way migration steps, applied in order by
//! [`folio_core::MigrationRunner`]:
//!
//! 1. base fields, category groups, singles and channels
//! 2. photography moves into its own structure section
//! 3. photography gains a third level; freelance work is added
//! 4. creative projects are removed
//! 5. a locations taxonomy is threaded into the content types
//! 6. the photography `category` entry type becomes `genre`
//! 7. the US states are seeded under `USA`

pub mod steps;

pub use steps::steps;
