//! The photography `category` entry type is renamed to `genre`.

use super::common::find_in_section;
use folio_core::schema::EntityKind;
use folio_core::{MigrationError, MigrationStep, StepContext};

/// Step 6 of the site schema.
pub struct RenamePhotographyCategory;

impl MigrationStep for RenamePhotographyCategory {
    fn id(&self) -> &'static str {
        "m251018_125000_rename_photography_category"
    }

    fn description(&self) -> &'static str {
        "Rename the photography category entry type to genre"
    }

    fn apply(&self, ctx: &mut StepContext<'_>) -> Result<(), MigrationError> {
        let Some(category) = find_in_section(ctx, "photography", "category") else {
            ctx.log()
                .skipped(EntityKind::EntryType, "category", "not found in `photography`");
            return Ok(());
        };

        match ctx.entry_types().rename(category, "Genre", "genre") {
            Ok(()) => {
                ctx.log().updated(EntityKind::EntryType, "genre", "renamed from `category`");
                Ok(())
            }
            Err(e) => {
                ctx.log().failed(EntityKind::EntryType, "category", &e);
                Err(e.into())
            }
        }
    }
}
