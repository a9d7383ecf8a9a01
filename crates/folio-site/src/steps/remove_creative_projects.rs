//! Creative projects are retired along with their fields and taxonomy.

use folio_core::schema::EntityKind;
use folio_core::{MigrationError, MigrationStep, StepContext};

/// Step 4 of the site schema.
pub struct RemoveCreativeProjects;

impl MigrationStep for RemoveCreativeProjects {
    fn id(&self) -> &'static str {
        "m251018_115000_remove_creative_projects"
    }

    fn description(&self) -> &'static str {
        "Remove the creative projects section, its relationship field and categories"
    }

    fn apply(&self, ctx: &mut StepContext<'_>) -> Result<(), MigrationError> {
        if let Some(section) = ctx.sections().find_by_handle("creativeProjects") {
            match ctx.sections().delete(section.uid) {
                Ok(entry_types) => {
                    ctx.log().removed(EntityKind::Section, "creativeProjects");
                    for handle in entry_types {
                        ctx.log().removed(EntityKind::EntryType, handle);
                    }
                }
                Err(e) => ctx.log().failed(EntityKind::Section, "creativeProjects", e),
            }
        }

        // layouts still placing these fields read past them
        for handle in ["relatedCreativeProjects", "creativeCategories"] {
            if !ctx.fields().exists(handle) {
                continue;
            }
            match ctx.fields().delete_field(handle) {
                Ok(_) => ctx.log().removed(EntityKind::Field, handle),
                Err(e) => ctx.log().failed(EntityKind::Field, handle, e),
            }
        }

        if let Some(group) = ctx.category_groups().find_by_handle("creativeCategories") {
            match ctx.category_groups().delete_group(group.uid) {
                Ok(_) => ctx.log().removed(EntityKind::CategoryGroup, "creativeCategories"),
                Err(e) => ctx.log().failed(EntityKind::CategoryGroup, "creativeCategories", e),
            }
        }
        Ok(())
    }
}
