//! Photography gains a category level above albums; freelance work gets its
//! own channel.

use super::common::{
    define_fields, ensure_entry_type, ensure_section, entry_routing, primary_site, EntryTypeSpec,
};
use folio_core::catalog::{FieldKind, PropagationMethod, SectionDef};
use folio_core::schema::EntityKind;
use folio_core::{MigrationError, MigrationStep, Precondition, StepContext};

const CATEGORY: EntryTypeSpec = EntryTypeSpec::new("Category", "category", &["featuredImage", "description"]);

const FREELANCE_PROJECT: EntryTypeSpec = EntryTypeSpec::new(
    "Freelance Project",
    "freelanceProject",
    &[
        "featuredImage",
        "projectType",
        "customer",
        "deliveryDate",
        "description",
        "projectImages",
    ],
);

/// Step 3 of the site schema.
pub struct PhotographyAndFreelance;

impl MigrationStep for PhotographyAndFreelance {
    fn id(&self) -> &'static str {
        "m251018_110000_restructure_photography_and_freelance"
    }

    fn description(&self) -> &'static str {
        "Add a category level to photography and create the freelance work channel"
    }

    fn preconditions(&self) -> Vec<Precondition> {
        vec![Precondition::PrimarySite]
    }

    fn apply(&self, ctx: &mut StepContext<'_>) -> Result<(), MigrationError> {
        let site = primary_site(ctx)?;

        // category -> album -> photo
        if let Some(photography) = ctx.sections().find_by_handle("photography") {
            if let Ok(category) = ensure_entry_type(ctx, &CATEGORY) {
                let sections = ctx.sections();
                let result = sections
                    .add_entry_type(photography.uid, category)
                    .and_then(|()| sections.update_max_levels(photography.uid, Some(3)));
                match result {
                    Ok(()) => ctx.log().updated(
                        EntityKind::Section,
                        "photography",
                        "added entry type `category`, max levels 3",
                    ),
                    Err(e) => ctx.log().failed(EntityKind::Section, "photography", e),
                }
            }
        }

        define_fields(
            ctx,
            vec![
                (FieldKind::plain_text(), "projectType", "Project Type"),
                (FieldKind::plain_text(), "customer", "Customer"),
                (FieldKind::date(), "deliveryDate", "Delivery Date"),
                (FieldKind::assets(), "projectImages", "Project Images"),
            ],
        );

        let freelance_project = ensure_entry_type(ctx, &FREELANCE_PROJECT)?;
        let freelance = SectionDef::channel("Freelance Work", "freelanceWork")
            .with_entry_types([freelance_project])
            .with_site(entry_routing(&site, "freelance"))
            .with_propagation(PropagationMethod::All);
        ensure_section(ctx, freelance)?;
        Ok(())
    }
}
