//! A locations taxonomy (country, state, city) used across the content types.

use super::common::{append_to_first_tab, ensure_category_field, ensure_category_group, primary_site};
use folio_core::catalog::{CategoryGroupDef, FieldLayout, LayoutOwner, LayoutTab, SiteSettings, DEFAULT_TAB};
use folio_core::{MigrationError, MigrationStep, Precondition, StepContext};

/// Entry types that get the locations field, by section.
const CONSUMERS: [(&str, &str); 4] = [
    ("photography", "album"),
    ("freelanceWork", "freelanceProject"),
    ("thoughts", "blogPost"),
    ("travels", "travelEntry"),
];

/// Step 5 of the site schema.
pub struct AddLocations;

impl MigrationStep for AddLocations {
    fn id(&self) -> &'static str {
        "m251018_120000_add_locations"
    }

    fn description(&self) -> &'static str {
        "Create the locations category group and add it to albums, projects, posts and travels"
    }

    fn preconditions(&self) -> Vec<Precondition> {
        vec![Precondition::PrimarySite]
    }

    fn apply(&self, ctx: &mut StepContext<'_>) -> Result<(), MigrationError> {
        let site = primary_site(ctx)?;

        let layout = FieldLayout::new(LayoutOwner::Category).with_tab(LayoutTab::new(DEFAULT_TAB, 1));
        let group = CategoryGroupDef::new("Locations", "locations")
            .with_max_levels(3)
            .with_site(SiteSettings::routed(&site, "locations/{slug}", "locations/_category"))
            .with_layout(layout);
        ensure_category_group(ctx, group)?;
        ensure_category_field(ctx, "locations", "locations", "Locations")?;

        for (section, entry_type) in CONSUMERS {
            append_to_first_tab(ctx, section, entry_type, "locations");
        }
        Ok(())
    }
}
