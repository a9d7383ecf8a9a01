//! The fifty US states, seeded under the `USA` location.

use folio_core::schema::{EntityKind, SeedOutcome};
use folio_core::{MigrationError, MigrationStep, Precondition, StepContext};
use tracing::info;

pub const US_STATES: [&str; 50] = [
    "Alabama",
    "Alaska",
    "Arizona",
    "Arkansas",
    "California",
    "Colorado",
    "Connecticut",
    "Delaware",
    "Florida",
    "Georgia",
    "Hawaii",
    "Idaho",
    "Illinois",
    "Indiana",
    "Iowa",
    "Kansas",
    "Kentucky",
    "Louisiana",
    "Maine",
    "Maryland",
    "Massachusetts",
    "Michigan",
    "Minnesota",
    "Mississippi",
    "Missouri",
    "Montana",
    "Nebraska",
    "Nevada",
    "New Hampshire",
    "New Jersey",
    "New Mexico",
    "New York",
    "North Carolina",
    "North Dakota",
    "Ohio",
    "Oklahoma",
    "Oregon",
    "Pennsylvania",
    "Rhode Island",
    "South Carolina",
    "South Dakota",
    "Tennessee",
    "Texas",
    "Utah",
    "Vermont",
    "Virginia",
    "Washington",
    "West Virginia",
    "Wisconsin",
    "Wyoming",
];

/// Step 7 of the site schema.
pub struct AddUsStates;

impl MigrationStep for AddUsStates {
    fn id(&self) -> &'static str {
        "m251018_130000_add_us_states"
    }

    fn description(&self) -> &'static str {
        "Seed the US states under the USA location"
    }

    fn preconditions(&self) -> Vec<Precondition> {
        vec![
            Precondition::category_group("locations"),
            Precondition::category("locations", "USA"),
        ]
    }

    fn apply(&self, ctx: &mut StepContext<'_>) -> Result<(), MigrationError> {
        let groups = ctx.category_groups();
        let locations = groups.get_by_handle("locations")?;
        let usa = groups.find_by_group_and_title(locations.uid, "USA")?;

        let report = groups.seed(locations.uid, &US_STATES, Some(usa))?;
        for (title, outcome) in &report.outcomes {
            match outcome {
                SeedOutcome::Created(_) => ctx.log().created(EntityKind::Category, title.as_str()),
                SeedOutcome::Skipped(_) => ctx.log().skipped(EntityKind::Category, title.as_str(), "already exists"),
                SeedOutcome::Failed(error) => ctx.log().failed(EntityKind::Category, title.as_str(), error),
            }
        }
        info!(
            created = report.created(),
            skipped = report.skipped(),
            failed = report.failed(),
            "seeded US states"
        );
        Ok(())
    }
}
