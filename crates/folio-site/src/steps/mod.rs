//! The ordered migration steps of the site schema.

mod add_locations;
mod add_us_states;
mod common;
mod photography_and_freelance;
mod remove_creative_projects;
mod rename_photography_category;
mod restructure_photography;
mod setup_content_architecture;

pub use add_locations::AddLocations;
pub use add_us_states::{AddUsStates, US_STATES};
pub use photography_and_freelance::PhotographyAndFreelance;
pub use remove_creative_projects::RemoveCreativeProjects;
pub use rename_photography_category::RenamePhotographyCategory;
pub use restructure_photography::RestructurePhotography;
pub use setup_content_architecture::SetupContentArchitecture;

use folio_core::MigrationStep;

/// Every step of the site schema, in the order they must run.
pub fn steps() -> Vec<Box<dyn MigrationStep>> {
    vec![
        Box::new(SetupContentArchitecture),
        Box::new(RestructurePhotography),
        Box::new(PhotographyAndFreelance),
        Box::new(RemoveCreativeProjects),
        Box::new(AddLocations),
        Box::new(RenamePhotographyCategory),
        Box::new(AddUsStates),
    ]
}
