//! Photography leaves Creative Projects and becomes a structure of albums and
//! photos.

use super::common::{
    ensure_entry_type, ensure_section, entry_routing, find_in_section, primary_site,
    thread_into_section, EntryTypeSpec,
};
use folio_core::catalog::{PropagationMethod, RelationTarget, SectionDef};
use folio_core::schema::EntityKind;
use folio_core::{MigrationError, MigrationStep, Precondition, StepContext};

const OTHER: EntryTypeSpec = EntryTypeSpec::new(
    "Other",
    "other",
    &[
        "featuredImage",
        "gallery",
        "description",
        "client",
        "projectDate",
        "creativeCategories",
    ],
);

const ALBUM: EntryTypeSpec = EntryTypeSpec::new(
    "Album",
    "album",
    &["featuredImage", "description", "photoLocation", "dateTaken"],
);

const PHOTO: EntryTypeSpec = EntryTypeSpec::new(
    "Photo",
    "photo",
    &[
        "featuredImage",
        "description",
        "dateTaken",
        "photoLocation",
        "camera",
        "lens",
        "iso",
        "aperture",
        "shutterSpeed",
    ],
);

/// Step 2 of the site schema.
pub struct RestructurePhotography;

impl MigrationStep for RestructurePhotography {
    fn id(&self) -> &'static str {
        "m251018_103821_restructure_photography"
    }

    fn description(&self) -> &'static str {
        "Move photography into an album/photo structure section"
    }

    fn preconditions(&self) -> Vec<Precondition> {
        vec![Precondition::PrimarySite]
    }

    fn apply(&self, ctx: &mut StepContext<'_>) -> Result<(), MigrationError> {
        let site = primary_site(ctx)?;

        // The photography project type goes away entirely, not just detached.
        if let Some(project) = find_in_section(ctx, "creativeProjects", "photographyProject") {
            let result = ctx.entry_types().delete(project);
            match result {
                Ok(()) => ctx.log().removed(EntityKind::EntryType, "photographyProject"),
                Err(e) => ctx.log().failed(EntityKind::EntryType, "photographyProject", e),
            }
        }

        if let Ok(other) = ensure_entry_type(ctx, &OTHER) {
            if let Some(creative) = ctx.sections().find_by_handle("creativeProjects") {
                match ctx.sections().add_entry_type(creative.uid, other) {
                    Ok(()) => ctx.log().updated(EntityKind::Section, "creativeProjects", "added entry type `other`"),
                    Err(e) => ctx.log().failed(EntityKind::Section, "creativeProjects", e),
                }
            }
        }

        let album = ensure_entry_type(ctx, &ALBUM)?;
        let photo = ensure_entry_type(ctx, &PHOTO)?;
        let photography = SectionDef::structure("Photography", "photography", Some(2))
            .with_entry_types([album, photo])
            .with_site(entry_routing(&site, "photography"))
            .with_propagation(PropagationMethod::All);
        let photography = ensure_section(ctx, photography)?;

        let defined = if ctx.fields().exists("relatedPhotographyAlbums") {
            ctx.log().skipped(EntityKind::Field, "relatedPhotographyAlbums", "already exists");
            true
        } else {
            let result = ctx.relations().define_relationship_field(
                "Related Photography Albums",
                "relatedPhotographyAlbums",
                RelationTarget::Section(photography),
            );
            ctx.log().record(EntityKind::Field, "relatedPhotographyAlbums", result).is_some()
        };
        if defined {
            thread_into_section(ctx, "travels", "relatedPhotographyAlbums");
            thread_into_section(ctx, "thoughts", "relatedPhotographyAlbums");
        }
        Ok(())
    }
}
