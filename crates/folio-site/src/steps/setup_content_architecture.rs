//! Base content architecture: category groups, fields, singles, channels and
//! the relationships between the channels.

use super::common::{
    create_category_group, create_entry_type, create_entry_types, create_section,
    define_category_field, define_fields, entry_routing, primary_site, thread_into_section,
    EntryTypeSpec,
};
use folio_core::catalog::{
    CategoryGroupDef, DropdownOption, FieldKind, PropagationMethod, RelationTarget, SectionDef,
    SiteSettings, HOME_URI,
};
use folio_core::schema::EntityKind;
use folio_core::{MigrationError, MigrationStep, Precondition, StepContext};

const CREATIVE_PROJECT_TYPES: [EntryTypeSpec; 3] = [
    EntryTypeSpec::new(
        "Photography Project",
        "photographyProject",
        &[
            "featuredImage",
            "gallery",
            "description",
            "dateTaken",
            "photoLocation",
            "camera",
            "lens",
            "iso",
            "aperture",
            "shutterSpeed",
            "projectDate",
            "creativeCategories",
        ],
    ),
    EntryTypeSpec::new(
        "Website Project",
        "websiteProject",
        &[
            "featuredImage",
            "gallery",
            "description",
            "client",
            "projectDate",
            "technologies",
            "projectUrl",
            "creativeCategories",
        ],
    ),
    EntryTypeSpec::new(
        "Graphic Design Project",
        "graphicDesignProject",
        &[
            "featuredImage",
            "gallery",
            "description",
            "client",
            "projectDate",
            "technologies",
            "creativeCategories",
        ],
    ),
];

const BLOG_POST: EntryTypeSpec =
    EntryTypeSpec::new("Blog Post", "blogPost", &["featuredImage", "description", "blogCategories"]);

const TRAVEL_ENTRY: EntryTypeSpec = EntryTypeSpec::new(
    "Travel Entry",
    "travelEntry",
    &[
        "featuredImage",
        "gallery",
        "description",
        "destination",
        "startDate",
        "endDate",
        "travelType",
    ],
);

/// Step 1 of the site schema.
pub struct SetupContentArchitecture;

impl MigrationStep for SetupContentArchitecture {
    fn id(&self) -> &'static str {
        "m251018_095600_setup_content_architecture"
    }

    fn description(&self) -> &'static str {
        "Create category groups, fields, singles, channels and their relationships"
    }

    fn preconditions(&self) -> Vec<Precondition> {
        vec![Precondition::PrimarySite]
    }

    fn apply(&self, ctx: &mut StepContext<'_>) -> Result<(), MigrationError> {
        let site = primary_site(ctx)?;
        create_category_groups(ctx, &site);
        create_fields(ctx);
        create_singles(ctx, &site);
        create_channels(ctx, &site);
        create_relationship_fields(ctx);

        thread_into_section(ctx, "travels", "relatedCreativeProjects");
        thread_into_section(ctx, "travels", "relatedBlogPosts");
        thread_into_section(ctx, "thoughts", "relatedCreativeProjects");
        thread_into_section(ctx, "thoughts", "relatedTravels");
        Ok(())
    }
}

fn create_category_groups(ctx: &mut StepContext<'_>, site: &str) {
    let groups = [
        ("Creative Categories", "creativeCategories", "creative"),
        ("Blog Categories", "blogCategories", "thoughts"),
    ];
    for (name, handle, base) in groups {
        let group = CategoryGroupDef::new(name, handle).with_site(SiteSettings::routed(
            site,
            format!("{base}/category/{{slug}}"),
            format!("{base}/_category"),
        ));
        let _ = create_category_group(ctx, group);
    }
}

fn create_fields(ctx: &mut StepContext<'_>) {
    define_fields(
        ctx,
        vec![
            // photography
            (FieldKind::date(), "dateTaken", "Date Taken"),
            (FieldKind::plain_text(), "photoLocation", "Location"),
            (FieldKind::plain_text(), "camera", "Camera"),
            (FieldKind::plain_text(), "lens", "Lens"),
            (FieldKind::plain_text(), "iso", "ISO"),
            (FieldKind::plain_text(), "aperture", "Aperture"),
            (FieldKind::plain_text(), "shutterSpeed", "Shutter Speed"),
            // projects
            (FieldKind::plain_text(), "client", "Client"),
            (FieldKind::date(), "projectDate", "Project Date"),
            (FieldKind::multiline_text(4), "technologies", "Technologies"),
            (FieldKind::plain_text(), "projectUrl", "Project URL"),
            // travel
            (FieldKind::plain_text(), "destination", "Destination"),
            (FieldKind::date(), "startDate", "Start Date"),
            (FieldKind::date(), "endDate", "End Date"),
            (
                FieldKind::dropdown(vec![
                    DropdownOption::new("Family Vacation", "family"),
                    DropdownOption::new("Personal Travel", "personal"),
                    DropdownOption::new("Work Travel", "work"),
                ]),
                "travelType",
                "Travel Type",
            ),
            // common
            (FieldKind::images(Some(1)), "featuredImage", "Featured Image"),
            (FieldKind::images(None), "gallery", "Gallery"),
            (FieldKind::multiline_text(6), "description", "Description"),
        ],
    );
    let _ = define_category_field(ctx, "creativeCategories", "creativeCategories", "Creative Categories");
    let _ = define_category_field(ctx, "blogCategories", "blogCategories", "Blog Categories");
}

fn create_singles(ctx: &mut StepContext<'_>, site: &str) {
    let singles = [
        ("Home", "home", HOME_URI),
        ("About", "about", "about"),
        ("Contact", "contact", "contact"),
    ];
    for (name, handle, uri) in singles {
        let Ok(entry_type) = create_entry_type(ctx, &EntryTypeSpec::new(name, handle, &[])) else {
            continue;
        };
        let section = SectionDef::single(name, handle)
            .with_entry_types([entry_type])
            .with_site(SiteSettings::routed(site, uri, format!("{handle}/index")))
            .with_propagation(PropagationMethod::All);
        let _ = create_section(ctx, section);
    }
}

fn create_channels(ctx: &mut StepContext<'_>, site: &str) {
    let creative = create_entry_types(ctx, &CREATIVE_PROJECT_TYPES);
    let _ = create_section(
        ctx,
        SectionDef::channel("Creative Projects", "creativeProjects")
            .with_entry_types(creative)
            .with_site(entry_routing(site, "creative"))
            .with_propagation(PropagationMethod::All),
    );

    if let Ok(blog_post) = create_entry_type(ctx, &BLOG_POST) {
        let _ = create_section(
            ctx,
            SectionDef::channel("Thoughts", "thoughts")
                .with_entry_types([blog_post])
                .with_site(entry_routing(site, "thoughts"))
                .with_propagation(PropagationMethod::All),
        );
    }

    if let Ok(travel_entry) = create_entry_type(ctx, &TRAVEL_ENTRY) {
        let _ = create_section(
            ctx,
            SectionDef::channel("Travels", "travels")
                .with_entry_types([travel_entry])
                .with_site(entry_routing(site, "travels"))
                .with_propagation(PropagationMethod::All),
        );
    }
}

fn create_relationship_fields(ctx: &mut StepContext<'_>) {
    let fields = [
        ("Related Creative Projects", "relatedCreativeProjects", "creativeProjects"),
        ("Related Blog Posts", "relatedBlogPosts", "thoughts"),
        ("Related Travels", "relatedTravels", "travels"),
    ];
    for (name, handle, section) in fields {
        let result = ctx
            .sections()
            .get_by_handle(section)
            .and_then(|s| ctx.relations().define_relationship_field(name, handle, RelationTarget::Section(s.uid)));
        ctx.log().record(EntityKind::Field, handle, result);
    }
}
