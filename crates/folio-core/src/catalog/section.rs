//! Section definitions and per-site routing settings.

use super::ids::{is_valid_handle, Uid};
use super::validation::ValidationErrors;
use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// URI format that routes a single section to the site root.
pub const HOME_URI: &str = "__home__";

/// Kind of section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Exactly one implicit entry (a static page).
    Single,
    /// Flat list of entries.
    Channel,
    /// Tree of entries bounded by a maximum depth.
    Structure,
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SectionKind::Single => write!(f, "single"),
            SectionKind::Channel => write!(f, "channel"),
            SectionKind::Structure => write!(f, "structure"),
        }
    }
}

/// How entry content replicates across sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropagationMethod {
    /// Replicate to every site.
    #[default]
    All,
    /// Replicate to sites in the same site group.
    SiteGroup,
    /// Replicate to sites sharing a language.
    Language,
    /// Keep each entry on the site it was created for.
    #[serde(rename = "none")]
    PerSite,
}

/// Routing settings of a section or category group for one site.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub struct SiteSettings {
    /// Handle of the site these settings apply to.
    pub site: String,
    /// Whether elements get their own URLs.
    pub has_urls: bool,
    /// URI pattern, e.g. `thoughts/{slug}`.
    pub uri_format: Option<String>,
    /// Template path used to render the element.
    pub template: Option<String>,
    /// Whether new entries are enabled for this site by default.
    pub enabled_by_default: bool,
}

impl SiteSettings {
    /// Settings without URLs.
    pub fn new(site: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            has_urls: false,
            uri_format: None,
            template: None,
            enabled_by_default: true,
        }
    }

    /// Settings routed by a URI pattern and rendered with a template.
    pub fn routed(site: impl Into<String>, uri_format: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            has_urls: true,
            uri_format: Some(uri_format.into()),
            template: Some(template.into()),
            enabled_by_default: true,
        }
    }

    /// Check the settings in isolation.
    pub fn validate(&self, errors: &mut ValidationErrors) {
        if !self.has_urls {
            return;
        }
        if self.uri_format.as_deref().map_or(true, |u| u.trim().is_empty()) {
            errors.add("uriFormat", format!("URI Format cannot be blank for site `{}`.", self.site));
        }
        if self.template.as_deref().map_or(true, |t| t.trim().is_empty()) {
            errors.add("template", format!("Template cannot be blank for site `{}`.", self.site));
        }
    }
}

/// Check a list of site settings: at least one, no site twice, each valid.
pub(crate) fn validate_site_settings(settings: &[SiteSettings], errors: &mut ValidationErrors) {
    if settings.is_empty() {
        errors.add("siteSettings", "At least one site must be enabled.");
    }
    for (i, s) in settings.iter().enumerate() {
        if settings[..i].iter().any(|o| o.site == s.site) {
            errors.add("siteSettings", format!("Site `{}` is configured twice.", s.site));
        }
        s.validate(errors);
    }
}

/// A content section.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub struct SectionDef {
    /// Stable identifier.
    pub uid: Uid,
    /// Display name.
    pub name: String,
    /// Machine name, unique among sections.
    pub handle: String,
    /// Section kind.
    pub kind: SectionKind,
    /// Maximum tree depth for structures; `None` means unlimited.
    pub max_levels: Option<u32>,
    /// Propagation policy.
    pub propagation: PropagationMethod,
    /// Entry types, in the order they were attached.
    pub entry_types: Vec<Uid>,
    /// Routing settings per site.
    pub site_settings: Vec<SiteSettings>,
}

impl SectionDef {
    fn with_kind(name: impl Into<String>, handle: impl Into<String>, kind: SectionKind) -> Self {
        Self {
            uid: Uid::generate(),
            name: name.into(),
            handle: handle.into(),
            kind,
            max_levels: None,
            propagation: PropagationMethod::default(),
            entry_types: Vec::new(),
            site_settings: Vec::new(),
        }
    }

    /// A single (static page) section.
    pub fn single(name: impl Into<String>, handle: impl Into<String>) -> Self {
        Self::with_kind(name, handle, SectionKind::Single)
    }

    /// A flat channel section.
    pub fn channel(name: impl Into<String>, handle: impl Into<String>) -> Self {
        Self::with_kind(name, handle, SectionKind::Channel)
    }

    /// A structure section bounded by `max_levels`.
    pub fn structure(name: impl Into<String>, handle: impl Into<String>, max_levels: Option<u32>) -> Self {
        let mut section = Self::with_kind(name, handle, SectionKind::Structure);
        section.max_levels = max_levels;
        section
    }

    /// Attach entry types.
    pub fn with_entry_types(mut self, entry_types: impl IntoIterator<Item = Uid>) -> Self {
        self.entry_types.extend(entry_types);
        self
    }

    /// Add routing settings for a site.
    pub fn with_site(mut self, settings: SiteSettings) -> Self {
        self.site_settings.push(settings);
        self
    }

    /// Set the propagation method.
    pub fn with_propagation(mut self, propagation: PropagationMethod) -> Self {
        self.propagation = propagation;
        self
    }

    /// Settings for a site.
    pub fn site(&self, handle: &str) -> Option<&SiteSettings> {
        self.site_settings.iter().find(|s| s.site == handle)
    }

    /// Check the definition in isolation (not against the rest of the schema).
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "Name cannot be blank.");
        }
        if !is_valid_handle(&self.handle) {
            errors.add("handle", "Handle is not a valid identifier.");
        }
        match self.kind {
            SectionKind::Single if self.entry_types.len() != 1 => {
                errors.add("entryTypes", "Single sections must have exactly one entry type.")
            }
            _ if self.entry_types.is_empty() => {
                errors.add("entryTypes", "At least one entry type is required.")
            }
            _ => {}
        }
        for (i, entry_type) in self.entry_types.iter().enumerate() {
            if self.entry_types[..i].contains(entry_type) {
                errors.add("entryTypes", format!("Entry type `{entry_type}` is listed twice."));
            }
        }
        match (self.kind, self.max_levels) {
            (SectionKind::Structure, Some(0)) => {
                errors.add("maxLevels", "Max levels must be at least 1.")
            }
            (SectionKind::Single | SectionKind::Channel, Some(_)) => {
                errors.add("maxLevels", "Only structure sections have a maximum level count.")
            }
            _ => {}
        }
        validate_site_settings(&self.site_settings, &mut errors);
        if self.kind == SectionKind::Single && self.site_settings.iter().any(|s| !s.has_urls) {
            errors.add("uriFormat", "Single sections must have a URI on every site.");
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routed() -> SiteSettings {
        SiteSettings::routed("default", "thoughts/{slug}", "thoughts/_entry")
    }

    #[test]
    fn test_valid_channel() {
        let section = SectionDef::channel("Thoughts", "thoughts")
            .with_entry_types([Uid::generate()])
            .with_site(routed());
        assert!(section.validate().is_empty());
        assert_eq!(section.propagation, PropagationMethod::All);
    }

    #[test]
    fn test_missing_template() {
        let mut settings = routed();
        settings.template = None;
        let section = SectionDef::channel("Thoughts", "thoughts")
            .with_entry_types([Uid::generate()])
            .with_site(settings);
        let errors = section.validate();
        assert!(errors.has("template"));
        assert!(!errors.has("uriFormat"));
    }

    #[test]
    fn test_single_needs_one_entry_type() {
        let section = SectionDef::single("Home", "home")
            .with_entry_types([Uid::generate(), Uid::generate()])
            .with_site(SiteSettings::routed("default", HOME_URI, "home/index"));
        assert!(section.validate().has("entryTypes"));
    }

    #[test]
    fn test_max_levels_rules() {
        let channel = SectionDef {
            max_levels: Some(2),
            ..SectionDef::channel("Travels", "travels")
        }
        .with_entry_types([Uid::generate()])
        .with_site(routed());
        assert!(channel.validate().has("maxLevels"));

        let zero = SectionDef::structure("Photography", "photography", Some(0))
            .with_entry_types([Uid::generate()])
            .with_site(routed());
        assert!(zero.validate().has("maxLevels"));
    }

    #[test]
    fn test_entry_type_listed_twice() {
        let post = Uid::generate();
        let section = SectionDef::channel("Thoughts", "thoughts")
            .with_entry_types([post, post])
            .with_site(routed());
        let errors = section.validate();
        assert!(errors.has("entryTypes"));
        assert_eq!(errors.get("entryTypes").len(), 1);
    }

    #[test]
    fn test_propagation_serializes_snake_case() {
        let section = SectionDef::channel("Thoughts", "thoughts")
            .with_entry_types([Uid::generate()])
            .with_site(routed())
            .with_propagation(PropagationMethod::PerSite);
        assert!(section.validate().is_empty());

        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(json["propagation"], "none");
        let back: SectionDef = serde_json::from_value(json).unwrap();
        assert_eq!(back, section);

        let site_group: PropagationMethod = serde_json::from_str("\"site_group\"").unwrap();
        assert_eq!(site_group, PropagationMethod::SiteGroup);
        assert_eq!(serde_json::to_string(&PropagationMethod::Language).unwrap(), "\"language\"");
    }

    #[test]
    fn test_duplicate_site_and_no_sites() {
        let none = SectionDef::channel("Travels", "travels").with_entry_types([Uid::generate()]);
        assert!(none.validate().has("siteSettings"));

        let twice = SectionDef::channel("Travels", "travels")
            .with_entry_types([Uid::generate()])
            .with_site(routed())
            .with_site(routed());
        assert!(twice.validate().has("siteSettings"));
    }
}
