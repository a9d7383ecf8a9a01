//! Site registry.

use super::error::{EntityKind, Result, SchemaError};
use crate::catalog::{is_valid_handle, SchemaBundle, Site, SiteSettings, ValidationErrors};
use crate::store::SchemaStore;
use tracing::info;

/// Configured sites and the primary site.
pub struct SiteRegistry<'a> {
    store: &'a SchemaStore,
}

impl<'a> SiteRegistry<'a> {
    pub fn new(store: &'a SchemaStore) -> Self {
        Self { store }
    }

    /// Register a site. Only one site may be primary.
    pub fn add_site(&self, site: Site) -> Result<()> {
        let mut errors = ValidationErrors::new();
        if !is_valid_handle(&site.handle) {
            errors.add("handle", "Handle is not a valid identifier.");
        }
        if site.name.trim().is_empty() {
            errors.add("name", "Name cannot be blank.");
        }
        if site.language.trim().is_empty() {
            errors.add("language", "Language cannot be blank.");
        }
        if !errors.is_empty() {
            return Err(SchemaError::validation(EntityKind::Site, site.handle, errors));
        }

        let handle = site.handle.clone();
        self.store.update(|schema| {
            if schema.site(&site.handle).is_some() {
                return Err(SchemaError::duplicate(EntityKind::Site, site.handle));
            }
            if site.primary && schema.primary_site().is_some() {
                let mut errors = ValidationErrors::new();
                errors.add("primary", "A primary site is already configured.");
                return Err(SchemaError::validation(EntityKind::Site, site.handle, errors));
            }
            schema.sites.push(site);
            Ok(())
        })?;

        info!(handle = %handle, "added site");
        Ok(())
    }

    /// Register the site unless one with its handle exists. Returns whether it was added.
    pub fn ensure_site(&self, site: Site) -> Result<bool> {
        if self.store.read(|schema| schema.site(&site.handle).is_some()) {
            return Ok(false);
        }
        self.add_site(site)?;
        Ok(true)
    }

    /// The primary site.
    pub fn primary(&self) -> Result<Site> {
        self.store
            .read(|schema| schema.primary_site().cloned())
            .ok_or_else(|| SchemaError::not_found(EntityKind::Site, "primary"))
    }

    pub fn all(&self) -> Vec<Site> {
        self.store.read(|schema| schema.sites.clone())
    }
}

/// Settings must name configured sites.
pub(crate) fn check_site_settings(
    schema: &SchemaBundle,
    settings: &[SiteSettings],
    errors: &mut ValidationErrors,
) {
    for s in settings {
        if schema.site(&s.site).is_none() {
            errors.add("siteSettings", format!("Site `{}` does not exist.", s.site));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_primary() {
        let store = SchemaStore::temporary().unwrap();
        let sites = SiteRegistry::new(&store);
        assert!(sites.primary().unwrap_err().is_not_found());

        sites.add_site(Site::new("default", "Default", "en-US").primary()).unwrap();
        let err = sites
            .add_site(Site::new("dutch", "Dutch", "nl-NL").primary())
            .unwrap_err();
        assert!(err.validation_errors().unwrap().has("primary"));

        sites.add_site(Site::new("dutch", "Dutch", "nl-NL")).unwrap();
        assert_eq!(sites.primary().unwrap().handle, "default");
        assert_eq!(sites.all().len(), 2);
    }

    #[test]
    fn test_ensure_site_is_idempotent() {
        let store = SchemaStore::temporary().unwrap();
        let sites = SiteRegistry::new(&store);
        assert!(sites.ensure_site(Site::new("default", "Default", "en-US").primary()).unwrap());
        assert!(!sites.ensure_site(Site::new("default", "Default", "en-US").primary()).unwrap());
        assert!(sites
            .add_site(Site::new("default", "Other", "en-GB"))
            .unwrap_err()
            .is_duplicate());
    }
}
