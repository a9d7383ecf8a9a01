//! Sites (locales) that sections and category groups are routed for.

use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// A configured site.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub struct Site {
    /// Machine name.
    pub handle: String,
    /// Display name.
    pub name: String,
    /// Language tag, e.g. `en-US`.
    pub language: String,
    /// Whether this is the primary site.
    pub primary: bool,
}

impl Site {
    /// Create a non-primary site.
    pub fn new(handle: impl Into<String>, name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            name: name.into(),
            language: language.into(),
            primary: false,
        }
    }

    /// Mark the site as primary.
    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }
}
