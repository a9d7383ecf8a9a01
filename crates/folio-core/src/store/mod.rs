//! Sled-backed persistence for schema snapshots.

mod config;
mod store;

pub use config::StoreConfig;
pub use store::SchemaStore;

/// Current time in milliseconds since the Unix epoch.
pub fn current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
