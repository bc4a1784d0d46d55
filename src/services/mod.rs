pub mod config;
pub mod error;
pub mod list;
pub mod preference_store;

pub use config::FilterConfiguration;
pub use error::StoreError;
pub use list::{ListCollaborators, ListController, ListControllerOptions, PersistenceLevel};
pub use preference_store::{JsonPreferenceStore, MemoryPreferenceStore, PreferenceStore, ViewPreferences};
