// Marketplace catalog mirroring
pub mod catalog;
pub mod changeset;
pub mod config;
pub mod entity;
pub mod error;
pub mod local;
pub mod product_type;
pub mod report;
pub mod sync;
pub mod transcode;
pub mod workspace;

// Re-export core types for convenience
pub use catalog::{AwsCatalog, CatalogApi, CatalogError};
pub use changeset::{ChangeSetRequest, ChangeType};
pub use config::SyncConfig;
pub use entity::EntityDetails;
pub use error::SyncError;
pub use local::{LocalDescriptionFile, LocalVersion};
pub use product_type::{ProductSelection, ProductType};
pub use sync::{CatalogSync, ChangeSetOutcome, ProductListing};
pub use transcode::{transcode_version, TranscodeError, VersionChangeDetails};
pub use workspace::{Workspace, WriteOutcome};
