use thiserror::Error;

use crate::catalog::CatalogError;
use crate::product_type::ProductTypeError;
use crate::transcode::TranscodeError;
use crate::workspace::StoreError;

/// Errors surfaced by the sync commands
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("no AWS region configured for profile {profile}; pass --region or set AWS_REGION")]
    MissingRegion { profile: String },

    #[error("could not find product {product} in any supported type")]
    ProductNotFound { product: String },

    #[error("catalog request for {product} failed: {source}")]
    Catalog {
        product: String,
        #[source]
        source: CatalogError,
    },

    #[error(transparent)]
    Listing(#[from] CatalogError),

    #[error("failed to decode entity details for {product}: {source}")]
    DecodeDetails {
        product: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not start change set: {0}")]
    ChangeSet(#[source] CatalogError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    #[error(transparent)]
    ProductType(#[from] ProductTypeError),

    #[error("failed to encode changeset details: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    pub(crate) fn catalog(product: &str) -> impl FnOnce(CatalogError) -> SyncError + '_ {
        move |source| SyncError::Catalog {
            product: product.to_string(),
            source,
        }
    }
}
