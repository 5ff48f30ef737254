//! Access to the Marketplace Catalog API.
//!
//! The sync driver talks to the catalog through [`CatalogApi`] so it can run
//! against the AWS SDK client or an in-memory catalog.

use async_trait::async_trait;
use aws_sdk_marketplacecatalog as marketplacecatalog;
use marketplacecatalog::error::{DisplayErrorContext, SdkError};
use marketplacecatalog::operation::list_entities::ListEntitiesError;
use marketplacecatalog::types::{Change, Entity};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

use crate::changeset::{ChangeSetRequest, MARKETPLACE_CATALOG};
use crate::product_type::ProductType;

/// Name and identifier of one catalog entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySummary {
    pub name: String,
    pub entity_id: String,
}

/// One page of list-entities results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityPage {
    pub entities: Vec<EntitySummary>,
    pub next_token: Option<String>,
}

/// Identifiers the catalog assigns to an accepted changeset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSetReceipt {
    pub change_set_id: String,
    pub change_set_arn: Option<String>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{entity_type} is not a valid entity type for this catalog: {message}")]
    InvalidEntityType { entity_type: String, message: String },

    #[error("{operation} failed: {message}")]
    Api { operation: &'static str, message: String },

    #[error("{operation} response is missing {field}")]
    MissingField { operation: &'static str, field: &'static str },

    #[error("could not build {what}: {message}")]
    Build { what: &'static str, message: String },
}

#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetch one page of entities of `entity_type`, continuing from `next_token`
    async fn list_entities(
        &self,
        entity_type: ProductType,
        next_token: Option<String>,
    ) -> Result<EntityPage, CatalogError>;

    /// Fetch the raw entity-details JSON document
    async fn describe_entity(&self, entity_id: &str) -> Result<String, CatalogError>;

    async fn start_change_set(&self, request: &ChangeSetRequest) -> Result<ChangeSetReceipt, CatalogError>;
}

/// Catalog client backed by the AWS SDK
pub struct AwsCatalog {
    client: marketplacecatalog::Client,
    page_size: i32,
}

impl AwsCatalog {
    pub fn new(sdk_config: &aws_config::SdkConfig, page_size: i32) -> Self {
        Self {
            client: marketplacecatalog::Client::new(sdk_config),
            page_size,
        }
    }
}

#[async_trait]
impl CatalogApi for AwsCatalog {
    async fn list_entities(
        &self,
        entity_type: ProductType,
        next_token: Option<String>,
    ) -> Result<EntityPage, CatalogError> {
        debug!(%entity_type, has_token = next_token.is_some(), "listing entities");

        let output = self
            .client
            .list_entities()
            .catalog(MARKETPLACE_CATALOG)
            .entity_type(entity_type.as_str())
            .max_results(self.page_size)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|err| list_entities_error(entity_type, &err))?;

        let entities = output
            .entity_summary_list()
            .iter()
            .filter_map(|summary| {
                Some(EntitySummary {
                    name: summary.name()?.to_string(),
                    entity_id: summary.entity_id()?.to_string(),
                })
            })
            .collect();

        Ok(EntityPage {
            entities,
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn describe_entity(&self, entity_id: &str) -> Result<String, CatalogError> {
        debug!(entity_id, "describing entity");

        let output = self
            .client
            .describe_entity()
            .catalog(MARKETPLACE_CATALOG)
            .entity_id(entity_id)
            .send()
            .await
            .map_err(|err| CatalogError::Api {
                operation: "DescribeEntity",
                message: DisplayErrorContext(&err).to_string(),
            })?;

        output
            .details()
            .map(str::to_string)
            .ok_or(CatalogError::MissingField {
                operation: "DescribeEntity",
                field: "Details",
            })
    }

    async fn start_change_set(&self, request: &ChangeSetRequest) -> Result<ChangeSetReceipt, CatalogError> {
        let mut builder = self
            .client
            .start_change_set()
            .catalog(&request.catalog)
            .set_change_set_name(request.change_set_name.clone());

        for change in &request.change_set {
            let entity = Entity::builder()
                .r#type(&change.entity.entity_type)
                .identifier(&change.entity.identifier)
                .build()
                .map_err(|err| CatalogError::Build {
                    what: "entity reference",
                    message: err.to_string(),
                })?;
            let change = Change::builder()
                .change_type(change.change_type.as_str())
                .change_name(&change.change_name)
                .entity(entity)
                .details(&change.details)
                .build()
                .map_err(|err| CatalogError::Build {
                    what: "change",
                    message: err.to_string(),
                })?;
            builder = builder.change_set(change);
        }

        let output = builder.send().await.map_err(|err| CatalogError::Api {
            operation: "StartChangeSet",
            message: DisplayErrorContext(&err).to_string(),
        })?;

        let change_set_id = output
            .change_set_id()
            .map(str::to_string)
            .ok_or(CatalogError::MissingField {
                operation: "StartChangeSet",
                field: "ChangeSetId",
            })?;

        Ok(ChangeSetReceipt {
            change_set_id,
            change_set_arn: output.change_set_arn().map(str::to_string),
        })
    }
}

/// Map a list-entities failure. Only a validation error that names the entity
/// type becomes [`CatalogError::InvalidEntityType`]; everything else is fatal.
fn list_entities_error<R: fmt::Debug>(
    entity_type: ProductType,
    err: &SdkError<ListEntitiesError, R>,
) -> CatalogError {
    if let Some(ListEntitiesError::ValidationException(validation)) = err.as_service_error() {
        let message = validation.message().unwrap_or_default();
        if is_invalid_entity_type(message) {
            return CatalogError::InvalidEntityType {
                entity_type: entity_type.to_string(),
                message: message.to_string(),
            };
        }
    }
    CatalogError::Api {
        operation: "ListEntities",
        message: DisplayErrorContext(err).to_string(),
    }
}

/// Whether a validation message complains about the entity type itself.
/// Catalogs reject product types they do not carry this way.
pub fn is_invalid_entity_type(message: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)entity[\s_-]?type").unwrap())
        .is_match(message)
}
