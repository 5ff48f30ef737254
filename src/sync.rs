use tracing::{debug, info, warn};

use crate::catalog::{CatalogApi, CatalogError, ChangeSetReceipt, EntitySummary};
use crate::changeset::ChangeSetRequest;
use crate::entity::{Description, EntityDetails};
use crate::error::SyncError;
use crate::local::{LocalDescriptionFile, LocalVersion};
use crate::product_type::{ProductSelection, ProductType};
use crate::transcode::transcode_version;
use crate::workspace::{Workspace, WriteOutcome};

/// Products of one type, sorted by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductGroup {
    pub product_type: ProductType,
    pub names: Vec<String>,
}

/// Result of a `list` run. Types without products are left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductListing {
    pub selection: ProductSelection,
    pub groups: Vec<ProductGroup>,
}

impl ProductListing {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Where a product lives in the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntity {
    pub entity_id: String,
    pub product_type: ProductType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeSetOutcome {
    /// `--no-op`: the request that would have been submitted
    DryRun { request_json: String },
    Submitted {
        product: String,
        entity: ResolvedEntity,
        receipt: ChangeSetReceipt,
    },
}

/// Drives the list, dump and push flows between the catalog and the local mirror
pub struct CatalogSync<C> {
    catalog: C,
    workspace: Workspace,
}

impl<C: CatalogApi> CatalogSync<C> {
    pub fn new(catalog: C, workspace: Workspace) -> Self {
        Self { catalog, workspace }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// List product names for one type or for every type
    pub async fn list(&self, selection: ProductSelection) -> Result<ProductListing, SyncError> {
        let mut groups = Vec::new();

        for product_type in selection.product_types() {
            let mut names: Vec<String> = self
                .collect_entities(product_type)
                .await?
                .into_iter()
                .map(|entity| entity.name)
                .collect();

            if names.is_empty() {
                continue;
            }
            names.sort();
            groups.push(ProductGroup { product_type, names });
        }

        Ok(ProductListing { selection, groups })
    }

    /// Find a product's entity id by scanning each product type in turn.
    /// The first type holding a product with that name wins.
    pub async fn resolve(&self, product: &str) -> Result<ResolvedEntity, SyncError> {
        for product_type in ProductType::ALL {
            let entities = self
                .collect_entities(product_type)
                .await
                .map_err(SyncError::catalog(product))?;

            if let Some(entity) = entities.into_iter().find(|entity| entity.name == product) {
                debug!(product, %product_type, entity_id = %entity.entity_id, "resolved product");
                return Ok(ResolvedEntity {
                    entity_id: entity.entity_id,
                    product_type,
                });
            }
        }

        Err(SyncError::ProductNotFound {
            product: product.to_string(),
        })
    }

    /// Mirror a product's description into `description.yaml`
    pub async fn dump(&self, product: &str) -> Result<WriteOutcome, SyncError> {
        let (entity, details) = self.fetch_details(product).await?;

        let local = LocalDescriptionFile::from(&details);
        let outcome = self.workspace.write_description(product, &local)?;

        info!(product, entity_id = %entity.entity_id, written = outcome.is_written(), "dumped description");
        Ok(outcome)
    }

    /// Mirror each version of a product into `versions/<title>.yaml`.
    ///
    /// Stops at the first version whose file is already up to date; later
    /// versions are not visited.
    pub async fn dump_versions(&self, product: &str) -> Result<Vec<WriteOutcome>, SyncError> {
        let (entity, details) = self.fetch_details(product).await?;
        let mut outcomes = Vec::with_capacity(details.versions.len());

        for (index, version) in details.versions.iter().enumerate() {
            let outcome = self.workspace.write_version(product, &LocalVersion::from(version))?;
            let unchanged = !outcome.is_written();
            outcomes.push(outcome);

            if unchanged {
                let skipped = details.versions.len() - index - 1;
                if skipped > 0 {
                    warn!(
                        product,
                        version = %version.version_title,
                        skipped,
                        "version unchanged, remaining versions not dumped"
                    );
                }
                break;
            }
        }

        info!(product, entity_id = %entity.entity_id, versions = outcomes.len(), "dumped versions");
        Ok(outcomes)
    }

    /// Submit the local description as an `UpdateInformation` change
    pub async fn update(&self, product: &str, no_op: bool) -> Result<ChangeSetOutcome, SyncError> {
        let entity = self.resolve(product).await?;
        let local = self.workspace.read_description(product)?;

        let details = serde_json::to_string(&Description::from(&local.description))?;
        let request =
            ChangeSetRequest::update_information(product, entity.product_type, &entity.entity_id, details);

        self.submit(product, entity, request, no_op).await
    }

    /// Submit a local version file as a new version (`AddDeliveryOptions`)
    pub async fn push_version(
        &self,
        product: &str,
        version_title: &str,
        no_op: bool,
    ) -> Result<ChangeSetOutcome, SyncError> {
        let local = self.workspace.read_version(product, version_title)?;
        let details = serde_json::to_string(&transcode_version(&local)?)?;

        let entity = self.resolve(product).await?;
        let request = ChangeSetRequest::add_delivery_options(
            product,
            version_title,
            entity.product_type,
            &entity.entity_id,
            details,
        );

        self.submit(product, entity, request, no_op).await
    }

    async fn submit(
        &self,
        product: &str,
        entity: ResolvedEntity,
        request: ChangeSetRequest,
        no_op: bool,
    ) -> Result<ChangeSetOutcome, SyncError> {
        if no_op {
            debug!(product, "no-op requested, not starting change set");
            return Ok(ChangeSetOutcome::DryRun {
                request_json: request.to_pretty_json()?,
            });
        }

        let receipt = self
            .catalog
            .start_change_set(&request)
            .await
            .map_err(SyncError::ChangeSet)?;

        info!(product, change_set_id = %receipt.change_set_id, "change set started");
        Ok(ChangeSetOutcome::Submitted {
            product: product.to_string(),
            entity,
            receipt,
        })
    }

    async fn fetch_details(&self, product: &str) -> Result<(ResolvedEntity, EntityDetails), SyncError> {
        let entity = self.resolve(product).await?;
        let raw = self
            .catalog
            .describe_entity(&entity.entity_id)
            .await
            .map_err(SyncError::catalog(product))?;

        let details = EntityDetails::from_json(&raw).map_err(|source| SyncError::DecodeDetails {
            product: product.to_string(),
            source,
        })?;
        Ok((entity, details))
    }

    /// Page through every entity of one type. A catalog that rejects the
    /// type itself yields no entities rather than an error.
    async fn collect_entities(&self, product_type: ProductType) -> Result<Vec<EntitySummary>, CatalogError> {
        let mut entities = Vec::new();
        let mut next_token = None;
        let mut first_page = true;

        loop {
            let page = match self.catalog.list_entities(product_type, next_token.take()).await {
                Ok(page) => page,
                Err(CatalogError::InvalidEntityType { message, .. }) if first_page => {
                    debug!(%product_type, reason = %message, "entity type not available, treating as empty");
                    return Ok(Vec::new());
                }
                Err(err) => return Err(err),
            };
            first_page = false;

            entities.extend(page.entities);
            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EntityPage;
    use crate::changeset::ChangeType;
    use crate::entity::tests::CONTAINER_PRODUCT_DETAILS;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// In-memory catalog. Pages are addressed by their index as the token.
    #[derive(Default)]
    struct FakeCatalog {
        pages: HashMap<ProductType, Vec<Vec<EntitySummary>>>,
        invalid_types: Vec<ProductType>,
        broken_types: Vec<ProductType>,
        details: HashMap<String, String>,
        describe_calls: AtomicUsize,
        submitted: Mutex<Vec<ChangeSetRequest>>,
    }

    impl FakeCatalog {
        fn with_pages(mut self, product_type: ProductType, pages: Vec<Vec<(&str, &str)>>) -> Self {
            let pages = pages
                .into_iter()
                .map(|page| {
                    page.into_iter()
                        .map(|(name, entity_id)| EntitySummary {
                            name: name.to_string(),
                            entity_id: entity_id.to_string(),
                        })
                        .collect()
                })
                .collect();
            self.pages.insert(product_type, pages);
            self
        }

        fn with_details(mut self, entity_id: &str, details: &str) -> Self {
            self.details.insert(entity_id.to_string(), details.to_string());
            self
        }

        fn with_invalid_type(mut self, product_type: ProductType) -> Self {
            self.invalid_types.push(product_type);
            self
        }

        fn with_broken_type(mut self, product_type: ProductType) -> Self {
            self.broken_types.push(product_type);
            self
        }

        fn submitted(&self) -> Vec<ChangeSetRequest> {
            self.submitted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CatalogApi for FakeCatalog {
        async fn list_entities(
            &self,
            entity_type: ProductType,
            next_token: Option<String>,
        ) -> Result<EntityPage, CatalogError> {
            if self.invalid_types.contains(&entity_type) {
                return Err(CatalogError::InvalidEntityType {
                    entity_type: entity_type.to_string(),
                    message: "Invalid entity type".to_string(),
                });
            }
            if self.broken_types.contains(&entity_type) {
                return Err(CatalogError::Api {
                    operation: "ListEntities",
                    message: "AccessDeniedException".to_string(),
                });
            }

            let index: usize = next_token.map(|t| t.parse().unwrap()).unwrap_or(0);
            let pages = self.pages.get(&entity_type).cloned().unwrap_or_default();
            let entities = pages.get(index).cloned().unwrap_or_default();
            let next_token = (index + 1 < pages.len()).then(|| (index + 1).to_string());
            Ok(EntityPage { entities, next_token })
        }

        async fn describe_entity(&self, entity_id: &str) -> Result<String, CatalogError> {
            self.describe_calls.fetch_add(1, Ordering::SeqCst);
            self.details.get(entity_id).cloned().ok_or(CatalogError::Api {
                operation: "DescribeEntity",
                message: "ResourceNotFoundException".to_string(),
            })
        }

        async fn start_change_set(&self, request: &ChangeSetRequest) -> Result<ChangeSetReceipt, CatalogError> {
            let mut submitted = self.submitted.lock().unwrap();
            submitted.push(request.clone());
            Ok(ChangeSetReceipt {
                change_set_id: format!("cs-{}", submitted.len()),
                change_set_arn: None,
            })
        }
    }

    fn widget_catalog() -> FakeCatalog {
        FakeCatalog::default()
            .with_pages(ProductType::ContainerProduct, vec![vec![("acme-widget", "prod-widget")]])
            .with_details("prod-widget", CONTAINER_PRODUCT_DETAILS)
    }

    fn sync_in(dir: &TempDir, catalog: FakeCatalog) -> CatalogSync<FakeCatalog> {
        CatalogSync::new(catalog, Workspace::new(dir.path()))
    }

    #[tokio::test]
    async fn test_list_all_skips_invalid_entity_types() {
        let catalog = FakeCatalog::default()
            .with_invalid_type(ProductType::DataProduct)
            .with_pages(ProductType::SaaSProduct, vec![vec![("zeta", "p-2"), ("alpha", "p-1")]]);
        let dir = TempDir::new().unwrap();
        let sync = sync_in(&dir, catalog);

        let listing = sync.list(ProductSelection::All).await.unwrap();

        assert_eq!(
            listing.groups,
            vec![ProductGroup {
                product_type: ProductType::SaaSProduct,
                names: vec!["alpha".to_string(), "zeta".to_string()],
            }]
        );
    }

    #[tokio::test]
    async fn test_list_follows_pagination_and_sorts() {
        let catalog = FakeCatalog::default().with_pages(
            ProductType::ContainerProduct,
            vec![
                vec![("mango", "p-3"), ("apple", "p-1")],
                vec![("kiwi", "p-2")],
                vec![("banana", "p-4")],
            ],
        );
        let dir = TempDir::new().unwrap();
        let sync = sync_in(&dir, catalog);

        let listing = sync
            .list(ProductSelection::One(ProductType::ContainerProduct))
            .await
            .unwrap();

        assert_eq!(listing.groups.len(), 1);
        assert_eq!(listing.groups[0].names, vec!["apple", "banana", "kiwi", "mango"]);
    }

    #[tokio::test]
    async fn test_list_aborts_on_other_errors() {
        let catalog = FakeCatalog::default()
            .with_pages(ProductType::ServerProduct, vec![vec![("server", "p-1")]])
            .with_broken_type(ProductType::DataProduct);
        let dir = TempDir::new().unwrap();
        let sync = sync_in(&dir, catalog);

        let err = sync.list(ProductSelection::All).await.unwrap_err();
        assert!(matches!(err, SyncError::Listing(CatalogError::Api { .. })));
    }

    #[tokio::test]
    async fn test_list_empty_catalog() {
        let dir = TempDir::new().unwrap();
        let sync = sync_in(&dir, FakeCatalog::default());

        let listing = sync.list(ProductSelection::All).await.unwrap();
        assert!(listing.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_first_matching_type_wins() {
        let catalog = FakeCatalog::default()
            .with_pages(ProductType::SupportProduct, vec![vec![("shared", "support-id")]])
            .with_pages(ProductType::ContainerProduct, vec![vec![("other", "x")], vec![("shared", "container-id")]]);
        let dir = TempDir::new().unwrap();
        let sync = sync_in(&dir, catalog);

        let entity = sync.resolve("shared").await.unwrap();
        assert_eq!(
            entity,
            ResolvedEntity {
                entity_id: "container-id".to_string(),
                product_type: ProductType::ContainerProduct,
            }
        );
    }

    #[tokio::test]
    async fn test_resolve_unknown_product() {
        let dir = TempDir::new().unwrap();
        let sync = sync_in(&dir, widget_catalog());

        let err = sync.resolve("ghost").await.unwrap_err();
        assert!(matches!(err, SyncError::ProductNotFound { ref product } if product == "ghost"));
    }

    #[tokio::test]
    async fn test_dump_twice_writes_once() {
        let dir = TempDir::new().unwrap();
        let sync = sync_in(&dir, widget_catalog());
        let path = sync.workspace().description_path("acme-widget");

        let first = sync.dump("acme-widget").await.unwrap();
        assert_eq!(first, WriteOutcome::Written(path.clone()));
        let bytes = fs::read(&path).unwrap();

        let second = sync.dump("acme-widget").await.unwrap();
        assert_eq!(second, WriteOutcome::Unchanged(path.clone()));
        assert_eq!(fs::read(&path).unwrap(), bytes);

        let contents = String::from_utf8(bytes).unwrap();
        assert!(contents.contains("producttitle: Acme Widget"));
        assert!(!contents.contains("versiontitle"));
    }

    #[tokio::test]
    async fn test_dump_reports_undecodable_details() {
        let catalog = FakeCatalog::default()
            .with_pages(ProductType::ContainerProduct, vec![vec![("acme-widget", "prod-widget")]])
            .with_details("prod-widget", "{\"Description\": \"oops\"}");
        let dir = TempDir::new().unwrap();
        let sync = sync_in(&dir, catalog);

        let err = sync.dump("acme-widget").await.unwrap_err();
        assert!(matches!(err, SyncError::DecodeDetails { ref product, .. } if product == "acme-widget"));
        assert!(!sync.workspace().description_path("acme-widget").exists());
    }

    #[tokio::test]
    async fn test_dump_versions_writes_each_version() {
        let details = r#"{"Versions": [
            {"VersionTitle": "v1.0.0", "Sources": [{"Images": ["a:v1.0.0"]}]},
            {"VersionTitle": "v1.1.0", "Sources": [{"Images": ["a:v1.1.0"]}]}
        ]}"#;
        let catalog = FakeCatalog::default()
            .with_pages(ProductType::ContainerProduct, vec![vec![("acme-widget", "prod-widget")]])
            .with_details("prod-widget", details);
        let dir = TempDir::new().unwrap();
        let sync = sync_in(&dir, catalog);

        let outcomes = sync.dump_versions("acme-widget").await.unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(WriteOutcome::is_written));

        let version = sync.workspace().read_version("acme-widget", "v1.1.0").unwrap();
        assert_eq!(version.sources[0].images, vec!["a:v1.1.0"]);
    }

    #[tokio::test]
    async fn test_dump_versions_stops_at_first_unchanged_version() {
        let details = r#"{"Versions": [
            {"VersionTitle": "v1.0.0", "ReleaseNotes": "one"},
            {"VersionTitle": "v1.1.0", "ReleaseNotes": "two"}
        ]}"#;
        let catalog = FakeCatalog::default()
            .with_pages(ProductType::ContainerProduct, vec![vec![("acme-widget", "prod-widget")]])
            .with_details("prod-widget", details);
        let dir = TempDir::new().unwrap();
        let sync = sync_in(&dir, catalog);

        let unchanged = LocalVersion {
            version_title: "v1.0.0".to_string(),
            release_notes: "one".to_string(),
            ..Default::default()
        };
        sync.workspace().write_version("acme-widget", &unchanged).unwrap();

        let outcomes = sync.dump_versions("acme-widget").await.unwrap();
        assert_eq!(outcomes.len(), 1);
        assert!(!outcomes[0].is_written());
        assert!(!sync.workspace().version_path("acme-widget", "v1.1.0").exists());
    }

    #[tokio::test]
    async fn test_update_no_op_prints_request_without_submitting() {
        let dir = TempDir::new().unwrap();
        let sync = sync_in(&dir, widget_catalog());
        sync.dump("acme-widget").await.unwrap();

        let outcome = sync.update("acme-widget", true).await.unwrap();
        let ChangeSetOutcome::DryRun { request_json } = outcome else {
            panic!("expected a dry run");
        };
        assert!(sync.catalog.submitted().is_empty());

        let request: ChangeSetRequest = serde_json::from_str(&request_json).unwrap();
        assert_eq!(request.change_set.len(), 1);
        assert_eq!(request.change_set[0].change_type, ChangeType::UpdateInformation);
        assert_eq!(request.change_set[0].entity.entity_type, "ContainerProduct@1.0");
        assert_eq!(request.change_set[0].entity.identifier, "prod-widget");

        let details: serde_json::Value = serde_json::from_str(&request.change_set[0].details).unwrap();
        assert_eq!(details["ProductTitle"], "Acme Widget");
        assert_eq!(details["Highlights"][0], "Fast");
        assert!(details.get("Versions").is_none());
    }

    #[tokio::test]
    async fn test_update_submits_edited_description() {
        let dir = TempDir::new().unwrap();
        let sync = sync_in(&dir, widget_catalog());
        sync.dump("acme-widget").await.unwrap();

        let path = sync.workspace().description_path("acme-widget");
        let edited = fs::read_to_string(&path)
            .unwrap()
            .replace("shortdescription: A widget", "shortdescription: A better widget");
        fs::write(&path, edited).unwrap();

        let outcome = sync.update("acme-widget", false).await.unwrap();
        assert!(matches!(outcome, ChangeSetOutcome::Submitted { ref receipt, .. } if receipt.change_set_id == "cs-1"));

        let submitted = sync.catalog.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(
            submitted[0].change_set_name.as_deref(),
            Some("Updated product Information for acme-widget")
        );
        let details: serde_json::Value = serde_json::from_str(&submitted[0].change_set[0].details).unwrap();
        assert_eq!(details["ShortDescription"], "A better widget");
    }

    #[tokio::test]
    async fn test_update_without_local_file() {
        let dir = TempDir::new().unwrap();
        let sync = sync_in(&dir, widget_catalog());

        let err = sync.update("acme-widget", false).await.unwrap_err();
        assert!(matches!(err, SyncError::Store(_)));
        assert!(sync.catalog.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_push_version_no_op_and_submit() {
        let dir = TempDir::new().unwrap();
        let sync = sync_in(&dir, widget_catalog());
        sync.dump_versions("acme-widget").await.unwrap();

        let outcome = sync.push_version("acme-widget", "v1.0.0", true).await.unwrap();
        let ChangeSetOutcome::DryRun { request_json } = outcome else {
            panic!("expected a dry run");
        };
        assert!(sync.catalog.submitted().is_empty());

        let request: ChangeSetRequest = serde_json::from_str(&request_json).unwrap();
        assert_eq!(request.change_set_name.as_deref(), Some("Push acme-widget version v1.0.0"));
        assert_eq!(request.change_set[0].change_type, ChangeType::AddDeliveryOptions);
        let details: serde_json::Value = serde_json::from_str(&request.change_set[0].details).unwrap();
        assert_eq!(details["Version"]["VersionTitle"], "v1.0.0");
        assert_eq!(
            details["DeliveryOptions"][0]["Details"]["EcrDeliveryOptionDetails"]["ContainerImages"][0],
            "123456789012.dkr.ecr.us-east-1.amazonaws.com/acme/widget:v1.0.0"
        );

        sync.push_version("acme-widget", "v1.0.0", false).await.unwrap();
        let submitted = sync.catalog.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0], request);
    }

    #[tokio::test]
    async fn test_push_version_without_sources_fails_before_catalog_calls() {
        let dir = TempDir::new().unwrap();
        let sync = sync_in(&dir, widget_catalog());
        let version = LocalVersion {
            version_title: "v2.0.0".to_string(),
            ..Default::default()
        };
        sync.workspace().write_version("acme-widget", &version).unwrap();

        let err = sync.push_version("acme-widget", "v2.0.0", false).await.unwrap_err();
        assert!(matches!(err, SyncError::Transcode(_)));
        assert!(sync.catalog.submitted().is_empty());
        assert_eq!(sync.catalog.describe_calls.load(Ordering::SeqCst), 0);
    }
}
