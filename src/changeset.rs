use serde::{Deserialize, Serialize};

use crate::product_type::ProductType;

/// Catalog that every request addresses
pub const MARKETPLACE_CATALOG: &str = "AWSMarketplace";

/// Kinds of change this tool submits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeType {
    UpdateInformation,
    AddDeliveryOptions,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::UpdateInformation => "UpdateInformation",
            ChangeType::AddDeliveryOptions => "AddDeliveryOptions",
        }
    }
}

/// Entity a change is addressed to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EntityReference {
    #[serde(rename = "Type")]
    pub entity_type: String,
    pub identifier: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Change {
    pub change_type: ChangeType,
    pub change_name: String,
    pub entity: EntityReference,
    /// JSON document whose shape depends on `change_type`
    pub details: String,
}

/// A start-changeset request. Always carries exactly one change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChangeSetRequest {
    pub catalog: String,
    pub change_set: Vec<Change>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_set_name: Option<String>,
}

impl ChangeSetRequest {
    fn single(change: Change, change_set_name: String) -> Self {
        Self {
            catalog: MARKETPLACE_CATALOG.to_string(),
            change_set: vec![change],
            change_set_name: Some(change_set_name),
        }
    }

    /// Replace a product's description with `details` (the Description JSON)
    pub fn update_information(
        product_name: &str,
        product_type: ProductType,
        entity_id: &str,
        details: String,
    ) -> Self {
        let change = Change {
            change_type: ChangeType::UpdateInformation,
            change_name: "UpdateProductInformation".to_string(),
            entity: EntityReference {
                entity_type: product_type.entity_type_identifier(),
                identifier: entity_id.to_string(),
            },
            details,
        };
        Self::single(change, format!("Updated product Information for {}", product_name))
    }

    /// Add a new version with its delivery options
    pub fn add_delivery_options(
        product_name: &str,
        version_title: &str,
        product_type: ProductType,
        entity_id: &str,
        details: String,
    ) -> Self {
        let change = Change {
            change_type: ChangeType::AddDeliveryOptions,
            change_name: "AddNewVersion".to_string(),
            entity: EntityReference {
                entity_type: product_type.entity_type_identifier(),
                identifier: entity_id.to_string(),
            },
            details,
        };
        Self::single(change, format!("Push {} version {}", product_name, version_title))
    }

    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
