use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// The part of a catalog entity-details document this tool understands.
///
/// Fields that are not modeled here are dropped on decode. The reference
/// sections are kept as raw JSON so they can be mirrored to disk without
/// being edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EntityDetails {
    pub versions: Vec<Version>,
    pub description: Description,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targeting: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotional_resources: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support_information: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_availability: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repositories: Option<JsonValue>,
}

impl EntityDetails {
    /// Parse the `Details` string returned by describe-entity
    pub fn from_json(details: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(details)
    }
}

/// Product description, the payload of an `UpdateInformation` change
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Description {
    pub highlights: Vec<String>,
    pub long_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<JsonValue>,
    pub search_keywords: Vec<String>,
    pub product_title: String,
    pub short_description: String,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Version {
    pub id: String,
    pub release_notes: String,
    pub upgrade_instructions: String,
    pub version_title: String,
    pub creation_date: Option<DateTime<Utc>>,
    pub sources: Vec<Source>,
    pub delivery_options: Vec<DeliveryOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Source {
    #[serde(rename = "Type")]
    pub source_type: String,
    pub id: String,
    pub images: Vec<String>,
    pub compatibility: PlatformCompatibility,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PlatformCompatibility {
    pub platform: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DeliveryOption {
    pub id: String,
    #[serde(rename = "Type")]
    pub option_type: String,
    pub source_id: String,
    pub title: String,
    pub short_description: String,
    #[serde(rename = "isRecommended")]
    pub is_recommended: bool,
    pub compatibility: ServiceCompatibility,
    pub instructions: Instructions,
    pub recommendations: Recommendations,
    pub visibility: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceCompatibility {
    #[serde(rename = "AWSServices")]
    pub aws_services: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Instructions {
    pub usage: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Recommendations {
    pub deployment_resources: Vec<DeploymentResource>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DeploymentResource {
    pub text: String,
    pub url: String,
}
