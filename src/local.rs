//! The on-disk YAML schema.
//!
//! Local files use flat lowercase keys (`releasenotes`, `deliveryoptions`)
//! rather than the catalog's PascalCase. Conversions from the API shape live
//! here, as does the conversion back to the API description for updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use serde_yaml::{Mapping, Value as YamlValue};
use tracing::warn;

use crate::entity::{
    DeliveryOption, DeploymentResource, Description, EntityDetails, Source, Version,
};

/// Contents of `data/<product>/description.yaml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalDescriptionFile {
    pub description: LocalDescription,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targeting: Option<YamlValue>,
    #[serde(rename = "promotionalresources", skip_serializing_if = "Option::is_none")]
    pub promotional_resources: Option<YamlValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<YamlValue>,
    #[serde(rename = "supportinformation", skip_serializing_if = "Option::is_none")]
    pub support_information: Option<YamlValue>,
    #[serde(rename = "regionavailability", skip_serializing_if = "Option::is_none")]
    pub region_availability: Option<YamlValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repositories: Option<YamlValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalDescription {
    #[serde(rename = "producttitle")]
    pub product_title: String,
    #[serde(rename = "shortdescription")]
    pub short_description: String,
    #[serde(rename = "longdescription")]
    pub long_description: String,
    pub highlights: Vec<String>,
    #[serde(rename = "searchkeywords")]
    pub search_keywords: Vec<String>,
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<JsonValue>,
}

/// Contents of `data/<product>/versions/<title>.yaml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalVersion {
    pub id: String,
    #[serde(rename = "releasenotes")]
    pub release_notes: String,
    #[serde(rename = "upgradeinstructions")]
    pub upgrade_instructions: String,
    #[serde(rename = "versiontitle")]
    pub version_title: String,
    #[serde(rename = "creationdate")]
    pub creation_date: Option<DateTime<Utc>>,
    pub sources: Vec<LocalSource>,
    #[serde(rename = "deliveryoptions")]
    pub delivery_options: Vec<LocalDeliveryOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub id: String,
    pub images: Vec<String>,
    pub compatibility: LocalPlatformCompatibility,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalPlatformCompatibility {
    pub platform: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalDeliveryOption {
    pub id: String,
    #[serde(rename = "type")]
    pub option_type: String,
    #[serde(rename = "sourceid")]
    pub source_id: String,
    pub title: String,
    #[serde(rename = "shortdescription")]
    pub short_description: String,
    #[serde(rename = "isrecommended")]
    pub is_recommended: bool,
    pub compatibility: LocalServiceCompatibility,
    pub instructions: LocalInstructions,
    pub recommendations: LocalRecommendations,
    pub visibility: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalServiceCompatibility {
    #[serde(rename = "awsservices")]
    pub aws_services: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalInstructions {
    pub usage: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalRecommendations {
    #[serde(rename = "deploymentresources")]
    pub deployment_resources: Vec<LocalDeploymentResource>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalDeploymentResource {
    pub text: String,
    pub url: String,
}

impl LocalDescriptionFile {
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }
}

impl LocalVersion {
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }
}

/// Versions are stripped: they live in their own files
impl From<&EntityDetails> for LocalDescriptionFile {
    fn from(details: &EntityDetails) -> Self {
        let lowered = |section: &Option<JsonValue>| section.as_ref().map(lowercase_keys);

        Self {
            description: LocalDescription::from(&details.description),
            targeting: lowered(&details.targeting),
            promotional_resources: lowered(&details.promotional_resources),
            dimensions: lowered(&details.dimensions),
            support_information: lowered(&details.support_information),
            region_availability: lowered(&details.region_availability),
            repositories: lowered(&details.repositories),
        }
    }
}

impl From<&Description> for LocalDescription {
    fn from(description: &Description) -> Self {
        Self {
            product_title: description.product_title.clone(),
            short_description: description.short_description.clone(),
            long_description: description.long_description.clone(),
            highlights: description.highlights.clone(),
            search_keywords: description.search_keywords.clone(),
            categories: description.categories.clone(),
            sku: description.sku.clone(),
        }
    }
}

impl From<&LocalDescription> for Description {
    fn from(local: &LocalDescription) -> Self {
        Self {
            highlights: local.highlights.clone(),
            long_description: local.long_description.clone(),
            sku: local.sku.clone(),
            search_keywords: local.search_keywords.clone(),
            product_title: local.product_title.clone(),
            short_description: local.short_description.clone(),
            categories: local.categories.clone(),
        }
    }
}

impl From<&Version> for LocalVersion {
    fn from(version: &Version) -> Self {
        Self {
            id: version.id.clone(),
            release_notes: version.release_notes.clone(),
            upgrade_instructions: version.upgrade_instructions.clone(),
            version_title: version.version_title.clone(),
            creation_date: version.creation_date,
            sources: version.sources.iter().map(LocalSource::from).collect(),
            delivery_options: version
                .delivery_options
                .iter()
                .map(LocalDeliveryOption::from)
                .collect(),
        }
    }
}

impl From<&Source> for LocalSource {
    fn from(source: &Source) -> Self {
        Self {
            source_type: source.source_type.clone(),
            id: source.id.clone(),
            images: source.images.clone(),
            compatibility: LocalPlatformCompatibility {
                platform: source.compatibility.platform.clone(),
            },
        }
    }
}

impl From<&DeliveryOption> for LocalDeliveryOption {
    fn from(option: &DeliveryOption) -> Self {
        Self {
            id: option.id.clone(),
            option_type: option.option_type.clone(),
            source_id: option.source_id.clone(),
            title: option.title.clone(),
            short_description: option.short_description.clone(),
            is_recommended: option.is_recommended,
            compatibility: LocalServiceCompatibility {
                aws_services: option.compatibility.aws_services.clone(),
            },
            instructions: LocalInstructions {
                usage: option.instructions.usage.clone(),
            },
            recommendations: LocalRecommendations {
                deployment_resources: option
                    .recommendations
                    .deployment_resources
                    .iter()
                    .map(LocalDeploymentResource::from)
                    .collect(),
            },
            visibility: option.visibility.clone(),
        }
    }
}

impl From<&DeploymentResource> for LocalDeploymentResource {
    fn from(resource: &DeploymentResource) -> Self {
        Self {
            text: resource.text.clone(),
            url: resource.url.clone(),
        }
    }
}

/// Recursively convert a JSON value to YAML, lowercasing every mapping key.
///
/// Keys that differ only by case (`Url` and `URL`) land on the same local key;
/// the one that comes last in the document wins.
pub fn lowercase_keys(value: &JsonValue) -> YamlValue {
    match value {
        JsonValue::Null => YamlValue::Null,
        JsonValue::Bool(b) => YamlValue::Bool(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                YamlValue::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                YamlValue::Number(u.into())
            } else {
                YamlValue::Number(n.as_f64().unwrap_or_default().into())
            }
        }
        JsonValue::String(s) => YamlValue::String(s.clone()),
        JsonValue::Array(items) => YamlValue::Sequence(items.iter().map(lowercase_keys).collect()),
        JsonValue::Object(map) => {
            let mut mapping = Mapping::new();
            for (key, item) in map {
                let lowered = key.to_lowercase();
                if mapping.insert(YamlValue::String(lowered.clone()), lowercase_keys(item)).is_some() {
                    warn!(key = %key, local_key = %lowered, "keys differ only by case, keeping the last one");
                }
            }
            YamlValue::Mapping(mapping)
        }
    }
}
