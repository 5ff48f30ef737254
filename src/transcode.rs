use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::local::{LocalDeliveryOption, LocalVersion};

/// Details payload of an `AddDeliveryOptions` change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersionChangeDetails {
    pub version: VersionInfo,
    pub delivery_options: Vec<DeliveryOptionChange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersionInfo {
    pub release_notes: String,
    pub version_title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeliveryOptionChange {
    pub details: DeliveryOptionDetails,
    pub delivery_option_title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeliveryOptionDetails {
    pub ecr_delivery_option_details: EcrDeliveryOptionDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EcrDeliveryOptionDetails {
    pub deployment_resources: Vec<DeploymentResourceChange>,
    pub compatible_services: Vec<String>,
    pub container_images: Vec<String>,
    pub description: String,
    pub usage_instructions: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeploymentResourceChange {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("version {version_title} has no sources; at least one source with container images is required")]
    NoSources { version_title: String },
}

/// Convert a locally edited version file into the changeset payload that
/// adds it to the catalog.
///
/// Every delivery option ships the images of the first source; any further
/// sources are ignored. Delivery options keep their input order.
pub fn transcode_version(src: &LocalVersion) -> Result<VersionChangeDetails, TranscodeError> {
    let first_source = src.sources.first().ok_or_else(|| TranscodeError::NoSources {
        version_title: src.version_title.clone(),
    })?;

    let delivery_options = src
        .delivery_options
        .iter()
        .map(|option| transcode_delivery_option(option, &first_source.images))
        .collect();

    Ok(VersionChangeDetails {
        version: VersionInfo {
            release_notes: src.release_notes.clone(),
            version_title: src.version_title.clone(),
        },
        delivery_options,
    })
}

fn transcode_delivery_option(option: &LocalDeliveryOption, images: &[String]) -> DeliveryOptionChange {
    let deployment_resources = option
        .recommendations
        .deployment_resources
        .iter()
        .map(|resource| DeploymentResourceChange {
            name: resource.text.clone(),
            url: resource.url.clone(),
        })
        .collect();

    DeliveryOptionChange {
        details: DeliveryOptionDetails {
            ecr_delivery_option_details: EcrDeliveryOptionDetails {
                deployment_resources,
                compatible_services: option.compatibility.aws_services.clone(),
                container_images: images.to_vec(),
                description: option.short_description.clone(),
                usage_instructions: option.instructions.usage.clone(),
            },
        },
        delivery_option_title: option.title.clone(),
    }
}
