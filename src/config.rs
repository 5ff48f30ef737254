use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_marketplacecatalog::config::Region;
use std::path::PathBuf;
use tracing::debug;

use crate::error::SyncError;

/// Directory that holds the local product mirror, relative to the working directory
pub const DEFAULT_DATA_DIR: &str = "data";

/// Largest page list-entities accepts
pub const DEFAULT_PAGE_SIZE: i32 = 50;

/// Runtime settings for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub data_dir: PathBuf,
    pub page_size: i32,
    /// Named profile from the shared AWS config files
    pub profile: Option<String>,
    pub region: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            page_size: DEFAULT_PAGE_SIZE,
            profile: None,
            region: None,
        }
    }
}

impl SyncConfig {
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_page_size(mut self, page_size: i32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_profile(mut self, profile: Option<String>) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    /// Resolve credentials and region through the standard AWS provider chain,
    /// applying any profile or region override. Fails before any API call
    /// when no region can be found.
    pub async fn load_sdk_config(&self) -> Result<SdkConfig, SyncError> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;
        ensure_region(&sdk_config, self.profile.as_deref())?;
        Ok(sdk_config)
    }
}

fn ensure_region(sdk_config: &SdkConfig, profile: Option<&str>) -> Result<(), SyncError> {
    match sdk_config.region() {
        Some(region) => {
            debug!(%region, profile, "loaded AWS configuration");
            Ok(())
        }
        None => Err(SyncError::MissingRegion {
            profile: profile.unwrap_or("default").to_string(),
        }),
    }
}
