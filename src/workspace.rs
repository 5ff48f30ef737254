//! The local `data/` tree that mirrors catalog products.
//!
//! ```text
//! data/<product>/description.yaml
//! data/<product>/versions/<version-title>.yaml
//! ```
//!
//! Files are only rewritten when their content changes. Writes go straight
//! to the destination path.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::local::{LocalDescriptionFile, LocalVersion};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to decode {}: {source}", .path.display())]
    Decode { path: PathBuf, source: serde_yaml::Error },

    #[error("failed to encode YAML for {}: {source}", .path.display())]
    Encode { path: PathBuf, source: serde_yaml::Error },
}

/// Result of a content-checked write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(PathBuf),
    Unchanged(PathBuf),
}

impl WriteOutcome {
    pub fn path(&self) -> &Path {
        match self {
            WriteOutcome::Written(path) | WriteOutcome::Unchanged(path) => path,
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, WriteOutcome::Written(_))
    }
}

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn product_dir(&self, product: &str) -> PathBuf {
        self.root.join(product)
    }

    pub fn description_path(&self, product: &str) -> PathBuf {
        self.product_dir(product).join("description.yaml")
    }

    pub fn version_path(&self, product: &str, version_title: &str) -> PathBuf {
        self.product_dir(product)
            .join("versions")
            .join(format!("{}.yaml", version_title))
    }

    pub fn read_description(&self, product: &str) -> Result<LocalDescriptionFile, StoreError> {
        let path = self.description_path(product);
        let contents = read_file(&path)?;
        LocalDescriptionFile::from_yaml(&contents).map_err(|source| StoreError::Decode { path, source })
    }

    pub fn read_version(&self, product: &str, version_title: &str) -> Result<LocalVersion, StoreError> {
        let path = self.version_path(product, version_title);
        let contents = read_file(&path)?;
        LocalVersion::from_yaml(&contents).map_err(|source| StoreError::Decode { path, source })
    }

    pub fn write_description(
        &self,
        product: &str,
        description: &LocalDescriptionFile,
    ) -> Result<WriteOutcome, StoreError> {
        let path = self.description_path(product);
        let contents = description
            .to_yaml()
            .map_err(|source| StoreError::Encode { path: path.clone(), source })?;
        write_if_changed(&path, contents.as_bytes())
    }

    pub fn write_version(&self, product: &str, version: &LocalVersion) -> Result<WriteOutcome, StoreError> {
        let path = self.version_path(product, &version.version_title);
        let contents = version
            .to_yaml()
            .map_err(|source| StoreError::Encode { path: path.clone(), source })?;
        write_if_changed(&path, contents.as_bytes())
    }

    /// Copy one version file to another, replacing every literal occurrence
    /// of `src_version` in the text with `dst_version`.
    ///
    /// The replacement is textual, so it also rewrites the source version
    /// string where it appears inside image tags, notes or URLs.
    pub fn clone_version(
        &self,
        product: &str,
        src_version: &str,
        dst_version: &str,
    ) -> Result<WriteOutcome, StoreError> {
        let src_path = self.version_path(product, src_version);
        let dst_path = self.version_path(product, dst_version);

        let src_contents = read_file(&src_path)?;

        match fs::read(&dst_path) {
            Ok(existing) if existing == src_contents.as_bytes() => {
                debug!(path = %dst_path.display(), "destination already matches source");
                return Ok(WriteOutcome::Unchanged(dst_path));
            }
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(source) => return Err(StoreError::Read { path: dst_path, source }),
        }

        let output = src_contents.replace(src_version, dst_version);
        write_if_changed(&dst_path, output.as_bytes())
    }
}

fn read_file(path: &Path) -> Result<String, StoreError> {
    fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `contents` to `path` unless the file already holds exactly those bytes
pub fn write_if_changed(path: &Path, contents: &[u8]) -> Result<WriteOutcome, StoreError> {
    match fs::read(path) {
        Ok(existing) if existing == contents => {
            debug!(path = %path.display(), "content unchanged, skipping write");
            return Ok(WriteOutcome::Unchanged(path.to_path_buf()));
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StoreError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(WriteOutcome::Written(path.to_path_buf()))
}
