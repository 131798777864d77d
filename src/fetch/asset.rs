use super::{is_remote, ImageFetcher};
use crate::{MapError, Result};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Reads icons from a packaged asset directory.
///
/// Asset references such as `/icons/default-map-icon.png` are resolved
/// against `root`. Remote URLs are handed to the optional remote fetcher.
pub struct AssetFetcher {
    root: PathBuf,
    remote: Option<Arc<dyn ImageFetcher>>,
}

impl AssetFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            remote: None,
        }
    }

    /// Delegate `http(s)://` URLs to `remote`
    pub fn with_remote(mut self, remote: Arc<dyn ImageFetcher>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps an asset reference to a file below the root. References that
    /// climb out of the root resolve to `None`.
    pub fn resolve_path(&self, reference: &str) -> Option<PathBuf> {
        let relative = Path::new(reference.trim().trim_start_matches('/'));
        let mut resolved = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => return None,
            }
        }
        if resolved == self.root {
            return None;
        }
        Some(resolved)
    }
}

#[async_trait]
impl ImageFetcher for AssetFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if is_remote(url) {
            return match &self.remote {
                Some(remote) => remote.fetch(url).await,
                None => Err(MapError::Fetch {
                    url: url.to_string(),
                    reason: "no remote fetcher configured".to_string(),
                }),
            };
        }

        let path = self.resolve_path(url).ok_or_else(|| MapError::Fetch {
            url: url.to_string(),
            reason: format!("not an asset below {}", self.root.display()),
        })?;

        log::debug!("reading icon asset {}", path.display());
        tokio::fs::read(&path).await.map_err(|e| MapError::Fetch {
            url: url.to_string(),
            reason: format!("{}: {}", path.display(), e),
        })
    }
}
