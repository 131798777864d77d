//! Fetching icon bytes by URL
//!
//! Rendering surfaces delegate `load_image` to an [`ImageFetcher`]. Local
//! asset paths go through [`AssetFetcher`], remote URLs through
//! [`HttpFetcher`], and either can be wrapped in a [`CachedFetcher`].

#[cfg(feature = "tokio-runtime")]
pub mod asset;
pub mod cache;
#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "tokio-runtime")]
pub use asset::AssetFetcher;
pub use cache::CachedFetcher;
#[cfg(feature = "http")]
pub use http::HttpFetcher;

use crate::{MapError, Result};
use async_trait::async_trait;
use image::{DynamicImage, GenericImageView};
use std::sync::Arc;

/// Anything that can produce the raw bytes behind an icon URL.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

#[async_trait]
impl<T: ImageFetcher + ?Sized> ImageFetcher for Arc<T> {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        (**self).fetch(url).await
    }
}

/// Whether `url` points at a remote resource rather than a bundled asset
pub fn is_remote(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Decodes fetched bytes into an image. An image without pixels counts as a
/// decode failure.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.is_empty() {
        return Err(MapError::Decode("empty image payload".to_string()));
    }

    let image = image::load_from_memory(bytes)?;
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(MapError::Decode(format!(
            "image has no pixels ({}x{})",
            width, height
        )));
    }

    Ok(image)
}
