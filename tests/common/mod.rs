#![allow(dead_code)]

use async_trait::async_trait;
use fairmap::fetch::ImageFetcher;
use fairmap::{MapError, MemorySurface, Result};
use image::{DynamicImage, ImageOutputFormat, RgbaImage};
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(RgbaImage::new(width, height))
        .write_to(&mut bytes, ImageOutputFormat::Png)
        .unwrap();
    bytes.into_inner()
}

/// Serves PNG bytes by URL and counts every fetch.
///
/// Unknown URLs fall back to a 16×16 image unless marked as failing. Gated
/// URLs wait until [`MockFetcher::open_gate`] is called.
pub struct MockFetcher {
    images: Mutex<HashMap<String, Vec<u8>>>,
    failing: Mutex<HashSet<String>>,
    gated: Mutex<HashSet<String>>,
    gate: Arc<Semaphore>,
    calls: AtomicUsize,
    fetched: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            images: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            gated: Mutex::new(HashSet::new()),
            gate: Arc::new(Semaphore::new(0)),
            calls: AtomicUsize::new(0),
            fetched: Mutex::new(Vec::new()),
        })
    }

    pub fn serve(&self, url: &str, width: u32, height: u32) {
        self.images
            .lock()
            .unwrap()
            .insert(url.to_string(), png(width, height));
    }

    pub fn serve_bytes(&self, url: &str, bytes: Vec<u8>) {
        self.images.lock().unwrap().insert(url.to_string(), bytes);
    }

    pub fn fail(&self, url: &str) {
        self.failing.lock().unwrap().insert(url.to_string());
    }

    pub fn gate(&self, url: &str) {
        self.gated.lock().unwrap().insert(url.to_string());
    }

    pub fn open_gate(&self) {
        self.gate.add_permits(1024);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.fetched.lock().unwrap().push(url.to_string());

        let gated = self.gated.lock().unwrap().contains(url);
        if gated {
            let _permit = self.gate.acquire().await.unwrap();
        }

        if self.failing.lock().unwrap().contains(url) {
            return Err(MapError::Fetch {
                url: url.to_string(),
                reason: "HTTP 404 Not Found".to_string(),
            });
        }

        let served = self.images.lock().unwrap().get(url).cloned();
        Ok(served.unwrap_or_else(|| png(16, 16)))
    }
}

pub fn surface_with(fetcher: &Arc<MockFetcher>) -> Arc<MemorySurface> {
    Arc::new(MemorySurface::new(fetcher.clone()))
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
