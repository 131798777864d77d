use fairmap::{
    attach,
    fetch::{AssetFetcher, CachedFetcher, HttpFetcher},
    icons::provision,
    CategoryDirectory, DispatcherOptions, IconDescriptor, IconLayer, IconLoadingConfig,
    IconSurface, MemorySurface,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Application configuration, read from an optional JSON file
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AppConfig {
    /// Directory holding the packaged `/icons/...` assets
    asset_root: PathBuf,
    loading: IconLoadingConfig,
    dispatcher: DispatcherOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("public"),
            loading: IconLoadingConfig::default(),
            dispatcher: DispatcherOptions::default(),
        }
    }
}

impl AppConfig {
    async fn load(path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        match path {
            Some(path) => {
                let raw = tokio::fs::read_to_string(path).await?;
                Ok(serde_json::from_str(&raw)?)
            }
            None => Ok(Self::default()),
        }
    }
}

/// Resolves and loads the icons of a descriptor file, then prints the load report
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(descriptor_path) = args.next() else {
        eprintln!("usage: fairmap-app <descriptors.json> [config.json]");
        std::process::exit(2);
    };
    let config = AppConfig::load(args.next().as_deref()).await?;
    config.loading.validate()?;

    let raw = tokio::fs::read_to_string(&descriptor_path).await?;
    let descriptors = IconDescriptor::from_json_list(&raw)?;
    log::info!(
        "loaded {} descriptors from {}",
        descriptors.len(),
        descriptor_path
    );

    let remote = CachedFetcher::with_default_capacity(HttpFetcher::new());
    let fetcher = AssetFetcher::new(&config.asset_root).with_remote(Arc::new(remote));
    let surface = Arc::new(MemorySurface::new(Arc::new(fetcher)));

    let report = match provision(&descriptors, surface.as_ref(), &config.loading).await {
        Ok(report) => report,
        Err(e) => {
            log::error!("icon provisioning failed: {}", e);
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    for layer in [IconLayer::cluster(), IconLayer::marker()] {
        log::debug!("adding layer {}", layer.to_style_json());
        surface.add_layer(layer)?;
    }

    let directory = CategoryDirectory::from_descriptors(&descriptors);
    log::debug!("{} named categories", directory.len());
    let mut dispatcher = attach(surface.clone(), directory, config.dispatcher.clone());

    println!("{}", serde_json::to_string_pretty(&report)?);

    dispatcher.teardown();
    Ok(())
}
