//! Concurrent icon loading into a rendering surface

use crate::core::config::IconLoadingConfig;
use crate::icons::normalize::normalize;
use crate::icons::resolver::IconWorkItem;
use crate::surface::IconSurface;
use crate::{MapError, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use image::GenericImageView;
use serde::Serialize;

/// Outcome of a [`load_all`] batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub requested: usize,
    pub failed: usize,
    /// One line per failed item, in work list order
    pub errors: Vec<String>,
    /// Identifiers registered by this batch
    pub registered: Vec<String>,
    /// Identifiers that were already registered before their fetch
    pub already_present: Vec<String>,
}

impl LoadReport {
    pub fn succeeded(&self) -> usize {
        self.requested - self.failed
    }

    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Registered,
    AlreadyPresent,
}

/// Loads every item of `items` into `surface` concurrently.
///
/// Per-item failures are collected into the report. The batch fails when
/// every requested item failed, or on the first failure when
/// `config.fail_fast` is set; in that case in-flight loads are dropped.
pub async fn load_all<S>(
    items: &[IconWorkItem],
    surface: &S,
    config: &IconLoadingConfig,
) -> Result<LoadReport>
where
    S: IconSurface + ?Sized,
{
    config.validate()?;

    let mut report = LoadReport {
        requested: items.len(),
        ..LoadReport::default()
    };
    if items.is_empty() {
        return Ok(report);
    }

    let mut pending: FuturesUnordered<_> = items
        .iter()
        .enumerate()
        .map(|(index, item)| async move { (index, load_one(item, surface, config).await) })
        .collect();

    let mut outcomes: Vec<Option<Result<Outcome>>> = Vec::with_capacity(items.len());
    outcomes.resize_with(items.len(), || None);

    while let Some((index, outcome)) = pending.next().await {
        let item = &items[index];
        match &outcome {
            Ok(Outcome::Registered) => log::debug!("registered icon {}", item.identifier),
            Ok(Outcome::AlreadyPresent) => {
                log::debug!("icon {} already registered", item.identifier)
            }
            Err(err) => {
                log::warn!(
                    "failed to load icon {} from {}: {}",
                    item.identifier,
                    item.source_url,
                    err
                );
                if config.fail_fast {
                    log::error!(
                        "aborting icon batch after {} failed ({} items requested)",
                        item.identifier,
                        items.len()
                    );
                    return Err(MapError::FailFast {
                        identifier: item.identifier.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }
        outcomes[index] = Some(outcome);
    }

    for (item, outcome) in items.iter().zip(outcomes) {
        match outcome {
            Some(Ok(Outcome::Registered)) => report.registered.push(item.identifier.clone()),
            Some(Ok(Outcome::AlreadyPresent)) => {
                report.already_present.push(item.identifier.clone())
            }
            Some(Err(err)) => {
                report.failed += 1;
                report.errors.push(format!("{}: {}", item.identifier, err));
            }
            None => {}
        }
    }

    if report.failed == report.requested {
        log::error!("all {} requested icons failed to load", report.requested);
        return Err(MapError::AllIconsFailed {
            requested: report.requested,
            errors: report.errors,
        });
    }

    if report.failed > 0 {
        log::warn!(
            "{} of {} icons failed to load",
            report.failed,
            report.requested
        );
    } else {
        log::info!(
            "loaded {} icons ({} new, {} already present)",
            report.requested,
            report.registered.len(),
            report.already_present.len()
        );
    }

    Ok(report)
}

async fn load_one<S>(item: &IconWorkItem, surface: &S, config: &IconLoadingConfig) -> Result<Outcome>
where
    S: IconSurface + ?Sized,
{
    if surface.is_destroyed() {
        return Err(MapError::SurfaceDestroyed);
    }
    if surface.has_image(&item.identifier) {
        return Ok(Outcome::AlreadyPresent);
    }

    let image = surface.load_image(&item.source_url).await?;
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(MapError::Decode(format!(
            "empty image at {}",
            item.source_url
        )));
    }

    let buffer = normalize(&image, item.effective_bounds(config), config.upsize_to_max);

    // The surface may have gone away or been filled while the fetch was pending
    if surface.is_destroyed() {
        return Err(MapError::SurfaceDestroyed);
    }
    if surface.has_image(&item.identifier) {
        return Ok(Outcome::AlreadyPresent);
    }

    match surface.add_image(&item.identifier, buffer) {
        Ok(()) => Ok(Outcome::Registered),
        // Another writer registered the id between the check and the add
        Err(_) if surface.has_image(&item.identifier) => {
            log::debug!("icon {} registered concurrently", item.identifier);
            Ok(Outcome::AlreadyPresent)
        }
        Err(err) => Err(err),
    }
}
