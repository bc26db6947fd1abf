use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use tracing::{debug, info, warn};

use crate::api::{ApiError, ServiceCatalog};
use crate::logic::defaults::{resolve, ManifestDefaults};
use crate::logic::manifests::build_manifests;
use crate::models::EmptyList;

pub const DOCUMENT_DELIMITER: &str = "---\n";

/// Everything the renderer needs besides its catalog, fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    /// Render only this service, without checking that it exists.
    pub service_name: Option<String>,
    pub defaults: ManifestDefaults,
}

impl RenderConfig {
    pub fn new(service_name: Option<String>, defaults: ManifestDefaults) -> Self {
        let service_name = service_name
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self {
            service_name,
            defaults,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RenderSummary {
    pub rendered: Vec<String>,
    pub skipped: Vec<String>,
    pub documents: usize,
}

pub struct Renderer<C> {
    catalog: C,
    config: RenderConfig,
}

impl<C: ServiceCatalog + Sync> Renderer<C> {
    pub fn new(catalog: C, config: RenderConfig) -> Self {
        Self { catalog, config }
    }

    pub async fn resolve_service_names(&self) -> Result<Vec<String>, ApiError> {
        match &self.config.service_name {
            Some(name) => Ok(vec![name.clone()]),
            None => self.catalog.list_service_names().await,
        }
    }

    /// Write every manifest for the resolved services to `out`.
    ///
    /// Each document is flushed as soon as it is built, so a transport error
    /// part-way through leaves the earlier documents in place.
    pub async fn render<W: Write>(&self, out: &mut W) -> Result<RenderSummary> {
        let names = self.resolve_service_names().await?;
        let mut summary = RenderSummary::default();

        if names.is_empty() {
            info!("No services to render, emitting empty List");
            write_document(out, &EmptyList::default(), false)?;
            return Ok(summary);
        }

        info!("Rendering {} service(s)", names.len());
        for name in names {
            let Some(record) = self.catalog.find_service(&name).await? else {
                warn!(service = %name, "No configuration record found, skipping");
                summary.skipped.push(name);
                continue;
            };

            let resolved = resolve(&record, &self.config.defaults);
            for manifest in build_manifests(&resolved) {
                debug!(service = %name, kind = manifest.kind(), manifest = manifest.name(), "emit");
                write_document(out, &manifest, true)?;
                summary.documents += 1;
            }
            summary.rendered.push(name);
        }

        Ok(summary)
    }
}

pub fn write_document<W: Write, T: Serialize>(out: &mut W, doc: &T, delimited: bool) -> Result<()> {
    let yaml = serde_yaml::to_string(doc).context("Failed to serialize manifest")?;
    out.write_all(yaml.as_bytes())?;
    if delimited {
        out.write_all(DOCUMENT_DELIMITER.as_bytes())?;
    }
    out.flush()?;
    Ok(())
}
