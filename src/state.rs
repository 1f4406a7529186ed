//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::generators::{
    FixedLayoutExporter, GenerationOrchestrator, OutputDirs, SofficeExporter,
};
use crate::registry::ArtifactRegistry;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub orchestrator: Arc<GenerationOrchestrator>,
    pub registry: ArtifactRegistry,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let exporter = Arc::new(SofficeExporter::new(
            config.converter_bin.clone(),
            config.conversion_timeout,
        ));
        Self::new_with_exporter(config, exporter)
    }

    /// Build with a custom PDF exporter (used by tests).
    pub fn new_with_exporter(config: AppConfig, exporter: Arc<dyn FixedLayoutExporter>) -> Self {
        let orchestrator = GenerationOrchestrator::new(
            OutputDirs::new(config.generated_dir.clone()),
            config.certificate_style.clone(),
            config.column_mode,
            exporter,
        );
        let registry = ArtifactRegistry::new(config.registry_ttl, config.registry_capacity);

        AppState {
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
            registry,
        }
    }
}
