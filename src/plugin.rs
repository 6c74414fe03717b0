//! Plugin facade.
//!
//! [`Plugin`] wires everything a host needs from one [`PluginSettings`]: the
//! shared resource catalog, the tokenizer and analyzer registries, the
//! summary extension and, when a resource server is configured, the sync
//! job. The host calls [`Plugin::start`] once its runtime is up and
//! [`Plugin::shutdown`] when the node stops.
//!
//! ```no_run
//! use hanlex::config::PluginSettings;
//! use hanlex::plugin::Plugin;
//! use hanlex::registry::TokenizerConfig;
//!
//! # async fn run() -> hanlex::error::Result<()> {
//! let plugin = Plugin::new(PluginSettings::from_json_str(
//!     r#"{"server": "http://nlp.local:8080"}"#,
//! )?)?;
//! plugin.start();
//!
//! let tokenizer = plugin.tokenizer("mynlp", &TokenizerConfig::default())?;
//! let _tokens: Vec<_> = tokenizer.tokenize("来到北京")?.collect();
//!
//! plugin.shutdown().await;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use log::{info, warn};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::analysis::analyzer::PipelineAnalyzer;
use crate::analysis::tokenizer::Tokenizer;
use crate::config::PluginSettings;
use crate::error::Result;
use crate::registry::{AnalyzerRegistry, TokenizerConfig, TokenizerRegistry};
use crate::resource::{CatalogHandle, ResourceCatalog, ResourceClient, SyncJob};
use crate::summary::{SentenceSummarizer, SummaryOutcome, SummaryRequest};

/// Everything the host talks to.
pub struct Plugin {
    settings: PluginSettings,
    catalog: CatalogHandle,
    tokenizers: Arc<TokenizerRegistry>,
    analyzers: Arc<AnalyzerRegistry>,
    sync: Option<Arc<SyncJob>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Plugin {
    /// Validate `settings` and build the plugin. Syncs over HTTP when a
    /// server is configured.
    pub fn new(settings: PluginSettings) -> Result<Self> {
        settings.validate()?;
        let catalog = CatalogHandle::new(ResourceCatalog::bundled());
        let sync = SyncJob::from_settings(&settings, catalog.clone())?.map(Arc::new);
        Ok(Self::assemble(settings, catalog, sync))
    }

    /// Build the plugin around a custom resource client.
    pub fn with_client(settings: PluginSettings, client: Arc<dyn ResourceClient>) -> Result<Self> {
        settings.validate()?;
        let catalog = CatalogHandle::new(ResourceCatalog::bundled());
        let sync = Arc::new(SyncJob::new(client, catalog.clone(), &settings));
        Ok(Self::assemble(settings, catalog, Some(sync)))
    }

    fn assemble(settings: PluginSettings, catalog: CatalogHandle, sync: Option<Arc<SyncJob>>) -> Self {
        let tokenizers = Arc::new(TokenizerRegistry::with_defaults(
            settings.clone(),
            catalog.clone(),
        ));
        let analyzers = Arc::new(AnalyzerRegistry::with_defaults(Arc::clone(&tokenizers)));
        info!(
            "plugin ready: {} tokenizer schemes, cws {}, resource sync {}",
            tokenizers.names().len(),
            if settings.enable_cws { "enabled" } else { "disabled" },
            if sync.is_some() { "enabled" } else { "disabled" },
        );
        Plugin {
            settings,
            catalog,
            tokenizers,
            analyzers,
            sync,
            task: Mutex::new(None),
        }
    }

    /// Start the periodic sync on the current tokio runtime.
    ///
    /// Returns `false` when there is nothing to start or it already runs.
    pub fn start(&self) -> bool {
        let Some(sync) = &self.sync else {
            return false;
        };
        let mut task = self.task.lock();
        if task.is_some() {
            return false;
        }
        *task = Some(Arc::clone(sync).spawn(self.settings.sync_interval()));
        true
    }

    /// Stop the sync job and wait for its task to end.
    pub async fn shutdown(&self) {
        if let Some(sync) = &self.sync {
            sync.shutdown();
        }
        let task = self.task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!("resource sync task ended abnormally: {e}");
            }
        }
    }

    /// Build a tokenizer by scheme name.
    pub fn tokenizer(&self, name: &str, config: &TokenizerConfig) -> Result<Box<dyn Tokenizer>> {
        self.tokenizers.get(name, config)
    }

    /// Build a registered analyzer.
    pub fn analyzer(&self, name: &str) -> Result<PipelineAnalyzer> {
        self.analyzers.get(name)
    }

    /// Summary extension, using the currently synchronized dictionary.
    pub fn summarize(&self, document: &Value, request: &SummaryRequest) -> SummaryOutcome {
        let snapshot = self.catalog.snapshot();
        SentenceSummarizer::new(Arc::clone(snapshot.lexicon().segmenter()))
            .summarize(document, request)
    }

    /// The settings in use.
    pub fn settings(&self) -> &PluginSettings {
        &self.settings
    }

    /// Shared resource catalog.
    pub fn catalog(&self) -> &CatalogHandle {
        &self.catalog
    }

    /// Tokenizer registry.
    pub fn tokenizers(&self) -> &Arc<TokenizerRegistry> {
        &self.tokenizers
    }

    /// Analyzer registry.
    pub fn analyzers(&self) -> &Arc<AnalyzerRegistry> {
        &self.analyzers
    }

    /// The sync job, when a resource source is configured.
    pub fn sync_job(&self) -> Option<&Arc<SyncJob>> {
        self.sync.as_ref()
    }
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("settings", &self.settings)
            .field("tokenizers", &self.tokenizers)
            .field("sync", &self.sync)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_without_server() {
        let plugin = Plugin::new(PluginSettings::default()).unwrap();
        assert!(plugin.sync_job().is_none());
        assert!(!plugin.start());
        assert!(plugin.tokenizer("hash", &TokenizerConfig::default()).is_ok());
        assert!(plugin.analyzer("pinyin").is_ok());
    }

    #[test]
    fn test_invalid_settings_are_fatal() {
        let settings = PluginSettings {
            download_timeout_secs: 0,
            ..Default::default()
        };
        assert!(Plugin::new(settings).is_err());
    }

    #[tokio::test]
    async fn test_start_and_shutdown() {
        let settings = PluginSettings {
            server: Some("http://127.0.0.1:9".to_string()),
            sync_interval_secs: 3600,
            ..Default::default()
        };
        let plugin = Plugin::new(settings).unwrap();
        assert!(plugin.start());
        assert!(!plugin.start());
        plugin.shutdown().await;
        assert_eq!(plugin.catalog().snapshot().generation(), 0);
    }
}
