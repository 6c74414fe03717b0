//! Analyzer registry.
//!
//! An [`AnalyzerDefinition`] names a tokenizer scheme plus an ordered filter
//! chain. Definitions are immutable once registered; re-registering a name
//! replaces the whole definition.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::{FilterSpec, PipelineAnalyzer};
use crate::error::{HanlexError, Result};
use crate::registry::tokenizer::{TokenizerConfig, TokenizerRegistry};

/// A named analyzer: tokenizer scheme plus filter stages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerDefinition {
    /// Analyzer name.
    pub name: String,
    /// Tokenizer scheme it is built on.
    pub scheme: String,
    /// Settings passed to the tokenizer.
    #[serde(default)]
    pub tokenizer_config: TokenizerConfig,
    /// Filter stages, applied in order.
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
}

impl AnalyzerDefinition {
    /// A definition with default tokenizer settings.
    pub fn new<N: Into<String>, S: Into<String>>(name: N, scheme: S, filters: Vec<FilterSpec>) -> Self {
        AnalyzerDefinition {
            name: name.into(),
            scheme: scheme.into(),
            tokenizer_config: TokenizerConfig::default(),
            filters,
        }
    }
}

/// Registry of named analyzers.
pub struct AnalyzerRegistry {
    tokenizers: Arc<TokenizerRegistry>,
    definitions: RwLock<BTreeMap<String, AnalyzerDefinition>>,
}

impl AnalyzerRegistry {
    /// An empty registry resolving schemes through `tokenizers`.
    pub fn new(tokenizers: Arc<TokenizerRegistry>) -> Self {
        AnalyzerRegistry {
            tokenizers,
            definitions: RwLock::new(BTreeMap::new()),
        }
    }

    /// A registry with one analyzer per available tokenizer scheme.
    ///
    /// Segmentation analyzers lowercase their latin tokens; the others
    /// index the tokenizer output as is.
    pub fn with_defaults(tokenizers: Arc<TokenizerRegistry>) -> Self {
        let registry = Self::new(Arc::clone(&tokenizers));
        for scheme in tokenizers.names() {
            let filters = if scheme.starts_with("pinyin") || scheme == "hash" || scheme == "issue"
            {
                Vec::new()
            } else {
                vec![FilterSpec::Lowercase]
            };
            registry.register(AnalyzerDefinition::new(scheme.clone(), scheme, filters));
        }
        registry
    }

    /// Register a definition. Registering an existing name replaces it.
    pub fn register(&self, definition: AnalyzerDefinition) {
        let name = definition.name.clone();
        if self.definitions.write().insert(name.clone(), definition).is_some() {
            warn!("analyzer '{name}' registered twice, keeping the last registration");
        } else {
            debug!("registered analyzer '{name}'");
        }
    }

    /// Build the analyzer registered as `name`.
    pub fn get(&self, name: &str) -> Result<PipelineAnalyzer> {
        let definition = self
            .definitions
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| HanlexError::unknown_scheme(name))?;
        self.instantiate(&definition)
    }

    /// Build an ad-hoc analyzer from a scheme and filter stages.
    pub fn build(&self, scheme: &str, filters: &[FilterSpec]) -> Result<PipelineAnalyzer> {
        self.instantiate(&AnalyzerDefinition::new(scheme, scheme, filters.to_vec()))
    }

    /// Registered definition of `name`.
    pub fn definition(&self, name: &str) -> Option<AnalyzerDefinition> {
        self.definitions.read().get(name).cloned()
    }

    /// Names of the registered analyzers, sorted.
    pub fn names(&self) -> Vec<String> {
        self.definitions.read().keys().cloned().collect()
    }

    /// The underlying tokenizer registry.
    pub fn tokenizers(&self) -> &Arc<TokenizerRegistry> {
        &self.tokenizers
    }

    fn instantiate(&self, definition: &AnalyzerDefinition) -> Result<PipelineAnalyzer> {
        let tokenizer = self
            .tokenizers
            .get(&definition.scheme, &definition.tokenizer_config)?;
        Ok(PipelineAnalyzer::new(Arc::from(tokenizer))
            .with_filters(&definition.filters)
            .with_name(definition.name.as_str()))
    }
}

impl fmt::Debug for AnalyzerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerRegistry")
            .field("analyzers", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::Analyzer;
    use crate::config::PluginSettings;
    use crate::resource::CatalogHandle;

    fn registry() -> AnalyzerRegistry {
        let tokenizers = TokenizerRegistry::with_defaults(
            PluginSettings::default(),
            CatalogHandle::default(),
        );
        AnalyzerRegistry::with_defaults(Arc::new(tokenizers))
    }

    #[test]
    fn test_default_analyzers() {
        let registry = registry();
        assert_eq!(registry.names(), registry.tokenizers().names());

        let analyzer = registry.get("mynlp").unwrap();
        assert_eq!(analyzer.name(), "mynlp");
        let texts: Vec<String> = analyzer.analyze("我爱iPhone").unwrap().map(|t| t.text).collect();
        assert!(texts.contains(&"iphone".to_string()));
    }

    #[test]
    fn test_custom_definition() {
        let registry = registry();
        registry.register(AnalyzerDefinition {
            name: "name_pinyin".to_string(),
            scheme: "pinyin".to_string(),
            tokenizer_config: TokenizerConfig::default(),
            filters: vec![FilterSpec::FuzzyPinyin],
        });

        let texts: Vec<String> = registry
            .get("name_pinyin")
            .unwrap()
            .analyze("张三")
            .unwrap()
            .map(|t| t.text)
            .collect();
        assert_eq!(texts, vec!["zhang", "zan", "san"]);
    }

    #[test]
    fn test_unknown_analyzer_and_scheme() {
        let registry = registry();
        assert!(matches!(
            registry.get("standard"),
            Err(HanlexError::UnknownScheme(_))
        ));
        assert!(matches!(
            registry.build("mynlp-cws", &[]),
            Err(HanlexError::UnknownScheme(_))
        ));
    }

    #[test]
    fn test_definition_from_json() {
        let definition: AnalyzerDefinition = serde_json::from_str(
            r#"{"name":"title","scheme":"mynlp","tokenizer_config":{"mode":"atom"},"filters":[{"type":"stop"},{"type":"limit","max":8}]}"#,
        )
        .unwrap();
        assert_eq!(definition.filters.len(), 2);
        assert_eq!(definition.tokenizer_config.get("mode"), Some("atom"));
    }
}
