//! Tokenizer registry.
//!
//! Each scheme name maps to a [`SchemeFactory`] and an availability
//! predicate evaluated against the plugin settings. A scheme whose predicate
//! is false behaves exactly like an unregistered one.
//!
//! # Examples
//!
//! ```
//! use hanlex::analysis::tokenizer::Tokenizer;
//! use hanlex::config::PluginSettings;
//! use hanlex::registry::{TokenizerConfig, TokenizerRegistry};
//! use hanlex::resource::CatalogHandle;
//!
//! let registry = TokenizerRegistry::with_defaults(PluginSettings::default(), CatalogHandle::default());
//! let tokenizer = registry.get("pinyin-head", &TokenizerConfig::default()).unwrap();
//! let heads: Vec<_> = tokenizer.tokenize("北京").unwrap().map(|t| t.text).collect();
//! assert_eq!(heads, vec!["b", "j"]);
//!
//! assert!(registry.get("mynlp-cws", &TokenizerConfig::default()).is_err());
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::{
    HashTokenizer, IssueTokenizer, LexerKind, PinyinMode, PinyinTokenizer, SegmentMode,
    SegmentOptions, SegmentTokenizer, Tokenizer,
};
use crate::config::PluginSettings;
use crate::error::{HanlexError, Result};
use crate::resource::{CatalogHandle, ResourceCatalog};

/// Availability predicate of a scheme.
pub type Predicate = Arc<dyn Fn(&PluginSettings) -> bool + Send + Sync>;

/// Per-tokenizer settings as string pairs, the way index settings carry them.
///
/// Recognized keys: `mode` (`top`|`atom`), `filter-punctuation`,
/// `filter-stopword`, `custom-word`, `correction`. Unknown keys are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenizerConfig(BTreeMap<String, String>);

impl TokenizerConfig {
    /// Empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a setting.
    pub fn with<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Raw value of a setting.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Boolean value of a setting, `default` when absent.
    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value.trim().parse().map_err(|_| {
                HanlexError::invalid_config(format!("{key} must be true or false, got '{value}'"))
            }),
        }
    }

    /// Segmentation options for a scheme called `name`.
    ///
    /// Without an explicit `mode`, a name containing `_atom` selects atom
    /// mode.
    pub fn segment_options(&self, name: &str, lexer: LexerKind) -> Result<SegmentOptions> {
        let mode = match self.get("mode") {
            Some(mode) => mode.parse()?,
            None if name.contains("_atom") => SegmentMode::Atom,
            None => SegmentMode::Top,
        };
        Ok(SegmentOptions {
            lexer,
            mode,
            filter_punctuation: self.get_bool("filter-punctuation", true)?,
            filter_stopword: self.get_bool("filter-stopword", false)?,
            custom_word: self.get_bool("custom-word", true)?,
            correction: self.get_bool("correction", true)?,
        })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TokenizerConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        TokenizerConfig(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// How a scheme builds its tokenizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SchemeFactory {
    /// Word segmentation.
    Segment(LexerKind),
    /// One member of the pinyin family.
    Pinyin(PinyinMode),
    /// SHA-256 digest of the whole input.
    Hash,
    /// CJK and digit runs.
    Issue,
}

impl SchemeFactory {
    /// Build a tokenizer from the given catalog snapshot.
    pub fn create(
        &self,
        name: &str,
        config: &TokenizerConfig,
        catalog: &ResourceCatalog,
    ) -> Result<Box<dyn Tokenizer>> {
        let tokenizer: Box<dyn Tokenizer> = match *self {
            SchemeFactory::Segment(lexer) => Box::new(SegmentTokenizer::new(
                catalog.lexicon(),
                config.segment_options(name, lexer)?,
            )),
            SchemeFactory::Pinyin(mode) => Box::new(PinyinTokenizer::with_dict(
                mode,
                Arc::clone(catalog.lexicon().pinyin()),
            )),
            SchemeFactory::Hash => Box::new(HashTokenizer::new()),
            SchemeFactory::Issue => Box::new(IssueTokenizer::new()),
        };
        Ok(tokenizer)
    }
}

#[derive(Clone)]
struct SchemeEntry {
    factory: SchemeFactory,
    predicate: Predicate,
}

/// Registry of tokenizer schemes.
pub struct TokenizerRegistry {
    schemes: RwLock<BTreeMap<String, SchemeEntry>>,
    settings: PluginSettings,
    catalog: CatalogHandle,
}

impl TokenizerRegistry {
    /// An empty registry.
    pub fn new(settings: PluginSettings, catalog: CatalogHandle) -> Self {
        TokenizerRegistry {
            schemes: RwLock::new(BTreeMap::new()),
            settings,
            catalog,
        }
    }

    /// A registry holding the default schemes.
    pub fn with_defaults(settings: PluginSettings, catalog: CatalogHandle) -> Self {
        let registry = Self::new(settings, catalog);

        let cws_enabled: Predicate = Arc::new(|settings: &PluginSettings| settings.enable_cws);
        for name in ["mynlp", "mynlp-core", "core", "mynlp_index_atom", "mynlp_smart_atom"] {
            registry.register_always(name, SchemeFactory::Segment(LexerKind::Core));
        }
        for name in ["mynlp-cws", "cws"] {
            registry.register(
                name,
                SchemeFactory::Segment(LexerKind::Cws),
                Arc::clone(&cws_enabled),
            );
        }
        registry.register_always("issue", SchemeFactory::Issue);
        registry.register_always("hash", SchemeFactory::Hash);
        for mode in PinyinMode::ALL {
            registry.register_always(mode.scheme_name(), SchemeFactory::Pinyin(mode));
        }
        registry
    }

    /// Register a scheme. Registering an existing name replaces it.
    pub fn register<S: Into<String>>(&self, name: S, factory: SchemeFactory, predicate: Predicate) {
        let name = name.into();
        let previous = self
            .schemes
            .write()
            .insert(name.clone(), SchemeEntry { factory, predicate });
        if previous.is_some() {
            warn!("tokenizer scheme '{name}' registered twice, keeping the last registration");
        } else {
            debug!("registered tokenizer scheme '{name}'");
        }
    }

    /// Register a scheme that is always available.
    pub fn register_always<S: Into<String>>(&self, name: S, factory: SchemeFactory) {
        self.register(name, factory, Arc::new(|_: &PluginSettings| true));
    }

    /// Build a tokenizer for `name`.
    ///
    /// The tokenizer keeps the resource snapshot current at this moment.
    pub fn get(&self, name: &str, config: &TokenizerConfig) -> Result<Box<dyn Tokenizer>> {
        let factory = self
            .available(name)
            .ok_or_else(|| HanlexError::unknown_scheme(name))?;
        factory.create(name, config, &self.catalog.snapshot())
    }

    /// Whether `name` is registered and currently available.
    pub fn is_available(&self, name: &str) -> bool {
        self.available(name).is_some()
    }

    /// Names of the currently available schemes, sorted.
    pub fn names(&self) -> Vec<String> {
        self.schemes
            .read()
            .iter()
            .filter(|(_, entry)| (entry.predicate)(&self.settings))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// The settings predicates are evaluated against.
    pub fn settings(&self) -> &PluginSettings {
        &self.settings
    }

    /// The resource catalog handle used for new tokenizers.
    pub fn catalog(&self) -> &CatalogHandle {
        &self.catalog
    }

    fn available(&self, name: &str) -> Option<SchemeFactory> {
        let schemes = self.schemes.read();
        let entry = schemes.get(name)?;
        (entry.predicate)(&self.settings).then_some(entry.factory)
    }
}

impl fmt::Debug for TokenizerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenizerRegistry")
            .field("schemes", &self.schemes.read().keys().collect::<Vec<_>>())
            .field("settings", &self.settings)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(enable_cws: bool) -> TokenizerRegistry {
        let settings = PluginSettings {
            enable_cws,
            ..Default::default()
        };
        TokenizerRegistry::with_defaults(settings, CatalogHandle::default())
    }

    #[test]
    fn test_default_names() {
        let names = registry(false).names();
        assert_eq!(names.len(), 14);
        assert!(names.contains(&"mynlp".to_string()));
        assert!(names.contains(&"pinyin-fuzzy-keyword".to_string()));
        assert!(!names.contains(&"mynlp-cws".to_string()));

        assert_eq!(registry(true).names().len(), 16);
    }

    #[test]
    fn test_cws_predicate() {
        let config = TokenizerConfig::default();
        assert!(matches!(
            registry(false).get("mynlp-cws", &config),
            Err(HanlexError::UnknownScheme(_))
        ));
        let tokenizer = registry(true).get("mynlp-cws", &config).unwrap();
        assert_eq!(tokenizer.name(), "cws");
    }

    #[test]
    fn test_atom_schemes() {
        let registry = registry(false);
        let config = TokenizerConfig::default();
        let top: Vec<String> = registry
            .get("mynlp", &config)
            .unwrap()
            .tokenize("中华人民共和国")
            .unwrap()
            .map(|t| t.text)
            .collect();
        assert_eq!(top, vec!["中华人民共和国"]);

        for name in ["mynlp_index_atom", "mynlp_smart_atom"] {
            let tokenizer = registry.get(name, &config).unwrap();
            assert_eq!(tokenizer.name(), "core");
            let atoms: Vec<String> = tokenizer
                .tokenize("中华人民共和国")
                .unwrap()
                .map(|t| t.text)
                .collect();
            assert!(atoms.len() > 1, "{name} kept the whole word");
            assert_eq!(atoms.concat(), "中华人民共和国");
        }
    }

    #[test]
    fn test_unknown_name() {
        assert!(matches!(
            registry(false).get("ik_smart", &TokenizerConfig::default()),
            Err(HanlexError::UnknownScheme(name)) if name == "ik_smart"
        ));
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = registry(false);
        registry.register_always("hash", SchemeFactory::Issue);
        let tokenizer = registry.get("hash", &TokenizerConfig::default()).unwrap();
        assert_eq!(tokenizer.name(), "issue");
    }

    #[test]
    fn test_segment_options_from_config() {
        let config: TokenizerConfig = [("filter-stopword", "true")].into_iter().collect();
        let options = config.segment_options("title_atom", LexerKind::Core).unwrap();
        assert_eq!(options.mode, SegmentMode::Atom);
        assert!(options.filter_stopword);
        assert!(options.filter_punctuation);

        let config = TokenizerConfig::new().with("mode", "top");
        let options = config.segment_options("title_atom", LexerKind::Core).unwrap();
        assert_eq!(options.mode, SegmentMode::Top);

        let config = TokenizerConfig::new().with("correction", "false");
        assert!(!config.segment_options("mynlp", LexerKind::Core).unwrap().correction);

        let config = TokenizerConfig::new().with("filter-punctuation", "yes");
        assert!(config.segment_options("mynlp", LexerKind::Core).is_err());
    }
}
