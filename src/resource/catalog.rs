//! Versioned resource catalog and the lexicon derived from it.
//!
//! A [`ResourceCatalog`] is an immutable snapshot: the version of every
//! resource module plus the [`Lexicon`] built from their payloads. The sync
//! job builds a complete new catalog off to the side and publishes it with a
//! single pointer swap through [`CatalogHandle`]; tokenizer factories take a
//! snapshot at construction time and keep it for their whole life.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use jieba_rs::Jieba;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pinyin::PinyinDict;
use crate::resource::correction::CorrectionDict;

/// Module id of the core dictionary additions.
pub const CORE_DICT: &str = "core_dict";
/// Module id of the custom business word list.
pub const WORD: &str = "word";
/// Module id of the pinyin override dictionary.
pub const PINYIN: &str = "pinyin";
/// Module id of the segmentation correction rules.
pub const CORRECTION: &str = "correction";

/// All resource modules, in sync order.
pub const MODULES: &[&str] = &[CORE_DICT, WORD, PINYIN, CORRECTION];

/// Frequency given to custom words that carry no count.
const DEFAULT_WORD_FREQ: usize = 100;

/// The bundled base dictionary, loaded once per process.
static BASE_SEGMENTER: LazyLock<Arc<Jieba>> = LazyLock::new(|| Arc::new(Jieba::new()));

/// Sync status of one resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Never synchronized; bundled data is in use.
    Pending,
    /// Last attempt applied a new version.
    Success,
    /// Last attempt failed; the previous version is still active. Catalog
    /// snapshots never hold this status, it is reported by
    /// [`SyncJob::versions`](crate::resource::SyncJob::versions).
    Failed,
}

/// Version information for one resource module.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceVersion {
    /// Module id (`core_dict`, `word`, `pinyin`, `correction`).
    pub id: String,
    /// Version string advertised by the resource server.
    pub version: String,
    /// SHA-256 of the applied payload, when advertised.
    pub checksum: Option<String>,
    /// When this version was applied.
    pub last_sync: Option<DateTime<Utc>>,
    /// Sync status.
    pub status: SyncStatus,
}

impl ResourceVersion {
    /// A version entry for bundled data that has not been synchronized yet.
    pub fn pending<S: Into<String>>(id: S) -> Self {
        ResourceVersion {
            id: id.into(),
            version: String::new(),
            checksum: None,
            last_sync: None,
            status: SyncStatus::Pending,
        }
    }
}

/// One row of the core dictionary module.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreDictEntry {
    /// The word.
    pub word: String,
    /// `ADD` or `DELETE`.
    #[serde(default = "default_operate")]
    pub operate: String,
    /// Corpus frequency.
    #[serde(default)]
    pub count: usize,
}

fn default_operate() -> String {
    "ADD".to_string()
}

/// One custom business word.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BizWord {
    /// The word.
    pub word: String,
}

/// One pinyin override (`text = 朝朝盈`, `pinyin = zhao,zhao,yin`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinyinEntry {
    /// Source text.
    pub text: String,
    /// Comma separated syllables.
    pub pinyin: String,
}

/// One correction rule (`rule = 第几/套房`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionRule {
    /// Slash separated pieces.
    pub rule: String,
}

/// Decoded payload of one module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModulePayload {
    /// `core_dict` rows.
    CoreDict(Vec<CoreDictEntry>),
    /// `word` rows.
    Words(Vec<BizWord>),
    /// `pinyin` rows.
    Pinyin(Vec<PinyinEntry>),
    /// `correction` rows.
    Correction(Vec<CorrectionRule>),
}

impl ModulePayload {
    /// Module id this payload belongs to.
    pub fn module(&self) -> &'static str {
        match self {
            ModulePayload::CoreDict(_) => CORE_DICT,
            ModulePayload::Words(_) => WORD,
            ModulePayload::Pinyin(_) => PINYIN,
            ModulePayload::Correction(_) => CORRECTION,
        }
    }
}

/// Raw resource data currently applied, kept so that updating one module
/// can rebuild the lexicon with the others unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceData {
    /// Core dictionary rows.
    pub core_dict: Vec<CoreDictEntry>,
    /// Business words.
    pub words: Vec<BizWord>,
    /// Pinyin overrides.
    pub pinyin: Vec<PinyinEntry>,
    /// Correction rules.
    pub corrections: Vec<CorrectionRule>,
}

impl ResourceData {
    fn apply(&mut self, payload: ModulePayload) {
        match payload {
            ModulePayload::CoreDict(rows) => self.core_dict = rows,
            ModulePayload::Words(rows) => self.words = rows,
            ModulePayload::Pinyin(rows) => self.pinyin = rows,
            ModulePayload::Correction(rows) => self.corrections = rows,
        }
    }
}

/// Dictionaries used by tokenizers, derived from [`ResourceData`].
#[derive(Clone, Debug)]
pub struct Lexicon {
    segmenter: Arc<Jieba>,
    pinyin: Arc<PinyinDict>,
    corrections: Arc<CorrectionDict>,
    custom_words: usize,
}

impl Lexicon {
    /// Lexicon with the bundled base dictionary only.
    pub fn bundled() -> Self {
        Lexicon {
            segmenter: Self::base_segmenter(),
            pinyin: Arc::new(PinyinDict::new()),
            corrections: Arc::new(CorrectionDict::new()),
            custom_words: 0,
        }
    }

    /// Build a lexicon from resource data.
    ///
    /// Fails if any pinyin override or correction rule is malformed;
    /// nothing is published in that case.
    pub fn build(data: &ResourceData) -> Result<Self> {
        let mut pinyin = PinyinDict::new();
        for entry in &data.pinyin {
            pinyin.insert(&entry.text, &entry.pinyin)?;
        }
        let mut corrections = CorrectionDict::new();
        for entry in &data.corrections {
            corrections.insert(&entry.rule)?;
        }

        let mut segmenter = Jieba::clone(&BASE_SEGMENTER);
        let mut custom_words = 0;
        for entry in &data.core_dict {
            let word = entry.word.trim();
            if word.is_empty() {
                continue;
            }
            if entry.operate.eq_ignore_ascii_case("DELETE") {
                debug!("ignoring core_dict DELETE for '{word}'");
                continue;
            }
            let freq = if entry.count > 0 {
                entry.count
            } else {
                DEFAULT_WORD_FREQ
            };
            segmenter.add_word(word, Some(freq), None);
            custom_words += 1;
        }
        for entry in &data.words {
            let word = entry.word.trim();
            if word.is_empty() {
                continue;
            }
            segmenter.add_word(word, Some(DEFAULT_WORD_FREQ), None);
            custom_words += 1;
        }

        Ok(Lexicon {
            segmenter: Arc::new(segmenter),
            pinyin: Arc::new(pinyin),
            corrections: Arc::new(corrections),
            custom_words,
        })
    }

    /// The bundled base dictionary without any synchronized words.
    pub fn base_segmenter() -> Arc<Jieba> {
        Arc::clone(&BASE_SEGMENTER)
    }

    /// The word segmenter.
    pub fn segmenter(&self) -> &Arc<Jieba> {
        &self.segmenter
    }

    /// The pinyin override dictionary.
    pub fn pinyin(&self) -> &Arc<PinyinDict> {
        &self.pinyin
    }

    /// Segmentation correction rules.
    pub fn corrections(&self) -> &Arc<CorrectionDict> {
        &self.corrections
    }

    /// Number of words added on top of the base dictionary.
    pub fn custom_words(&self) -> usize {
        self.custom_words
    }
}

/// A verified update for one module, ready to be applied.
#[derive(Clone, Debug)]
pub struct ModuleUpdate {
    /// New version string.
    pub version: String,
    /// Checksum of the payload, if advertised.
    pub checksum: Option<String>,
    /// Decoded payload.
    pub payload: ModulePayload,
}

/// Immutable snapshot of all resources.
#[derive(Clone, Debug)]
pub struct ResourceCatalog {
    versions: BTreeMap<String, ResourceVersion>,
    data: ResourceData,
    lexicon: Lexicon,
    generation: u64,
}

impl ResourceCatalog {
    /// Catalog holding bundled data, every module pending.
    pub fn bundled() -> Self {
        let versions = MODULES
            .iter()
            .map(|m| (m.to_string(), ResourceVersion::pending(*m)))
            .collect();
        ResourceCatalog {
            versions,
            data: ResourceData::default(),
            lexicon: Lexicon::bundled(),
            generation: 0,
        }
    }

    /// Build the successor catalog with `updates` applied.
    ///
    /// `self` is never modified; the lexicon is rebuilt from scratch so a
    /// failure leaves no partial state anywhere.
    pub fn with_updates(&self, updates: Vec<ModuleUpdate>, now: DateTime<Utc>) -> Result<Self> {
        let mut data = self.data.clone();
        let mut versions = self.versions.clone();
        for update in updates {
            let module = update.payload.module();
            versions.insert(
                module.to_string(),
                ResourceVersion {
                    id: module.to_string(),
                    version: update.version,
                    checksum: update.checksum,
                    last_sync: Some(now),
                    status: SyncStatus::Success,
                },
            );
            data.apply(update.payload);
        }
        let lexicon = Lexicon::build(&data)?;
        Ok(ResourceCatalog {
            versions,
            data,
            lexicon,
            generation: self.generation + 1,
        })
    }

    /// Version entry for a module.
    pub fn version(&self, module: &str) -> Option<&ResourceVersion> {
        self.versions.get(module)
    }

    /// All version entries, ordered by module id.
    pub fn versions(&self) -> impl Iterator<Item = &ResourceVersion> {
        self.versions.values()
    }

    /// Currently applied raw data.
    pub fn data(&self) -> &ResourceData {
        &self.data
    }

    /// Derived dictionaries.
    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Number of swaps since startup.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Default for ResourceCatalog {
    fn default() -> Self {
        Self::bundled()
    }
}

/// Shared, atomically swappable handle on the current catalog.
///
/// Reads never block; a write replaces the whole snapshot at once.
#[derive(Clone, Debug)]
pub struct CatalogHandle(Arc<ArcSwap<ResourceCatalog>>);

impl CatalogHandle {
    /// Create a handle publishing `catalog`.
    pub fn new(catalog: ResourceCatalog) -> Self {
        CatalogHandle(Arc::new(ArcSwap::from_pointee(catalog)))
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<ResourceCatalog> {
        self.0.load_full()
    }

    /// Publish a new catalog.
    pub fn publish(&self, catalog: ResourceCatalog) {
        self.0.store(Arc::new(catalog));
    }
}

impl Default for CatalogHandle {
    fn default() -> Self {
        Self::new(ResourceCatalog::bundled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words_update(version: &str, words: &[&str]) -> ModuleUpdate {
        ModuleUpdate {
            version: version.to_string(),
            checksum: None,
            payload: ModulePayload::Words(
                words
                    .iter()
                    .map(|w| BizWord {
                        word: w.to_string(),
                    })
                    .collect(),
            ),
        }
    }

    #[test]
    fn test_bundled_catalog() {
        let catalog = ResourceCatalog::bundled();
        assert_eq!(catalog.generation(), 0);
        assert_eq!(catalog.versions().count(), MODULES.len());
        assert_eq!(catalog.version(WORD).unwrap().status, SyncStatus::Pending);
    }

    #[test]
    fn test_with_updates_leaves_original_untouched() {
        let catalog = ResourceCatalog::bundled();
        let next = catalog
            .with_updates(vec![words_update("7", &["朝朝盈"])], Utc::now())
            .unwrap();

        assert_eq!(next.generation(), 1);
        assert_eq!(next.version(WORD).unwrap().version, "7");
        assert_eq!(next.version(WORD).unwrap().status, SyncStatus::Success);
        assert_eq!(next.lexicon().custom_words(), 1);

        assert_eq!(catalog.version(WORD).unwrap().version, "");
        assert_eq!(catalog.lexicon().custom_words(), 0);
    }

    #[test]
    fn test_invalid_pinyin_rejected() {
        let catalog = ResourceCatalog::bundled();
        let update = ModuleUpdate {
            version: "2".to_string(),
            checksum: None,
            payload: ModulePayload::Pinyin(vec![PinyinEntry {
                text: "朝朝盈".to_string(),
                pinyin: "zhao".to_string(),
            }]),
        };
        assert!(catalog.with_updates(vec![update], Utc::now()).is_err());
    }

    #[test]
    fn test_correction_rules() {
        let catalog = ResourceCatalog::bundled();
        let update = |rule: &str| ModuleUpdate {
            version: "c1".to_string(),
            checksum: None,
            payload: ModulePayload::Correction(vec![CorrectionRule {
                rule: rule.to_string(),
            }]),
        };

        let next = catalog
            .with_updates(vec![update("第几/套房")], Utc::now())
            .unwrap();
        assert_eq!(next.lexicon().corrections().len(), 1);
        assert_eq!(next.data().corrections.len(), 1);
        assert_eq!(next.version(CORRECTION).unwrap().version, "c1");

        assert!(catalog.with_updates(vec![update("套房")], Utc::now()).is_err());
    }

    #[test]
    fn test_handle_publish() {
        let handle = CatalogHandle::default();
        let before = handle.snapshot();
        let next = before
            .with_updates(vec![words_update("1", &["哈哈哈"])], Utc::now())
            .unwrap();
        handle.publish(next);

        assert_eq!(before.generation(), 0);
        assert_eq!(handle.snapshot().generation(), 1);
    }
}
