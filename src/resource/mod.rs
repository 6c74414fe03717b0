//! Dictionary resources and their synchronization.
//!
//! - [`catalog`]: immutable snapshots of resource versions and the lexicon
//!   built from them, published through a lock-free handle.
//! - [`client`]: the resource server protocol.
//! - [`correction`]: rules that force a segmentation.
//! - [`sync`]: the periodic job that keeps the catalog current.

pub mod catalog;
pub mod client;
pub mod correction;
pub mod sync;

pub use catalog::{
    BizWord, CatalogHandle, CoreDictEntry, CorrectionRule, Lexicon, ModulePayload, ModuleUpdate, PinyinEntry,
    ResourceCatalog, ResourceData, ResourceVersion, SyncStatus,
};
pub use client::{HttpResourceClient, RemoteVersion, ResourceClient};
pub use correction::CorrectionDict;
pub use sync::{SyncJob, SyncOutcome, SyncRecord, SyncState};
