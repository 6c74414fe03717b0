//! Periodic resource synchronization.
//!
//! One cycle walks the state machine
//!
//! ```text
//! Idle → Checking → UpToDate                                  → Idle
//!                 → Downloading → Verifying → Applied | Failed → Idle
//! ```
//!
//! Downloads and verification happen off to the side; the active catalog is
//! replaced with one pointer swap only after every changed module has been
//! downloaded, checksummed and decoded. Any failure leaves the active catalog
//! untouched.
//!
//! At most one cycle runs at a time. A tick that arrives while a cycle is in
//! flight is skipped, not queued.

use std::collections::{BTreeSet, VecDeque};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use crate::config::PluginSettings;
use crate::error::{HanlexError, Result, SyncFailure};
use crate::resource::catalog::{
    CatalogHandle, MODULES, ModuleUpdate, ResourceCatalog, ResourceVersion, SyncStatus,
};
use crate::resource::client::{
    HttpResourceClient, RemoteVersion, ResourceClient, decode_payload, verify_checksum,
};

/// Step of the sync state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// No cycle running.
    Idle,
    /// Asking the server for module versions.
    Checking,
    /// Every module matches the active catalog.
    UpToDate,
    /// Fetching changed modules.
    Downloading,
    /// Checking checksums and decoding payloads.
    Verifying,
    /// A new catalog was published.
    Applied,
    /// The cycle failed; the previous catalog stays active.
    Failed,
}

/// Result of one tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// New versions of `modules` were published.
    Applied {
        /// Modules that changed.
        modules: Vec<String>,
    },
    /// Nothing to do.
    UpToDate,
    /// The cycle failed.
    Failed {
        /// Classified reason.
        reason: SyncFailure,
        /// Detail.
        message: String,
    },
    /// Another cycle was already running.
    Skipped,
}

/// One entry of the sync history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRecord {
    /// Node that ran the cycle.
    pub node_id: String,
    /// When the tick started.
    pub started_at: DateTime<Utc>,
    /// When the tick ended.
    pub finished_at: DateTime<Utc>,
    /// What happened.
    #[serde(flatten)]
    pub outcome: SyncOutcome,
}

/// The resource synchronization job.
pub struct SyncJob {
    client: Arc<dyn ResourceClient>,
    catalog: CatalogHandle,
    node_id: String,
    timeout: Duration,
    history_size: usize,
    state: Mutex<SyncState>,
    history: Mutex<VecDeque<SyncRecord>>,
    // modules whose last attempt failed
    failed: Mutex<BTreeSet<String>>,
    cycle: tokio::sync::Mutex<()>,
    shutdown: watch::Sender<bool>,
}

impl SyncJob {
    /// Create a job pulling from `client` into `catalog`.
    pub fn new(
        client: Arc<dyn ResourceClient>,
        catalog: CatalogHandle,
        settings: &PluginSettings,
    ) -> Self {
        let node_id = settings
            .node_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let (shutdown, _) = watch::channel(false);
        SyncJob {
            client,
            catalog,
            node_id,
            timeout: settings.download_timeout(),
            history_size: settings.history_size.max(1),
            state: Mutex::new(SyncState::Idle),
            history: Mutex::new(VecDeque::new()),
            failed: Mutex::new(BTreeSet::new()),
            cycle: tokio::sync::Mutex::new(()),
            shutdown,
        }
    }

    /// Create an HTTP-backed job, or `None` when no server is configured.
    pub fn from_settings(settings: &PluginSettings, catalog: CatalogHandle) -> Result<Option<Self>> {
        let Some(server) = settings.server.as_deref() else {
            return Ok(None);
        };
        let client = HttpResourceClient::new(server, settings.download_timeout())?;
        Ok(Some(Self::new(Arc::new(client), catalog, settings)))
    }

    /// Current step of the state machine.
    pub fn state(&self) -> SyncState {
        *self.state.lock()
    }

    /// Node id written into sync records.
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// The catalog this job publishes into.
    pub fn catalog(&self) -> &CatalogHandle {
        &self.catalog
    }

    /// Sync records, oldest first.
    pub fn history(&self) -> Vec<SyncRecord> {
        self.history.lock().iter().cloned().collect()
    }

    /// The most recent record.
    pub fn last_record(&self) -> Option<SyncRecord> {
        self.history.lock().back().cloned()
    }

    /// Version entries of the active catalog, with [`SyncStatus::Failed`]
    /// for modules whose last attempt failed.
    pub fn versions(&self) -> Vec<ResourceVersion> {
        let failed = self.failed.lock();
        self.catalog
            .snapshot()
            .versions()
            .map(|version| {
                let mut version = version.clone();
                if failed.contains(&version.id) {
                    version.status = SyncStatus::Failed;
                }
                version
            })
            .collect()
    }

    /// Run one cycle unless one is already running.
    pub async fn on_tick(&self) -> SyncOutcome {
        let started_at = Utc::now();
        let outcome = match self.cycle.try_lock() {
            Ok(_guard) => {
                let mut attempted = Vec::new();
                let result = self.run_cycle(&mut attempted).await;
                let outcome = match result {
                    Ok(modules) => {
                        self.failed.lock().clear();
                        if modules.is_empty() {
                            SyncOutcome::UpToDate
                        } else {
                            SyncOutcome::Applied { modules }
                        }
                    }
                    Err(err) => {
                        self.set_state(SyncState::Failed);
                        let reason = err.sync_failure().unwrap_or(SyncFailure::Network);
                        warn!("resource sync failed ({reason}): {err}");
                        if reason != SyncFailure::Cancelled {
                            self.failed.lock().extend(attempted);
                        }
                        SyncOutcome::Failed {
                            reason,
                            message: err.to_string(),
                        }
                    }
                };
                self.set_state(SyncState::Idle);
                outcome
            }
            Err(_) => {
                debug!("resource sync already running, skipping tick");
                SyncOutcome::Skipped
            }
        };
        self.record(started_at, outcome.clone());
        outcome
    }

    /// Run [`on_tick`](Self::on_tick) every `interval` until shutdown.
    pub fn spawn(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let shutdown = self.shutdown.subscribe();
            info!(
                "resource sync started on node {} every {:?}",
                self.node_id, interval
            );
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.on_tick().await;
                    }
                    _ = wait_shutdown(shutdown.clone()) => break,
                }
            }
            info!("resource sync stopped");
        })
    }

    /// Stop the job. An in-flight cycle ends as `Failed { cancelled }`
    /// without touching the active catalog.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Whether [`shutdown`](Self::shutdown) was called.
    pub fn is_shut_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// One cycle. `attempted` names the modules a failure is charged to.
    async fn run_cycle(&self, attempted: &mut Vec<String>) -> Result<Vec<String>> {
        self.set_state(SyncState::Checking);
        attempted.extend(MODULES.iter().map(|m| m.to_string()));
        let current = self.catalog.snapshot();
        let remote = self
            .guarded(try_join_all(
                MODULES.iter().map(|module| self.client.fetch_version(module)),
            ))
            .await?;

        let stale: Vec<RemoteVersion> = remote
            .into_iter()
            .filter(|remote| {
                !remote.version.is_empty()
                    && current
                        .version(&remote.module)
                        .is_none_or(|active| active.version != remote.version)
            })
            .collect();
        if stale.is_empty() {
            self.set_state(SyncState::UpToDate);
            debug!("resources up to date");
            return Ok(Vec::new());
        }
        *attempted = stale.iter().map(|remote| remote.module.clone()).collect();

        self.set_state(SyncState::Downloading);
        let mut bodies = Vec::with_capacity(stale.len());
        for remote in stale {
            let body = self.guarded(self.client.fetch_module(&remote.module)).await?;
            bodies.push((remote, body));
        }

        self.set_state(SyncState::Verifying);
        let mut modules = Vec::with_capacity(bodies.len());
        let mut updates = Vec::with_capacity(bodies.len());
        for (remote, body) in bodies {
            verify_checksum(&body, remote.checksum.as_deref())?;
            let payload = decode_payload(&remote.module, &body)?;
            modules.push(remote.module);
            updates.push(ModuleUpdate {
                version: remote.version,
                checksum: remote.checksum,
                payload,
            });
        }
        let next = build_catalog(current, updates).await?;

        if self.is_shut_down() {
            return Err(cancelled());
        }
        self.catalog.publish(next);
        self.set_state(SyncState::Applied);
        info!("applied resource modules {modules:?}");
        Ok(modules)
    }

    /// Await `fut` under the download timeout, aborting on shutdown.
    async fn guarded<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_shut_down() {
            return Err(cancelled());
        }
        tokio::select! {
            res = tokio::time::timeout(self.timeout, fut) => match res {
                Ok(res) => res,
                Err(_) => Err(HanlexError::sync(
                    SyncFailure::Timeout,
                    format!("no answer within {:?}", self.timeout),
                )),
            },
            _ = wait_shutdown(self.shutdown.subscribe()) => Err(cancelled()),
        }
    }

    fn set_state(&self, state: SyncState) {
        *self.state.lock() = state;
    }

    fn record(&self, started_at: DateTime<Utc>, outcome: SyncOutcome) {
        let mut history = self.history.lock();
        history.push_back(SyncRecord {
            node_id: self.node_id.clone(),
            started_at,
            finished_at: Utc::now(),
            outcome,
        });
        while history.len() > self.history_size {
            history.pop_front();
        }
    }
}

impl std::fmt::Debug for SyncJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncJob")
            .field("node_id", &self.node_id)
            .field("state", &self.state())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Rebuild the lexicon on the blocking pool; it clones the whole base
/// dictionary.
async fn build_catalog(
    current: Arc<ResourceCatalog>,
    updates: Vec<ModuleUpdate>,
) -> Result<ResourceCatalog> {
    tokio::task::spawn_blocking(move || current.with_updates(updates, Utc::now()))
        .await
        .map_err(|e| {
            let reason = if e.is_cancelled() {
                SyncFailure::Cancelled
            } else {
                SyncFailure::ParseError
            };
            HanlexError::sync(reason, format!("catalog build did not finish: {e}"))
        })?
        .map_err(|e| HanlexError::sync(SyncFailure::ParseError, e.to_string()))
}

fn cancelled() -> HanlexError {
    HanlexError::sync(SyncFailure::Cancelled, "shutdown requested")
}

async fn wait_shutdown(mut rx: watch::Receiver<bool>) {
    while !*rx.borrow_and_update() {
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::catalog::{ModulePayload, PINYIN, PinyinEntry, WORD};

    struct StaticClient {
        version: String,
        body: Vec<u8>,
    }

    #[async_trait::async_trait]
    impl ResourceClient for StaticClient {
        async fn fetch_version(&self, module: &str) -> Result<RemoteVersion> {
            let version = if module == WORD { self.version.clone() } else { String::new() };
            Ok(RemoteVersion {
                module: module.to_string(),
                version,
                checksum: None,
            })
        }

        async fn fetch_module(&self, _module: &str) -> Result<Vec<u8>> {
            Ok(self.body.clone())
        }
    }

    fn job(body: &str) -> SyncJob {
        let client = StaticClient {
            version: "v1".to_string(),
            body: body.as_bytes().to_vec(),
        };
        SyncJob::new(
            Arc::new(client),
            CatalogHandle::default(),
            &PluginSettings {
                node_id: Some("node-a".to_string()),
                history_size: 2,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_apply_then_up_to_date() {
        let job = job(r#"{"success":true,"data":[{"word":"朝朝盈"}]}"#);

        assert_eq!(
            job.on_tick().await,
            SyncOutcome::Applied {
                modules: vec![WORD.to_string()]
            }
        );
        let snapshot = job.catalog().snapshot();
        assert_eq!(snapshot.version(WORD).unwrap().version, "v1");
        assert_eq!(snapshot.version(WORD).unwrap().status, SyncStatus::Success);

        assert_eq!(job.on_tick().await, SyncOutcome::UpToDate);
        assert_eq!(job.state(), SyncState::Idle);
        assert_eq!(job.last_record().unwrap().node_id, "node-a");
    }

    #[tokio::test]
    async fn test_parse_failure_keeps_catalog() {
        let job = job(r#"{"success":false}"#);
        let before = job.catalog().snapshot();

        let outcome = job.on_tick().await;
        assert!(matches!(
            outcome,
            SyncOutcome::Failed {
                reason: SyncFailure::ParseError,
                ..
            }
        ));
        assert_eq!(job.catalog().snapshot().generation(), before.generation());
        assert_eq!(job.state(), SyncState::Idle);
    }

    #[tokio::test]
    async fn test_failed_module_status() {
        let job = job(r#"{"success":false}"#);
        job.on_tick().await;

        let versions = job.versions();
        let status = |id: &str| versions.iter().find(|v| v.id == id).unwrap().status;
        assert_eq!(status(WORD), SyncStatus::Failed);
        assert_eq!(status(PINYIN), SyncStatus::Pending);

        let active = job.catalog().snapshot();
        assert_eq!(active.version(WORD).unwrap().status, SyncStatus::Pending);
        assert_eq!(active.version(WORD).unwrap().version, "");
    }

    #[tokio::test]
    async fn test_build_catalog_off_the_runtime() {
        let current = Arc::new(ResourceCatalog::bundled());
        let bad = ModuleUpdate {
            version: "p1".to_string(),
            checksum: None,
            payload: ModulePayload::Pinyin(vec![PinyinEntry {
                text: "朝朝盈".to_string(),
                pinyin: "zhao".to_string(),
            }]),
        };
        let err = build_catalog(Arc::clone(&current), vec![bad]).await.unwrap_err();
        assert_eq!(err.sync_failure(), Some(SyncFailure::ParseError));

        let next = build_catalog(current, Vec::new()).await.unwrap();
        assert_eq!(next.generation(), 1);
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let job = job(r#"{"success":true,"data":[]}"#);
        for _ in 0..5 {
            job.on_tick().await;
        }
        assert_eq!(job.history().len(), 2);
    }

    #[tokio::test]
    async fn test_shutdown_cancels() {
        let job = job(r#"{"success":true,"data":[]}"#);
        job.shutdown();
        assert!(matches!(
            job.on_tick().await,
            SyncOutcome::Failed {
                reason: SyncFailure::Cancelled,
                ..
            }
        ));
        assert_eq!(job.catalog().snapshot().generation(), 0);
    }

    #[test]
    fn test_no_server_no_job() {
        let job = SyncJob::from_settings(&PluginSettings::default(), CatalogHandle::default());
        assert!(job.unwrap().is_none());
    }

    #[test]
    fn test_record_serialization() {
        let record = SyncRecord {
            node_id: "n".to_string(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            outcome: SyncOutcome::Failed {
                reason: SyncFailure::ChecksumMismatch,
                message: "x".to_string(),
            },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["outcome"], "failed");
        assert_eq!(json["reason"], "checksum-mismatch");
    }
}
