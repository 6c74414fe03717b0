//! Integration tests for the resource sync job against a scripted server.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use hanlex::analysis::*;
use hanlex::config::PluginSettings;
use hanlex::error::{HanlexError, Result, SyncFailure};
use hanlex::plugin::Plugin;
use hanlex::registry::TokenizerConfig;
use hanlex::resource::catalog::{CORRECTION, PINYIN, SyncStatus, WORD};
use hanlex::resource::{RemoteVersion, ResourceClient, SyncJob, SyncOutcome, SyncState};

#[derive(Clone)]
struct Module {
    version: String,
    checksum: Option<String>,
    body: String,
}

#[derive(Default)]
struct ScriptedServer {
    modules: Mutex<HashMap<String, Module>>,
    delay: Option<Duration>,
    unreachable: bool,
    downloads: AtomicUsize,
}

impl ScriptedServer {
    fn publish(&self, module: &str, version: &str, body: &str, checksum: Option<String>) {
        self.modules.lock().insert(
            module.to_string(),
            Module {
                version: version.to_string(),
                checksum,
                body: body.to_string(),
            },
        );
    }
}

#[async_trait]
impl ResourceClient for ScriptedServer {
    async fn fetch_version(&self, module: &str) -> Result<RemoteVersion> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.unreachable {
            return Err(HanlexError::sync(SyncFailure::Network, "connection refused"));
        }
        let found = self.modules.lock().get(module).cloned();
        Ok(RemoteVersion {
            module: module.to_string(),
            version: found.as_ref().map(|m| m.version.clone()).unwrap_or_default(),
            checksum: found.and_then(|m| m.checksum),
        })
    }

    async fn fetch_module(&self, module: &str) -> Result<Vec<u8>> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        let found = self.modules.lock().get(module).cloned();
        found
            .map(|m| m.body.into_bytes())
            .ok_or_else(|| HanlexError::sync(SyncFailure::Network, "404"))
    }
}

const WORDS: &str = r#"{"success": true, "data": [{"word": "朝朝盈"}]}"#;
const PINYINS: &str = r#"{"success": true, "data": [{"text": "朝朝盈", "pinyin": "zhao,zhao,ying"}]}"#;

fn settings() -> PluginSettings {
    PluginSettings {
        server: Some("http://resources.test".to_string()),
        node_id: Some("node-1".to_string()),
        download_timeout_secs: 1,
        ..Default::default()
    }
}

fn sha256(body: &str) -> String {
    format!("{:x}", Sha256::digest(body.as_bytes()))
}

fn texts(plugin: &Plugin, scheme: &str, text: &str) -> Vec<String> {
    let tokenizer = plugin
        .tokenizer(scheme, &TokenizerConfig::default())
        .unwrap();
    words(tokenizer.as_ref(), text)
}

fn words(tokenizer: &dyn Tokenizer, text: &str) -> Vec<String> {
    tokenizer
        .tokenize(text)
        .unwrap()
        .map(|t: Token| t.text)
        .collect()
}

fn word_status(job: &SyncJob) -> (String, SyncStatus) {
    let version = job.versions().into_iter().find(|v| v.id == WORD).unwrap();
    (version.version, version.status)
}

#[tokio::test]
async fn test_sync_updates_tokenizers() -> Result<()> {
    let server = Arc::new(ScriptedServer::default());
    server.publish(WORD, "w1", WORDS, Some(sha256(WORDS)));
    server.publish(PINYIN, "p1", PINYINS, None);

    let plugin = Plugin::with_client(settings(), server.clone())?;
    let job = plugin.sync_job().unwrap();

    let mut modules = match job.on_tick().await {
        SyncOutcome::Applied { modules } => modules,
        other => panic!("expected applied, got {other:?}"),
    };
    modules.sort();
    assert_eq!(modules, vec![PINYIN.to_string(), WORD.to_string()]);

    assert_eq!(texts(&plugin, "mynlp", "朝朝盈"), vec!["朝朝盈"]);
    assert_eq!(texts(&plugin, "pinyin", "朝朝盈"), vec!["zhao", "zhao", "ying"]);
    assert_eq!(texts(&plugin, "pinyin-head-keyword", "朝朝盈"), vec!["zzy"]);

    // Nothing changed upstream, nothing is downloaded again.
    assert_eq!(job.on_tick().await, SyncOutcome::UpToDate);
    assert_eq!(server.downloads.load(Ordering::SeqCst), 2);
    assert_eq!(job.state(), SyncState::Idle);

    Ok(())
}

#[tokio::test]
async fn test_checksum_mismatch_keeps_active_version() -> Result<()> {
    let server = Arc::new(ScriptedServer::default());
    server.publish(WORD, "w1", WORDS, None);
    let plugin = Plugin::with_client(settings(), server.clone())?;
    let job = plugin.sync_job().unwrap();
    job.on_tick().await;
    let generation = plugin.catalog().snapshot().generation();

    server.publish(WORD, "w2", r#"{"success": true, "data": []}"#, Some("00ff".to_string()));
    let outcome = job.on_tick().await;
    assert!(matches!(
        outcome,
        SyncOutcome::Failed {
            reason: SyncFailure::ChecksumMismatch,
            ..
        }
    ));

    let snapshot = plugin.catalog().snapshot();
    assert_eq!(snapshot.generation(), generation);
    assert_eq!(snapshot.version(WORD).unwrap().version, "w1");
    assert_eq!(texts(&plugin, "mynlp", "朝朝盈"), vec!["朝朝盈"]);
    assert_eq!(word_status(job), ("w1".to_string(), SyncStatus::Failed));

    // A good release clears the failure.
    let body = r#"{"success": true, "data": []}"#;
    server.publish(WORD, "w3", body, Some(sha256(body)));
    assert!(matches!(job.on_tick().await, SyncOutcome::Applied { .. }));
    assert_eq!(word_status(job), ("w3".to_string(), SyncStatus::Success));

    Ok(())
}

#[tokio::test]
async fn test_existing_tokenizers_keep_their_snapshot() -> Result<()> {
    let server = Arc::new(ScriptedServer::default());
    server.publish(WORD, "w1", WORDS, None);
    let plugin = Plugin::with_client(settings(), server)?;
    let job = plugin.sync_job().unwrap();

    let before = plugin.tokenizer("mynlp", &TokenizerConfig::default())?;
    assert_ne!(words(before.as_ref(), "朝朝盈"), vec!["朝朝盈"]);

    assert!(matches!(job.on_tick().await, SyncOutcome::Applied { .. }));

    assert_ne!(words(before.as_ref(), "朝朝盈"), vec!["朝朝盈"]);
    assert_eq!(texts(&plugin, "mynlp", "朝朝盈"), vec!["朝朝盈"]);

    Ok(())
}

#[tokio::test]
async fn test_correction_rules_sync() -> Result<()> {
    let rules = r#"{"success": true, "data": [{"rule": "南京市/长江/大桥"}]}"#;
    let server = Arc::new(ScriptedServer::default());
    server.publish(CORRECTION, "c1", rules, Some(sha256(rules)));
    let plugin = Plugin::with_client(settings(), server)?;
    let uncorrected = texts(&plugin, "mynlp", "南京市长江大桥");

    let outcome = plugin.sync_job().unwrap().on_tick().await;
    assert_eq!(
        outcome,
        SyncOutcome::Applied {
            modules: vec![CORRECTION.to_string()]
        }
    );
    assert_eq!(
        texts(&plugin, "mynlp", "南京市长江大桥"),
        vec!["南京市", "长江", "大桥"]
    );

    let disabled = plugin.tokenizer("mynlp", &TokenizerConfig::new().with("correction", "false"))?;
    assert_eq!(words(disabled.as_ref(), "南京市长江大桥"), uncorrected);

    Ok(())
}

#[tokio::test]
async fn test_shutdown_during_tick_keeps_catalog() -> Result<()> {
    let server = Arc::new(ScriptedServer {
        delay: Some(Duration::from_millis(500)),
        ..Default::default()
    });
    server.publish(WORD, "w1", WORDS, None);
    let plugin = Plugin::with_client(settings(), server.clone())?;
    let job = plugin.sync_job().unwrap();

    let (outcome, _) = tokio::join!(job.on_tick(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        job.shutdown();
    });
    assert!(matches!(
        outcome,
        SyncOutcome::Failed {
            reason: SyncFailure::Cancelled,
            ..
        }
    ));
    assert_eq!(plugin.catalog().snapshot().generation(), 0);
    assert_eq!(server.downloads.load(Ordering::SeqCst), 0);
    assert_eq!(job.state(), SyncState::Idle);
    // Cancellation is not charged to the modules.
    assert_eq!(word_status(job), (String::new(), SyncStatus::Pending));

    Ok(())
}

#[tokio::test]
async fn test_unreachable_server() -> Result<()> {
    let server = Arc::new(ScriptedServer {
        unreachable: true,
        ..Default::default()
    });
    let plugin = Plugin::with_client(settings(), server)?;
    let job = plugin.sync_job().unwrap();

    let outcome = job.on_tick().await;
    assert!(matches!(
        outcome,
        SyncOutcome::Failed {
            reason: SyncFailure::Network,
            ..
        }
    ));
    assert_eq!(plugin.catalog().snapshot().generation(), 0);

    let record = job.last_record().unwrap();
    assert_eq!(record.node_id, "node-1");
    assert!(record.finished_at >= record.started_at);

    Ok(())
}

#[tokio::test]
async fn test_slow_server_times_out() -> Result<()> {
    let server = Arc::new(ScriptedServer {
        delay: Some(Duration::from_secs(30)),
        ..Default::default()
    });
    server.publish(WORD, "w1", WORDS, None);
    let plugin = Plugin::with_client(settings(), server)?;

    let outcome = plugin.sync_job().unwrap().on_tick().await;
    assert!(matches!(
        outcome,
        SyncOutcome::Failed {
            reason: SyncFailure::Timeout,
            ..
        }
    ));
    assert_eq!(plugin.catalog().snapshot().generation(), 0);

    Ok(())
}

#[tokio::test]
async fn test_overlapping_ticks_run_one_cycle() -> Result<()> {
    let server = Arc::new(ScriptedServer {
        delay: Some(Duration::from_millis(100)),
        ..Default::default()
    });
    server.publish(WORD, "w1", WORDS, None);
    let plugin = Plugin::with_client(settings(), server.clone())?;
    let job = plugin.sync_job().unwrap();

    let (first, second) = tokio::join!(job.on_tick(), job.on_tick());
    assert!(matches!(first, SyncOutcome::Applied { .. }));
    assert_eq!(second, SyncOutcome::Skipped);
    assert_eq!(server.downloads.load(Ordering::SeqCst), 1);
    assert_eq!(plugin.catalog().snapshot().generation(), 1);
    assert_eq!(job.history().len(), 2);

    Ok(())
}

#[test]
fn test_shutdown_before_tick() {
    let server = Arc::new(ScriptedServer::default());
    server.publish(WORD, "w1", WORDS, None);
    let plugin = Plugin::with_client(settings(), server.clone()).unwrap();
    let job = plugin.sync_job().unwrap();

    tokio_test::block_on(async {
        plugin.shutdown().await;
        let outcome = job.on_tick().await;
        assert!(matches!(
            outcome,
            SyncOutcome::Failed {
                reason: SyncFailure::Cancelled,
                ..
            }
        ));
    });
    assert_eq!(server.downloads.load(Ordering::SeqCst), 0);
}
