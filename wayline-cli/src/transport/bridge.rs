//! Child-process bridge to the messaging network.
//!
//! The session itself (pairing, credential persistence, transport retries)
//! lives in a separate bridge executable; this module spawns it and drives it
//! over newline-delimited JSON on stdin/stdout. Pairing codes and other
//! interactive output stay on the bridge's inherited stderr, which the
//! orchestrator never inspects.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{Context as _, bail};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{Mutex, oneshot, watch};
use tracing::{debug, info, warn};

use crate::transport::address::Recipient;
use crate::transport::session::SessionState;

/// Upper bound on a single delivery round-trip through the bridge.
const SEND_TIMEOUT: Duration = Duration::from_secs(60);

type PendingMap = HashMap<u64, oneshot::Sender<Result<(), String>>>;

#[derive(serde::Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum BridgeRequest<'a> {
    Init {
        session_path: &'a str,
    },
    SendImage {
        id: u64,
        to: &'a str,
        path: &'a str,
        filename: &'a str,
        caption: &'a str,
    },
    Shutdown,
}

#[derive(serde::Deserialize, Debug)]
#[serde(tag = "event", rename_all = "snake_case")]
enum BridgeEvent {
    State {
        state: BridgeState,
    },
    Result {
        id: u64,
        ok: bool,
        #[serde(default)]
        error: Option<String>,
    },
}

#[derive(serde::Deserialize, Clone, Copy, Debug)]
#[serde(rename_all = "snake_case")]
enum BridgeState {
    Pairing,
    Ready,
    Disconnected,
}

impl From<BridgeState> for SessionState {
    fn from(s: BridgeState) -> Self {
        match s {
            BridgeState::Pairing => SessionState::AwaitingPairing,
            BridgeState::Ready => SessionState::Ready,
            BridgeState::Disconnected => SessionState::Disconnected,
        }
    }
}

/// Messaging delivery seam used by the dispatcher.
#[async_trait::async_trait]
pub trait MessagingClient: Send + Sync + 'static {
    /// Non-blocking readiness check; a scheduled update is skipped entirely
    /// (no retry) when this is false.
    fn is_ready(&self) -> bool;

    /// Deliver one image to one recipient.
    async fn send_image(
        &self,
        recipient: &Recipient,
        image: &[u8],
        filename: &str,
        caption: &str,
    ) -> anyhow::Result<()>;
}

/// Handle to the spawned bridge process.
pub struct BridgeClient {
    child: Mutex<Child>,
    stdin: Mutex<ChildStdin>,
    state: watch::Receiver<SessionState>,
    pending: Arc<Mutex<PendingMap>>,
    next_id: AtomicU64,
    scratch_dir: PathBuf,
}

impl BridgeClient {
    /// Spawn `cmd` and hand it the session storage path.
    pub async fn spawn(cmd: &str, session_path: &Path) -> anyhow::Result<Self> {
        let argv =
            shell_words::split(cmd).with_context(|| format!("parse bridge command '{cmd}'"))?;
        let Some((program, args)) = argv.split_first() else {
            bail!("bridge command is empty");
        };

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("spawn messaging bridge '{cmd}'"))?;

        let stdin = child.stdin.take().context("bridge stdin unavailable")?;
        let stdout = child.stdout.take().context("bridge stdout unavailable")?;

        let (state_tx, state_rx) = watch::channel(SessionState::Uninitialized);
        let pending: Arc<Mutex<PendingMap>> = Arc::new(Mutex::new(HashMap::new()));
        tokio::spawn(read_events(stdout, state_tx, Arc::clone(&pending)));

        let client = Self {
            child: Mutex::new(child),
            stdin: Mutex::new(stdin),
            state: state_rx,
            pending,
            next_id: AtomicU64::new(1),
            scratch_dir: std::env::temp_dir(),
        };
        client
            .write_request(&BridgeRequest::Init {
                session_path: &session_path.to_string_lossy(),
            })
            .await?;
        Ok(client)
    }

    /// Wait until the session reports ready, bounded by `timeout`.
    ///
    /// This is the only blocking readiness wait in the program; per-tick
    /// checks go through [`MessagingClient::is_ready`] and never block.
    pub async fn wait_ready(&self, timeout: Duration) -> anyhow::Result<()> {
        let mut state = self.state.clone();
        match tokio::time::timeout(timeout, state.wait_for(|s| s.is_ready())).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(_)) => bail!("bridge exited before the session became ready"),
            Err(_) => bail!("session not ready after {timeout:?}"),
        }
    }

    /// Ask the bridge to terminate, then reap (or kill) the process.
    pub async fn destroy(&self) {
        let _ = self.write_request(&BridgeRequest::Shutdown).await;
        let mut child = self.child.lock().await;
        match tokio::time::timeout(Duration::from_secs(5), child.wait()).await {
            Ok(Ok(status)) => info!(%status, "bridge exited"),
            Ok(Err(e)) => warn!(error = %e, "failed to reap bridge"),
            Err(_) => {
                warn!("bridge did not exit in time; killing it");
                let _ = child.start_kill();
            }
        }
    }

    async fn write_request(&self, req: &BridgeRequest<'_>) -> anyhow::Result<()> {
        let mut line = serde_json::to_string(req).context("encode bridge request")?;
        line.push('\n');
        let mut stdin = self.stdin.lock().await;
        stdin
            .write_all(line.as_bytes())
            .await
            .context("write to bridge")?;
        stdin.flush().await.context("flush bridge stdin")?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl MessagingClient for BridgeClient {
    fn is_ready(&self) -> bool {
        self.state.borrow().is_ready()
    }

    async fn send_image(
        &self,
        recipient: &Recipient,
        image: &[u8],
        filename: &str,
        caption: &str,
    ) -> anyhow::Result<()> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        // The image crosses the process boundary as a file path, keeping the
        // stdin protocol line-oriented.
        let path = self
            .scratch_dir
            .join(format!("wayline-{}-{id}.png", std::process::id()));
        tokio::fs::write(&path, image)
            .await
            .with_context(|| format!("stage image '{}'", path.display()))?;

        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);

        let req = BridgeRequest::SendImage {
            id,
            to: recipient.address(),
            path: &path.to_string_lossy(),
            filename,
            caption,
        };
        if let Err(e) = self.write_request(&req).await {
            self.pending.lock().await.remove(&id);
            let _ = tokio::fs::remove_file(&path).await;
            return Err(e);
        }

        let outcome = tokio::time::timeout(SEND_TIMEOUT, rx).await;
        let _ = tokio::fs::remove_file(&path).await;
        match outcome {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(msg))) => bail!("bridge rejected delivery: {msg}"),
            Ok(Err(_)) => bail!("bridge closed before answering"),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                bail!("delivery timed out after {SEND_TIMEOUT:?}")
            }
        }
    }
}

async fn read_events(
    stdout: ChildStdout,
    state_tx: watch::Sender<SessionState>,
    pending: Arc<Mutex<PendingMap>>,
) {
    let mut lines = BufReader::new(stdout).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<BridgeEvent>(line) {
                    Ok(BridgeEvent::State { state }) => {
                        let next = SessionState::from(state);
                        info!(?next, "bridge session state changed");
                        let _ = state_tx.send(next);
                    }
                    Ok(BridgeEvent::Result { id, ok, error }) => {
                        let Some(tx) = pending.lock().await.remove(&id) else {
                            debug!(id, "result for unknown or timed-out delivery");
                            continue;
                        };
                        let outcome = if ok {
                            Ok(())
                        } else {
                            Err(error.unwrap_or_else(|| "unspecified bridge error".to_string()))
                        };
                        let _ = tx.send(outcome);
                    }
                    Err(e) => warn!(error = %e, line, "unparseable bridge output"),
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "bridge stdout read failed");
                break;
            }
        }
    }

    warn!("bridge stdout closed; marking session disconnected");
    let _ = state_tx.send(SessionState::Disconnected);
    // Fail anything still waiting for an answer.
    for (_, tx) in pending.lock().await.drain() {
        let _ = tx.send(Err("bridge exited".to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_serialize_to_tagged_lines() {
        let req = BridgeRequest::SendImage {
            id: 7,
            to: "905551112233@c.us",
            path: "/tmp/wayline-7.png",
            filename: "journey-progress.png",
            caption: "hello",
        };
        let line = serde_json::to_string(&req).unwrap();
        assert!(line.contains(r#""op":"send_image""#));
        assert!(line.contains(r#""to":"905551112233@c.us""#));

        let init = serde_json::to_string(&BridgeRequest::Init {
            session_path: "./session",
        })
        .unwrap();
        assert!(init.contains(r#""op":"init""#));
    }

    #[test]
    fn events_deserialize_from_tagged_lines() {
        let ev: BridgeEvent = serde_json::from_str(r#"{"event":"state","state":"pairing"}"#).unwrap();
        match ev {
            BridgeEvent::State { state } => {
                assert_eq!(SessionState::from(state), SessionState::AwaitingPairing);
            }
            other => panic!("unexpected event {other:?}"),
        }

        let ev: BridgeEvent =
            serde_json::from_str(r#"{"event":"result","id":3,"ok":false,"error":"nope"}"#).unwrap();
        match ev {
            BridgeEvent::Result { id, ok, error } => {
                assert_eq!(id, 3);
                assert!(!ok);
                assert_eq!(error.as_deref(), Some("nope"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn result_error_field_is_optional() {
        let ev: BridgeEvent = serde_json::from_str(r#"{"event":"result","id":1,"ok":true}"#).unwrap();
        assert!(matches!(ev, BridgeEvent::Result { ok: true, .. }));
    }
}
