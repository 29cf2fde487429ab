//! The engine task and its connection table.
//!
//! All inbound traffic funnels through one `mpsc` channel into a single task
//! that owns the [`SyncEngine`]. That task handles each event to completion
//! (board mutated, outbound frames queued) before taking the next, which is
//! what gives every client the same ordering of state changes.
//!
//! Outbound frames go to per-connection unbounded channels, so the engine
//! never waits on a slow peer.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::board::ConnectionId;
use crate::sync::{BoardStats, Delivery, Outbound, ServerMessage, SyncEngine};

/// Capacity of the shared inbound queue.
const INBOUND_QUEUE: usize = 1024;

/// Something that happened on the transport.
#[derive(Debug)]
pub enum EngineEvent {
    Connected {
        conn: ConnectionId,
        tx: mpsc::UnboundedSender<String>,
    },
    Frame {
        conn: ConnectionId,
        text: String,
    },
    Disconnected {
        conn: ConnectionId,
    },
}

/// Live counters published after every event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct HubStats {
    pub connections: usize,
    #[serde(flatten)]
    pub board: BoardStats,
}

/// Cloneable handle used by connection tasks to talk to the engine.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineEvent>,
    stats: watch::Receiver<HubStats>,
    next_id: Arc<AtomicU64>,
}

impl EngineHandle {
    /// Register a new connection and get the receiving end of its outbound queue.
    pub async fn connect(&self) -> Option<(ConnectionId, mpsc::UnboundedReceiver<String>)> {
        let conn = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = mpsc::unbounded_channel();
        self.tx
            .send(EngineEvent::Connected { conn, tx })
            .await
            .ok()?;
        Some((conn, rx))
    }

    /// Queue an inbound text frame. Returns false once the engine has stopped.
    pub async fn frame(&self, conn: ConnectionId, text: String) -> bool {
        self.tx
            .send(EngineEvent::Frame { conn, text })
            .await
            .is_ok()
    }

    /// Report that a connection is gone.
    pub async fn disconnect(&self, conn: ConnectionId) {
        // A stopped engine has nothing left to clean up.
        let _ = self.tx.send(EngineEvent::Disconnected { conn }).await;
    }

    /// Latest published counters.
    pub fn stats(&self) -> HubStats {
        *self.stats.borrow()
    }
}

/// Owns the engine and the outbound side of every connection.
pub struct Hub {
    engine: SyncEngine,
    peers: BTreeMap<ConnectionId, mpsc::UnboundedSender<String>>,
    stats: watch::Sender<HubStats>,
}

impl Hub {
    /// Spawn the engine task. The task ends when every handle is dropped.
    pub fn spawn(engine: SyncEngine) -> (EngineHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(INBOUND_QUEUE);
        let initial = HubStats {
            connections: 0,
            board: engine.stats(),
        };
        let (stats_tx, stats_rx) = watch::channel(initial);
        let hub = Hub {
            engine,
            peers: BTreeMap::new(),
            stats: stats_tx,
        };
        let task = tokio::spawn(hub.run(rx));
        let handle = EngineHandle {
            tx,
            stats: stats_rx,
            next_id: Arc::new(AtomicU64::new(0)),
        };
        (handle, task)
    }

    async fn run(mut self, mut rx: mpsc::Receiver<EngineEvent>) {
        while let Some(event) = rx.recv().await {
            let outbound = self.handle(event);
            self.publish_stats();
            self.deliver(outbound);
        }
        debug!("engine task stopped");
    }

    fn handle(&mut self, event: EngineEvent) -> Vec<Outbound> {
        match event {
            EngineEvent::Connected { conn, tx } => {
                info!(conn, "connection opened");
                self.peers.insert(conn, tx);
                Vec::new()
            }
            EngineEvent::Frame { conn, text } => {
                let engine = &mut self.engine;
                // A handler panic fails only the frame that caused it.
                match panic::catch_unwind(AssertUnwindSafe(|| engine.handle_frame(conn, &text))) {
                    Ok(outbound) => outbound,
                    Err(_) => {
                        error!(conn, "panic while handling frame");
                        vec![Outbound {
                            delivery: Delivery::Origin(conn),
                            message: ServerMessage::ServerError {
                                message: "internal error while processing request".to_string(),
                            },
                        }]
                    }
                }
            }
            EngineEvent::Disconnected { conn } => {
                // Drop the peer first so presence goes only to those still here.
                self.peers.remove(&conn);
                info!(conn, "connection closed");
                self.engine.disconnect(conn)
            }
        }
    }

    fn deliver(&self, outbound: Vec<Outbound>) {
        for out in outbound {
            let text = match serde_json::to_string(&out.message) {
                Ok(text) => text,
                Err(e) => {
                    warn!(event = out.message.event_name(), error = %e, "failed to encode event");
                    continue;
                }
            };
            for (conn, tx) in &self.peers {
                if out.reaches(*conn) {
                    // Closed queues belong to peers whose disconnect is already on its way.
                    let _ = tx.send(text.clone());
                }
            }
        }
    }

    fn publish_stats(&self) {
        let stats = HubStats {
            connections: self.peers.len(),
            board: self.engine.stats(),
        };
        self.stats.send_if_modified(|current| {
            if *current == stats {
                false
            } else {
                *current = stats;
                true
            }
        });
    }
}
