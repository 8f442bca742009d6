mod handlers;
mod monitor;
mod queue;
mod scheduler;
mod state;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::queue::DurableQueue;
use crate::state::{AppState, Core};

/// Sin heartbeat durante este tiempo, un nodo pasa a `unresponsive`.
pub const NODE_UNRESPONSIVE_TIMEOUT: Duration = Duration::from_secs(20);
pub const LIVENESS_SWEEP_INTERVAL: Duration = Duration::from_secs(5);
/// Capacidad del canal broadcast de dispatch.
pub const TASK_CHANNEL_CAPACITY: usize = 256;

const DEFAULT_QUEUE_PATH: &str = "/data/queue/tasks.jsonl";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("head=debug,axum=info,tower_http=info")
        .init();

    let queue_path = env::var("QUEUE_PATH").unwrap_or_else(|_| DEFAULT_QUEUE_PATH.to_string());
    let queue = match DurableQueue::open(&queue_path) {
        Ok(q) => {
            info!("cola durable de dispatch en {}", queue_path);
            Some(Arc::new(q))
        }
        Err(e) => {
            warn!(
                "no se pudo abrir la cola durable en {}: {}; siguiendo solo con broadcast",
                queue_path, e
            );
            None
        }
    };

    let (task_tx, _) = broadcast::channel(TASK_CHANNEL_CAPACITY);

    let state = AppState {
        core: Arc::new(Core::new()),
        executors: Arc::new(common::default_registry()),
        task_tx,
        queue,
    };

    let app = handlers::build_router(state.clone());

    // barrido de liveness en segundo plano
    let monitor_state = state.clone();
    tokio::spawn(async move {
        monitor::monitor_nodes(monitor_state).await;
    });

    let bind = env::var("HEAD_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    // sin los canales de transporte no hay coordinador: el bind no es recuperable
    let listener = TcpListener::bind(&bind)
        .await
        .expect("no se pudo bindear el listener HTTP");
    info!("head escuchando en {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
