use tokio::time::sleep;
use tracing::warn;

use crate::state::AppState;
use crate::{LIVENESS_SWEEP_INTERVAL, NODE_UNRESPONSIVE_TIMEOUT};

/// Barrido de liveness: degrada a `unresponsive` los nodos sin heartbeat
/// reciente para que la selección no los tome. No borra ni reasigna nada;
/// un heartbeat posterior los reactiva.
pub async fn monitor_nodes(state: AppState) {
    loop {
        sleep(LIVENESS_SWEEP_INTERVAL).await;

        for node_id in state.core.sweep_unresponsive(NODE_UNRESPONSIVE_TIMEOUT) {
            warn!(
                "marcando nodo {} como unresponsive (sin heartbeat hace más de {:?})",
                node_id, NODE_UNRESPONSIVE_TIMEOUT
            );
        }
    }
}
