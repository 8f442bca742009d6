use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type NodeId = String;

/// Capacidades que reporta un nodo al registrarse (cpu_count, memory_gb,
/// gpu, o lo que sea: el head las guarda tal cual, sin interpretarlas).
pub type Capabilities = HashMap<String, serde_json::Value>;

/// Clase de afinidad de un nodo, derivada al registrarse a partir de su id
/// y su dirección. Se usa para no mezclar nodos heterogéneos en una tarea.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AffinityClass {
    ClassA,
    ClassB,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Active,
    Unresponsive,
}

/* --------- Mensajes del canal de registro --------- */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub node_id: NodeId,
    pub capabilities: Capabilities,
    /// Pista de dirección del nodo (entra en la clasificación de afinidad)
    pub ip_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/* --------- Mensajes del canal de heartbeat --------- */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatRequest {
    pub node_id: NodeId,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatResponse {
    pub status: String,
    /// false si el nodo nunca se registró (se responde igual, no se inserta)
    pub known: bool,
}

/* --------- Vista de nodos para el listado --------- */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeView {
    pub node_id: NodeId,
    pub affinity: AffinityClass,
    pub status: NodeStatus,
    pub last_seen_secs_ago: u64,
    pub capabilities: Capabilities,
}
