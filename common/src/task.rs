use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::node::NodeId;

pub type TaskId = String;
pub type SubtaskId = String;

/// Estado de una tarea: sin estados intermedios, pasa de pending a
/// completed cuando TODOS sus subtasks completaron.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtaskStatus {
    Pending,
    Completed,
    Failed,
}

/* --------- API de submission y consulta de estado --------- */

fn default_num_nodes() -> usize {
    1
}

fn default_user_id() -> String {
    "user_1".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    #[serde(rename = "type")]
    pub task_type: String,
    #[serde(default = "default_num_nodes")]
    pub num_nodes: usize,
    #[serde(default = "default_user_id")]
    pub user_id: String,
    /// Aceptada pero sin efecto en la planificación
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_class: Option<crate::node::AffinityClass>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatusResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/* --------- Mensajes de dispatch y de resultados --------- */

/// Mensaje de dispatch de un subtask. Viaja por el canal broadcast a TODOS
/// los nodos (y espejado a la cola durable con la misma forma); solo el
/// nodo cuyo id coincide con `node_id` lo procesa.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDispatch {
    pub task_id: TaskId,
    pub subtask_id: SubtaskId,
    pub node_id: NodeId,
    #[serde(rename = "type")]
    pub task_type: String,
    /// Solo la porción de datos de este nodo
    pub data: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Completed,
    Error,
}

/// Resultado de un subtask, empujado por el nodo al head. La entrega es
/// at-least-once: el mismo mensaje puede llegar más de una vez.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultMessage {
    pub task_id: TaskId,
    pub subtask_id: SubtaskId,
    pub node_id: NodeId,
    pub status: ResultStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub timestamp: DateTime<Utc>,
}
