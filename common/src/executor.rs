use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::gradient::GradientExecutor;
use crate::matrix::MatrixMultExecutor;

/// Errores de una submission, devueltos síncronamente al cliente. Ninguno
/// muta estado en el head.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("se pidieron {requested} nodos, solo hay {available} disponibles")]
    InsufficientNodes { requested: usize, available: usize },
    #[error("tipo de tarea desconocido: {0}")]
    UnknownTaskType(String),
}

/// Fallo al ejecutar o combinar un subtask. En el nodo se reporta como
/// resultado de error; nunca tira abajo el agente.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutorError {
    #[error("datos de entrada inválidos: {0}")]
    BadInput(String),
    #[error("fallo del ejecutor: {0}")]
    Failed(String),
}

/// Contrato de un tipo de tarea particionable. Un mismo ejecutor sirve a
/// los tres lados del protocolo:
/// - head: `total_units` + `generate_input` + `slice_input` para particionar,
/// - nodo: `execute` sobre su porción (función pura),
/// - agregación: `combine` sobre los parciales EN ORDEN DE PARTICIÓN.
pub trait TaskExecutor: Send + Sync {
    /// Nombre bajo el que se registra este tipo de tarea
    fn task_type(&self) -> &'static str;

    /// Total de unidades de trabajo a repartir entre nodos
    fn total_units(&self) -> usize;

    /// Entrada completa del trabajo (lado head, al momento del submit)
    fn generate_input(&self) -> Value;

    /// Porción de la entrada para el rango `[start, end)` de un subtask
    fn slice_input(&self, input: &Value, start: usize, end: usize) -> Value;

    fn execute(&self, data: &Value) -> Result<Value, ExecutorError>;

    fn combine(&self, partials: &[Value]) -> Result<Value, ExecutorError>;
}

/// Registro de ejecutores por tipo de tarea. Agregar un tipo nuevo es
/// registrarlo acá; el scheduler y el agregador no conocen los tipos.
pub struct ExecutorRegistry {
    executors: HashMap<&'static str, Arc<dyn TaskExecutor>>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self {
            executors: HashMap::new(),
        }
    }

    pub fn register(&mut self, executor: Arc<dyn TaskExecutor>) {
        self.executors.insert(executor.task_type(), executor);
    }

    pub fn get(&self, task_type: &str) -> Option<Arc<dyn TaskExecutor>> {
        self.executors.get(task_type).cloned()
    }
}

impl Default for ExecutorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Registro con los dos tipos de tarea de fábrica. El head y los nodos
/// construyen el mismo, así las dimensiones del contrato coinciden.
pub fn default_registry() -> ExecutorRegistry {
    let mut registry = ExecutorRegistry::new();
    registry.register(Arc::new(MatrixMultExecutor::default()));
    registry.register(Arc::new(GradientExecutor::default()));
    registry
}
