use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{info, warn};

use common::{
    partition_ranges, AffinityClass, Capabilities, ExecutorRegistry, NodeId, NodeStatus,
    NodeView, ResultMessage, ResultStatus, SubmitError, SubtaskId, SubtaskStatus, TaskDispatch,
    TaskId, TaskStatus,
};

use crate::queue::DurableQueue;
use crate::scheduler::{classify, select_nodes};

/// Estado compartido entre los handlers HTTP del head.
#[derive(Clone)]
pub struct AppState {
    pub core: Arc<Core>,
    pub executors: Arc<ExecutorRegistry>,
    /// Canal broadcast de dispatch (rol PUB: todos los nodos ven todo)
    pub task_tx: broadcast::Sender<TaskDispatch>,
    /// Espejo durable del dispatch; None si no se pudo abrir al arrancar
    pub queue: Option<Arc<DurableQueue>>,
}

/// Registro de un nodo worker conocido por el head. Nunca se borra; el
/// monitor de liveness solo lo degrada a `unresponsive`.
#[derive(Debug, Clone)]
pub struct NodeRecord {
    pub capabilities: Capabilities,
    pub last_seen: SystemTime,
    pub status: NodeStatus,
    pub affinity: AffinityClass,
}

#[derive(Debug, Clone)]
pub struct SubtaskRecord {
    pub node_id: NodeId,
    pub status: SubtaskStatus,
}

#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub task_type: String,
    pub num_nodes: usize,
    pub user_id: String,
    pub status: TaskStatus,
    pub submitted_at: DateTime<Utc>,
    /// true si la selección tuvo que mezclar clases de afinidad
    pub heterogeneous: bool,
    /// Ids de subtasks en orden de partición, NO de llegada
    pub subtask_ids: Vec<SubtaskId>,
    pub subtasks: HashMap<SubtaskId, SubtaskRecord>,
    /// Resultados por subtask id: clavados por clave, no apilados, para
    /// desacoplar el almacenamiento del orden de llegada
    pub results: HashMap<SubtaskId, Value>,
}

/// Asignación de un subtask a un nodo con su rango de unidades. `submit`
/// las devuelve para armar los mensajes de dispatch FUERA del lock.
#[derive(Debug, Clone)]
pub struct SubtaskAssignment {
    pub subtask_id: SubtaskId,
    pub node_id: NodeId,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug)]
pub struct SubmitOk {
    pub task_id: TaskId,
    pub assignments: Vec<SubtaskAssignment>,
}

/// Qué pasó al aceptar un mensaje de resultado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptOutcome {
    Stored { task_completed: bool },
    UnknownTask,
    UnknownSubtask,
}

/// Vista del estado de una tarea para el endpoint de consulta.
#[derive(Debug)]
pub enum StatusView {
    NotFound,
    Pending,
    /// Parciales clonados en orden de partición, listos para combinar
    Completed {
        task_type: String,
        partials: Vec<Value>,
    },
}

#[derive(Default)]
struct CoreInner {
    nodes: HashMap<NodeId, NodeRecord>,
    /// Orden de registro: hace deterministas los listados y la selección
    node_order: Vec<NodeId>,
    tasks: HashMap<TaskId, TaskRecord>,
    next_task_seq: u64,
}

/// Dueño único del estado del coordinador (registro de nodos + tareas).
///
/// Toda lectura y mutación entra por estas operaciones; cada una toma el
/// lock exactamente una vez, así cada operación lógica (registro,
/// heartbeat, selección + creación, resultado + chequeo de completitud) es
/// atómica frente a las demás. Ningún handler toca los mapas directamente.
pub struct Core {
    inner: Mutex<CoreInner>,
}

impl Core {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(CoreInner::default()),
        }
    }

    /// Registra (o re-registra) un nodo. Idempotente: un id repetido
    /// sobrescribe capacidades y refresca liveness, sin duplicar.
    pub fn register(
        &self,
        node_id: &str,
        capabilities: Capabilities,
        ip_address: &str,
    ) -> AffinityClass {
        let affinity = classify(node_id, ip_address);

        let mut inner = self.inner.lock().unwrap();
        if !inner.nodes.contains_key(node_id) {
            inner.node_order.push(node_id.to_string());
        }
        inner.nodes.insert(
            node_id.to_string(),
            NodeRecord {
                capabilities,
                last_seen: SystemTime::now(),
                status: NodeStatus::Active,
                affinity,
            },
        );
        affinity
    }

    /// Refresca liveness y reactiva el nodo si estaba degradado. Devuelve
    /// si el id era conocido: un nodo debe registrarse antes de poder
    /// hacer heartbeat, los desconocidos se responden pero no se insertan.
    pub fn heartbeat(&self, node_id: &str) -> bool {
        let mut inner = self.inner.lock().unwrap();
        match inner.nodes.get_mut(node_id) {
            Some(record) => {
                record.last_seen = SystemTime::now();
                record.status = NodeStatus::Active;
                true
            }
            None => false,
        }
    }

    /// Ids activos en orden de registro, opcionalmente filtrados por
    /// clase. Un solo lock: snapshot consistente aunque haya registros y
    /// heartbeats concurrentes.
    pub fn list_active(&self, filter: Option<AffinityClass>) -> Vec<NodeId> {
        let inner = self.inner.lock().unwrap();
        let mut out = Vec::new();
        for id in &inner.node_order {
            if let Some(record) = inner.nodes.get(id) {
                if record.status == NodeStatus::Active
                    && filter.map_or(true, |class| record.affinity == class)
                {
                    out.push(id.clone());
                }
            }
        }
        out
    }

    /// Selección + creación de la tarea con TODOS sus subtasks, en un solo
    /// lock. El dispatch (red) va después, fuera del lock, con los
    /// registros ya consultables: un resultado que llegue apenas enviado
    /// el mensaje nunca se rechaza como tarea desconocida.
    pub fn submit(
        &self,
        task_type: &str,
        num_nodes: usize,
        user_id: &str,
        preferred: Option<AffinityClass>,
        total_units: usize,
    ) -> Result<SubmitOk, SubmitError> {
        let mut inner = self.inner.lock().unwrap();

        let mut active: Vec<(NodeId, AffinityClass)> = Vec::new();
        for id in &inner.node_order {
            if let Some(record) = inner.nodes.get(id) {
                if record.status == NodeStatus::Active {
                    active.push((id.clone(), record.affinity));
                }
            }
        }

        let selection = select_nodes(&active, num_nodes, preferred)?;

        let seq = inner.next_task_seq;
        inner.next_task_seq += 1;
        let task_id = format!("{}-{}", Utc::now().timestamp_millis(), seq);

        if selection.heterogeneous {
            warn!("tarea {} mezcla clases de nodos, no recomendado", task_id);
        }

        let ranges = partition_ranges(total_units, num_nodes);
        let mut subtask_ids = Vec::with_capacity(num_nodes);
        let mut subtasks = HashMap::with_capacity(num_nodes);
        let mut assignments = Vec::with_capacity(num_nodes);

        for (i, (node_id, (start, end))) in
            selection.nodes.iter().zip(ranges.into_iter()).enumerate()
        {
            let subtask_id = format!("{}_{}", task_id, i);
            subtask_ids.push(subtask_id.clone());
            subtasks.insert(
                subtask_id.clone(),
                SubtaskRecord {
                    node_id: node_id.clone(),
                    status: SubtaskStatus::Pending,
                },
            );
            assignments.push(SubtaskAssignment {
                subtask_id,
                node_id: node_id.clone(),
                start,
                end,
            });
        }

        inner.tasks.insert(
            task_id.clone(),
            TaskRecord {
                task_type: task_type.to_string(),
                num_nodes,
                user_id: user_id.to_string(),
                status: TaskStatus::Pending,
                submitted_at: Utc::now(),
                heterogeneous: selection.heterogeneous,
                subtask_ids,
                subtasks,
                results: HashMap::new(),
            },
        );

        info!("tarea {} creada con {} subtasks", task_id, num_nodes);
        Ok(SubmitOk {
            task_id,
            assignments,
        })
    }

    /// Acepta un mensaje de resultado. La entrega es at-least-once, así
    /// que la operación es idempotente: un duplicado sobrescribe el
    /// payload (el último gana) y deja el estado igual. La actualización y
    /// el chequeo de completitud comparten el lock: son atómicos frente a
    /// otros accept de la misma tarea.
    pub fn accept(&self, msg: &ResultMessage) -> AcceptOutcome {
        let mut inner = self.inner.lock().unwrap();
        let Some(task) = inner.tasks.get_mut(&msg.task_id) else {
            return AcceptOutcome::UnknownTask;
        };

        match msg.status {
            ResultStatus::Completed => {
                match task.subtasks.get_mut(&msg.subtask_id) {
                    Some(subtask) => subtask.status = SubtaskStatus::Completed,
                    None => return AcceptOutcome::UnknownSubtask,
                }
                task.results.insert(
                    msg.subtask_id.clone(),
                    msg.result.clone().unwrap_or(Value::Null),
                );

                let completed = task
                    .subtasks
                    .values()
                    .all(|s| s.status == SubtaskStatus::Completed);
                if completed && task.status != TaskStatus::Completed {
                    task.status = TaskStatus::Completed;
                    info!("tarea {} completada", msg.task_id);
                }
                AcceptOutcome::Stored {
                    task_completed: completed,
                }
            }
            ResultStatus::Error => {
                match task.subtasks.get_mut(&msg.subtask_id) {
                    Some(subtask) => subtask.status = SubtaskStatus::Failed,
                    None => return AcceptOutcome::UnknownSubtask,
                }
                AcceptOutcome::Stored {
                    task_completed: false,
                }
            }
        }
    }

    /// Estado de una tarea para el endpoint de consulta. Si completó, los
    /// parciales salen clonados en orden de partición; la combinación
    /// (que puede ser pesada) corre fuera del lock.
    pub fn status_view(&self, task_id: &str) -> StatusView {
        let inner = self.inner.lock().unwrap();
        match inner.tasks.get(task_id) {
            None => StatusView::NotFound,
            Some(task) if task.status == TaskStatus::Completed => {
                let partials = task
                    .subtask_ids
                    .iter()
                    .map(|sid| task.results.get(sid).cloned().unwrap_or(Value::Null))
                    .collect();
                StatusView::Completed {
                    task_type: task.task_type.clone(),
                    partials,
                }
            }
            Some(_) => StatusView::Pending,
        }
    }

    /// Degrada a `unresponsive` los nodos activos sin heartbeat dentro de
    /// `timeout`. Devuelve los ids degradados en esta pasada.
    pub fn sweep_unresponsive(&self, timeout: Duration) -> Vec<NodeId> {
        let now = SystemTime::now();
        let mut inner = self.inner.lock().unwrap();
        let mut demoted = Vec::new();
        for (id, record) in inner.nodes.iter_mut() {
            if record.status != NodeStatus::Active {
                continue;
            }
            if let Ok(elapsed) = now.duration_since(record.last_seen) {
                if elapsed > timeout {
                    record.status = NodeStatus::Unresponsive;
                    demoted.push(id.clone());
                }
            }
        }
        demoted
    }

    /// Listado de nodos para observabilidad, en orden de registro.
    pub fn list_nodes(&self) -> Vec<NodeView> {
        let now = SystemTime::now();
        let inner = self.inner.lock().unwrap();
        let mut out = Vec::new();
        for id in &inner.node_order {
            if let Some(record) = inner.nodes.get(id) {
                out.push(NodeView {
                    node_id: id.clone(),
                    affinity: record.affinity,
                    status: record.status,
                    last_seen_secs_ago: now
                        .duration_since(record.last_seen)
                        .unwrap_or_default()
                        .as_secs(),
                    capabilities: record.capabilities.clone(),
                });
            }
        }
        out
    }
}

impl Default for Core {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Capabilities, MatrixMultExecutor, TaskExecutor};
    use serde_json::json;

    impl Core {
        fn task_snapshot(&self, task_id: &str) -> Option<TaskRecord> {
            self.inner.lock().unwrap().tasks.get(task_id).cloned()
        }

        fn task_count(&self) -> usize {
            self.inner.lock().unwrap().tasks.len()
        }

        fn node_count(&self) -> usize {
            self.inner.lock().unwrap().nodes.len()
        }
    }

    fn registrar(core: &Core, node_id: &str) {
        core.register(node_id, Capabilities::new(), "");
    }

    fn resultado_ok(task_id: &str, subtask_id: &str, payload: Value) -> ResultMessage {
        ResultMessage {
            task_id: task_id.to_string(),
            subtask_id: subtask_id.to_string(),
            node_id: "nodo-test".to_string(),
            status: ResultStatus::Completed,
            result: Some(payload),
            error_message: None,
            timestamp: Utc::now(),
        }
    }

    fn resultado_error(task_id: &str, subtask_id: &str) -> ResultMessage {
        ResultMessage {
            task_id: task_id.to_string(),
            subtask_id: subtask_id.to_string(),
            node_id: "nodo-test".to_string(),
            status: ResultStatus::Error,
            result: None,
            error_message: Some("se rompió".to_string()),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn register_clasifica_y_lista_en_orden_de_registro() {
        let core = Core::new();
        registrar(&core, "nodo-classb-1");
        registrar(&core, "nodo-classa-1");
        registrar(&core, "nodo-raro");

        assert_eq!(
            core.list_active(None),
            vec!["nodo-classb-1", "nodo-classa-1", "nodo-raro"]
        );
        assert_eq!(
            core.list_active(Some(AffinityClass::ClassA)),
            vec!["nodo-classa-1"]
        );
        assert_eq!(
            core.list_active(Some(AffinityClass::Unknown)),
            vec!["nodo-raro"]
        );
    }

    /// Re-registrar el mismo id sobrescribe el registro, no lo duplica.
    #[test]
    fn re_registro_sobrescribe_sin_duplicar() {
        let core = Core::new();
        let mut caps = Capabilities::new();
        caps.insert("cpu_count".to_string(), json!(4));
        core.register("nodo-1", caps, "");

        let mut caps2 = Capabilities::new();
        caps2.insert("cpu_count".to_string(), json!(16));
        core.register("nodo-1", caps2, "");

        assert_eq!(core.node_count(), 1);
        let nodes = core.list_nodes();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].capabilities["cpu_count"], json!(16));
    }

    /// Un heartbeat de un nodo nunca registrado se responde pero no inserta.
    #[test]
    fn heartbeat_desconocido_no_inserta() {
        let core = Core::new();
        assert!(!core.heartbeat("fantasma"));
        assert_eq!(core.node_count(), 0);
    }

    #[test]
    fn heartbeat_reactiva_nodos_degradados() {
        let core = Core::new();
        registrar(&core, "nodo-1");

        // sin heartbeats dentro de un timeout cero, el barrido lo degrada
        std::thread::sleep(Duration::from_millis(5));
        let demoted = core.sweep_unresponsive(Duration::from_secs(0));
        assert_eq!(demoted, vec!["nodo-1"]);
        assert!(core.list_active(None).is_empty());

        assert!(core.heartbeat("nodo-1"));
        assert_eq!(core.list_active(None), vec!["nodo-1"]);
    }

    /// Con suficientes nodos de una misma clase, la selección no mezcla.
    #[test]
    fn submit_elige_dentro_de_una_sola_clase() {
        let core = Core::new();
        registrar(&core, "nodo-classa-1");
        registrar(&core, "nodo-classa-2");
        registrar(&core, "nodo-classb-1");
        registrar(&core, "nodo-classb-2");
        registrar(&core, "nodo-classb-3");

        let ok = core.submit("matrix_mult", 2, "user_1", None, 1000).unwrap();
        let elegidos: Vec<&str> = ok.assignments.iter().map(|a| a.node_id.as_str()).collect();
        assert_eq!(elegidos, vec!["nodo-classa-1", "nodo-classa-2"]);

        let task = core.task_snapshot(&ok.task_id).unwrap();
        assert!(!task.heterogeneous);
    }

    /// Si ninguna clase alcanza sola pero la unión sí, la tarea se crea y
    /// queda marcada como heterogénea.
    #[test]
    fn submit_heterogeneo_cuando_ninguna_clase_alcanza() {
        let core = Core::new();
        registrar(&core, "nodo-classa-1");
        registrar(&core, "nodo-classb-1");

        let ok = core.submit("matrix_mult", 2, "user_1", None, 1000).unwrap();
        let task = core.task_snapshot(&ok.task_id).unwrap();
        assert!(task.heterogeneous);
        assert_eq!(task.status, TaskStatus::Pending);
    }

    /// Sin nodos activos el submit falla y no muta nada.
    #[test]
    fn submit_sin_nodos_no_crea_tarea() {
        let core = Core::new();

        let err = core
            .submit("matrix_mult", 1, "user_1", None, 1000)
            .unwrap_err();
        assert!(matches!(err, SubmitError::InsufficientNodes { .. }));
        assert_eq!(core.task_count(), 0);
        assert_eq!(core.node_count(), 0);
    }

    #[test]
    fn submit_no_toma_nodos_degradados() {
        let core = Core::new();
        registrar(&core, "nodo-1");
        std::thread::sleep(Duration::from_millis(5));
        core.sweep_unresponsive(Duration::from_secs(0));

        let err = core
            .submit("matrix_mult", 1, "user_1", None, 1000)
            .unwrap_err();
        assert!(matches!(
            err,
            SubmitError::InsufficientNodes {
                requested: 1,
                available: 0
            }
        ));
    }

    #[test]
    fn ids_de_tarea_no_colisionan_en_el_mismo_milisegundo() {
        let core = Core::new();
        registrar(&core, "nodo-1");

        let a = core.submit("matrix_mult", 1, "user_1", None, 10).unwrap();
        let b = core.submit("matrix_mult", 1, "user_1", None, 10).unwrap();
        assert_ne!(a.task_id, b.task_id);
    }

    /// Escenario completo: matrix_mult con T=1000 y 2 nodos produce los
    /// rangos [0, 500) y [500, 1000); los resultados llegan desordenados y
    /// la reconstrucción igual respeta el orden de partición.
    #[test]
    fn escenario_matrix_mult_con_llegada_desordenada() {
        let core = Core::new();
        registrar(&core, "nodo-classa-1");
        registrar(&core, "nodo-classa-2");

        let ok = core.submit("matrix_mult", 2, "user_1", None, 1000).unwrap();
        assert_eq!(ok.assignments.len(), 2);
        assert_eq!((ok.assignments[0].start, ok.assignments[0].end), (0, 500));
        assert_eq!((ok.assignments[1].start, ok.assignments[1].end), (500, 1000));

        // llega primero el segundo bloque
        let bloque_1 = json!([[3.0, 4.0]]);
        let bloque_0 = json!([[1.0, 2.0]]);
        core.accept(&resultado_ok(
            &ok.task_id,
            &ok.assignments[1].subtask_id,
            bloque_1.clone(),
        ));
        let outcome = core.accept(&resultado_ok(
            &ok.task_id,
            &ok.assignments[0].subtask_id,
            bloque_0.clone(),
        ));
        assert_eq!(
            outcome,
            AcceptOutcome::Stored {
                task_completed: true
            }
        );

        let StatusView::Completed { task_type, partials } = core.status_view(&ok.task_id) else {
            panic!("la tarea debería estar completa");
        };
        assert_eq!(task_type, "matrix_mult");
        assert_eq!(partials, vec![bloque_0, bloque_1]);

        let combinado = MatrixMultExecutor::default().combine(&partials).unwrap();
        assert_eq!(combinado, json!([[1.0, 2.0], [3.0, 4.0]]));
    }

    /// La reconstrucción no depende del orden de llegada: cualquier
    /// permutación de entregas produce los mismos parciales ordenados.
    #[test]
    fn parciales_invariantes_al_orden_de_llegada() {
        let payloads = [json!([[0.0]]), json!([[1.0]]), json!([[2.0]])];
        let ordenes: [[usize; 3]; 3] = [[0, 1, 2], [2, 1, 0], [1, 2, 0]];

        let mut vistos = Vec::new();
        for orden in ordenes {
            let core = Core::new();
            registrar(&core, "n1");
            registrar(&core, "n2");
            registrar(&core, "n3");

            let ok = core.submit("matrix_mult", 3, "user_1", None, 9).unwrap();
            for i in orden {
                core.accept(&resultado_ok(
                    &ok.task_id,
                    &ok.assignments[i].subtask_id,
                    payloads[i].clone(),
                ));
            }

            let StatusView::Completed { partials, .. } = core.status_view(&ok.task_id) else {
                panic!("la tarea debería estar completa");
            };
            vistos.push(partials);
        }

        assert_eq!(vistos[0], vistos[1]);
        assert_eq!(vistos[1], vistos[2]);
        assert_eq!(vistos[0], payloads.to_vec());
    }

    /// accept es idempotente: entregar dos veces el mismo éxito deja el
    /// agregado idéntico a entregarlo una vez.
    #[test]
    fn accept_duplicado_no_cambia_el_agregado() {
        let core = Core::new();
        registrar(&core, "n1");
        registrar(&core, "n2");

        let ok = core.submit("matrix_mult", 2, "user_1", None, 10).unwrap();
        let msg = resultado_ok(&ok.task_id, &ok.assignments[0].subtask_id, json!([[7.0]]));
        core.accept(&msg);
        core.accept(&msg);
        core.accept(&resultado_ok(
            &ok.task_id,
            &ok.assignments[1].subtask_id,
            json!([[8.0]]),
        ));

        let StatusView::Completed { partials, .. } = core.status_view(&ok.task_id) else {
            panic!("la tarea debería estar completa");
        };
        assert_eq!(partials, vec![json!([[7.0]]), json!([[8.0]])]);
    }

    /// La tarea completa exactamente cuando TODOS los subtasks reportaron
    /// éxito: ni antes, ni con alguno pendiente o fallado.
    #[test]
    fn completa_solo_con_todos_los_subtasks() {
        let core = Core::new();
        registrar(&core, "n1");
        registrar(&core, "n2");
        registrar(&core, "n3");

        let ok = core.submit("matrix_mult", 3, "user_1", None, 30).unwrap();

        core.accept(&resultado_ok(
            &ok.task_id,
            &ok.assignments[0].subtask_id,
            json!([[1.0]]),
        ));
        core.accept(&resultado_ok(
            &ok.task_id,
            &ok.assignments[1].subtask_id,
            json!([[2.0]]),
        ));
        assert!(matches!(core.status_view(&ok.task_id), StatusView::Pending));

        core.accept(&resultado_ok(
            &ok.task_id,
            &ok.assignments[2].subtask_id,
            json!([[3.0]]),
        ));
        assert!(matches!(
            core.status_view(&ok.task_id),
            StatusView::Completed { .. }
        ));
    }

    #[test]
    fn subtask_fallado_deja_la_tarea_pendiente() {
        let core = Core::new();
        registrar(&core, "n1");
        registrar(&core, "n2");

        let ok = core.submit("matrix_mult", 2, "user_1", None, 10).unwrap();
        core.accept(&resultado_ok(
            &ok.task_id,
            &ok.assignments[0].subtask_id,
            json!([[1.0]]),
        ));
        core.accept(&resultado_error(&ok.task_id, &ok.assignments[1].subtask_id));

        assert!(matches!(core.status_view(&ok.task_id), StatusView::Pending));
        let task = core.task_snapshot(&ok.task_id).unwrap();
        assert_eq!(
            task.subtasks[&ok.assignments[1].subtask_id].status,
            SubtaskStatus::Failed
        );
    }

    /// Mensajes viejos o maliciosos que referencian registros inexistentes
    /// se descartan sin mutar nada.
    #[test]
    fn resultados_para_registros_inexistentes_se_descartan() {
        let core = Core::new();
        registrar(&core, "n1");
        let ok = core.submit("matrix_mult", 1, "user_1", None, 10).unwrap();

        let outcome = core.accept(&resultado_ok("999-0", "999-0_0", json!([[1.0]])));
        assert_eq!(outcome, AcceptOutcome::UnknownTask);

        let outcome = core.accept(&resultado_ok(&ok.task_id, "otro_7", json!([[1.0]])));
        assert_eq!(outcome, AcceptOutcome::UnknownSubtask);

        let task = core.task_snapshot(&ok.task_id).unwrap();
        assert!(task.results.is_empty());
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[test]
    fn status_de_tarea_inexistente() {
        let core = Core::new();
        assert!(matches!(core.status_view("nada"), StatusView::NotFound));
    }
}
