use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use common::{
    HeartbeatRequest, HeartbeatResponse, NodeView, RegisterRequest, RegisterResponse,
    ResultMessage, SubmitError, SubmitRequest, SubmitResponse, TaskDispatch, TaskStatusResponse,
};

use crate::state::{AcceptOutcome, AppState, StatusView};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/submit_task", post(submit_task))
        .route("/task_status/:task_id", get(task_status))
        .route("/api/v1/nodes/register", post(register_node))
        .route("/api/v1/nodes/heartbeat", post(node_heartbeat))
        .route("/api/v1/nodes", get(list_nodes))
        .route("/api/v1/tasks/stream", get(task_stream))
        .route("/api/v1/tasks/result", post(push_result))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/* ---------------- handlers HTTP ---------------- */

async fn health() -> &'static str {
    "ok"
}

fn submit_error(message: String) -> Json<SubmitResponse> {
    Json(SubmitResponse {
        status: "error".to_string(),
        task_id: None,
        message: Some(message),
    })
}

// Crea una tarea: selección + creación de registros en un solo lock del
// Core, dispatch por broadcast + espejo durable recién después.
async fn submit_task(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> Json<SubmitResponse> {
    if req.num_nodes < 1 {
        return submit_error("num_nodes debe ser al menos 1".to_string());
    }

    let Some(executor) = state.executors.get(&req.task_type) else {
        return submit_error(SubmitError::UnknownTaskType(req.task_type.clone()).to_string());
    };

    // la entrada completa del trabajo se genera antes de tomar el lock
    let input = executor.generate_input();

    let submitted = state.core.submit(
        &req.task_type,
        req.num_nodes,
        &req.user_id,
        req.preferred_class,
        executor.total_units(),
    );

    let ok = match submitted {
        Ok(ok) => ok,
        Err(e) => return submit_error(e.to_string()),
    };

    // los registros ya existen y son consultables: un resultado que llegue
    // apenas enviado el mensaje nunca cae como tarea desconocida
    for assignment in &ok.assignments {
        let dispatch = TaskDispatch {
            task_id: ok.task_id.clone(),
            subtask_id: assignment.subtask_id.clone(),
            node_id: assignment.node_id.clone(),
            task_type: req.task_type.clone(),
            data: executor.slice_input(&input, assignment.start, assignment.end),
        };

        // un send fallido solo significa que todavía no hay suscriptores
        let _ = state.task_tx.send(dispatch.clone());

        if let Some(queue) = &state.queue {
            if let Err(e) = queue.append(&dispatch) {
                warn!(
                    "no se pudo espejar el subtask {} en la cola durable: {}",
                    dispatch.subtask_id, e
                );
            }
        }
    }

    info!(
        "tarea {} de {} enviada a {} nodos",
        ok.task_id,
        req.user_id,
        ok.assignments.len()
    );
    Json(SubmitResponse {
        status: "success".to_string(),
        task_id: Some(ok.task_id),
        message: None,
    })
}

// Consulta de estado: el cliente sondea hasta ver "completed". La
// combinación de parciales corre acá, fuera del lock del Core.
async fn task_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Json<TaskStatusResponse> {
    match state.core.status_view(&task_id) {
        StatusView::NotFound => Json(TaskStatusResponse {
            status: "error".to_string(),
            results: None,
            message: Some("Task not found".to_string()),
        }),
        StatusView::Pending => Json(TaskStatusResponse {
            status: "pending".to_string(),
            results: None,
            message: None,
        }),
        StatusView::Completed { task_type, partials } => {
            let combined = state
                .executors
                .get(&task_type)
                .ok_or_else(|| SubmitError::UnknownTaskType(task_type.clone()).to_string())
                .and_then(|executor| {
                    executor.combine(&partials).map_err(|e| e.to_string())
                });
            match combined {
                Ok(results) => Json(TaskStatusResponse {
                    status: "completed".to_string(),
                    results: Some(results),
                    message: None,
                }),
                Err(message) => Json(TaskStatusResponse {
                    status: "error".to_string(),
                    results: None,
                    message: Some(message),
                }),
            }
        }
    }
}

async fn register_node(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Json<RegisterResponse> {
    let affinity = state
        .core
        .register(&req.node_id, req.capabilities, &req.ip_address);

    info!("nodo {} registrado con clase {:?}", req.node_id, affinity);
    Json(RegisterResponse {
        status: "registered".to_string(),
        message: None,
    })
}

async fn node_heartbeat(
    State(state): State<AppState>,
    Json(req): Json<HeartbeatRequest>,
) -> Json<HeartbeatResponse> {
    let known = state.core.heartbeat(&req.node_id);
    if !known {
        warn!(
            "heartbeat de nodo desconocido {}, tiene que registrarse primero",
            req.node_id
        );
    }
    Json(HeartbeatResponse {
        status: "ack".to_string(),
        known,
    })
}

async fn list_nodes(State(state): State<AppState>) -> Json<Vec<NodeView>> {
    Json(state.core.list_nodes())
}

// Canal broadcast de tareas como stream SSE: cada suscriptor ve TODOS los
// dispatch y filtra por su propio node_id. Un suscriptor lento pierde
// mensajes (el rol es con pérdida, la redundancia la pone la cola durable).
async fn task_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.task_tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(dispatch) => match Event::default().json_data(&dispatch) {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                warn!("no se pudo serializar un dispatch para el stream: {}", e);
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(n)) => {
            warn!("suscriptor del stream de tareas atrasado, perdió {} mensajes", n);
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

// Resultados: fire-and-forget para el emisor, así que siempre 200; lo que
// no matchea con ningún registro se descarta con log y nada más.
async fn push_result(State(state): State<AppState>, Json(msg): Json<ResultMessage>) -> StatusCode {
    match state.core.accept(&msg) {
        AcceptOutcome::Stored { task_completed } => {
            info!(
                "resultado de {} para tarea {} subtask {} ({:?})",
                msg.node_id, msg.task_id, msg.subtask_id, msg.status
            );
            if task_completed {
                info!("tarea {} lista para reconstruir", msg.task_id);
            }
        }
        AcceptOutcome::UnknownTask => {
            warn!("resultado para tarea desconocida {}, descartado", msg.task_id);
        }
        AcceptOutcome::UnknownSubtask => {
            warn!(
                "resultado para subtask desconocido {} de la tarea {}, descartado",
                msg.subtask_id, msg.task_id
            );
        }
    }
    StatusCode::OK
}
