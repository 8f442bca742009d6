use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use futures::StreamExt;
use reqwest::Client;
use serde_json::{json, Value};
use sysinfo::{System, SystemExt};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use common::{
    default_registry, Capabilities, ExecutorRegistry, HeartbeatRequest, HeartbeatResponse,
    RegisterRequest, RegisterResponse, ResultMessage, ResultStatus, TaskDispatch,
};

/// Tiempo máximo del handshake de registro. Si vence, el nodo no puede
/// operar y el arranque falla.
const REGISTRATION_TIMEOUT: Duration = Duration::from_secs(10);
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(5);
/// Espera antes de reintentar la suscripción al stream de tareas.
const RESUBSCRIBE_DELAY: Duration = Duration::from_secs(1);

/// Igual que en el client:
/// - En Docker: HEAD_URL=http://head:8080
/// - Local: default http://localhost:8080
fn head_base_url() -> String {
    env::var("HEAD_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

/// Id propio del nodo: NODE_ID del entorno, o hostname + uuid. El id entra
/// en la clasificación de afinidad del head, así que ponerle un marcador
/// de clase (p. ej. "nodo-classa-3") lo agrupa con los suyos.
fn own_node_id() -> String {
    if let Ok(id) = env::var("NODE_ID") {
        return id;
    }
    let host = hostname::get()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    format!("{}-{}", host, uuid::Uuid::new_v4())
}

/// Capacidades del sistema que se reportan al registrarse.
fn system_capabilities() -> Capabilities {
    let mut sys = System::new_all();
    sys.refresh_memory();

    let mut caps = Capabilities::new();
    caps.insert("cpu_count".to_string(), json!(sys.cpus().len()));
    caps.insert(
        "memory_gb".to_string(),
        json!(sys.total_memory() as f64 / (1024.0 * 1024.0 * 1024.0)),
    );
    caps.insert(
        "gpu".to_string(),
        json!(env::var("NODE_GPU").unwrap_or_else(|_| "cpu".to_string())),
    );
    caps
}

/// Loop principal del agente:
/// - se registra contra el head (fatal si no puede),
/// - arranca el heartbeat en segundo plano,
/// - consume el stream de tareas y ejecuta las propias en paralelo.
pub async fn run() -> Result<()> {
    let base_url = head_base_url();
    let client = Client::new();
    let node_id = own_node_id();
    let executors = Arc::new(default_registry());

    register(&client, &base_url, &node_id).await?;

    {
        let client = client.clone();
        let base_url = base_url.clone();
        let node_id = node_id.clone();
        tokio::spawn(async move {
            heartbeat_loop(client, base_url, node_id).await;
        });
    }

    intake_loop(client, base_url, node_id, executors).await
}

/// Handshake de registro con timeout acotado. Fallar acá es fatal: un nodo
/// que no se pudo registrar no debe operar.
async fn register(client: &Client, base_url: &str, node_id: &str) -> Result<()> {
    let req = RegisterRequest {
        node_id: node_id.to_string(),
        capabilities: system_capabilities(),
        ip_address: env::var("NODE_ADDR").unwrap_or_default(),
    };

    let url = format!("{}/api/v1/nodes/register", base_url);
    let resp = client
        .post(&url)
        .timeout(REGISTRATION_TIMEOUT)
        .json(&req)
        .send()
        .await
        .context("timeout o error de red registrando el nodo")?;

    let resp: RegisterResponse = resp
        .json()
        .await
        .context("respuesta de registro inválida")?;
    if resp.status != "registered" {
        bail!(
            "registro rechazado por el head: {}",
            resp.message.unwrap_or_default()
        );
    }

    info!("nodo {} registrado contra {}", node_id, base_url);
    Ok(())
}

/// Heartbeat periódico por toda la vida del agente. Un timeout se loguea y
/// nada más: el agente sigue ejecutando tareas y el head re-aprende
/// liveness con el próximo heartbeat que sí llegue.
async fn heartbeat_loop(client: Client, base_url: String, node_id: String) {
    let url = format!("{}/api/v1/nodes/heartbeat", base_url);
    loop {
        let req = HeartbeatRequest {
            node_id: node_id.clone(),
            timestamp: Utc::now(),
        };

        match client
            .post(&url)
            .timeout(HEARTBEAT_TIMEOUT)
            .json(&req)
            .send()
            .await
        {
            Ok(resp) => match resp.json::<HeartbeatResponse>().await {
                Ok(ack) if !ack.known => {
                    warn!("heartbeat no reconocido: el head no tiene registrado este nodo")
                }
                Ok(_) => debug!("heartbeat ack"),
                Err(e) => warn!("respuesta de heartbeat inválida: {}", e),
            },
            Err(e) => warn!("heartbeat sin respuesta: {}", e),
        }

        sleep(HEARTBEAT_INTERVAL).await;
    }
}

/// Loop de recepción: se suscribe al stream de tareas (que es broadcast,
/// llegan los dispatch de TODOS los nodos) y re-suscribe si se corta.
async fn intake_loop(
    client: Client,
    base_url: String,
    node_id: String,
    executors: Arc<ExecutorRegistry>,
) -> Result<()> {
    let url = format!("{}/api/v1/tasks/stream", base_url);
    loop {
        match client.get(&url).send().await {
            Ok(resp) => {
                info!("suscripto al stream de tareas");
                let mut stream = resp.bytes_stream();
                let mut buffer = String::new();

                while let Some(chunk) = stream.next().await {
                    let chunk = match chunk {
                        Ok(c) => c,
                        Err(e) => {
                            warn!("error leyendo el stream de tareas: {}", e);
                            break;
                        }
                    };
                    buffer.push_str(&String::from_utf8_lossy(&chunk));

                    while let Some(pos) = buffer.find('\n') {
                        let line = buffer[..pos].trim_end_matches('\r').to_string();
                        buffer.drain(..=pos);
                        if let Some(dispatch) = parse_event_line(&line) {
                            handle_dispatch(dispatch, &client, &base_url, &node_id, &executors);
                        }
                    }
                }
                warn!("stream de tareas cortado, reintentando");
            }
            Err(e) => warn!("no se pudo suscribir al stream de tareas: {}", e),
        }
        sleep(RESUBSCRIBE_DELAY).await;
    }
}

/// Parsea una línea del stream SSE. Solo interesan las líneas `data:`;
/// comentarios keep-alive y líneas en blanco se ignoran.
fn parse_event_line(line: &str) -> Option<TaskDispatch> {
    let data = line.strip_prefix("data:")?.trim_start();
    match serde_json::from_str(data) {
        Ok(dispatch) => Some(dispatch),
        Err(e) => {
            warn!("dispatch inválido en el stream: {}", e);
            None
        }
    }
}

/// Filtra por destinatario y lanza una unidad de ejecución concurrente:
/// un subtask lento no bloquea la recepción del mensaje siguiente.
fn handle_dispatch(
    dispatch: TaskDispatch,
    client: &Client,
    base_url: &str,
    node_id: &str,
    executors: &Arc<ExecutorRegistry>,
) {
    if dispatch.node_id != node_id {
        debug!("dispatch para {} ignorado", dispatch.node_id);
        return;
    }

    info!(
        "procesando tarea {} subtask {}",
        dispatch.task_id, dispatch.subtask_id
    );

    let client = client.clone();
    let base_url = base_url.to_string();
    let executors = executors.clone();
    tokio::spawn(async move {
        let outcome = execute_dispatch(&dispatch, &executors).await;
        report_result(&client, &base_url, dispatch, outcome).await;
    });
}

/// Ejecuta el subtask en un hilo de bloqueo. Cualquier fallo, incluido un
/// panic del ejecutor, se convierte en un resultado de error legible:
/// nunca tira abajo el agente.
async fn execute_dispatch(
    dispatch: &TaskDispatch,
    executors: &ExecutorRegistry,
) -> Result<Value, String> {
    let Some(executor) = executors.get(&dispatch.task_type) else {
        return Err(format!("tipo de tarea desconocido: {}", dispatch.task_type));
    };

    let data = dispatch.data.clone();
    let handle = tokio::task::spawn_blocking(move || executor.execute(&data));

    match handle.await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(e)) => Err(e.to_string()),
        Err(e) => Err(format!("panic o join error ejecutando el subtask: {}", e)),
    }
}

/// Empuja el resultado al head. Fire-and-forget: un fallo de red solo se
/// loguea; la entrega es at-least-once y el head tolera duplicados.
async fn report_result(
    client: &Client,
    base_url: &str,
    dispatch: TaskDispatch,
    outcome: Result<Value, String>,
) {
    let msg = match outcome {
        Ok(result) => ResultMessage {
            task_id: dispatch.task_id,
            subtask_id: dispatch.subtask_id,
            node_id: dispatch.node_id,
            status: ResultStatus::Completed,
            result: Some(result),
            error_message: None,
            timestamp: Utc::now(),
        },
        Err(error) => {
            warn!("subtask {} falló: {}", dispatch.subtask_id, error);
            ResultMessage {
                task_id: dispatch.task_id,
                subtask_id: dispatch.subtask_id,
                node_id: dispatch.node_id,
                status: ResultStatus::Error,
                result: None,
                error_message: Some(error),
                timestamp: Utc::now(),
            }
        }
    };

    let url = format!("{}/api/v1/tasks/result", base_url);
    if let Err(e) = client.post(&url).json(&msg).send().await {
        warn!("no se pudo enviar el resultado de {}: {}", msg.subtask_id, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_event_line_acepta_lineas_data() {
        let line = r#"data: {"task_id":"1-0","subtask_id":"1-0_0","node_id":"n1","type":"matrix_mult","data":{}}"#;
        let dispatch = parse_event_line(line).unwrap();
        assert_eq!(dispatch.task_id, "1-0");
        assert_eq!(dispatch.subtask_id, "1-0_0");
        assert_eq!(dispatch.node_id, "n1");
        assert_eq!(dispatch.task_type, "matrix_mult");
    }

    #[test]
    fn parse_event_line_ignora_keepalives_y_lineas_vacias() {
        assert!(parse_event_line(":").is_none());
        assert!(parse_event_line(": keep-alive").is_none());
        assert!(parse_event_line("").is_none());
        assert!(parse_event_line("event: message").is_none());
    }

    #[test]
    fn parse_event_line_descarta_json_invalido() {
        assert!(parse_event_line("data: {esto no es json}").is_none());
    }

    #[test]
    fn capacidades_reportan_cpu_memoria_y_gpu() {
        let caps = system_capabilities();
        assert!(caps.contains_key("cpu_count"));
        assert!(caps.contains_key("memory_gb"));
        assert!(caps.contains_key("gpu"));
        assert!(caps["cpu_count"].as_u64().unwrap_or(0) >= 1);
    }
}
