use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use reqwest::Client;
use std::env;

use common::{
    AffinityClass, NodeView, SubmitRequest, SubmitResponse, TaskStatusResponse,
};

/// Igual que en el provider:
/// - En Docker: HEAD_URL=http://head:8080
/// - Local: default http://localhost:8080
fn head_base_url() -> String {
    env::var("HEAD_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

#[derive(Parser)]
#[command(name = "client")]
#[command(about = "CLI simple para hablar con el head")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Envía una tarea nueva
    Submit {
        /// Tipo de tarea registrado (matrix_mult, gradient_compute)
        #[arg(value_name = "TIPO")]
        task_type: String,

        /// Cantidad de nodos entre los que se parte el trabajo
        #[arg(long, default_value_t = 1)]
        num_nodes: usize,

        #[arg(long, default_value = "user_1")]
        user_id: String,

        /// Clase de afinidad preferida (classA | classB | unknown)
        #[arg(long)]
        preferred_class: Option<String>,
    },
    /// Consulta el estado de una tarea
    Status {
        #[arg(value_name = "TASK_ID")]
        id: String,
    },
    /// Lista los nodos registrados en el head
    Nodes,
}

fn parse_class(raw: &str) -> Result<AffinityClass> {
    match raw.to_lowercase().as_str() {
        "classa" => Ok(AffinityClass::ClassA),
        "classb" => Ok(AffinityClass::ClassB),
        "unknown" => Ok(AffinityClass::Unknown),
        _ => bail!("clase desconocida: {raw} (vale classA, classB o unknown)"),
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();
    let base_url = head_base_url();

    match cli.command {
        Commands::Submit {
            task_type,
            num_nodes,
            user_id,
            preferred_class,
        } => {
            let preferred = preferred_class.as_deref().map(parse_class).transpose()?;

            let url = format!("{}/submit_task", base_url);
            let req = SubmitRequest {
                task_type,
                num_nodes,
                user_id,
                priority: None,
                preferred_class: preferred,
            };

            let resp: SubmitResponse = client.post(&url).json(&req).send().await?.json().await?;
            if resp.status == "success" {
                println!("Tarea creada:");
                println!("  id: {}", resp.task_id.unwrap_or_default());
                println!("  (consultar con: client status <TASK_ID>)");
            } else {
                println!("Error: {}", resp.message.unwrap_or_default());
            }
        }

        Commands::Status { id } => {
            let url = format!("{}/task_status/{}", base_url, id);
            let resp: TaskStatusResponse = client.get(&url).send().await?.json().await?;

            match resp.status.as_str() {
                "completed" => {
                    println!("Tarea {} completada", id);
                    if let Some(results) = resp.results {
                        println!("{}", serde_json::to_string_pretty(&results)?);
                    }
                }
                "pending" => println!("Tarea {} pendiente", id),
                _ => println!("Error: {}", resp.message.unwrap_or_default()),
            }
        }

        Commands::Nodes => {
            let url = format!("{}/api/v1/nodes", base_url);
            let nodes: Vec<NodeView> = client.get(&url).send().await?.json().await?;

            if nodes.is_empty() {
                println!("No hay nodos registrados.");
            }
            for n in nodes {
                println!("Nodo {}", n.node_id);
                println!("  clase          : {:?}", n.affinity);
                println!("  estado         : {:?}", n.status);
                println!("  last_heartbeat : {} s ago", n.last_seen_secs_ago);
                println!("  capacidades    : {}", serde_json::to_string(&n.capabilities)?);
                println!();
            }
        }
    }

    Ok(())
}
