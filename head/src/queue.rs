use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use common::TaskDispatch;

/// Espejo durable del canal de dispatch: cada mensaje se agrega como una
/// línea JSON al archivo de cola. Es el camino redundante, best-effort; si
/// el espejo falla, el dispatch sigue solo por broadcast. Nada lo consume
/// dentro del proceso.
pub struct DurableQueue {
    path: PathBuf,
    file: Mutex<File>,
}

impl DurableQueue {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, dispatch: &TaskDispatch) -> io::Result<()> {
        let line = serde_json::to_string(dispatch)?;
        let mut file = self.file.lock().unwrap();
        writeln!(file, "{}", line)?;
        file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_path(sub: &str) -> PathBuf {
        let base = std::env::temp_dir().join("durable_queue_tests").join(sub);
        let _ = fs::remove_dir_all(&base);
        base.join("tasks.jsonl")
    }

    fn dispatch(subtask_id: &str) -> TaskDispatch {
        TaskDispatch {
            task_id: "1-0".to_string(),
            subtask_id: subtask_id.to_string(),
            node_id: "nodo-1".to_string(),
            task_type: "matrix_mult".to_string(),
            data: json!({ "matrix_a_chunk": [[1.0]], "matrix_b": [[2.0]] }),
        }
    }

    #[test]
    fn append_escribe_una_linea_json_por_mensaje() {
        let path = temp_path("append");
        let queue = DurableQueue::open(&path).unwrap();

        queue.append(&dispatch("1-0_0")).unwrap();
        queue.append(&dispatch("1-0_1")).unwrap();

        let content = fs::read_to_string(queue.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: TaskDispatch = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed.subtask_id, "1-0_1");
        assert_eq!(parsed.node_id, "nodo-1");
    }

    #[test]
    fn open_crea_los_directorios_intermedios() {
        let base = std::env::temp_dir().join("durable_queue_tests").join("nested");
        let _ = fs::remove_dir_all(&base);
        let path = base.join("sub").join("tasks.jsonl");
        assert!(!path.parent().unwrap().exists());

        let queue = DurableQueue::open(&path).unwrap();
        queue.append(&dispatch("1-0_0")).unwrap();
        assert!(path.exists());
    }
}
