use rand::Rng;
use serde_json::{json, Value};

use crate::executor::{ExecutorError, TaskExecutor};

/// Multiplicación de matrices por bloques de filas: el operando izquierdo
/// `a` (rows x inner) se parte en filas, el derecho `b` (inner x cols)
/// viaja completo a cada nodo, y el resultado final se reconstruye
/// concatenando los bloques de filas en orden de partición.
pub struct MatrixMultExecutor {
    rows: usize,
    inner: usize,
    cols: usize,
}

impl MatrixMultExecutor {
    pub fn new(rows: usize, inner: usize, cols: usize) -> Self {
        Self { rows, inner, cols }
    }
}

impl Default for MatrixMultExecutor {
    fn default() -> Self {
        Self::new(1000, 1000, 1000)
    }
}

fn random_matrix(rows: usize, cols: usize) -> Vec<Vec<f64>> {
    let mut rng = rand::thread_rng();
    (0..rows)
        .map(|_| (0..cols).map(|_| rng.gen::<f64>()).collect())
        .collect()
}

fn parse_matrix(value: &Value, field: &str) -> Result<Vec<Vec<f64>>, ExecutorError> {
    serde_json::from_value(value.get(field).cloned().unwrap_or(Value::Null))
        .map_err(|e| ExecutorError::BadInput(format!("campo {field}: {e}")))
}

fn matmul(a: &[Vec<f64>], b: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ExecutorError> {
    let inner = b.len();
    if inner == 0 {
        return Err(ExecutorError::BadInput("matriz derecha vacía".to_string()));
    }
    let cols = b[0].len();

    let mut out = Vec::with_capacity(a.len());
    for row in a {
        if row.len() != inner {
            return Err(ExecutorError::BadInput(format!(
                "dimensiones incompatibles: fila de {} contra {} filas de b",
                row.len(),
                inner
            )));
        }
        let mut out_row = vec![0.0; cols];
        for (k, x) in row.iter().enumerate() {
            for (j, y) in b[k].iter().enumerate() {
                out_row[j] += x * y;
            }
        }
        out.push(out_row);
    }
    Ok(out)
}

impl TaskExecutor for MatrixMultExecutor {
    fn task_type(&self) -> &'static str {
        "matrix_mult"
    }

    fn total_units(&self) -> usize {
        self.rows
    }

    fn generate_input(&self) -> Value {
        json!({
            "matrix_a": random_matrix(self.rows, self.inner),
            "matrix_b": random_matrix(self.inner, self.cols),
        })
    }

    fn slice_input(&self, input: &Value, start: usize, end: usize) -> Value {
        let chunk: Vec<Value> = input["matrix_a"]
            .as_array()
            .map(|rows| rows[start..end].to_vec())
            .unwrap_or_default();
        json!({
            "matrix_a_chunk": chunk,
            "matrix_b": input["matrix_b"].clone(),
        })
    }

    fn execute(&self, data: &Value) -> Result<Value, ExecutorError> {
        let a_chunk = parse_matrix(data, "matrix_a_chunk")?;
        let b = parse_matrix(data, "matrix_b")?;
        let product = matmul(&a_chunk, &b)?;
        Ok(json!(product))
    }

    fn combine(&self, partials: &[Value]) -> Result<Value, ExecutorError> {
        let mut rows: Vec<Value> = Vec::new();
        for partial in partials {
            let block = partial
                .as_array()
                .ok_or_else(|| ExecutorError::BadInput("parcial no es una matriz".to_string()))?;
            rows.extend(block.iter().cloned());
        }
        Ok(Value::Array(rows))
    }
}
