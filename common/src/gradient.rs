use rand::Rng;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::executor::{ExecutorError, TaskExecutor};

/// Cómputo de gradientes por porciones de muestras: cada nodo recibe una
/// tajada de (inputs, targets) y calcula el gradiente de mínimos cuadrados
/// de un modelo lineal inicializado en cero (determinista dado el dato).
/// El agregado es la media elemento a elemento de todos los parciales.
pub struct GradientExecutor {
    samples: usize,
    features: usize,
    classes: usize,
}

impl GradientExecutor {
    pub fn new(samples: usize, features: usize, classes: usize) -> Self {
        Self {
            samples,
            features,
            classes,
        }
    }
}

impl Default for GradientExecutor {
    fn default() -> Self {
        Self::new(1000, 784, 10)
    }
}

#[derive(Debug, Deserialize)]
struct GradientPartial {
    weight: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

impl TaskExecutor for GradientExecutor {
    fn task_type(&self) -> &'static str {
        "gradient_compute"
    }

    fn total_units(&self) -> usize {
        self.samples
    }

    fn generate_input(&self) -> Value {
        let mut rng = rand::thread_rng();
        let inputs: Vec<Vec<f64>> = (0..self.samples)
            .map(|_| (0..self.features).map(|_| rng.gen_range(-1.0..1.0)).collect())
            .collect();
        let targets: Vec<usize> = (0..self.samples)
            .map(|_| rng.gen_range(0..self.classes))
            .collect();
        json!({ "inputs": inputs, "targets": targets })
    }

    fn slice_input(&self, input: &Value, start: usize, end: usize) -> Value {
        let inputs: Vec<Value> = input["inputs"]
            .as_array()
            .map(|rows| rows[start..end].to_vec())
            .unwrap_or_default();
        let targets: Vec<Value> = input["targets"]
            .as_array()
            .map(|rows| rows[start..end].to_vec())
            .unwrap_or_default();
        json!({ "inputs": inputs, "targets": targets })
    }

    /// Gradiente de ||W·x - onehot(y)||² con W = 0:
    ///   grad_w[c][j] = -(2/n) · Σ x_ij sobre las muestras con target c
    ///   grad_b[c]    = -(2/n) · #{ muestras con target c }
    fn execute(&self, data: &Value) -> Result<Value, ExecutorError> {
        let inputs: Vec<Vec<f64>> =
            serde_json::from_value(data.get("inputs").cloned().unwrap_or(Value::Null))
                .map_err(|e| ExecutorError::BadInput(format!("campo inputs: {e}")))?;
        let targets: Vec<usize> =
            serde_json::from_value(data.get("targets").cloned().unwrap_or(Value::Null))
                .map_err(|e| ExecutorError::BadInput(format!("campo targets: {e}")))?;

        if inputs.is_empty() {
            return Err(ExecutorError::BadInput("porción sin muestras".to_string()));
        }
        if inputs.len() != targets.len() {
            return Err(ExecutorError::BadInput(format!(
                "{} inputs contra {} targets",
                inputs.len(),
                targets.len()
            )));
        }

        let n = inputs.len() as f64;
        let mut grad_w = vec![vec![0.0; self.features]; self.classes];
        let mut grad_b = vec![0.0; self.classes];

        for (row, &target) in inputs.iter().zip(targets.iter()) {
            if row.len() != self.features {
                return Err(ExecutorError::BadInput(format!(
                    "muestra con {} features, se esperaban {}",
                    row.len(),
                    self.features
                )));
            }
            if target >= self.classes {
                return Err(ExecutorError::BadInput(format!(
                    "target {} fuera de rango (clases: {})",
                    target, self.classes
                )));
            }
            for (j, x) in row.iter().enumerate() {
                grad_w[target][j] -= 2.0 * x / n;
            }
            grad_b[target] -= 2.0 / n;
        }

        Ok(json!({ "weight": grad_w, "bias": grad_b }))
    }

    fn combine(&self, partials: &[Value]) -> Result<Value, ExecutorError> {
        if partials.is_empty() {
            return Err(ExecutorError::BadInput("sin parciales que combinar".to_string()));
        }

        let mut sum_w: Vec<Vec<f64>> = Vec::new();
        let mut sum_b: Vec<f64> = Vec::new();

        for (i, value) in partials.iter().enumerate() {
            let partial: GradientPartial = serde_json::from_value(value.clone())
                .map_err(|e| ExecutorError::BadInput(format!("parcial inválido: {e}")))?;

            if i == 0 {
                sum_w = partial.weight;
                sum_b = partial.bias;
                continue;
            }

            if sum_w.len() != partial.weight.len() || sum_b.len() != partial.bias.len() {
                return Err(ExecutorError::BadInput(
                    "parciales con dimensiones distintas".to_string(),
                ));
            }
            for (acc_row, row) in sum_w.iter_mut().zip(partial.weight) {
                if acc_row.len() != row.len() {
                    return Err(ExecutorError::BadInput(
                        "parciales con dimensiones distintas".to_string(),
                    ));
                }
                for (acc, x) in acc_row.iter_mut().zip(row) {
                    *acc += x;
                }
            }
            for (acc, x) in sum_b.iter_mut().zip(partial.bias) {
                *acc += x;
            }
        }

        let count = partials.len() as f64;
        let mean_w: Vec<Vec<f64>> = sum_w
            .into_iter()
            .map(|row| row.into_iter().map(|x| x / count).collect())
            .collect();
        let mean_b: Vec<f64> = sum_b.into_iter().map(|x| x / count).collect();

        Ok(json!({ "weight": mean_w, "bias": mean_b }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execute_calcula_el_gradiente_esperado() {
        let executor = GradientExecutor::new(2, 2, 2);
        let data = json!({
            "inputs": [[1.0, 2.0], [3.0, 4.0]],
            "targets": [0, 1],
        });

        let result = executor.execute(&data).unwrap();
        assert_eq!(
            result,
            json!({
                "weight": [[-1.0, -2.0], [-3.0, -4.0]],
                "bias": [-1.0, -1.0],
            })
        );
    }

    #[test]
    fn execute_rechaza_target_fuera_de_rango() {
        let executor = GradientExecutor::new(1, 2, 2);
        let data = json!({ "inputs": [[1.0, 2.0]], "targets": [5] });

        assert!(matches!(
            executor.execute(&data),
            Err(ExecutorError::BadInput(_))
        ));
    }

    #[test]
    fn execute_rechaza_porcion_vacia() {
        let executor = GradientExecutor::default();
        let data = json!({ "inputs": [], "targets": [] });

        assert!(executor.execute(&data).is_err());
    }

    #[test]
    fn combine_promedia_elemento_a_elemento() {
        let executor = GradientExecutor::new(4, 2, 1);
        let p0 = json!({ "weight": [[2.0, 4.0]], "bias": [2.0] });
        let p1 = json!({ "weight": [[4.0, 8.0]], "bias": [6.0] });

        let combinado = executor.combine(&[p0, p1]).unwrap();
        assert_eq!(
            combinado,
            json!({ "weight": [[3.0, 6.0]], "bias": [4.0] })
        );
    }

    #[test]
    fn combine_rechaza_dimensiones_distintas() {
        let executor = GradientExecutor::default();
        let p0 = json!({ "weight": [[1.0]], "bias": [1.0] });
        let p1 = json!({ "weight": [[1.0, 2.0]], "bias": [1.0] });

        assert!(executor.combine(&[p0, p1]).is_err());
    }

    #[test]
    fn slice_respeta_los_rangos() {
        let executor = GradientExecutor::new(4, 2, 2);
        let input = json!({
            "inputs": [[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]],
            "targets": [0, 1, 0, 1],
        });

        let porcion = executor.slice_input(&input, 1, 3);
        assert_eq!(
            porcion,
            json!({ "inputs": [[1.0, 1.0], [2.0, 2.0]], "targets": [1, 0] })
        );
    }
}
