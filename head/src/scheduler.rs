use common::{AffinityClass, NodeId, SubmitError};

/// Marcadores buscados (en minúsculas) dentro del id y de la dirección del
/// nodo para derivar su clase de afinidad.
const CLASS_A_MARKER: &str = "classa";
const CLASS_B_MARKER: &str = "classb";

/// Orden fijo entre clases: desempata la selección y ordena la unión del
/// fallback heterogéneo.
pub const CLASS_PRIORITY: [AffinityClass; 3] = [
    AffinityClass::ClassA,
    AffinityClass::ClassB,
    AffinityClass::Unknown,
];

/// Regla fija de clasificación: substring sobre el id y luego sobre la
/// dirección, con fallback a `unknown`.
pub fn classify(node_id: &str, ip_address: &str) -> AffinityClass {
    let id = node_id.to_lowercase();
    let addr = ip_address.to_lowercase();

    if id.contains(CLASS_A_MARKER) || addr.contains(CLASS_A_MARKER) {
        AffinityClass::ClassA
    } else if id.contains(CLASS_B_MARKER) || addr.contains(CLASS_B_MARKER) {
        AffinityClass::ClassB
    } else {
        AffinityClass::Unknown
    }
}

#[derive(Debug, Clone)]
pub struct Selection {
    /// Ids elegidos, en el orden de iteración de la lista candidata
    pub nodes: Vec<NodeId>,
    /// true si hubo que mezclar clases para juntar suficientes nodos
    pub heterogeneous: bool,
}

/// Selecciona `num_nodes` sobre un snapshot consistente `(id, clase)` en
/// orden de registro:
/// 1. Con clase preferida: solo candidatos de esa clase, o `InsufficientNodes`.
/// 2. Sin preferencia: la clase más chica que alcance sola (homogeneidad
///    antes que mezcla), desempatando por `CLASS_PRIORITY`.
/// 3. Si ninguna clase alcanza: la unión de todas, clase por clase, y la
///    selección queda marcada como heterogénea.
/// 4. Si ni la unión alcanza: `InsufficientNodes`.
pub fn select_nodes(
    active: &[(NodeId, AffinityClass)],
    num_nodes: usize,
    preferred: Option<AffinityClass>,
) -> Result<Selection, SubmitError> {
    if let Some(class) = preferred {
        let candidates: Vec<NodeId> = active
            .iter()
            .filter(|(_, c)| *c == class)
            .map(|(id, _)| id.clone())
            .collect();
        if candidates.len() < num_nodes {
            return Err(SubmitError::InsufficientNodes {
                requested: num_nodes,
                available: candidates.len(),
            });
        }
        return Ok(Selection {
            nodes: candidates.into_iter().take(num_nodes).collect(),
            heterogeneous: false,
        });
    }

    let by_class: Vec<Vec<NodeId>> = CLASS_PRIORITY
        .iter()
        .map(|class| {
            active
                .iter()
                .filter(|(_, c)| c == class)
                .map(|(id, _)| id.clone())
                .collect()
        })
        .collect();

    let mut best: Option<&Vec<NodeId>> = None;
    for group in &by_class {
        if group.len() < num_nodes {
            continue;
        }
        match best {
            Some(b) if group.len() >= b.len() => {}
            _ => best = Some(group),
        }
    }
    if let Some(group) = best {
        return Ok(Selection {
            nodes: group.iter().take(num_nodes).cloned().collect(),
            heterogeneous: false,
        });
    }

    let union: Vec<NodeId> = by_class.into_iter().flatten().collect();
    if union.len() < num_nodes {
        return Err(SubmitError::InsufficientNodes {
            requested: num_nodes,
            available: union.len(),
        });
    }
    Ok(Selection {
        nodes: union.into_iter().take(num_nodes).collect(),
        heterogeneous: true,
    })
}
