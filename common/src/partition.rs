/// Parte `total` unidades de trabajo en `parts` rangos contiguos
/// `[inicio, fin)`. Los primeros `parts - 1` rangos reciben
/// `total / parts` unidades cada uno y el último absorbe el resto, así
/// `[0, total)` queda cubierto exactamente una vez, sin solapes.
pub fn partition_ranges(total: usize, parts: usize) -> Vec<(usize, usize)> {
    let chunk = total / parts;
    let mut ranges = Vec::with_capacity(parts);
    for i in 0..parts {
        let start = i * chunk;
        let end = if i == parts - 1 { total } else { start + chunk };
        ranges.push((start, end));
    }
    ranges
}
