use crate::types::{MapArea, MunicipalityCount, MunicipalityShape};
use std::collections::HashMap;

/// Canonicalize a municipality name for matching across the two sources:
/// surrounding whitespace is trimmed and the name is uppercased.
pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Left merge of counts onto shapes.
///
/// Every shape produces exactly one output row, in input order. Shapes with no
/// matching count get count = 0; counts with no matching shape are dropped.
/// Duplicate count rows for the same normalized name are summed.
pub fn join_counts(shapes: &[MunicipalityShape], counts: &[MunicipalityCount]) -> Vec<MapArea> {
    let mut by_name: HashMap<String, u64> = HashMap::new();
    for count in counts {
        *by_name.entry(normalize_name(&count.municipality)).or_insert(0) += count.count;
    }

    shapes
        .iter()
        .map(|shape| {
            let key = normalize_name(&shape.municipality);
            let count = by_name.get(&key).copied().unwrap_or(0);
            MapArea {
                municipality: key,
                geometry: shape.geometry.clone(),
                count,
            }
        })
        .collect()
}
