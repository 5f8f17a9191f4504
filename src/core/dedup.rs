use std::collections::{HashMap, HashSet};

use crate::client::AssetRecord;

/// Records with unique identifiers plus the identifiers that collided.
#[derive(Debug, Default)]
pub struct Deduplicated {
    pub records: Vec<AssetRecord>,
    /// Each colliding identifier once, in the order its first repeat appears.
    pub duplicate_identifiers: Vec<String>,
}

/// Keeps the last record for every identifier.
///
/// Identifiers are compared by exact string equality. Survivors stay in the
/// input order of their surviving (last) occurrence.
pub fn dedup_last_wins(candidates: Vec<AssetRecord>) -> Deduplicated {
    let mut last_index: HashMap<&str, usize> = HashMap::with_capacity(candidates.len());
    let mut reported: HashSet<&str> = HashSet::new();
    let mut duplicate_identifiers = Vec::new();

    for (index, record) in candidates.iter().enumerate() {
        let id = record.identifier.as_str();
        if last_index.insert(id, index).is_some() && reported.insert(id) {
            duplicate_identifiers.push(id.to_string());
        }
    }

    let keep: HashSet<usize> = last_index.into_values().collect();

    let records = candidates
        .into_iter()
        .enumerate()
        .filter(|(index, _)| keep.contains(index))
        .map(|(_, record)| record)
        .collect();

    Deduplicated {
        records,
        duplicate_identifiers,
    }
}
