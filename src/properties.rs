use stacq::Node;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

pub fn collect_properties(filters: &[(String, Node)]) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    for (_, node) in filters {
        for name in node.properties() {
            *counts.entry(name.to_string()).or_default() += 1;
        }
    }

    counts
}

/// Lists property names alphabetically, or ranked by reference count when
/// `show_count` is set. Ties in the ranking keep alphabetical order.
pub fn format_properties(counts: HashMap<String, usize>, show_count: bool) -> Vec<String> {
    let by_name: BTreeMap<String, usize> = counts.into_iter().collect();
    if !show_count {
        return by_name.into_keys().collect();
    }

    let mut ranked: Vec<(String, usize)> = by_name.into_iter().collect();
    ranked.sort_by_key(|&(_, count)| Reverse(count));
    ranked
        .into_iter()
        .map(|(name, count)| format!("{}: {}", name, count))
        .collect()
}
