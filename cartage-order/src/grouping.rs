use crate::models::LineItem;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Composite shipment key: one manifest and one label are generated per
/// (supplier, courier) pair. A structured key rather than a joined string,
/// so identifiers containing separator characters cannot collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    pub supplier_id: String,
    pub courier_id: String,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.supplier_id, self.courier_id)
    }
}

/// The line items sharing one chosen supplier+courier pair, processed as one
/// shipment unit. Built fresh per fulfillment attempt, never persisted.
#[derive(Debug, Clone)]
pub struct ManifestGroup {
    pub key: GroupKey,
    pub items: Vec<LineItem>,
}

/// Partition fulfillable lines into shipment groups.
///
/// Lines missing either selection are skipped silently, and lines already in
/// terminal status are excluded so re-running fulfillment never re-bills a
/// completed shipment. Item order within a group and first-seen group order
/// are both preserved: manifest line ordering is customer-visible.
pub fn group_for_manifest(items: &[LineItem]) -> Vec<ManifestGroup> {
    let mut groups: Vec<ManifestGroup> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();

    for item in items {
        if item.status.is_terminal() {
            continue;
        }

        let key = match (&item.supplier_id, &item.courier_id) {
            (Some(supplier_id), Some(courier_id)) => GroupKey {
                supplier_id: supplier_id.clone(),
                courier_id: courier_id.clone(),
            },
            _ => continue, // incomplete selections are skipped, not an error
        };

        let slot = match index.get(&key) {
            Some(slot) => *slot,
            None => {
                groups.push(ManifestGroup {
                    key: key.clone(),
                    items: Vec::new(),
                });
                index.insert(key, groups.len() - 1);
                groups.len() - 1
            }
        };

        groups[slot].items.push(item.clone());
    }

    groups
}
