//! Parent/child hierarchy for work items
//!
//! Items are kept in an arena keyed by ID; the tree shape lives in a separate
//! parent -> ordered children index that is rebuilt from scratch on every
//! [`Hierarchy::build`]. Nothing is attached to the items themselves.
//!
//! Ordering rules:
//! - Roots ascend by ID.
//! - Siblings ascend by ([`type_priority`], ID).
//!
//! An item whose parent is not loaded becomes a root. Items caught in a
//! parent cycle (including an item naming itself as parent) also become
//! roots, so every loaded item appears exactly once in the forest.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, HashMap, HashSet};

use super::id::WorkItemId;
use super::work_item::WorkItem;

/// Sibling rank for known work item types
const TYPE_ORDER: [(&str, u32); 3] = [("Feature", 1), ("User Story", 2), ("Task", 3)];

/// Rank given to any type not listed in the order table
pub const UNRANKED_TYPE: u32 = 99;

/// Returns the sibling sort rank of a work item type
pub fn type_priority(item_type: &str) -> u32 {
    TYPE_ORDER
        .iter()
        .find(|(name, _)| *name == item_type)
        .map(|(_, rank)| *rank)
        .unwrap_or(UNRANKED_TYPE)
}

/// Why an item with a declared parent was placed at the root level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detached {
    /// The declared parent is not among the loaded items
    MissingParent(WorkItemId),
    /// The item is part of a parent cycle
    Cycle(WorkItemId),
}

/// An ordered forest of work items
#[derive(Debug, Default)]
pub struct Hierarchy {
    items: BTreeMap<WorkItemId, WorkItem>,
    roots: Vec<WorkItemId>,
    children: HashMap<WorkItemId, Vec<WorkItemId>>,
    detached: BTreeMap<WorkItemId, Detached>,
}

impl Hierarchy {
    /// Builds the forest from a flat collection of items
    ///
    /// Later duplicates of the same ID replace earlier ones.
    pub fn build(items: impl IntoIterator<Item = WorkItem>) -> Self {
        let items: BTreeMap<WorkItemId, WorkItem> =
            items.into_iter().map(|item| (item.id, item)).collect();

        let mut detached = BTreeMap::new();

        // Resolve declared parents against the loaded set
        let mut parent_of: BTreeMap<WorkItemId, WorkItemId> = BTreeMap::new();
        for item in items.values() {
            let Some(parent) = item.parent_id else {
                continue;
            };
            if parent == item.id {
                detached.insert(item.id, Detached::Cycle(parent));
            } else if items.contains_key(&parent) {
                parent_of.insert(item.id, parent);
            } else {
                log::debug!(
                    "work item {} references missing parent {}, treating as root",
                    item.id,
                    parent
                );
                detached.insert(item.id, Detached::MissingParent(parent));
            }
        }

        for id in cycle_members(&items, &parent_of) {
            if let Some(parent) = parent_of.remove(&id) {
                log::warn!(
                    "work item {} is part of a parent cycle via {}, treating as root",
                    id,
                    parent
                );
                detached.insert(id, Detached::Cycle(parent));
            }
        }

        let mut roots = Vec::new();
        let mut children: HashMap<WorkItemId, Vec<WorkItemId>> =
            items.keys().map(|id| (*id, Vec::new())).collect();

        for id in items.keys() {
            match parent_of.get(id) {
                Some(parent) => children.entry(*parent).or_default().push(*id),
                None => roots.push(*id),
            }
        }

        roots.sort();
        for siblings in children.values_mut() {
            siblings.sort_by_key(|id| (type_priority(&items[id].item_type), *id));
        }

        Self {
            items,
            roots,
            children,
            detached,
        }
    }

    /// Returns the root IDs in order
    pub fn roots(&self) -> &[WorkItemId] {
        &self.roots
    }

    /// Returns the ordered children of an item (empty if unknown)
    pub fn children(&self, id: WorkItemId) -> &[WorkItemId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns an item by ID
    pub fn get(&self, id: WorkItemId) -> Option<&WorkItem> {
        self.items.get(&id)
    }

    /// Returns items that declared a parent but were placed at the root level
    pub fn detached(&self) -> &BTreeMap<WorkItemId, Detached> {
        &self.detached
    }

    /// Returns the number of items in the forest
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the forest is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Walks the forest depth-first, yielding each item with its depth
    pub fn depth_first(&self) -> Vec<(usize, &WorkItem)> {
        let mut out = Vec::with_capacity(self.items.len());
        let mut stack: Vec<(usize, WorkItemId)> =
            self.roots.iter().rev().map(|id| (0, *id)).collect();

        while let Some((depth, id)) = stack.pop() {
            if let Some(item) = self.items.get(&id) {
                out.push((depth, item));
            }
            for child in self.children(id).iter().rev() {
                stack.push((depth + 1, *child));
            }
        }

        out
    }
}

/// Finds every item that sits on a parent cycle
fn cycle_members(
    items: &BTreeMap<WorkItemId, WorkItem>,
    parent_of: &BTreeMap<WorkItemId, WorkItemId>,
) -> Vec<WorkItemId> {
    let mut graph: DiGraph<WorkItemId, ()> = DiGraph::new();
    let nodes: HashMap<WorkItemId, NodeIndex> = items
        .keys()
        .map(|id| (*id, graph.add_node(*id)))
        .collect();

    for (child, parent) in parent_of {
        graph.add_edge(nodes[parent], nodes[child], ());
    }

    let mut members: HashSet<WorkItemId> = HashSet::new();
    for component in tarjan_scc(&graph) {
        if component.len() > 1 {
            members.extend(component.iter().map(|idx| graph[*idx]));
        }
    }

    let mut members: Vec<_> = members.into_iter().collect();
    members.sort();
    members
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(list: &[WorkItemId]) -> Vec<u32> {
        list.iter().map(|id| id.value()).collect()
    }

    #[test]
    fn type_priority_table() {
        assert_eq!(type_priority("Feature"), 1);
        assert_eq!(type_priority("User Story"), 2);
        assert_eq!(type_priority("Task"), 3);
        assert_eq!(type_priority("Bug"), UNRANKED_TYPE);
        assert_eq!(type_priority(""), UNRANKED_TYPE);
    }

    #[test]
    fn children_sorted_by_type_then_id() {
        let h = Hierarchy::build([
            WorkItem::new(1, "Feature", "Root"),
            WorkItem::new(2, "Task", "Do it").with_parent(1),
            WorkItem::new(3, "User Story", "Story").with_parent(1),
        ]);

        assert_eq!(ids(h.roots()), vec![1]);
        assert_eq!(ids(h.children(WorkItemId::new(1))), vec![3, 2]);
    }

    #[test]
    fn unknown_types_sort_last_by_id() {
        let h = Hierarchy::build([
            WorkItem::new(1, "Epic", "Root"),
            WorkItem::new(9, "Bug", "b").with_parent(1),
            WorkItem::new(4, "Spike", "s").with_parent(1),
            WorkItem::new(7, "Task", "t").with_parent(1),
            WorkItem::new(8, "Feature", "f").with_parent(1),
        ]);

        assert_eq!(ids(h.children(WorkItemId::new(1))), vec![8, 7, 4, 9]);
    }

    #[test]
    fn missing_parent_becomes_root() {
        let h = Hierarchy::build([
            WorkItem::new(1, "Feature", "Root"),
            WorkItem::new(5, "Task", "Orphan").with_parent(99),
        ]);

        assert_eq!(ids(h.roots()), vec![1, 5]);
        assert_eq!(
            h.detached().get(&WorkItemId::new(5)),
            Some(&Detached::MissingParent(WorkItemId::new(99)))
        );
    }

    #[test]
    fn roots_sorted_by_id() {
        let h = Hierarchy::build([
            WorkItem::new(30, "Task", "c"),
            WorkItem::new(4, "Feature", "a"),
            WorkItem::new(12, "User Story", "b"),
        ]);

        assert_eq!(ids(h.roots()), vec![4, 12, 30]);
    }

    #[test]
    fn self_parent_becomes_root() {
        let h = Hierarchy::build([WorkItem::new(3, "Task", "loop").with_parent(3)]);

        assert_eq!(ids(h.roots()), vec![3]);
        assert!(h.children(WorkItemId::new(3)).is_empty());
    }

    #[test]
    fn parent_cycle_members_become_roots() {
        let h = Hierarchy::build([
            WorkItem::new(1, "Feature", "a").with_parent(2),
            WorkItem::new(2, "Feature", "b").with_parent(1),
            WorkItem::new(3, "Task", "hangs off cycle").with_parent(2),
        ]);

        assert_eq!(ids(h.roots()), vec![1, 2]);
        assert_eq!(ids(h.children(WorkItemId::new(2))), vec![3]);
        assert!(matches!(h.detached().get(&WorkItemId::new(1)), Some(Detached::Cycle(_))));
        assert_eq!(h.depth_first().len(), 3);
    }

    #[test]
    fn depth_first_visits_in_document_order() {
        let h = Hierarchy::build([
            WorkItem::new(1, "Feature", "f1"),
            WorkItem::new(2, "User Story", "s1").with_parent(1),
            WorkItem::new(3, "Task", "t1").with_parent(2),
            WorkItem::new(4, "Feature", "f2"),
        ]);

        let walk: Vec<_> = h
            .depth_first()
            .into_iter()
            .map(|(depth, item)| (depth, item.id.value()))
            .collect();

        assert_eq!(walk, vec![(0, 1), (1, 2), (2, 3), (0, 4)]);
    }

    #[test]
    fn unknown_id_has_no_children() {
        let h = Hierarchy::build(Vec::new());
        assert!(h.is_empty());
        assert!(h.children(WorkItemId::new(1)).is_empty());
    }

    fn arb_items() -> impl Strategy<Value = Vec<WorkItem>> {
        proptest::collection::vec(
            (
                prop_oneof![Just("Feature"), Just("User Story"), Just("Task"), Just("Bug")],
                proptest::option::of(1u32..40),
            ),
            0..40,
        )
        .prop_map(|specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (kind, parent))| {
                    let mut item = WorkItem::new(i as u32 + 1, kind, format!("item {}", i + 1));
                    item.parent_id = parent.map(WorkItemId::new);
                    item
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn every_item_appears_exactly_once(items in arb_items()) {
            let count = items.len();
            let h = Hierarchy::build(items);

            let mut seen: Vec<u32> = h
                .depth_first()
                .iter()
                .map(|(_, item)| item.id.value())
                .collect();
            seen.sort();
            let expected: Vec<u32> = (1..=count as u32).collect();

            prop_assert_eq!(seen, expected);
        }

        #[test]
        fn siblings_are_ordered(items in arb_items()) {
            let h = Hierarchy::build(items);

            for (_, item) in h.depth_first() {
                let keys: Vec<_> = h
                    .children(item.id)
                    .iter()
                    .map(|id| (type_priority(&h.get(*id).unwrap().item_type), *id))
                    .collect();
                let mut sorted = keys.clone();
                sorted.sort();
                prop_assert_eq!(keys, sorted);
            }

            let mut roots = h.roots().to_vec();
            roots.sort();
            prop_assert_eq!(roots.as_slice(), h.roots());
        }

        #[test]
        fn building_twice_is_identical(items in arb_items()) {
            let first = Hierarchy::build(items.clone());
            let second = Hierarchy::build(items);

            let walk = |h: &Hierarchy| -> Vec<(usize, u32)> {
                h.depth_first().iter().map(|(d, item)| (*d, item.id.value())).collect()
            };
            prop_assert_eq!(walk(&first), walk(&second));
        }
    }
}
