//! Directed graph over node ids, edges pointing dependency -> dependent.
//!
//! Adjacency lives in BTreeMaps keyed by id, so every traversal visits nodes
//! in lexicographic order. Selector synthesis relies on that: wherever a tie
//! exists (equal-length longest paths, sink enumeration order) the
//! lexicographically smallest id wins, and two runs over the same graph emit
//! the same selector text.

use crate::id::UniqueId;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

#[derive(Debug, Clone, Default)]
pub struct Dag {
    children: BTreeMap<UniqueId, BTreeSet<UniqueId>>,
    parents: BTreeMap<UniqueId, BTreeSet<UniqueId>>,
}

impl Dag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: UniqueId) {
        self.children.entry(id.clone()).or_default();
        self.parents.entry(id).or_default();
    }

    pub fn add_edge(&mut self, from: UniqueId, to: UniqueId) {
        self.parents.entry(to.clone()).or_default().insert(from.clone());
        self.children.entry(to.clone()).or_default();
        self.parents.entry(from.clone()).or_default();
        self.children.entry(from).or_default().insert(to);
    }

    pub fn contains(&self, id: &UniqueId) -> bool {
        self.children.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &UniqueId> {
        self.children.keys()
    }

    pub fn node_set(&self) -> BTreeSet<UniqueId> {
        self.children.keys().cloned().collect()
    }

    pub fn parents_of(&self, id: &UniqueId) -> BTreeSet<UniqueId> {
        self.parents.get(id).cloned().unwrap_or_default()
    }

    pub fn children_of(&self, id: &UniqueId) -> BTreeSet<UniqueId> {
        self.children.get(id).cloned().unwrap_or_default()
    }

    pub fn out_degree(&self, id: &UniqueId) -> usize {
        self.children.get(id).map(|c| c.len()).unwrap_or(0)
    }

    /// All transitive dependencies of `id`, excluding `id` itself.
    pub fn ancestors(&self, id: &UniqueId) -> BTreeSet<UniqueId> {
        self.closure(id, &self.parents)
    }

    /// All transitive dependents of `id`, excluding `id` itself.
    pub fn descendants(&self, id: &UniqueId) -> BTreeSet<UniqueId> {
        self.closure(id, &self.children)
    }

    fn closure(
        &self,
        id: &UniqueId,
        adjacency: &BTreeMap<UniqueId, BTreeSet<UniqueId>>,
    ) -> BTreeSet<UniqueId> {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([id.clone()]);
        while let Some(current) = queue.pop_front() {
            for next in adjacency.get(&current).into_iter().flatten() {
                if seen.insert(next.clone()) {
                    queue.push_back(next.clone());
                }
            }
        }
        seen
    }

    /// The induced subgraph on `keep`: those nodes plus every edge whose
    /// endpoints both survive.
    pub fn subgraph(&self, keep: &BTreeSet<UniqueId>) -> Dag {
        let mut sub = Dag::new();
        for id in keep {
            if !self.contains(id) {
                continue;
            }
            sub.add_node(id.clone());
            for child in self.children.get(id).into_iter().flatten() {
                if keep.contains(child) {
                    sub.add_edge(id.clone(), child.clone());
                }
            }
        }
        sub
    }

    pub fn remove_nodes(&mut self, remove: &BTreeSet<UniqueId>) {
        for id in remove {
            self.children.remove(id);
            self.parents.remove(id);
        }
        for set in self.children.values_mut() {
            set.retain(|id| !remove.contains(id));
        }
        for set in self.parents.values_mut() {
            set.retain(|id| !remove.contains(id));
        }
    }

    /// Kahn's algorithm with the ready set held in a BTreeSet, so ids at the
    /// same depth come out in lexicographic order.
    ///
    /// If the graph has a cycle the result is shorter than `len()`; callers
    /// that ingest untrusted edges check for exactly that.
    pub fn topological_sort(&self) -> Vec<UniqueId> {
        let mut indegree: BTreeMap<&UniqueId, usize> = self
            .children
            .keys()
            .map(|id| (id, self.parents.get(id).map(|p| p.len()).unwrap_or(0)))
            .collect();

        let mut ready: BTreeSet<&UniqueId> = indegree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(id, _)| *id)
            .collect();

        let mut order = Vec::with_capacity(self.len());
        while let Some(id) = ready.pop_first() {
            order.push(id.clone());
            for child in self.children.get(id).into_iter().flatten() {
                if let Some(d) = indegree.get_mut(child) {
                    *d -= 1;
                    if *d == 0 {
                        ready.insert(child);
                    }
                }
            }
        }
        order
    }

    /// Weakly connected components, each returned as a node set, ordered by
    /// their smallest member id.
    pub fn weakly_connected_components(&self) -> Vec<BTreeSet<UniqueId>> {
        let mut seen: BTreeSet<UniqueId> = BTreeSet::new();
        let mut components = Vec::new();

        for start in self.children.keys() {
            if seen.contains(start) {
                continue;
            }
            let mut component = BTreeSet::from([start.clone()]);
            let mut queue = VecDeque::from([start.clone()]);
            seen.insert(start.clone());
            while let Some(current) = queue.pop_front() {
                let neighbours = self
                    .children
                    .get(&current)
                    .into_iter()
                    .flatten()
                    .chain(self.parents.get(&current).into_iter().flatten());
                for next in neighbours {
                    if seen.insert(next.clone()) {
                        component.insert(next.clone());
                        queue.push_back(next.clone());
                    }
                }
            }
            components.push(component);
        }
        components
    }

    /// The longest directed path in the graph, as a node list from start to
    /// end. Requires an acyclic graph.
    ///
    /// Length ties are broken toward the lexicographically smallest ids: we
    /// scan predecessors and endpoints in id order and only replace a
    /// candidate on a strictly better length.
    pub fn longest_path(&self) -> Vec<UniqueId> {
        let order = self.topological_sort();
        let mut length: BTreeMap<&UniqueId, usize> = BTreeMap::new();
        let mut predecessor: BTreeMap<&UniqueId, &UniqueId> = BTreeMap::new();

        for id in &order {
            let mut best = 1;
            for parent in self.parents.get(id).into_iter().flatten() {
                let candidate = length.get(parent).copied().unwrap_or(1) + 1;
                if candidate > best {
                    best = candidate;
                    predecessor.insert(id, parent);
                }
            }
            length.insert(id, best);
        }

        let mut end: Option<&UniqueId> = None;
        let mut best = 0;
        for id in &order {
            let len = length.get(id).copied().unwrap_or(1);
            if len > best {
                best = len;
                end = Some(id);
            }
        }

        let mut path = Vec::new();
        let mut current = end;
        while let Some(id) = current {
            path.push(id.clone());
            current = predecessor.get(id).copied();
        }
        path.reverse();
        path
    }
}
