use std::collections::HashSet;
use std::hash::Hash;

use crate::arena::{NodeId, SummaryId};

/// Leaf aggregate: an unordered set of caller-supplied objects. Duplicate
/// inserts of an equal object collapse (the reference behaves as a set, not
/// a multiset).
#[derive(Debug, Clone)]
pub struct Summary<O> {
    objects: HashSet<O>,
    pub owner: Option<NodeId>,
}

impl<O> Default for Summary<O> {
    fn default() -> Self {
        Self {
            objects: HashSet::new(),
            owner: None,
        }
    }
}

impl<O: Eq + Hash + Clone + Ord> Summary<O> {
    pub fn insert(&mut self, object: O) {
        self.objects.insert(object);
    }

    pub fn objects(&self) -> &HashSet<O> {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// A fresh, independently-owned copy of the object set. Used when a
    /// SHARED summary must be split from its previous owner before a new
    /// object can be added to it.
    pub fn shallow_copy(&self) -> Self {
        Self {
            objects: self.objects.clone(),
            owner: None,
        }
    }
}

impl<O: Eq + Hash + Clone + Ord + std::fmt::Display> Summary<O> {
    /// Objects in sorted order, space-joined. Used by tests only, mirroring
    /// the reference implementation's `Summary::info`.
    pub fn info(&self) -> String {
        let mut sorted: Vec<&O> = self.objects.iter().collect();
        sorted.sort();
        sorted
            .iter()
            .map(|o| o.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Index-based pool of [`Summary`] slots, mirroring [`crate::node::NodeArena`].
#[derive(Debug, Default)]
pub struct SummaryArena<O> {
    summaries: Vec<Summary<O>>,
}

impl<O: Eq + Hash + Clone + Ord> SummaryArena<O> {
    pub fn new() -> Self {
        Self {
            summaries: Vec::new(),
        }
    }

    pub fn alloc(&mut self) -> SummaryId {
        let id = SummaryId(self.summaries.len());
        self.summaries.push(Summary::default());
        id
    }

    pub fn get(&self, id: SummaryId) -> &Summary<O> {
        &self.summaries[id.0]
    }

    pub fn get_mut(&mut self, id: SummaryId) -> &mut Summary<O> {
        &mut self.summaries[id.0]
    }

    pub fn set_owner(&mut self, id: SummaryId, owner: NodeId) {
        self.summaries[id.0].owner = Some(owner);
    }

    /// Duplicates `id`'s object set into a fresh, unowned slot (invariant
    /// I3 applied to summaries).
    pub fn shallow_copy(&mut self, id: SummaryId) -> SummaryId {
        let copy = self.summaries[id.0].shallow_copy();
        let new_id = SummaryId(self.summaries.len());
        self.summaries.push(copy);
        new_id
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }
}
