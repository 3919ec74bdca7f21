//! An in-memory multidimensional aggregation index that aggressively shares
//! structure across dimensions: subtrees and leaf summaries are shared
//! whenever two addresses agree on a suffix, and insertion mutates only the
//! paths that actually change.
//!
//! The crate is organized bottom-up: [`Summary`] and the node arena
//! ([`NodeId`]) form the data model, [`upstream`] proves switch-equivalence,
//! [`thread`] tracks descent state during insertion, and [`insert`] /
//! [`query`] implement the two public operations.

mod arena;
mod error;
mod events;
mod insert;
mod label;
mod node;
#[cfg(test)]
mod proptests;
mod query;
mod summary;
mod thread;
mod upstream;

pub use arena::{NodeId, SummaryId};
pub use error::NanocubeError;
pub use events::{Color, ContentId, LinkKind, NullSink, Sink};
pub use label::{address, Address, Label};
pub use summary::Summary;

use std::hash::Hash;

use node::NodeArena;
use summary::SummaryArena;
use thread::{MainThread, ParallelThreadSet};

/// A shared-DAG multidimensional aggregation index over objects of type `O`.
///
/// `O` must be cloneable (a copy is stored in every Summary it reaches) and
/// totally ordered (summaries report their contents in sorted order for
/// tests and diagnostics); see [`Summary`].
#[derive(Debug)]
pub struct Nanocube<O> {
    levels: Vec<usize>,
    nodes: NodeArena,
    summaries: SummaryArena<O>,
    root: Option<NodeId>,
}

impl<O> Nanocube<O>
where
    O: Eq + Hash + Clone + Ord,
{
    /// Creates an empty cube with `levels.len()` dimensions, where
    /// `levels[d]` is the maximum path depth in dimension `d`. The depth
    /// bound is informational for `insert` (it is not enforced there) but
    /// is validated against on `query`.
    pub fn new(levels: Vec<usize>) -> Result<Self, NanocubeError> {
        if levels.is_empty() {
            return Err(NanocubeError::InternalInvariantViolation(
                "levels must name at least one dimension",
            ));
        }
        log::debug!("nanocube created with {} dimensions", levels.len());
        Ok(Self {
            levels,
            nodes: NodeArena::new(),
            summaries: SummaryArena::new(),
            root: None,
        })
    }

    pub fn dimension(&self) -> usize {
        self.levels.len()
    }

    pub fn levels(&self) -> &[usize] {
        &self.levels
    }

    fn validate_address(&self, address: &Address) -> Result<(), NanocubeError> {
        if address.dimension() != self.levels.len() {
            return Err(NanocubeError::MalformedAddress {
                found: address.dimension(),
                expected: self.levels.len(),
            });
        }
        for (dim, (path, &max)) in address.dims.iter().zip(self.levels.iter()).enumerate() {
            if path.len() > max {
                return Err(NanocubeError::PathTooLong {
                    dim,
                    found: path.len(),
                    max,
                });
            }
        }
        Ok(())
    }

    /// Inserts `object` at `address`, creating at most
    /// O(sum of per-dimension path lengths) new nodes. Silently discards
    /// the event stream (see [`Self::insert_with_sink`] to observe it).
    pub fn insert(&mut self, address: &Address, object: O) -> Result<(), NanocubeError> {
        self.insert_with_sink(address, object, &mut NullSink)
    }

    /// Like [`Self::insert`], but every structural mutation is also reported
    /// to `sink` (see [`events::Sink`]). The core never inspects `sink`'s
    /// state; this is purely an observation hook for external collaborators
    /// such as a visualization log.
    pub fn insert_with_sink(
        &mut self,
        address: &Address,
        object: O,
        sink: &mut dyn Sink,
    ) -> Result<(), NanocubeError> {
        self.validate_address(address)?;
        log::trace!("insert: address={:?}", address);

        if self.root.is_none() {
            let r = self.nodes.alloc();
            sink.new_node(r, 0, 0);
            self.root = Some(r);
        }
        let root = self.root.expect("root just ensured present");

        let mut main = MainThread::new();
        let mut parallel = ParallelThreadSet::new();
        main.start(&mut self.nodes, sink, root, 0, 0);

        let result = {
            let mut ctx = insert::InsertCtx {
                nodes: &mut self.nodes,
                summaries: &mut self.summaries,
                address,
                object: &object,
                sink: &mut *sink,
            };
            insert::insert_at(&mut ctx, &mut main, &mut parallel)
        };

        // Invariant I6 must hold on every exit path, success or failure,
        // however deep the recursion got before returning.
        main.clear_all(&mut self.nodes, sink);
        parallel.clear_all(&mut self.nodes, sink);

        if let Err(ref e) = result {
            log::debug!("insert aborted: {e}");
        }
        result
    }

    /// Walks `address` from the root, descending child links within each
    /// dimension and content links between dimensions. A per-dimension path
    /// shorter than the configured depth is a valid prefix query. Returns
    /// `None` on any miss (absent path, or an empty cube).
    pub fn query(&self, address: &Address) -> Option<&Summary<O>> {
        let root = self.root?;
        query::query(&self.nodes, &self.summaries, root, &self.levels, address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn objects(cube: &Nanocube<i32>, addr: &Address) -> Option<Vec<i32>> {
        cube.query(addr).map(|s| {
            let mut v: Vec<i32> = s.objects().iter().copied().collect();
            v.sort();
            v
        })
    }

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn scenario_1_single_insert() {
        init_logger();
        let mut cube = Nanocube::new(vec![2, 2]).unwrap();
        cube.insert(&address([&[0, 0], &[0, 0]]), 1).unwrap();

        assert_eq!(objects(&cube, &address([&[], &[]])), Some(vec![1]));
        assert_eq!(objects(&cube, &address([&[0], &[]])), Some(vec![1]));
        assert_eq!(objects(&cube, &address([&[1], &[]])), None);
        assert_eq!(objects(&cube, &address([&[0, 0], &[0, 1]])), None);
    }

    #[test]
    fn scenario_2_shared_dim0_prefix() {
        let mut cube = Nanocube::new(vec![2, 2]).unwrap();
        cube.insert(&address([&[0, 0], &[0, 0]]), 1).unwrap();
        cube.insert(&address([&[0, 0], &[0, 1]]), 2).unwrap();

        assert_eq!(objects(&cube, &address([&[0, 0], &[]])), Some(vec![1, 2]));
        assert_eq!(objects(&cube, &address([&[0, 0], &[0, 0]])), Some(vec![1]));
        assert_eq!(objects(&cube, &address([&[0, 0], &[0, 1]])), Some(vec![2]));
    }

    #[test]
    fn scenario_3_dim1_subtree_shared_across_siblings() {
        let mut cube = Nanocube::new(vec![2, 2]).unwrap();
        cube.insert(&address([&[0, 0], &[0, 0]]), 1).unwrap();
        cube.insert(&address([&[0, 0], &[0, 1]]), 2).unwrap();
        cube.insert(&address([&[0, 1], &[0, 0]]), 3).unwrap();

        assert_eq!(
            objects(&cube, &address([&[0], &[]])),
            Some(vec![1, 2, 3])
        );
        assert_eq!(objects(&cube, &address([&[0, 0], &[]])), Some(vec![1, 2]));
        assert_eq!(objects(&cube, &address([&[0, 1], &[]])), Some(vec![3]));
    }

    #[test]
    fn scenario_4_duplicate_insert_is_idempotent() {
        let mut cube = Nanocube::new(vec![2, 2]).unwrap();
        cube.insert(&address([&[0, 0], &[0, 0]]), 1).unwrap();
        cube.insert(&address([&[0, 0], &[0, 1]]), 2).unwrap();
        cube.insert(&address([&[0, 1], &[0, 0]]), 3).unwrap();
        cube.insert(&address([&[0, 0], &[0, 0]]), 1).unwrap();

        assert_eq!(
            objects(&cube, &address([&[0], &[]])),
            Some(vec![1, 2, 3])
        );
        assert_eq!(objects(&cube, &address([&[0, 0], &[0, 0]])), Some(vec![1]));
    }

    #[test]
    fn scenario_5_fresh_insert_spine_is_proper() {
        let mut cube = Nanocube::new(vec![2, 2]).unwrap();
        cube.insert(&address([&[1, 0], &[1, 1]]), 4).unwrap();

        assert_eq!(objects(&cube, &address([&[], &[]])), Some(vec![4]));
    }

    #[test]
    fn scenario_6_random_shared_prefixes_bound_node_count() {
        use rand::rngs::StdRng;
        use rand::seq::SliceRandom;
        use rand::SeedableRng;

        let addrs: [([u32; 2], [u32; 2]); 8] = [
            ([0, 0], [0, 0]),
            ([0, 0], [0, 1]),
            ([0, 1], [0, 0]),
            ([0, 1], [1, 0]),
            ([1, 0], [0, 0]),
            ([1, 0], [0, 1]),
            ([1, 1], [1, 1]),
            ([1, 1], [1, 0]),
        ];
        let mut order: Vec<usize> = (0..addrs.len()).collect();
        order.shuffle(&mut StdRng::seed_from_u64(7));

        let mut cube = Nanocube::new(vec![2, 2]).unwrap();
        for i in order {
            let (a, b) = &addrs[i];
            cube.insert(&address([a, b]), i as i32).unwrap();
        }

        assert!(cube.nodes.len() < 8 * 2 * 2);
        assert_eq!(objects(&cube, &address([&[], &[]])).unwrap().len(), 8);
    }

    #[test]
    fn rejects_wrong_dimension_count() {
        let mut cube = Nanocube::new(vec![2, 2]).unwrap();
        let err = cube.insert(&address([&[0, 0]]), 1).unwrap_err();
        assert_eq!(
            err,
            NanocubeError::MalformedAddress {
                found: 1,
                expected: 2
            }
        );
    }

    #[test]
    fn rejects_empty_levels() {
        assert!(matches!(
            Nanocube::<i32>::new(vec![]),
            Err(NanocubeError::InternalInvariantViolation(_))
        ));
    }

    #[test]
    fn query_on_empty_cube_is_none() {
        let cube = Nanocube::<i32>::new(vec![1, 1]).unwrap();
        assert_eq!(objects(&cube, &address([&[], &[]])), None);
    }
}
