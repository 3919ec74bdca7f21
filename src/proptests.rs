//! Property tests for invariants P1-P7 (data model section of the spec this
//! crate implements). Compiled only under `cfg(test)`; reaches directly into
//! `Nanocube`'s private fields since it's a descendant of the crate root
//! module, not a separate integration-test crate.

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;

use crate::arena::{Flag, LinkType};
use crate::{address, Nanocube, NodeId};

type Addr2 = ([u32; 2], [u32; 2]);

/// Objects are a deterministic function of the address rather than
/// insertion position, so two cubes built from the same multiset of
/// addresses in different orders (P6) end up with literally equal object
/// sets, not merely equal-sized ones.
fn encode(a: &[u32; 2], b: &[u32; 2]) -> i32 {
    (a[0] * 1000 + a[1] * 100 + b[0] * 10 + b[1]) as i32
}

fn build(addrs: &[Addr2]) -> Nanocube<i32> {
    let mut cube = Nanocube::new(vec![2, 2]).unwrap();
    for (a, b) in addrs {
        cube.insert(&address([a, b]), encode(a, b)).unwrap();
    }
    cube
}

/// P1, P2, P3: at most one PROPER incoming edge per node, sorted children,
/// single-child pass-through.
fn check_structural_invariants(cube: &Nanocube<i32>) {
    let mut proper_incoming: HashMap<usize, usize> = HashMap::new();

    for i in 0..cube.nodes.len() {
        let id = NodeId(i);
        let data = cube.nodes.get(id);

        for w in data.children.windows(2) {
            assert!(w[0].label < w[1].label, "P2 violated at node {i}");
        }
        for c in &data.children {
            if c.link_type == LinkType::Proper {
                *proper_incoming.entry(c.target.0).or_insert(0) += 1;
            }
        }
        if let Some(content) = data.content {
            if content.link_type == LinkType::Proper {
                if let Some(target) = content.target.as_node() {
                    *proper_incoming.entry(target.0).or_insert(0) += 1;
                }
            }
        }

        if data.children.len() == 1 {
            let only_child = data.children[0].target;
            let child_content = cube.nodes.get(only_child).content;
            assert_eq!(
                data.content.map(|c| c.target),
                child_content.map(|c| c.target),
                "P3 violated at node {i}: single-child content mismatch"
            );
            if let Some(c) = data.content {
                assert_eq!(c.link_type, LinkType::Shared, "P3 violated at node {i}");
            }
        }
    }

    for (node, count) in proper_incoming {
        assert!(
            count <= 1,
            "P1 violated: node {node} has {count} proper incoming edges"
        );
    }
}

/// P4: every node's flag is NONE once insertion has returned.
fn check_flags_clear(cube: &Nanocube<i32>) {
    for i in 0..cube.nodes.len() {
        assert_eq!(cube.nodes.flag(NodeId(i)), Flag::None, "P4 violated at node {i}");
    }
}

fn extends(full: &[u32], prefix: &[u32]) -> bool {
    full.len() >= prefix.len() && full[..prefix.len()] == *prefix
}

/// Brute-force reference for P5: the set of objects whose address extends
/// `q0`/`q1` in every dimension.
fn expected_objects_for(addrs: &[Addr2], q0: &[u32], q1: &[u32]) -> HashSet<i32> {
    addrs
        .iter()
        .filter(|(a, b)| extends(a, q0) && extends(b, q1))
        .map(|(a, b)| encode(a, b))
        .collect()
}

fn label_range() -> impl Strategy<Value = u32> {
    0u32..3
}

fn addr2_strategy() -> impl Strategy<Value = Addr2> {
    (
        [label_range(), label_range()],
        [label_range(), label_range()],
    )
}

proptest! {
    #[test]
    fn p1_p2_p3_p4_hold_after_any_insert_sequence(addrs in prop::collection::vec(addr2_strategy(), 0..10)) {
        let cube = build(&addrs);
        check_structural_invariants(&cube);
        check_flags_clear(&cube);
    }

    #[test]
    fn p5_aggregation_correctness(
        addrs in prop::collection::vec(addr2_strategy(), 1..10),
        q0_len in 0usize..2,
        q1_len in 0usize..2,
    ) {
        let cube = build(&addrs);
        let (q0_full, _) = &addrs[0];
        let q0 = &q0_full[..q0_len.min(q0_full.len())];
        let (_, q1_full) = &addrs[addrs.len() - 1];
        let q1 = &q1_full[..q1_len.min(q1_full.len())];

        let expected = expected_objects_for(&addrs, q0, q1);
        let got: HashSet<i32> = cube
            .query(&address([q0, q1]))
            .map(|s| s.objects().iter().copied().collect())
            .unwrap_or_default();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn p6_determinism_under_reordering(addrs in prop::collection::vec(addr2_strategy(), 1..8)) {
        let forward = build(&addrs);
        let mut shuffled = addrs.clone();
        shuffled.reverse();
        let backward = build(&shuffled);

        let full = address([&[] as &[u32], &[] as &[u32]]);
        let forward_set: HashSet<i32> = forward
            .query(&full)
            .map(|s| s.objects().iter().copied().collect())
            .unwrap_or_default();
        let backward_set: HashSet<i32> = backward
            .query(&full)
            .map(|s| s.objects().iter().copied().collect())
            .unwrap_or_default();
        prop_assert_eq!(forward_set, backward_set);
    }
}

#[test]
fn p7_structural_sharing_lower_bound() {
    let addrs: Vec<Addr2> = (0..8u32)
        .map(|i| ([0, i % 3], [i % 2, (i + 1) % 3]))
        .collect();
    let cube = build(&addrs);
    assert!(cube.nodes.len() < 8 * 2 * 2);
}

#[test]
fn query_is_read_only_and_repeatable() {
    let addrs = vec![([0, 0], [0, 0]), ([0, 0], [0, 1]), ([0, 1], [0, 0])];
    let cube = build(&addrs);
    let q = address([&[0u32], &[]]);
    let first: HashSet<i32> = cube.query(&q).unwrap().objects().iter().copied().collect();
    let second: HashSet<i32> = cube.query(&q).unwrap().objects().iter().copied().collect();
    assert_eq!(first, second);
}
