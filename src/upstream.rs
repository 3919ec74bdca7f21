use crate::arena::{Flag, NodeId};
use crate::events::{Color, Sink};
use crate::label::Label;
use crate::node::NodeArena;

/// Follows a node's single PROPER incoming edge one step: its proper-parent
/// child link if it has one, else its owner content link, else the chain
/// has ended.
pub(crate) fn upstream_next(nodes: &NodeArena, id: NodeId) -> Option<NodeId> {
    let data = nodes.get(id);
    match data.proper_parent {
        Some((parent, _)) => Some(parent),
        None => data.owner,
    }
}

/// What the PROPER-ancestor chain starting at (but not including) a given
/// node proves about switch-equivalence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UpstreamProof {
    /// A node flagged IN_PARALLEL_PATH was reached: the subtree predates
    /// this insertion as part of the parallel frontier's coverage.
    Parallel,
    /// A node flagged IN_MAIN_PATH was reached first: the subtree is only
    /// reachable via the branch currently being inserted.
    Main,
    /// The chain ended (or was empty) without meeting a flagged node: no
    /// proof either way.
    NoProof,
}

#[derive(Debug, Clone, Copy)]
enum Via {
    Root,
    Child(Label),
    Content,
}

/// Transient walker that highlights every node and link it visits with
/// `Color::UpstreamCheck`, mirroring the reference's scoped upstream-walk
/// helper, and clears every highlight it made once the caller is done with
/// it (there's no destructor access to a `sink` here, so the clearing is
/// done explicitly via `clear_all` rather than on drop).
struct UpstreamWalker {
    stack: Vec<(NodeId, Via)>,
}

impl UpstreamWalker {
    fn new(sink: &mut dyn Sink, start: NodeId) -> Self {
        sink.highlight_node(start, Color::UpstreamCheck);
        Self {
            stack: vec![(start, Via::Root)],
        }
    }

    fn top(&self) -> NodeId {
        self.stack.last().expect("upstream walker stack is empty").0
    }

    /// Looks at the next node upstream without visiting it.
    fn peek_next(&self, nodes: &NodeArena) -> Option<NodeId> {
        upstream_next(nodes, self.top())
    }

    /// Visits the next node upstream, highlighting it and the link used to
    /// reach it.
    fn advance(&mut self, nodes: &NodeArena, sink: &mut dyn Sink) {
        let current = self.top();
        let data = nodes.get(current);
        let (next, via) = match data.proper_parent {
            Some((parent, label)) => (parent, Via::Child(label)),
            None => (
                data.owner
                    .expect("advance: peek_next confirmed a next node exists"),
                Via::Content,
            ),
        };
        match via {
            Via::Content => sink.highlight_content_link(next, Color::UpstreamCheck),
            Via::Child(label) => sink.highlight_child_link(next, label, Color::UpstreamCheck),
            Via::Root => unreachable!("advance never produces a Root frame"),
        }
        sink.highlight_node(next, Color::UpstreamCheck);
        self.stack.push((next, via));
    }

    fn clear_all(&mut self, sink: &mut dyn Sink) {
        while let Some((node, via)) = self.stack.pop() {
            sink.highlight_node(node, Color::Clear);
            match via {
                Via::Content => sink.highlight_content_link(node, Color::Clear),
                Via::Child(label) => sink.highlight_child_link(node, label, Color::Clear),
                Via::Root => {}
            }
        }
    }
}

/// Walks the PROPER-ancestor chain ahead of `walker`'s current position,
/// stopping at the first flagged node.
fn upstream_proof(nodes: &NodeArena, sink: &mut dyn Sink, walker: &mut UpstreamWalker) -> UpstreamProof {
    loop {
        match walker.peek_next(nodes) {
            None => return UpstreamProof::NoProof,
            Some(next) => match nodes.flag(next) {
                Flag::InParallelPath => return UpstreamProof::Parallel,
                Flag::InMainPath => return UpstreamProof::Main,
                Flag::None => walker.advance(nodes, sink),
            },
        }
    }
}

/// Is the subtree rooted at `target` switch-equivalent to a subtree
/// reachable from the current parallel frontier? Proof device used by both
/// Phase 1 (child-link reconciliation) and the last-dimension content check.
///
/// `target`'s own flag is checked first: it may already be flagged (it can
/// be an ancestor frame still on `main`/`parallel`'s stack from a shallower
/// dimension, which is possible at the last-dimension call site though never
/// at the Phase 1 one, where the child being tested is always unflagged) and
/// if so that settles the question directly, exactly as the original's
/// last-dimension check does. Otherwise `target`'s PROPER-ancestor chain is
/// walked, reporting whether a parallel-flagged node is met before a
/// main-flagged one.
pub(crate) fn is_switchable(nodes: &NodeArena, sink: &mut dyn Sink, target: NodeId) -> bool {
    match nodes.flag(target) {
        Flag::InParallelPath => return true,
        Flag::InMainPath => return false,
        Flag::None => {}
    }
    let mut walker = UpstreamWalker::new(sink, target);
    let result = upstream_proof(nodes, sink, &mut walker);
    walker.clear_all(sink);
    result == UpstreamProof::Parallel
}
