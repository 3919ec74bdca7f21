use crate::label::Label;

/// Index into the node arena. Nodes are never deleted (the core is
/// append-only, per the Lifecycle note in the data model), so a `NodeId`
/// stays valid for the lifetime of the owning [`crate::Nanocube`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Index into the summary arena. Same append-only lifetime guarantee as
/// [`NodeId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SummaryId(pub(crate) usize);

/// Whether an outgoing link owns its target (PROPER) or merely points at a
/// subtree owned elsewhere (SHARED). See invariants I1/I2 in the data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkType {
    Proper,
    Shared,
}

/// Transient per-node state written only during an in-progress insertion.
/// Outside of `Nanocube::insert`, every node's flag is `None` (invariant I6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flag {
    #[default]
    None,
    InMainPath,
    InParallelPath,
}

/// A single Node's outgoing link to one of its content targets: either
/// another Node (intermediate dimensions) or a Summary (last dimension).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRef {
    Node(NodeId),
    Summary(SummaryId),
}

impl ContentRef {
    pub fn as_node(self) -> Option<NodeId> {
        match self {
            ContentRef::Node(n) => Some(n),
            ContentRef::Summary(_) => None,
        }
    }

    pub fn as_summary(self) -> Option<SummaryId> {
        match self {
            ContentRef::Summary(s) => Some(s),
            ContentRef::Node(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentLink {
    pub target: ContentRef,
    pub link_type: LinkType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildLink {
    pub label: Label,
    pub target: NodeId,
    pub link_type: LinkType,
}

/// A DAG vertex. See the data model's Node entity for the full invariant
/// list (I1-I5).
#[derive(Debug, Clone, Default)]
pub struct NodeData {
    pub children: Vec<ChildLink>,
    pub content: Option<ContentLink>,
    pub proper_parent: Option<(NodeId, Label)>,
    pub owner: Option<NodeId>,
}
