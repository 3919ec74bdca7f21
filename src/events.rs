//! Hooks for the visualization-oriented event log: an external collaborator
//! that is explicitly out of scope for this crate (see the data model's
//! overview). The core invokes these at well-defined points during
//! insertion but never inspects their return value or any state a sink
//! keeps; a caller that doesn't care passes [`NullSink`].

use crate::arena::{NodeId, SummaryId};
use crate::label::Label;

/// The finite color set the UI-only highlight events use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Clear,
    Main,
    Parallel,
    UpstreamCheck,
}

/// Whether a just-(re)written link is owning or shared, for event purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Proper,
    Shared,
}

impl From<crate::arena::LinkType> for LinkKind {
    fn from(lt: crate::arena::LinkType) -> Self {
        match lt {
            crate::arena::LinkType::Proper => LinkKind::Proper,
            crate::arena::LinkType::Shared => LinkKind::Shared,
        }
    }
}

/// A content pointer, for event purposes only (mirrors [`crate::arena::ContentRef`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentId {
    Node(NodeId),
    Summary(SummaryId),
}

/// The event-log collaborator's hook surface. All methods default to
/// no-ops so implementors only override what they actually consume.
pub trait Sink {
    fn new_node(&mut self, _node: NodeId, _dim: usize, _layer: usize) {}
    fn new_summary(&mut self, _summary: SummaryId, _dim: usize, _layer: usize) {}
    fn set_child_link(&mut self, _parent: NodeId, _child: NodeId, _label: Label, _kind: LinkKind) {}
    fn set_content_link(&mut self, _node: NodeId, _content: ContentId, _kind: LinkKind) {}
    fn store(&mut self, _summary: SummaryId) {}
    fn highlight_node(&mut self, _node: NodeId, _color: Color) {}
    fn highlight_child_link(&mut self, _node: NodeId, _label: Label, _color: Color) {}
    fn highlight_content_link(&mut self, _node: NodeId, _color: Color) {}
}

/// The default sink: observes nothing, costs nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl Sink for NullSink {}
