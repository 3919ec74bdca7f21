use crate::arena::{ContentRef, Flag, NodeId, SummaryId};
use crate::error::NanocubeError;
use crate::events::{Color, Sink};
use crate::label::Label;
use crate::node::NodeArena;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ThreadKind {
    Main,
    Parallel,
}

/// How a frame was reached, kept so `rewind` knows which link (if any) to
/// clear alongside the frame's own node highlight.
#[derive(Debug, Clone, Copy)]
enum FrameKind {
    Root,
    Child(Label),
    Content,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    node: NodeId,
    dim: usize,
    layer: usize,
    kind: FrameKind,
}

/// A single descent stack through the DAG: the address currently being
/// inserted (a "main thread") or a sibling content subgraph that may supply
/// switch-equivalent subtrees (a "parallel thread").
#[derive(Debug)]
struct Thread {
    kind: ThreadKind,
    stack: Vec<Frame>,
}

impl Thread {
    fn new(kind: ThreadKind) -> Self {
        Self {
            kind,
            stack: Vec::new(),
        }
    }

    fn flag_for_kind(&self) -> Flag {
        match self.kind {
            ThreadKind::Main => Flag::InMainPath,
            ThreadKind::Parallel => Flag::InParallelPath,
        }
    }

    fn color(&self) -> Color {
        match self.kind {
            ThreadKind::Main => Color::Main,
            ThreadKind::Parallel => Color::Parallel,
        }
    }

    fn start(&mut self, nodes: &mut NodeArena, sink: &mut dyn Sink, root: NodeId, dim: usize, layer: usize) {
        debug_assert!(self.stack.is_empty());
        self.stack.push(Frame {
            node: root,
            dim,
            layer,
            kind: FrameKind::Root,
        });
        nodes.set_flag(root, self.flag_for_kind());
        sink.highlight_node(root, self.color());
    }

    fn advance_child(
        &mut self,
        nodes: &mut NodeArena,
        sink: &mut dyn Sink,
        label: Label,
    ) -> Result<(), NanocubeError> {
        let top = self.top();
        let (child, _) = nodes.get_child(top, label).ok_or(
            NanocubeError::InternalInvariantViolation("advanceChild: label has no child"),
        )?;
        let dim = self.current_dim();
        let layer = self.current_layer();
        let color = self.color();
        sink.highlight_child_link(top, label, color);
        sink.highlight_node(child, color);
        self.stack.push(Frame {
            node: child,
            dim,
            layer: layer + 1,
            kind: FrameKind::Child(label),
        });
        nodes.set_flag(child, self.flag_for_kind());
        Ok(())
    }

    fn advance_content(
        &mut self,
        nodes: &mut NodeArena,
        sink: &mut dyn Sink,
    ) -> Result<(), NanocubeError> {
        let top = self.top();
        let content = nodes.get_content(top).ok_or(
            NanocubeError::InternalInvariantViolation("advanceContent: node has no content"),
        )?;
        let next = content.target.as_node().ok_or(
            NanocubeError::InternalInvariantViolation(
                "advanceContent: content is a Summary, not a Node",
            ),
        )?;
        let dim = self.current_dim();
        let color = self.color();
        sink.highlight_content_link(top, color);
        sink.highlight_node(next, color);
        self.stack.push(Frame {
            node: next,
            dim: dim + 1,
            layer: 0,
            kind: FrameKind::Content,
        });
        nodes.set_flag(next, self.flag_for_kind());
        Ok(())
    }

    fn rewind(&mut self, nodes: &mut NodeArena, sink: &mut dyn Sink) {
        if let Some(top) = self.stack.last() {
            nodes.set_flag(top.node, Flag::None);
        }
        if let Some(frame) = self.stack.pop() {
            sink.highlight_node(frame.node, Color::Clear);
            if let Some(parent) = self.stack.last() {
                let parent_node = parent.node;
                match frame.kind {
                    FrameKind::Content => sink.highlight_content_link(parent_node, Color::Clear),
                    FrameKind::Child(label) => {
                        sink.highlight_child_link(parent_node, label, Color::Clear)
                    }
                    FrameKind::Root => {}
                }
            }
        }
    }

    /// Pops every remaining frame, clearing each one's flag and highlight.
    /// Used to re-establish I6 regardless of how many frames are still on
    /// the stack, either because a thread is being discarded mid-recursion
    /// or because an error is unwinding out of an in-progress insertion.
    fn clear_all(&mut self, nodes: &mut NodeArena, sink: &mut dyn Sink) {
        while !self.stack.is_empty() {
            self.rewind(nodes, sink);
        }
    }

    fn top(&self) -> NodeId {
        self.stack.last().expect("thread stack is empty").node
    }

    fn current_dim(&self) -> usize {
        self.stack.last().expect("thread stack is empty").dim
    }

    fn current_layer(&self) -> usize {
        self.stack.last().expect("thread stack is empty").layer
    }
}

/// The descent stack of the address currently being inserted.
#[derive(Debug)]
pub(crate) struct MainThread(Thread);

impl MainThread {
    pub fn new() -> Self {
        Self(Thread::new(ThreadKind::Main))
    }

    pub fn start(
        &mut self,
        nodes: &mut NodeArena,
        sink: &mut dyn Sink,
        root: NodeId,
        dim: usize,
        layer: usize,
    ) {
        self.0.start(nodes, sink, root, dim, layer);
    }

    pub fn advance_child(
        &mut self,
        nodes: &mut NodeArena,
        sink: &mut dyn Sink,
        label: Label,
    ) -> Result<(), NanocubeError> {
        self.0.advance_child(nodes, sink, label)
    }

    pub fn advance_content(
        &mut self,
        nodes: &mut NodeArena,
        sink: &mut dyn Sink,
    ) -> Result<(), NanocubeError> {
        self.0.advance_content(nodes, sink)
    }

    pub fn rewind(&mut self, nodes: &mut NodeArena, sink: &mut dyn Sink) {
        self.0.rewind(nodes, sink);
    }

    /// Clears every frame still on the stack. Called once after the
    /// top-level insertion returns (Ok or Err) to guarantee I6.
    pub fn clear_all(&mut self, nodes: &mut NodeArena, sink: &mut dyn Sink) {
        self.0.clear_all(nodes, sink);
    }

    pub fn top(&self) -> NodeId {
        self.0.top()
    }

    pub fn current_dim(&self) -> usize {
        self.0.current_dim()
    }

    pub fn current_layer(&self) -> usize {
        self.0.current_layer()
    }
}

/// An ordered collection of parallel threads, advanced in lockstep, used
/// during insertion to discover switch-equivalent subtrees.
#[derive(Debug, Default)]
pub(crate) struct ParallelThreadSet {
    threads: Vec<Thread>,
}

impl ParallelThreadSet {
    pub fn new() -> Self {
        Self {
            threads: Vec::new(),
        }
    }

    /// Starts a new parallel thread at a coarser-dimension sibling
    /// discovered during insertion.
    pub fn push(
        &mut self,
        nodes: &mut NodeArena,
        sink: &mut dyn Sink,
        root: NodeId,
        dim: usize,
        layer: usize,
    ) {
        let mut t = Thread::new(ThreadKind::Parallel);
        t.start(nodes, sink, root, dim, layer);
        self.threads.push(t);
    }

    pub fn advance_child(
        &mut self,
        nodes: &mut NodeArena,
        sink: &mut dyn Sink,
        label: Label,
    ) -> Result<(), NanocubeError> {
        for t in &mut self.threads {
            t.advance_child(nodes, sink, label)?;
        }
        Ok(())
    }

    pub fn advance_content(
        &mut self,
        nodes: &mut NodeArena,
        sink: &mut dyn Sink,
    ) -> Result<(), NanocubeError> {
        for t in &mut self.threads {
            t.advance_content(nodes, sink)?;
        }
        Ok(())
    }

    pub fn rewind(&mut self, nodes: &mut NodeArena, sink: &mut dyn Sink) {
        for t in &mut self.threads {
            t.rewind(nodes, sink);
        }
    }

    /// Fully discards the most recently pushed thread, clearing every frame
    /// it still carries. Used to undo a `push` made earlier in the same
    /// recursion frame, after that frame's own `advanceContent` has already
    /// advanced the pushed thread along with the rest of the set.
    pub fn rewind_last_and_pop(&mut self, nodes: &mut NodeArena, sink: &mut dyn Sink) {
        if let Some(mut t) = self.threads.pop() {
            t.clear_all(nodes, sink);
        }
    }

    /// Clears every frame of every thread still in the set. Used alongside
    /// [`MainThread::clear_all`] to guarantee I6 when an insertion unwinds,
    /// whatever depth the recursion happened to reach.
    pub fn clear_all(&mut self, nodes: &mut NodeArena, sink: &mut dyn Sink) {
        for t in &mut self.threads {
            t.clear_all(nodes, sink);
        }
    }

    /// First thread whose top has a PROPER child under `label`.
    pub fn get_first_proper_child(&self, nodes: &NodeArena, label: Label) -> Option<NodeId> {
        for t in &self.threads {
            if let Some((child, crate::arena::LinkType::Proper)) = nodes.get_child(t.top(), label)
            {
                return Some(child);
            }
        }
        None
    }

    /// First thread's top content, interpreted as a Summary.
    pub fn get_first_summary(&self, nodes: &NodeArena) -> Option<SummaryId> {
        let t = self.threads.first()?;
        nodes.get_content(t.top())?.target.as_summary()
    }

    /// First thread's top content, whatever it is.
    pub fn get_any_content(&self, nodes: &NodeArena) -> Option<ContentRef> {
        let t = self.threads.first()?;
        nodes.get_content(t.top()).map(|c| c.target)
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }
}
