use crate::arena::{ChildLink, ContentLink, ContentRef, Flag, LinkType, NodeData, NodeId};
use crate::label::Label;

/// Index-based pool of [`NodeData`] slots, with a parallel flag table keyed
/// by the same index. Realizes the arena-of-indices strategy the data
/// model's Design Notes recommend in place of raw back-pointers.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<NodeData>,
    flags: Vec<Flag>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData::default());
        self.flags.push(Flag::None);
        id
    }

    pub fn get(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    pub fn flag(&self, id: NodeId) -> Flag {
        self.flags[id.0]
    }

    pub fn set_flag(&mut self, id: NodeId, flag: Flag) {
        self.flags[id.0] = flag;
    }

    /// Binary search over the sorted child vector (invariant I4).
    pub fn get_child(&self, id: NodeId, label: Label) -> Option<(NodeId, LinkType)> {
        let children = &self.nodes[id.0].children;
        children
            .binary_search_by_key(&label, |c| c.label)
            .ok()
            .map(|idx| (children[idx].target, children[idx].link_type))
    }

    /// Upsert a child link, keeping the child vector sorted by label. If
    /// `link_type` is PROPER, also sets the child's proper-parent
    /// back-pointer; this never touches the child's `owner` field.
    pub fn set_child_link(&mut self, id: NodeId, label: Label, target: NodeId, link_type: LinkType) {
        let children = &mut self.nodes[id.0].children;
        match children.binary_search_by_key(&label, |c| c.label) {
            Ok(idx) => {
                children[idx] = ChildLink {
                    label,
                    target,
                    link_type,
                };
            }
            Err(idx) => {
                children.insert(
                    idx,
                    ChildLink {
                        label,
                        target,
                        link_type,
                    },
                );
            }
        }
        if link_type == LinkType::Proper {
            self.nodes[target.0].proper_parent = Some((id, label));
        }
    }

    pub fn num_children(&self, id: NodeId) -> usize {
        self.nodes[id.0].children.len()
    }

    /// The sole child of a node known to have exactly one. Panics if called
    /// on a node with a different child count; callers are expected to have
    /// already checked `num_children(id) == 1`.
    pub fn only_child(&self, id: NodeId) -> NodeId {
        self.nodes[id.0].children[0].target
    }

    pub fn get_content(&self, id: NodeId) -> Option<ContentLink> {
        self.nodes[id.0].content
    }

    /// Replaces the node's sole content link. If PROPER, sets the target's
    /// owner back-pointer (the target may be a Node or a Summary).
    pub fn set_content_node(&mut self, id: NodeId, target: ContentRef, link_type: LinkType) {
        self.nodes[id.0].content = Some(ContentLink { target, link_type });
        if link_type == LinkType::Proper {
            if let ContentRef::Node(n) = target {
                self.nodes[n.0].owner = Some(id);
            }
        }
    }

    /// Duplicates `id`'s child vector and content pointer into a fresh node,
    /// forcing every outgoing link to SHARED and clearing both back-pointers
    /// (invariant I3). The caller is responsible for attaching the copy.
    pub fn shallow_copy(&mut self, id: NodeId) -> NodeId {
        let mut data = self.nodes[id.0].clone();
        for child in &mut data.children {
            child.link_type = LinkType::Shared;
        }
        if let Some(content) = &mut data.content {
            content.link_type = LinkType::Shared;
        }
        data.proper_parent = None;
        data.owner = None;

        let new_id = NodeId(self.nodes.len());
        self.nodes.push(data);
        self.flags.push(Flag::None);
        new_id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
