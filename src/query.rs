use std::hash::Hash;

use crate::arena::NodeId;
use crate::label::Address;
use crate::node::NodeArena;
use crate::summary::{Summary, SummaryArena};

/// Walks `address` from `root`: for each dimension, descends by child link
/// label-by-label (any miss ends the walk), then steps through the content
/// link into the next dimension's root. Returns `None` on any miss,
/// otherwise the content at the final position interpreted as a Summary.
pub(crate) fn query<'a, O>(
    nodes: &NodeArena,
    summaries: &'a SummaryArena<O>,
    root: NodeId,
    levels: &[usize],
    address: &Address,
) -> Option<&'a Summary<O>>
where
    O: Eq + Hash + Clone + Ord,
{
    let dimension = levels.len();
    let mut current = root;
    for d in 0..dimension {
        let path = address.dims.get(d)?;
        if path.len() > levels[d] {
            return None;
        }
        for &label in path {
            let (child, _) = nodes.get_child(current, label)?;
            current = child;
        }
        if d + 1 < dimension {
            let content = nodes.get_content(current)?;
            current = content.target.as_node()?;
        }
    }
    let content = nodes.get_content(current)?;
    let summary_id = content.target.as_summary()?;
    Some(summaries.get(summary_id))
}
