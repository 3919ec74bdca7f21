use std::hash::Hash;

use crate::arena::{ContentRef, LinkType};
use crate::error::NanocubeError;
use crate::events::{ContentId, LinkKind, Sink};
use crate::label::{Address, Label};
use crate::node::NodeArena;
use crate::summary::SummaryArena;
use crate::thread::{MainThread, ParallelThreadSet};
use crate::upstream::is_switchable;

/// Everything the recursive insertion procedure needs, threaded through by
/// mutable reference so the recursion stays a plain call stack bounded by
/// the cube's dimensionality.
pub(crate) struct InsertCtx<'a, O> {
    pub nodes: &'a mut NodeArena,
    pub summaries: &'a mut SummaryArena<O>,
    pub address: &'a Address,
    pub object: &'a O,
    pub sink: &'a mut dyn Sink,
}

fn to_content_id(target: ContentRef) -> ContentId {
    match target {
        ContentRef::Node(n) => ContentId::Node(n),
        ContentRef::Summary(s) => ContentId::Summary(s),
    }
}

/// The recursive per-dimension insertion procedure. Descends dimension
/// `main.currentDim()` along its address path (Phase 1, reconciling
/// sharing), then unwinds back up that path fixing up content links
/// (Phase 2), recursing into the next dimension from within Phase 2 when
/// this isn't the last one.
pub(crate) fn insert_at<O>(
    ctx: &mut InsertCtx<'_, O>,
    main: &mut MainThread,
    parallel: &mut ParallelThreadSet,
) -> Result<(), NanocubeError>
where
    O: Eq + Hash + Clone + Ord,
{
    let d = main.current_dim();
    let last_dim = d == ctx.address.dimension() - 1;
    let path: &[Label] = &ctx.address.dims[d];

    let mut i = 0usize;
    while i < path.len() {
        let parent = main.top();
        let label = path[i];
        let existing = ctx.nodes.get_child(parent, label);
        let mut halted = false;

        match existing {
            Some((child, LinkType::Shared)) => {
                if is_switchable(ctx.nodes, ctx.sink, child) {
                    let new_child = parallel
                        .get_first_proper_child(ctx.nodes, label)
                        .ok_or(NanocubeError::InternalInvariantViolation(
                            "phase1 A-switch: switchable child has no parallel proper sibling",
                        ))?;
                    if new_child != child {
                        ctx.nodes
                            .set_child_link(parent, label, new_child, LinkType::Shared);
                        ctx.sink
                            .set_child_link(parent, new_child, label, LinkKind::Shared);
                    }
                    halted = true;
                } else {
                    let layer = main.current_layer() + 1;
                    let copy = ctx.nodes.shallow_copy(child);
                    ctx.sink.new_node(copy, d, layer);
                    ctx.nodes
                        .set_child_link(parent, label, copy, LinkType::Proper);
                    ctx.sink.set_child_link(parent, copy, label, LinkKind::Proper);
                }
            }
            Some((_, LinkType::Proper)) => {}
            None => {
                if let Some(sibling) = parallel.get_first_proper_child(ctx.nodes, label) {
                    ctx.nodes
                        .set_child_link(parent, label, sibling, LinkType::Shared);
                    ctx.sink
                        .set_child_link(parent, sibling, label, LinkKind::Shared);
                    halted = true;
                } else {
                    let layer = main.current_layer() + 1;
                    let new_node = ctx.nodes.alloc();
                    ctx.sink.new_node(new_node, d, layer);
                    ctx.nodes
                        .set_child_link(parent, label, new_node, LinkType::Proper);
                    ctx.sink
                        .set_child_link(parent, new_node, label, LinkKind::Proper);
                }
            }
        }

        if halted {
            break;
        }
        main.advance_child(ctx.nodes, ctx.sink, label)?;
        parallel.advance_child(ctx.nodes, ctx.sink, label)?;
        i += 1;
    }

    // Phase 2: unwind from depth i back to 0, fixing up content links.
    loop {
        let parent = main.top();

        if ctx.nodes.num_children(parent) == 1 {
            let child = ctx.nodes.only_child(parent);
            if let Some(content) = ctx.nodes.get_content(child) {
                ctx.nodes
                    .set_content_node(parent, content.target, LinkType::Shared);
                ctx.sink.set_content_link(
                    parent,
                    to_content_id(content.target),
                    LinkKind::Shared,
                );
            }
        } else if !last_dim {
            match ctx.nodes.get_content(parent) {
                None => {
                    let new_node = ctx.nodes.alloc();
                    ctx.sink.new_node(new_node, d + 1, 0);
                    ctx.nodes
                        .set_content_node(parent, ContentRef::Node(new_node), LinkType::Proper);
                    ctx.sink.set_content_link(
                        parent,
                        ContentId::Node(new_node),
                        LinkKind::Proper,
                    );
                }
                Some(c) if c.link_type == LinkType::Shared => {
                    let old = c.target.as_node().ok_or(
                        NanocubeError::InternalInvariantViolation(
                            "phase2 intermediate: content target is a summary, not a node",
                        ),
                    )?;
                    let copy = ctx.nodes.shallow_copy(old);
                    ctx.sink.new_node(copy, d + 1, 0);
                    ctx.nodes
                        .set_content_node(parent, ContentRef::Node(copy), LinkType::Proper);
                    ctx.sink
                        .set_content_link(parent, ContentId::Node(copy), LinkKind::Proper);
                }
                Some(_) => {}
            }

            let mut pushed_parallel = false;
            if i < path.len() && ctx.nodes.num_children(parent) > 0 {
                if let Some((sibling, _)) = ctx.nodes.get_child(parent, path[i]) {
                    parallel.push(ctx.nodes, ctx.sink, sibling, d, main.current_layer() + 1);
                    pushed_parallel = true;
                }
            }

            main.advance_content(ctx.nodes, ctx.sink)?;
            parallel.advance_content(ctx.nodes, ctx.sink)?;
            insert_at(ctx, main, parallel)?;
            main.rewind(ctx.nodes, ctx.sink);
            parallel.rewind(ctx.nodes, ctx.sink);
            if pushed_parallel {
                parallel.rewind_last_and_pop(ctx.nodes, ctx.sink);
            }
        } else {
            match ctx.nodes.get_content(parent) {
                None => {
                    if let Some(existing) = parallel.get_first_summary(ctx.nodes) {
                        ctx.nodes.set_content_node(
                            parent,
                            ContentRef::Summary(existing),
                            LinkType::Shared,
                        );
                        ctx.sink.set_content_link(
                            parent,
                            ContentId::Summary(existing),
                            LinkKind::Shared,
                        );
                    } else {
                        let s = ctx.summaries.alloc();
                        ctx.summaries.get_mut(s).insert(ctx.object.clone());
                        ctx.summaries.set_owner(s, parent);
                        ctx.nodes
                            .set_content_node(parent, ContentRef::Summary(s), LinkType::Proper);
                        ctx.sink.new_summary(s, d + 1, 0);
                        ctx.sink.set_content_link(
                            parent,
                            ContentId::Summary(s),
                            LinkKind::Proper,
                        );
                        ctx.sink.store(s);
                    }
                }
                Some(c) if c.link_type == LinkType::Shared => {
                    let cur = c.target.as_summary().ok_or(
                        NanocubeError::InternalInvariantViolation(
                            "phase2 last-dim: content target is a node, not a summary",
                        ),
                    )?;
                    let owner = ctx.summaries.get(cur).owner.ok_or(
                        NanocubeError::InternalInvariantViolation(
                            "phase2 last-dim: shared summary has no owner",
                        ),
                    )?;
                    if is_switchable(ctx.nodes, ctx.sink, owner) {
                        let new_summary = parallel.get_first_summary(ctx.nodes).ok_or(
                            NanocubeError::InternalInvariantViolation(
                                "phase2 last-dim: switchable summary has no parallel summary",
                            ),
                        )?;
                        if ctx.summaries.get(new_summary).owner.is_some() {
                            return Err(NanocubeError::InternalInvariantViolation(
                                "phase2 last-dim: switch target summary already has an owner",
                            ));
                        }
                        ctx.summaries.set_owner(new_summary, parent);
                        ctx.nodes.set_content_node(
                            parent,
                            ContentRef::Summary(new_summary),
                            LinkType::Proper,
                        );
                        ctx.sink.set_content_link(
                            parent,
                            ContentId::Summary(new_summary),
                            LinkKind::Proper,
                        );
                    } else {
                        let copy = ctx.summaries.shallow_copy(cur);
                        ctx.summaries.get_mut(copy).insert(ctx.object.clone());
                        ctx.summaries.set_owner(copy, parent);
                        ctx.nodes.set_content_node(
                            parent,
                            ContentRef::Summary(copy),
                            LinkType::Proper,
                        );
                        ctx.sink.new_summary(copy, d + 1, 0);
                        ctx.sink.set_content_link(
                            parent,
                            ContentId::Summary(copy),
                            LinkKind::Proper,
                        );
                        ctx.sink.store(copy);
                    }
                }
                Some(c) => {
                    let s = c.target.as_summary().ok_or(
                        NanocubeError::InternalInvariantViolation(
                            "phase2 last-dim: proper content target is a node, not a summary",
                        ),
                    )?;
                    ctx.summaries.get_mut(s).insert(ctx.object.clone());
                    ctx.sink.store(s);
                }
            }
        }

        if i == 0 {
            break;
        }
        main.rewind(ctx.nodes, ctx.sink);
        parallel.rewind(ctx.nodes, ctx.sink);
        i -= 1;
    }

    Ok(())
}
