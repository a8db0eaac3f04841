//! Level-by-level expansion over an arena, then a bottom-up fold into the tree.
//! Each round gathers the child requests of the whole frontier and assembles
//! them in parallel, so the critical path is the number of levels, not the fan-out.

use rayon::prelude::*;
use tracing::debug;

use crate::assemble::EntityBody;
use crate::data::snapshot::{EntityKind, MasterSnapshot};
use crate::error::EngineError;
use crate::hydrate::{assemble_body, edges, HydratedEntity, RelationLevel, ReverseContext, ReverseSlot};

/// Arena position of a node; `None` is the root.
type NodeRef = Option<usize>;

struct Node {
    body: EntityBody,
    ctx: ReverseContext,
    /// Set once the node passed the expansion guard.
    expanded: bool,
    children: Vec<(EntityKind, Vec<usize>)>,
}

impl Node {
    fn new(body: EntityBody, ctx: ReverseContext) -> Self {
        Self {
            body,
            ctx,
            expanded: false,
            children: Vec::new(),
        }
    }
}

struct Request {
    parent: NodeRef,
    edge: usize,
    kind: EntityKind,
    id: i64,
}

fn node_mut<'a>(root: &'a mut Node, arena: &'a mut [Node], at: NodeRef) -> &'a mut Node {
    match at {
        None => root,
        Some(index) => &mut arena[index],
    }
}

pub(super) fn expand(
    snapshot: &MasterSnapshot,
    body: EntityBody,
    ctx: ReverseContext,
) -> Result<HydratedEntity, EngineError> {
    let mut root = Node::new(body, ctx);
    let mut arena: Vec<Node> = Vec::new();
    let mut frontier: Vec<NodeRef> = vec![None];
    let mut rounds = 0usize;

    while !frontier.is_empty() {
        let mut requests = Vec::new();
        for &at in &frontier {
            let node = node_mut(&mut root, &mut arena, at);
            let kind = node.body.kind();
            if !node.ctx.expands(RelationLevel::of(kind)) {
                continue;
            }
            node.expanded = true;
            let target = node.body.id();
            for (edge_index, edge) in edges(kind).iter().enumerate() {
                let ids = edge.sources(snapshot, target);
                node.children.push((edge.child, Vec::with_capacity(ids.len())));
                requests.extend(ids.into_iter().map(|id| Request {
                    parent: at,
                    edge: edge_index,
                    kind: edge.child,
                    id,
                }));
            }
        }
        if requests.is_empty() {
            break;
        }

        let data = ctx.data;
        let assembled = requests
            .par_iter()
            .map(|request| {
                assemble_body(snapshot, request.kind, request.id, data)
                    .map_err(EngineError::into_missing_source)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut next = Vec::new();
        for (request, body) in requests.into_iter().zip(assembled) {
            let child_ctx = node_mut(&mut root, &mut arena, request.parent).ctx.child();
            let index = arena.len();
            arena.push(Node::new(body, child_ctx));
            node_mut(&mut root, &mut arena, request.parent).children[request.edge]
                .1
                .push(index);
            if child_ctx.reverse {
                next.push(Some(index));
            }
        }
        rounds += 1;
        frontier = next;
    }

    debug!(
        kind = %root.body.kind(),
        id = root.body.id(),
        rounds,
        entities = arena.len() + 1,
        "reverse tree expanded"
    );
    Ok(fold(root, arena))
}

/// Children always sit at higher arena positions than their parent, so a
/// reverse sweep builds every child before its parent needs it.
fn fold(root: Node, arena: Vec<Node>) -> HydratedEntity {
    let mut built: Vec<Option<HydratedEntity>> = Vec::with_capacity(arena.len());
    built.resize_with(arena.len(), || None);
    for (index, node) in arena.into_iter().enumerate().rev() {
        let entity = finish(node, &mut built);
        built[index] = Some(entity);
    }
    finish(root, &mut built)
}

fn finish(node: Node, built: &mut [Option<HydratedEntity>]) -> HydratedEntity {
    let reverse = node.expanded.then(|| {
        let mut slot = ReverseSlot::default();
        for (kind, indices) in node.children {
            let entities = indices
                .into_iter()
                .filter_map(|index| built[index].take())
                .collect();
            slot.set(kind, entities);
        }
        slot
    });
    HydratedEntity {
        body: node.body,
        reverse,
    }
}
