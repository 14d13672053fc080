//! Stop inference.
//!
//! A generation without a stop has to learn where it ends from what follows
//! it. At every boundary of a sequence, the generations that can end the
//! left side take the leading character of the literals that can start the
//! right side. The result is only computed here; [`crate::Ast::join`]
//! applies it once the whole sequence checks out.

use indexmap::IndexMap;

use super::frontier::{first_frontier, last_frontier};
use crate::ast::{Ast, GenStop, NodeId};
use crate::{Error, Result};

/// Stop chosen for one generation node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InferredStop {
    /// A single character.
    pub text: String,
    /// The literal the character was read from.
    pub source: NodeId,
}

/// Compute the stops `sequence` assigns to open generations, keyed by
/// generation node in discovery order.
pub(crate) fn infer_stops(
    ast: &Ast,
    sequence: &[NodeId],
) -> Result<IndexMap<NodeId, InferredStop>> {
    let mut assigned: IndexMap<NodeId, InferredStop> = IndexMap::new();

    for i in 0..sequence.len().saturating_sub(1) {
        let pending: Vec<NodeId> = last_frontier(ast, &sequence[i..=i])
            .into_iter()
            .filter(|&id| ast.node(id).as_gen().is_some_and(|g| g.stop.is_open()))
            .collect();
        let rest = &sequence[i + 1..];
        // A rest that may match nothing lets the generation run to end of
        // output.
        if pending.is_empty() || rest.iter().all(|&id| ast.node(id).is_nullable()) {
            continue;
        }

        let followers: Vec<NodeId> = first_frontier(ast, rest)
            .into_iter()
            .filter(|&id| ast.node(id).as_literal() != Some(""))
            .collect();
        let Some(stop) = leading_stop(ast, pending[0], &followers)? else {
            continue;
        };

        for gen_id in pending {
            if let Some(previous) = previous_stop(ast, &assigned, gen_id)
                && previous.text != stop.text
            {
                return Err(Error::ConflictingStop {
                    generation: ast.pp(gen_id),
                    previous: ast.pp(previous.source),
                    current: ast.pp(stop.source),
                });
            }
            assigned.entry(gen_id).or_insert_with(|| stop.clone());
        }
    }

    Ok(assigned)
}

/// The stop every follower agrees on, or `None` when nothing follows.
fn leading_stop(
    ast: &Ast,
    gen_id: NodeId,
    followers: &[NodeId],
) -> Result<Option<InferredStop>> {
    if let Some(&other) = followers
        .iter()
        .find(|&&id| ast.node(id).as_literal().is_none())
    {
        return Err(Error::CannotInferStop {
            generation: ast.pp(gen_id),
            follower: ast.pp(other),
        });
    }

    let mut leading = followers.iter().filter_map(|&id| {
        let text = ast.node(id).as_literal()?;
        text.chars().next().map(|c| (id, c))
    });
    let Some((source, first)) = leading.next() else {
        return Ok(None);
    };
    if let Some((other, _)) = leading.find(|&(_, c)| c != first) {
        return Err(Error::AmbiguousStop {
            generation: ast.pp(gen_id),
            first: ast.pp(source),
            second: ast.pp(other),
        });
    }

    Ok(Some(InferredStop {
        text: first.to_string(),
        source,
    }))
}

/// Stop already given to `gen_id`, by an earlier sequence or an earlier
/// boundary of this one.
fn previous_stop(
    ast: &Ast,
    assigned: &IndexMap<NodeId, InferredStop>,
    gen_id: NodeId,
) -> Option<InferredStop> {
    if let Some(stop) = assigned.get(&gen_id) {
        return Some(stop.clone());
    }
    match &ast.node(gen_id).as_gen()?.stop {
        GenStop::Inferred { text, source, .. } => Some(InferredStop {
            text: text.clone(),
            source: *source,
        }),
        GenStop::Unset | GenStop::Explicit(_) => None,
    }
}
