//! Regex table for one grammar.
//!
//! Serializes regex nodes post-order into wire entries and hash-conses them:
//! structurally identical subtrees share one id, whichever nodes they were
//! built from.

use std::collections::HashMap;

use gramkit_core::RegexJson;

use crate::ast::{Ast, RegexId};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy)]
enum Slot {
    /// Children are being serialized; meeting this node again is a cycle.
    InProgress,
    Done(u32),
}

/// Builds the `rx_nodes` list of one grammar.
#[derive(Debug, Default)]
pub struct RegexTable {
    /// Wire id of every regex node already visited.
    slots: HashMap<RegexId, Slot>,
    /// Reverse lookup from payload to wire id.
    lookup: HashMap<RegexJson, u32>,
    /// Ordered entries for the artifact.
    entries: Vec<RegexJson>,
}

impl RegexTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize `root` and everything below it, returning its wire id.
    ///
    /// Works with an explicit stack, so deep regexes cannot overflow the
    /// call stack, and reports a cycle instead of looping.
    pub fn serialize(&mut self, ast: &Ast, root: RegexId) -> Result<u32> {
        let mut stack = vec![(root, false)];

        while let Some((id, expanded)) = stack.pop() {
            let node = ast.ensure_regex("regex", id)?;

            if expanded {
                let children = node
                    .children()
                    .iter()
                    .map(|child| match self.slots.get(child) {
                        Some(Slot::Done(wire)) => Ok(*wire),
                        _ => Err(Error::Unreachable("regex child serialized out of order")),
                    })
                    .collect::<Result<Vec<_>>>()?;
                let wire = self.intern(node.to_wire(&children));
                self.slots.insert(id, Slot::Done(wire));
                continue;
            }

            match self.slots.get(&id) {
                Some(Slot::Done(_)) => continue,
                Some(Slot::InProgress) => return Err(Error::CircularRegex(ast.pp_regex(id))),
                None => {}
            }
            self.slots.insert(id, Slot::InProgress);
            stack.push((id, true));
            for &child in node.children().iter().rev() {
                match self.slots.get(&child) {
                    Some(Slot::Done(_)) => {}
                    Some(Slot::InProgress) => {
                        return Err(Error::CircularRegex(ast.pp_regex(child)));
                    }
                    None => stack.push((child, false)),
                }
            }
        }

        match self.slots.get(&root) {
            Some(Slot::Done(wire)) => Ok(*wire),
            _ => Err(Error::Unreachable("regex root left unserialized")),
        }
    }

    /// Add an entry, or return the id of an identical one.
    pub fn intern(&mut self, entry: RegexJson) -> u32 {
        if let Some(&id) = self.lookup.get(&entry) {
            tracing::trace!(id, "regex hash-cons hit");
            return id;
        }
        let id = self.entries.len() as u32;
        self.lookup.insert(entry.clone(), id);
        self.entries.push(entry);
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RegexJson] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<RegexJson> {
        self.entries
    }
}
