//! Regex nodes and their constructors.
//!
//! Regexes are never interpreted here. `Regex` carries pattern source that
//! the engine validates and compiles; the other variants are structure the
//! engine combines.

use gramkit_core::RegexJson;

use super::{Ast, RegexId};
use crate::emit::RegexTable;
use crate::{Error, Result};

/// Regex AST node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegexNode {
    Literal(String),
    ByteLiteral(Vec<u8>),
    Byte(u8),
    /// 256-bit set, eight words, bit `b % 32` of word `b / 32`.
    ByteSet(Vec<u32>),
    /// Pattern source.
    Regex(String),
    Or(Vec<RegexId>),
    And(Vec<RegexId>),
    Concat(Vec<RegexId>),
    Not(RegexId),
    LookAhead(RegexId),
    Repeat {
        inner: RegexId,
        min: u32,
        max: Option<u32>,
    },
    EmptyString,
    NoMatch,
}

impl RegexNode {
    /// Immediate children, in payload order.
    pub fn children(&self) -> &[RegexId] {
        match self {
            RegexNode::Or(c) | RegexNode::And(c) | RegexNode::Concat(c) => c,
            RegexNode::Not(c) | RegexNode::LookAhead(c) | RegexNode::Repeat { inner: c, .. } => {
                std::slice::from_ref(c)
            }
            RegexNode::Literal(_)
            | RegexNode::ByteLiteral(_)
            | RegexNode::Byte(_)
            | RegexNode::ByteSet(_)
            | RegexNode::Regex(_)
            | RegexNode::EmptyString
            | RegexNode::NoMatch => &[],
        }
    }

    /// Wire payload, given the serialized ids of [`Self::children`].
    pub(crate) fn to_wire(&self, children: &[u32]) -> RegexJson {
        match self {
            RegexNode::Literal(s) => RegexJson::Literal(s.clone()),
            RegexNode::ByteLiteral(b) => RegexJson::ByteLiteral(b.clone()),
            RegexNode::Byte(b) => RegexJson::Byte(*b),
            RegexNode::ByteSet(words) => RegexJson::ByteSet(words.clone()),
            RegexNode::Regex(src) => RegexJson::Regex(src.clone()),
            RegexNode::Or(_) => RegexJson::Or(children.to_vec()),
            RegexNode::And(_) => RegexJson::And(children.to_vec()),
            RegexNode::Concat(_) => RegexJson::Concat(children.to_vec()),
            RegexNode::Not(_) => RegexJson::Not(children[0]),
            RegexNode::LookAhead(_) => RegexJson::LookAhead(children[0]),
            RegexNode::Repeat { min, max, .. } => RegexJson::Repeat(children[0], *min, *max),
            RegexNode::EmptyString => RegexJson::EmptyString {},
            RegexNode::NoMatch => RegexJson::NoMatch {},
        }
    }
}

/// Either an already built regex or pattern source to wrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegexDef {
    Node(RegexId),
    Source(String),
}

impl From<RegexId> for RegexDef {
    fn from(id: RegexId) -> Self {
        RegexDef::Node(id)
    }
}

impl From<&str> for RegexDef {
    fn from(source: &str) -> Self {
        RegexDef::Source(source.to_string())
    }
}

impl From<String> for RegexDef {
    fn from(source: String) -> Self {
        RegexDef::Source(source)
    }
}

impl Ast {
    /// Regex matching exactly `text`.
    pub fn regex_literal(&mut self, text: impl Into<String>) -> RegexId {
        self.push_regex(RegexNode::Literal(text.into()))
    }

    /// Regex from pattern source.
    pub fn regex(&mut self, source: impl Into<String>) -> RegexId {
        self.push_regex(RegexNode::Regex(source.into()))
    }

    /// Normalize a built regex or pattern source into a regex handle.
    pub fn rx(&mut self, def: impl Into<RegexDef>) -> RegexId {
        match def.into() {
            RegexDef::Node(id) => id,
            RegexDef::Source(source) => self.regex(source),
        }
    }

    pub fn no_match(&mut self) -> RegexId {
        self.push_regex(RegexNode::NoMatch)
    }

    pub fn empty_string(&mut self) -> RegexId {
        self.push_regex(RegexNode::EmptyString)
    }

    pub fn byte(&mut self, byte: u8) -> RegexId {
        self.push_regex(RegexNode::Byte(byte))
    }

    pub fn byte_literal(&mut self, bytes: impl Into<Vec<u8>>) -> RegexId {
        self.push_regex(RegexNode::ByteLiteral(bytes.into()))
    }

    /// Regex matching any one of `bytes`.
    pub fn byte_set(&mut self, bytes: impl IntoIterator<Item = u8>) -> RegexId {
        let mut words = vec![0u32; 8];
        for b in bytes {
            words[(b / 32) as usize] |= 1 << (b % 32);
        }
        self.push_regex(RegexNode::ByteSet(words))
    }

    /// Union. An empty union matches nothing.
    pub fn or(&mut self, alts: impl IntoIterator<Item = RegexId>) -> Result<RegexId> {
        let alts = self.regex_children("or", alts)?;
        Ok(self.push_regex(RegexNode::Or(alts)))
    }

    /// Intersection.
    pub fn and(&mut self, parts: impl IntoIterator<Item = RegexId>) -> Result<RegexId> {
        let parts = self.regex_children("and", parts)?;
        Ok(self.push_regex(RegexNode::And(parts)))
    }

    /// Concatenation. An empty concatenation matches the empty string.
    pub fn concat(&mut self, parts: impl IntoIterator<Item = RegexId>) -> Result<RegexId> {
        let parts = self.regex_children("concat", parts)?;
        Ok(self.push_regex(RegexNode::Concat(parts)))
    }

    pub fn not(&mut self, inner: RegexId) -> Result<RegexId> {
        self.ensure_regex("not", inner)?;
        Ok(self.push_regex(RegexNode::Not(inner)))
    }

    pub fn lookahead(&mut self, inner: RegexId) -> Result<RegexId> {
        self.ensure_regex("lookahead", inner)?;
        Ok(self.push_regex(RegexNode::LookAhead(inner)))
    }

    /// `inner` repeated `min..=max` times; no `max` means unbounded.
    pub fn repeat(&mut self, inner: RegexId, min: u32, max: Option<u32>) -> Result<RegexId> {
        self.ensure_regex("repeat", inner)?;
        if let Some(max) = max.filter(|&max| max < min) {
            return Err(Error::Malformed {
                what: "repeat",
                reason: format!("max {max} is below min {min}"),
            });
        }
        Ok(self.push_regex(RegexNode::Repeat { inner, min, max }))
    }

    /// Check that `id` and everything below it exists and is acyclic,
    /// without compiling any grammar.
    pub fn check_regex(&self, id: RegexId) -> Result<()> {
        RegexTable::new().serialize(self, id).map(|_| ())
    }

    fn regex_children(
        &self,
        what: &'static str,
        ids: impl IntoIterator<Item = RegexId>,
    ) -> Result<Vec<RegexId>> {
        ids.into_iter()
            .map(|id| self.ensure_regex(what, id).map(|_| id))
            .collect()
    }
}
