//! Grammar nodes.

use super::{NodeId, RegexId};

/// Properties any grammar node may carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Props {
    /// Token budget for the text matched by this node.
    pub max_tokens: Option<u32>,
    /// The engine reports the matched text under this name.
    pub capture_name: Option<String>,
}

/// A grammar node with its derived static properties.
#[derive(Debug, Clone, PartialEq)]
pub struct GrammarNode {
    pub(crate) kind: GrammarKind,
    pub(crate) props: Props,
    pub(crate) nullable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GrammarKind {
    // Terminals:
    /// Forced literal text.
    String(String),
    /// Generation bounded by a body regex and a stop regex.
    Gen(Gen),
    Lexeme(Lexeme),
    /// Reference to an independently compiled grammar.
    Nested(Nested),
    // Non-terminals:
    /// Ordered choice. Empty means "never matches".
    Select(Vec<NodeId>),
    /// Sequence.
    Join(Vec<NodeId>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gen {
    pub body: RegexId,
    pub stop: GenStop,
    pub lazy: Option<bool>,
    pub temperature: Option<f32>,
    pub stop_capture_name: Option<String>,
}

/// Where a generation's stop regex comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenStop {
    /// Neither given nor inferred (yet).
    Unset,
    Explicit(RegexId),
    /// Taken from the leading character of the literal that follows.
    Inferred {
        text: String,
        rx: RegexId,
        /// The literal the stop was read from.
        source: NodeId,
    },
}

impl GenStop {
    pub fn regex(&self) -> Option<RegexId> {
        match self {
            GenStop::Unset => None,
            GenStop::Explicit(rx) | GenStop::Inferred { rx, .. } => Some(*rx),
        }
    }

    /// Stop inference may still assign (or re-confirm) this stop.
    pub fn is_open(&self) -> bool {
        !matches!(self, GenStop::Explicit(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub rx: RegexId,
    /// `Some(true)` for keywords; `None` leaves the grammar default.
    pub contextual: Option<bool>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Nested {
    /// `None` until a placeholder is defined.
    pub start: Option<NodeId>,
    /// Ignored lexeme (whitespace) for the nested grammar.
    pub skip: Option<RegexId>,
}

impl GrammarNode {
    pub(crate) fn new(kind: GrammarKind, nullable: bool) -> Self {
        Self {
            kind,
            props: Props::default(),
            nullable,
        }
    }

    pub fn kind(&self) -> &GrammarKind {
        &self.kind
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    /// Whether the node can match the empty string.
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Anything but a choice or a sequence.
    pub fn is_terminal(&self) -> bool {
        !matches!(self.kind, GrammarKind::Select(_) | GrammarKind::Join(_))
    }

    /// Immediate child grammar nodes. A nested grammar exposes its start node.
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            GrammarKind::Select(c) | GrammarKind::Join(c) => c,
            GrammarKind::Nested(n) => n.start.as_slice(),
            GrammarKind::String(_) | GrammarKind::Gen(_) | GrammarKind::Lexeme(_) => &[],
        }
    }

    pub fn as_gen(&self) -> Option<&Gen> {
        match &self.kind {
            GrammarKind::Gen(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&str> {
        match &self.kind {
            GrammarKind::String(s) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn temperature(&self) -> Option<f32> {
        match &self.kind {
            GrammarKind::Gen(g) => g.temperature,
            GrammarKind::Lexeme(l) => l.temperature,
            _ => None,
        }
    }
}
