//! Wire format of a compiled grammar.
//!
//! The artifact is a list of grammars. The first one is the entry point and
//! the rest are reachable from it through `GenGrammar` nodes, which refer to
//! them by their index in [`TopLevelGrammar::grammars`].
//!
//! Inside one grammar, node and regex references are indices into that
//! grammar's own `nodes` and `rx_nodes` lists. The start node is `nodes[0]`.

use serde::{Deserialize, Serialize};

/// Index into [`TopLevelGrammar::grammars`].
pub type GrammarId = u32;

/// Index into [`GrammarWithLexer::nodes`].
pub type NodeId = u32;

/// Index into [`GrammarWithLexer::rx_nodes`].
pub type RegexId = u32;

/// A collection of grammars with the start grammar at position 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopLevelGrammar {
    pub grammars: Vec<GrammarWithLexer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub test_trace: bool,
}

impl TopLevelGrammar {
    /// Compact JSON, as sent to the engine.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Indented JSON, for humans.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// One independently compiled grammar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarWithLexer {
    /// Serialized nodes. The start symbol is `nodes[0]`.
    pub nodes: Vec<NodeJson>,

    /// When enabled, the grammar can use `Lexeme` but not `Gen`.
    /// `String` is allowed either way.
    pub greedy_lexer: bool,

    /// Lexeme ignored while parsing (usually whitespace).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greedy_skip_rx: Option<RegexSpec>,

    /// Default for `contextual` in `Lexeme` nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contextual: Option<bool>,

    /// Deduplicated regexes, referenced by position.
    pub rx_nodes: Vec<RegexJson>,
}

impl GrammarWithLexer {
    /// Empty grammar with the defaults the compiler starts from.
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            greedy_lexer: false,
            greedy_skip_rx: None,
            contextual: Some(false),
            rx_nodes: Vec::new(),
        }
    }
}

/// Serialized grammar node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeJson {
    // Terminals:
    /// Force generation of the specific string.
    String(NodeString),
    /// Generate according to regex.
    Gen(NodeGen),
    /// Lexeme in a greedy grammar.
    Lexeme(NodeLexeme),
    /// Generate according to another grammar.
    GenGrammar(NodeGenGrammar),
    // Non-terminals:
    /// Generate one of the options.
    Select(NodeSelect),
    /// Generate all of the nodes in sequence.
    Join(NodeJoin),
}

impl NodeJson {
    pub fn props(&self) -> &NodeProps {
        match self {
            NodeJson::String(n) => &n.props,
            NodeJson::Gen(n) => &n.props,
            NodeJson::Lexeme(n) => &n.props,
            NodeJson::GenGrammar(n) => &n.props,
            NodeJson::Select(n) => &n.props,
            NodeJson::Join(n) => &n.props,
        }
    }

    pub fn props_mut(&mut self) -> &mut NodeProps {
        match self {
            NodeJson::String(n) => &mut n.props,
            NodeJson::Gen(n) => &mut n.props,
            NodeJson::Lexeme(n) => &mut n.props,
            NodeJson::GenGrammar(n) => &mut n.props,
            NodeJson::Select(n) => &mut n.props,
            NodeJson::Join(n) => &mut n.props,
        }
    }
}

/// Optional fields allowed on any node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeString {
    pub literal: String,
    #[serde(flatten)]
    pub props: NodeProps,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeGen {
    /// Regular expression matching the body of generation.
    pub body_rx: RegexSpec,

    /// The whole generation must match `body_rx + stop_rx`.
    /// Whatever matched `stop_rx` is discarded.
    /// If `stop_rx` is empty, it's assumed to be EOS.
    pub stop_rx: RegexSpec,

    /// When set, the text matching `stop_rx` is reported as a capture
    /// with this name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_capture_name: Option<String>,

    /// Lazy gens take the shortest match, non-lazy the longest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lazy: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(flatten)]
    pub props: NodeProps,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLexeme {
    pub rx: RegexSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contextual: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(flatten)]
    pub props: NodeProps,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeGenGrammar {
    pub grammar: GrammarId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens_grm: Option<u32>,
    #[serde(flatten)]
    pub props: NodeProps,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSelect {
    pub among: Vec<NodeId>,
    #[serde(flatten)]
    pub props: NodeProps,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeJoin {
    pub sequence: Vec<NodeId>,
    #[serde(flatten)]
    pub props: NodeProps,
}

/// Reference to a regex: either by id, or inline pattern source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegexSpec {
    Id(RegexId),
    Source(String),
}

impl RegexSpec {
    /// Empty stop: the generation runs until end of output.
    pub fn end_of_output() -> Self {
        RegexSpec::Source(String::new())
    }
}

/// Serialized regex node.
///
/// Composite variants refer to earlier entries of the same `rx_nodes` list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegexJson {
    /// Intersection of the regexes.
    And(Vec<RegexId>),
    /// Union of the regexes.
    Or(Vec<RegexId>),
    /// Concatenation of the regexes.
    Concat(Vec<RegexId>),
    /// Matches the regex; should be at the end of the main regex.
    LookAhead(RegexId),
    /// Matches everything the regex doesn't match.
    Not(RegexId),
    /// Repeat the regex at least min times, at most max times.
    Repeat(RegexId, u32, Option<u32>),
    /// Matches the empty string. Same as `Concat([])`.
    EmptyString {},
    /// Matches nothing. Same as `Or([])`.
    NoMatch {},
    /// Pattern source, compiled by the engine.
    Regex(String),
    /// Matches this string only.
    Literal(String),
    /// Matches this string of bytes only.
    ByteLiteral(Vec<u8>),
    /// Matches this byte only.
    Byte(u8),
    /// Matches any byte in the set, as a 256-bit set in eight words.
    ByteSet(Vec<u32>),
}
