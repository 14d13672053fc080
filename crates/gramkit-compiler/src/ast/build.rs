//! Combinators for building grammars.

use gramkit_core::LIST_APPEND_PREFIX;
use indexmap::IndexMap;

use super::grammar::{Gen, GenStop, GrammarKind, GrammarNode, Lexeme, Nested, Props};
use super::{Ast, NodeId, RegexDef, RegexId};
use crate::analyze::{InferredStop, infer_stops};
use crate::{Error, Result};

const DEFAULT_GEN_REGEX: &str = ".*";

/// Either a built grammar node or literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarDef {
    Node(NodeId),
    Literal(String),
}

impl From<NodeId> for GrammarDef {
    fn from(id: NodeId) -> Self {
        GrammarDef::Node(id)
    }
}

impl From<&str> for GrammarDef {
    fn from(text: &str) -> Self {
        GrammarDef::Literal(text.to_string())
    }
}

impl From<String> for GrammarDef {
    fn from(text: String) -> Self {
        GrammarDef::Literal(text)
    }
}

/// Stop of a generation: literal text or a regex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopDef {
    Literal(String),
    Regex(RegexDef),
}

impl From<&str> for StopDef {
    fn from(text: &str) -> Self {
        StopDef::Literal(text.to_string())
    }
}

impl From<String> for StopDef {
    fn from(text: String) -> Self {
        StopDef::Literal(text)
    }
}

impl From<RegexId> for StopDef {
    fn from(id: RegexId) -> Self {
        StopDef::Regex(RegexDef::Node(id))
    }
}

/// Options for [`Ast::generation`].
#[derive(Debug, Clone, Default)]
pub struct GenOptions {
    pub name: Option<String>,
    /// Body regex; `.*` when absent.
    pub regex: Option<RegexDef>,
    /// Empty literal text counts as no stop.
    pub stop: Option<StopDef>,
    pub lazy: Option<bool>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Report every match of `name` as a list item.
    pub list_append: bool,
    pub stop_capture_name: Option<String>,
}

impl GenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn regex(mut self, regex: impl Into<RegexDef>) -> Self {
        self.regex = Some(regex.into());
        self
    }

    pub fn stop(mut self, stop: impl Into<StopDef>) -> Self {
        self.stop = Some(stop.into());
        self
    }

    pub fn lazy(mut self, value: bool) -> Self {
        self.lazy = Some(value);
        self
    }

    pub fn temperature(mut self, value: f32) -> Self {
        self.temperature = Some(value);
        self
    }

    pub fn max_tokens(mut self, value: u32) -> Self {
        self.max_tokens = Some(value);
        self
    }

    pub fn list_append(mut self, value: bool) -> Self {
        self.list_append = value;
        self
    }

    pub fn stop_capture_name(mut self, name: impl Into<String>) -> Self {
        self.stop_capture_name = Some(name.into());
        self
    }
}

/// Options for [`Ast::lexeme_with`].
#[derive(Debug, Clone)]
pub struct LexemeOptions {
    pub rx: RegexDef,
    pub contextual: Option<bool>,
    pub temperature: Option<f32>,
}

impl Ast {
    /// Literal text. The empty string is nullable.
    pub fn str(&mut self, text: impl Into<String>) -> NodeId {
        let text = text.into();
        let nullable = text.is_empty();
        self.push_node(GrammarNode::new(GrammarKind::String(text), nullable))
    }

    /// Normalize a node or literal text into a node handle.
    pub fn def(&mut self, def: impl Into<GrammarDef>) -> Result<NodeId> {
        match def.into() {
            GrammarDef::Node(id) => self.ensure_node("grammar", id).map(|_| id),
            GrammarDef::Literal(text) => Ok(self.str(text)),
        }
    }

    /// Pattern-bounded generation.
    pub fn generation(&mut self, options: GenOptions) -> Result<NodeId> {
        let capture_name = match (options.name, options.list_append) {
            (Some(name), true) => Some(format!("{LIST_APPEND_PREFIX}{name}")),
            (None, true) => {
                return Err(Error::Malformed {
                    what: "generation",
                    reason: "list_append needs a capture name".to_string(),
                });
            }
            (name, false) => name,
        };

        let body = self.rx(
            options
                .regex
                .unwrap_or_else(|| RegexDef::from(DEFAULT_GEN_REGEX)),
        );
        self.check_regex(body)?;

        let stop = match options.stop {
            None => GenStop::Unset,
            Some(StopDef::Literal(text)) if text.is_empty() => GenStop::Unset,
            Some(StopDef::Literal(text)) => GenStop::Explicit(self.regex_literal(text)),
            Some(StopDef::Regex(def)) => GenStop::Explicit(self.rx(def)),
        };
        if let Some(rx) = stop.regex() {
            self.check_regex(rx)?;
        }

        let mut node = GrammarNode::new(
            GrammarKind::Gen(Gen {
                body,
                stop,
                lazy: options.lazy,
                temperature: options.temperature,
                stop_capture_name: options.stop_capture_name,
            }),
            false,
        );
        node.props = Props {
            max_tokens: options.max_tokens,
            capture_name,
        };
        Ok(self.push_node(node))
    }

    pub fn lexeme(&mut self, rx: impl Into<RegexDef>) -> Result<NodeId> {
        self.lexeme_with(LexemeOptions {
            rx: rx.into(),
            contextual: None,
            temperature: None,
        })
    }

    /// Contextual lexeme matching `text` literally.
    pub fn keyword(&mut self, text: impl Into<String>) -> Result<NodeId> {
        let rx = self.regex_literal(text);
        self.lexeme_with(LexemeOptions {
            rx: rx.into(),
            contextual: Some(true),
            temperature: None,
        })
    }

    pub fn lexeme_with(&mut self, options: LexemeOptions) -> Result<NodeId> {
        let rx = self.rx(options.rx);
        self.check_regex(rx)?;
        let lexeme = Lexeme {
            rx,
            contextual: options.contextual,
            temperature: options.temperature,
        };
        Ok(self.push_node(GrammarNode::new(GrammarKind::Lexeme(lexeme), false)))
    }

    /// Ordered choice.
    pub fn select<I, T>(&mut self, items: I) -> Result<NodeId>
    where
        I: IntoIterator<Item = T>,
        T: Into<GrammarDef>,
    {
        let among = self.defs(items)?;
        let nullable = among.iter().any(|&id| self.node(id).nullable);
        Ok(self.push_node(GrammarNode::new(GrammarKind::Select(among), nullable)))
    }

    /// Sequence. Infers missing generation stops from the literals that
    /// follow them; on error nothing is built or modified.
    pub fn join<I, T>(&mut self, items: I) -> Result<NodeId>
    where
        I: IntoIterator<Item = T>,
        T: Into<GrammarDef>,
    {
        // Literal items become nodes while resolving; drop them again if the
        // sequence is rejected.
        let mark = self.nodes.len();
        let (sequence, stops) = match self.resolve_sequence(items) {
            Ok(resolved) => resolved,
            Err(err) => {
                self.nodes.truncate(mark);
                return Err(err);
            }
        };

        for (gen_id, stop) in stops {
            let GrammarKind::Gen(current) = &self.node(gen_id).kind else {
                return Err(Error::Unreachable("stop inferred for a non-gen node"));
            };
            if matches!(&current.stop, GenStop::Inferred { text, .. } if *text == stop.text) {
                continue;
            }
            tracing::debug!(node = gen_id.as_u32(), stop = %stop.text, "inferred stop");
            let rx = self.regex_literal(stop.text.clone());
            if let GrammarKind::Gen(target) = &mut self.nodes[gen_id.index()].kind {
                target.stop = GenStop::Inferred {
                    text: stop.text,
                    rx,
                    source: stop.source,
                };
            }
        }

        let nullable = sequence.iter().all(|&id| self.node(id).nullable);
        Ok(self.push_node(GrammarNode::new(GrammarKind::Join(sequence), nullable)))
    }

    /// Two-element sequence `first + second`.
    pub fn join_pair(
        &mut self,
        first: impl Into<GrammarDef>,
        second: impl Into<GrammarDef>,
    ) -> Result<NodeId> {
        let first = self.def(first)?;
        let second = self.def(second)?;
        self.join([first, second])
    }

    /// Reference to an independently compiled grammar starting at `start`.
    pub fn nested(
        &mut self,
        start: impl Into<GrammarDef>,
        skip: Option<RegexId>,
    ) -> Result<NodeId> {
        let start = self.def(start)?;
        if let Some(skip) = skip {
            self.check_regex(skip)?;
        }
        Ok(self.push_nested(Some(start), skip))
    }

    /// Nested grammar whose start node is supplied later with
    /// [`Ast::define_nested`]. This is how grammars recurse.
    pub fn nested_placeholder(&mut self) -> NodeId {
        self.push_nested(None, None)
    }

    pub fn define_nested(&mut self, id: NodeId, start: impl Into<GrammarDef>) -> Result<()> {
        let start = self.def(start)?;
        let grammar = self.ensure_node("define_nested", id)?;
        match &grammar.kind {
            GrammarKind::Nested(Nested { start: None, .. }) => {}
            GrammarKind::Nested(_) => {
                return Err(Error::Malformed {
                    what: "define_nested",
                    reason: format!("grammar #{} is already defined", id.as_u32()),
                });
            }
            _ => {
                return Err(Error::Malformed {
                    what: "define_nested",
                    reason: format!("{} is not a nested grammar", self.pp(id)),
                });
            }
        }
        if let GrammarKind::Nested(nested) = &mut self.nodes[id.index()].kind {
            nested.start = Some(start);
        }
        Ok(())
    }

    /// `item`, one or more times.
    pub fn one_or_more(&mut self, item: impl Into<GrammarDef>) -> Result<NodeId> {
        let item = self.def(item)?;
        let repeated = self.nested_placeholder();
        let more = self.join([repeated, item])?;
        let body = self.select([item, more])?;
        self.define_nested(repeated, body)?;
        Ok(repeated)
    }

    /// `item`, zero or more times.
    pub fn zero_or_more(&mut self, item: impl Into<GrammarDef>) -> Result<NodeId> {
        let item = self.def(item)?;
        let empty = self.str("");
        let repeated = self.nested_placeholder();
        let more = self.join([repeated, item])?;
        let body = self.select([empty, more])?;
        self.define_nested(repeated, body)?;
        Ok(repeated)
    }

    /// Copy of `node` reported by the engine under `name`.
    pub fn capture(&mut self, node: NodeId, name: impl Into<String>) -> Result<NodeId> {
        let name = name.into();
        self.with_props(node, |props| props.capture_name = Some(name))
    }

    /// Copy of `node` whose every match is appended to the list `name`.
    pub fn list_capture(&mut self, node: NodeId, name: impl Into<String>) -> Result<NodeId> {
        let name = format!("{LIST_APPEND_PREFIX}{}", name.into());
        self.with_props(node, |props| props.capture_name = Some(name))
    }

    /// Copy of `node` limited to `max_tokens` tokens.
    pub fn with_max_tokens(&mut self, node: NodeId, max_tokens: u32) -> Result<NodeId> {
        self.with_props(node, |props| props.max_tokens = Some(max_tokens))
    }

    fn with_props(&mut self, node: NodeId, update: impl FnOnce(&mut Props)) -> Result<NodeId> {
        let mut copy = self.ensure_node("props", node)?.clone();
        update(&mut copy.props);
        Ok(self.push_node(copy))
    }

    fn push_nested(&mut self, start: Option<NodeId>, skip: Option<RegexId>) -> NodeId {
        self.push_node(GrammarNode::new(
            GrammarKind::Nested(Nested { start, skip }),
            false,
        ))
    }

    fn resolve_sequence<I, T>(
        &mut self,
        items: I,
    ) -> Result<(Vec<NodeId>, IndexMap<NodeId, InferredStop>)>
    where
        I: IntoIterator<Item = T>,
        T: Into<GrammarDef>,
    {
        let sequence = self.defs(items)?;
        let stops = infer_stops(self, &sequence)?;
        Ok((sequence, stops))
    }

    fn defs<I, T>(&mut self, items: I) -> Result<Vec<NodeId>>
    where
        I: IntoIterator<Item = T>,
        T: Into<GrammarDef>,
    {
        items.into_iter().map(|item| self.def(item)).collect()
    }
}
