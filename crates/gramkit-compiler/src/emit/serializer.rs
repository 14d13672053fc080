//! Multi-grammar serializer.
//!
//! Compiles one entry grammar, plus every nested grammar it reaches, into a
//! [`TopLevelGrammar`]. Each grammar gets its own node and regex id space.
//! Nested references register further grammars while a grammar is being
//! compiled; the fixpoint loop picks them up until the list stops growing.

use std::collections::HashMap;

use gramkit_core::{
    GrammarWithLexer, NodeGen, NodeGenGrammar, NodeJoin, NodeJson, NodeLexeme, NodeProps,
    NodeSelect, NodeString, RegexSpec, TopLevelGrammar,
};
use indexmap::IndexSet;

use super::RegexTable;
use crate::ast::{Ast, Gen, GrammarKind, GrammarNode, Nested, NodeId};
use crate::{Error, Result};

/// What to emit for a generation that has neither an explicit nor an
/// inferred stop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StopPolicy {
    /// Stop at end of output (empty stop regex).
    #[default]
    EndOfOutput,
    /// Fail the compile with [`Error::UnresolvedStop`].
    Error,
}

/// Knobs for one compile.
#[derive(Debug, Clone, Default)]
pub struct CompileConfig {
    pub stop_policy: StopPolicy,
    /// Copied onto the artifact.
    pub max_tokens: Option<u32>,
    /// Copied onto the artifact.
    pub test_trace: bool,
    /// Ceiling on serialized grammar nodes, summed over all grammars.
    /// Depth needs no ceiling here: serialization does not recurse.
    pub node_limit: Option<usize>,
}

/// Builder for [`Serializer`].
pub struct SerializerBuilder<'a> {
    ast: &'a Ast,
    config: CompileConfig,
}

impl<'a> SerializerBuilder<'a> {
    pub fn new(ast: &'a Ast) -> Self {
        Self {
            ast,
            config: CompileConfig::default(),
        }
    }

    pub fn stop_policy(mut self, policy: StopPolicy) -> Self {
        self.config.stop_policy = policy;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.config.max_tokens = Some(max_tokens);
        self
    }

    pub fn test_trace(mut self, enabled: bool) -> Self {
        self.config.test_trace = enabled;
        self
    }

    pub fn node_limit(mut self, limit: usize) -> Self {
        self.config.node_limit = Some(limit);
        self
    }

    pub fn config(mut self, config: CompileConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Serializer<'a> {
        Serializer {
            ast: self.ast,
            config: self.config,
            sources: IndexSet::new(),
            node_count: 0,
        }
    }
}

/// Single-use compile pass. All state lives here; the AST is only read.
pub struct Serializer<'a> {
    ast: &'a Ast,
    config: CompileConfig,
    /// Registered grammars; the index is the grammar id.
    sources: IndexSet<NodeId>,
    node_count: usize,
}

/// Per-grammar state, reset for every grammar.
#[derive(Default)]
struct GrammarScope {
    ids: HashMap<NodeId, u32>,
    /// Slots are reserved before children are serialized.
    nodes: Vec<Option<NodeJson>>,
    regexes: RegexTable,
}

/// A choice or sequence whose children are still being serialized.
struct Frame<'a> {
    id: NodeId,
    wire: u32,
    children: &'a [NodeId],
    ids: Vec<u32>,
}

enum Entry<'a> {
    Done(u32),
    Open(Frame<'a>),
}

impl<'a> Serializer<'a> {
    pub fn new(ast: &'a Ast) -> Self {
        Self::builder(ast).build()
    }

    pub fn builder(ast: &'a Ast) -> SerializerBuilder<'a> {
        SerializerBuilder::new(ast)
    }

    /// Compile `root` and everything it references.
    ///
    /// A nested grammar root is grammar 0 itself; any other root becomes the
    /// start node of an implicit entry grammar without skip regex.
    pub fn compile(mut self, root: NodeId) -> Result<TopLevelGrammar> {
        self.ast.ensure_node("root", root)?;
        let entry = self.register(root);
        if entry != 0 {
            return Err(Error::Unreachable("entry grammar is not grammar 0"));
        }

        let mut grammars = Vec::new();
        // `sources` grows while grammars compile.
        let mut index = 0;
        while index < self.sources.len() {
            let key = self.sources[index];
            grammars.push(self.compile_grammar(index, key)?);
            index += 1;
        }

        Ok(TopLevelGrammar {
            grammars,
            max_tokens: self.config.max_tokens,
            test_trace: self.config.test_trace,
        })
    }

    /// Grammar id for `key`, registering it on first sight.
    fn register(&mut self, key: NodeId) -> u32 {
        let (index, inserted) = self.sources.insert_full(key);
        if inserted {
            tracing::trace!(grammar = index, node = key.as_u32(), "registered grammar");
        }
        index as u32
    }

    fn compile_grammar(&mut self, index: usize, key: NodeId) -> Result<GrammarWithLexer> {
        let (start, skip) = match self.ast.node(key).kind() {
            GrammarKind::Nested(Nested {
                start: Some(start),
                skip,
            }) => (*start, *skip),
            GrammarKind::Nested(Nested { start: None, .. }) => {
                return Err(Error::UndefinedGrammar(format!("#{}", key.as_u32())));
            }
            _ => (key, None),
        };

        let mut scope = GrammarScope::default();
        if self.serialize_node(&mut scope, start)? != 0 {
            return Err(Error::Unreachable("grammar start is not node 0"));
        }
        let greedy_skip_rx = skip
            .map(|rx| scope.regexes.serialize(self.ast, rx).map(RegexSpec::Id))
            .transpose()?;

        let nodes = scope
            .nodes
            .into_iter()
            .map(|slot| slot.ok_or(Error::Unreachable("grammar node slot never filled")))
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(
            grammar = index,
            nodes = nodes.len(),
            regexes = scope.regexes.len(),
            "compiled grammar"
        );

        Ok(GrammarWithLexer {
            nodes,
            greedy_skip_rx,
            rx_nodes: scope.regexes.into_entries(),
            ..GrammarWithLexer::empty()
        })
    }

    /// Serialize `root` into the current grammar, returning its node id there.
    /// Ids are assigned on entry, so a parent precedes its children. The walk
    /// keeps its own stack, so grammar depth is not limited by the call stack.
    fn serialize_node(&mut self, scope: &mut GrammarScope, root: NodeId) -> Result<u32> {
        let mut stack = match self.enter(scope, root)? {
            Entry::Done(wire) => return Ok(wire),
            Entry::Open(frame) => vec![frame],
        };

        while let Some(frame) = stack.last_mut() {
            if let Some(&child) = frame.children.get(frame.ids.len()) {
                match self.enter(scope, child)? {
                    Entry::Done(wire) => frame.ids.push(wire),
                    Entry::Open(child_frame) => stack.push(child_frame),
                }
                continue;
            }

            let Some(frame) = stack.pop() else { break };
            let wire = frame.wire;
            self.close(scope, frame);
            match stack.last_mut() {
                Some(parent) => parent.ids.push(wire),
                None => return Ok(wire),
            }
        }
        Err(Error::Unreachable("serialization stack emptied early"))
    }

    /// Assign `id` its node id. Terminals are finished on the spot;
    /// composites come back open, with their slot reserved.
    fn enter(&mut self, scope: &mut GrammarScope, id: NodeId) -> Result<Entry<'a>> {
        if let Some(&wire) = scope.ids.get(&id) {
            return Ok(Entry::Done(wire));
        }
        let ast = self.ast;
        let node = ast.ensure_node("grammar", id)?;
        self.count_node()?;

        let wire = scope.nodes.len() as u32;
        scope.ids.insert(id, wire);
        scope.nodes.push(None);

        let json = match node.kind() {
            GrammarKind::Select(children) | GrammarKind::Join(children) => {
                return Ok(Entry::Open(Frame {
                    id,
                    wire,
                    children,
                    ids: Vec::with_capacity(children.len()),
                }));
            }
            GrammarKind::String(literal) => NodeJson::String(NodeString {
                literal: literal.clone(),
                props: NodeProps::default(),
            }),
            GrammarKind::Gen(generation) => self.serialize_gen(scope, id, generation)?,
            GrammarKind::Lexeme(lexeme) => NodeJson::Lexeme(NodeLexeme {
                rx: RegexSpec::Id(scope.regexes.serialize(ast, lexeme.rx)?),
                contextual: lexeme.contextual,
                temperature: lexeme.temperature,
                props: NodeProps::default(),
            }),
            GrammarKind::Nested(_) => NodeJson::GenGrammar(NodeGenGrammar {
                grammar: self.register(id),
                temperature: node.temperature(),
                max_tokens_grm: None,
                props: NodeProps::default(),
            }),
        };
        store(scope, node, wire, json);
        Ok(Entry::Done(wire))
    }

    /// Finish a composite once all its children have ids.
    fn close(&self, scope: &mut GrammarScope, frame: Frame<'a>) {
        let node = self.ast.node(frame.id);
        let json = match node.kind() {
            GrammarKind::Select(_) => NodeJson::Select(NodeSelect {
                among: frame.ids,
                props: NodeProps::default(),
            }),
            _ => NodeJson::Join(NodeJoin {
                sequence: frame.ids,
                props: NodeProps::default(),
            }),
        };
        store(scope, node, frame.wire, json);
    }

    fn serialize_gen(
        &self,
        scope: &mut GrammarScope,
        id: NodeId,
        generation: &Gen,
    ) -> Result<NodeJson> {
        let body_rx = RegexSpec::Id(scope.regexes.serialize(self.ast, generation.body)?);
        let stop_rx = match generation.stop.regex() {
            Some(rx) => RegexSpec::Id(scope.regexes.serialize(self.ast, rx)?),
            None => match self.config.stop_policy {
                StopPolicy::EndOfOutput => RegexSpec::end_of_output(),
                StopPolicy::Error => return Err(Error::UnresolvedStop(self.ast.pp(id))),
            },
        };
        Ok(NodeJson::Gen(NodeGen {
            body_rx,
            stop_rx,
            stop_capture_name: generation.stop_capture_name.clone(),
            lazy: generation.lazy,
            temperature: generation.temperature,
            props: NodeProps::default(),
        }))
    }

    fn count_node(&mut self) -> Result<()> {
        self.node_count += 1;
        match self.config.node_limit {
            Some(limit) if self.node_count > limit => Err(Error::NodeLimitExceeded(limit)),
            _ => Ok(()),
        }
    }
}

/// Fill the reserved slot, merging the cross-cutting props.
fn store(scope: &mut GrammarScope, node: &GrammarNode, wire: u32, mut json: NodeJson) {
    let props = json.props_mut();
    props.max_tokens = node.props().max_tokens;
    props.capture_name = node.props().capture_name.clone();
    scope.nodes[wire as usize] = Some(json);
}
