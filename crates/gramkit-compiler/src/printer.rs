//! Pretty-printing for diagnostics.
//!
//! Output is for humans and error messages only; nothing parses it back.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use crate::ast::{Ast, GrammarKind, GrammarNode, NodeId, RegexId, RegexNode};

/// Regex renderings are cut after this many characters.
pub const REGEX_PP_LIMIT: usize = 1024;

/// Grammar renderings in diagnostics are cut after this many bytes.
pub const GRAMMAR_PP_LIMIT: usize = 1024;

/// Renders a grammar node and everything below it on one line.
///
/// Nodes reachable along more than one path are labelled `#id: ` the first
/// time and printed as `#id` afterwards, so shared subgraphs print once.
pub struct GrammarPrinter<'a> {
    ast: &'a Ast,
    root: NodeId,
}

impl<'a> GrammarPrinter<'a> {
    pub fn new(ast: &'a Ast, root: NodeId) -> Self {
        Self { ast, root }
    }

    /// Full rendering. Recursion follows the nesting depth of the grammar;
    /// see [`dump_truncated`](Self::dump_truncated) for unbounded input.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    /// Rendering cut after `limit` bytes, with `...` appended when cut.
    /// Each nesting level writes before descending, so depth is bounded by
    /// `limit` too.
    pub fn dump_truncated(&self, limit: usize) -> String {
        let mut out = String::new();
        let mut capped = Capped {
            out: &mut out,
            limit,
        };
        if self.format(&mut capped).is_err() {
            out.push_str("...");
        }
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let mut render = Render {
            ast: self.ast,
            uses: self.use_counts(),
            visited: HashSet::new(),
        };
        render.node(self.root, w)
    }

    fn use_counts(&self) -> HashMap<NodeId, usize> {
        let mut uses: HashMap<NodeId, usize> = HashMap::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let count = uses.entry(id).or_default();
            *count += 1;
            if *count > 1 {
                continue;
            }
            if let Some(node) = self.ast.get_node(id) {
                stack.extend(node.children().iter().rev());
            }
        }
        uses
    }
}

/// Accepts output until `limit` bytes, keeping what fits, then fails.
struct Capped<'a> {
    out: &'a mut String,
    limit: usize,
}

impl Write for Capped<'_> {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        let room = self.limit.saturating_sub(self.out.len());
        if s.len() <= room {
            self.out.push_str(s);
            return Ok(());
        }
        let mut cut = room;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        self.out.push_str(&s[..cut]);
        Err(std::fmt::Error)
    }
}

struct Render<'a> {
    ast: &'a Ast,
    uses: HashMap<NodeId, usize>,
    visited: HashSet<NodeId>,
}

impl Render<'_> {
    fn node(&mut self, id: NodeId, w: &mut impl Write) -> std::fmt::Result {
        if !self.visited.insert(id) {
            return write!(w, "#{}", id.as_u32());
        }
        let ast = self.ast;
        let Some(node) = ast.get_node(id) else {
            return write!(w, "<unknown #{}>", id.as_u32());
        };
        let label = self.uses.get(&id).is_some_and(|&n| n > 1);

        if !node.is_terminal() || matches!(node.kind(), GrammarKind::Nested(_)) {
            w.write_char('(')?;
            write_label(id, label, w)?;
            match node.kind() {
                GrammarKind::Select(among) => self.list(among, " | ", w)?,
                GrammarKind::Join(sequence) => self.list(sequence, " + ", w)?,
                GrammarKind::Nested(nested) => {
                    w.write_str("grammar(")?;
                    match nested.start {
                        Some(start) => self.node(start, w)?,
                        None => w.write_char('?')?,
                    }
                    w.write_char(')')?;
                }
                GrammarKind::String(_) | GrammarKind::Gen(_) | GrammarKind::Lexeme(_) => {}
            }
            write_props(node, w)?;
            return w.write_char(')');
        }

        write_label(id, label, w)?;
        match node.kind() {
            GrammarKind::String(literal) => {
                write_json_str(literal, w)?;
                write_props(node, w)
            }
            GrammarKind::Gen(generation) => {
                write!(w, "gen(regex:{}", ast.pp_regex(generation.body))?;
                if let Some(stop) = generation.stop.regex() {
                    write!(w, " stop:{}", ast.pp_regex(stop))?;
                }
                write_props(node, w)?;
                w.write_char(')')
            }
            GrammarKind::Lexeme(lexeme) => {
                let kw = if lexeme.contextual == Some(true) {
                    "keyword"
                } else {
                    "lexeme"
                };
                write!(w, "{kw}({}", ast.pp_regex(lexeme.rx))?;
                write_props(node, w)?;
                w.write_char(')')
            }
            GrammarKind::Select(_) | GrammarKind::Join(_) | GrammarKind::Nested(_) => Ok(()),
        }
    }

    fn list(&mut self, children: &[NodeId], sep: &str, w: &mut impl Write) -> std::fmt::Result {
        for (i, &child) in children.iter().enumerate() {
            if i > 0 {
                w.write_str(sep)?;
            }
            self.node(child, w)?;
        }
        Ok(())
    }
}

fn write_props(node: &GrammarNode, w: &mut impl Write) -> std::fmt::Result {
    if let Some(max_tokens) = node.props().max_tokens {
        write!(w, " maxTokens:{max_tokens}")?;
    }
    if let Some(temperature) = node.temperature() {
        write!(w, " temp:{temperature}")?;
    }
    if let Some(name) = &node.props().capture_name {
        w.write_str(" name:")?;
        write_json_str(name, w)?;
    }
    Ok(())
}

fn write_label(id: NodeId, label: bool, w: &mut impl Write) -> std::fmt::Result {
    if label {
        write!(w, "#{}: ", id.as_u32())?;
    }
    Ok(())
}

fn write_json_str(text: &str, w: &mut impl Write) -> std::fmt::Result {
    let quoted = serde_json::to_string(text).map_err(|_| std::fmt::Error)?;
    w.write_str(&quoted)
}

/// Renders regexes, truncated to [`REGEX_PP_LIMIT`] characters.
///
/// Literals print JSON-quoted and pattern sources between slashes; the
/// other variants use a generic structural form.
pub struct RegexPrinter<'a> {
    ast: &'a Ast,
}

impl<'a> RegexPrinter<'a> {
    pub fn new(ast: &'a Ast) -> Self {
        Self { ast }
    }

    pub fn dump(&self, id: RegexId) -> String {
        let mut out = String::new();
        self.format_regex(id, &mut out)
            .expect("String write never fails");
        if out.len() > REGEX_PP_LIMIT {
            let mut cut = REGEX_PP_LIMIT;
            while !out.is_char_boundary(cut) {
                cut -= 1;
            }
            out.truncate(cut);
            out.push_str("...");
        }
        out
    }

    /// Every composite writes before descending, so even a cyclic regex
    /// stops once the budget is spent.
    fn format_regex(&self, id: RegexId, out: &mut String) -> std::fmt::Result {
        if out.len() > REGEX_PP_LIMIT {
            return Ok(());
        }
        let Some(node) = self.ast.get_regex(id) else {
            return write!(out, "<unknown rx#{}>", id.as_u32());
        };
        match node {
            RegexNode::Literal(text) => write_json_str(text, out),
            RegexNode::Regex(source) => write!(out, "/{source}/"),
            RegexNode::ByteLiteral(bytes) => write!(out, "b\"{}\"", bytes.escape_ascii()),
            RegexNode::Byte(b) => write!(out, "b'{}'", b.escape_ascii()),
            RegexNode::ByteSet(words) => {
                let size: u32 = words.iter().map(|w| w.count_ones()).sum();
                write!(out, "byteset({size})")
            }
            RegexNode::Or(alts) => self.format_list(alts, " | ", out),
            RegexNode::And(parts) => self.format_list(parts, " & ", out),
            RegexNode::Concat(parts) => self.format_list(parts, " ", out),
            RegexNode::Not(inner) => {
                out.push('~');
                self.format_regex(*inner, out)
            }
            RegexNode::LookAhead(inner) => {
                out.push_str("lookahead(");
                self.format_regex(*inner, out)?;
                out.push(')');
                Ok(())
            }
            RegexNode::Repeat { inner, min, max } => {
                out.push('(');
                self.format_regex(*inner, out)?;
                match max {
                    Some(max) => write!(out, "){{{min},{max}}}"),
                    None => write!(out, "){{{min},}}"),
                }
            }
            RegexNode::EmptyString => out.write_str("\"\""),
            RegexNode::NoMatch => out.write_str("nomatch"),
        }
    }

    fn format_list(&self, ids: &[RegexId], sep: &str, out: &mut String) -> std::fmt::Result {
        out.push('(');
        for (i, &id) in ids.iter().enumerate() {
            if i > 0 {
                out.push_str(sep);
            }
            self.format_regex(id, out)?;
        }
        out.push(')');
        Ok(())
    }
}
