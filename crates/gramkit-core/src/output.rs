//! Events streamed back by the engine while it generates under a grammar.
//!
//! The engine reports progress as log lines. Lines starting with `JSON-OUT: `
//! carry one [`ParserOutput`] each; [`GenerationOutput`] folds them into the
//! generated text and the named captures.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Capture names starting with this prefix are list captures: every match is
/// appended under the name with the prefix stripped.
pub const LIST_APPEND_PREFIX: &str = "__LIST_APPEND:";

const JSON_OUT_PREFIX: &str = "JSON-OUT: ";
const WARNING_PREFIX: &str = "Warning: ";

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("malformed engine output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed hex in engine output: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// One event of the engine's output stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "object", rename_all = "snake_case")]
pub enum ParserOutput {
    Capture(OutCapture),
    FinalText(OutFinalText),
    Text(OutText),
}

/// A node with a capture name was matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutCapture {
    pub name: String,
    /// Matched bytes, hex-encoded.
    pub hex: String,
    /// Matched bytes, lossily decoded.
    pub str: String,
    pub log_prob: f64,
}

/// Generation finished.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutFinalText {
    #[serde(default)]
    pub hex: String,
    #[serde(default)]
    pub str: String,
}

/// Bytes appended to the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutText {
    pub hex: String,
    pub str: String,
    #[serde(default)]
    pub log_prob: f64,
    #[serde(default)]
    pub num_tokens: u32,
    /// False when the bytes were forced by the grammar rather than sampled.
    #[serde(default)]
    pub is_generated: bool,
    #[serde(default)]
    pub stats: ParserStats,
}

/// Engine-side performance counters attached to text events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserStats {
    pub runtime_us: u64,
    pub rows: u64,
    pub definitive_bytes: u64,
    pub lexer_ops: u64,
    pub all_items: u64,
    pub hidden_bytes: u64,
}

/// Accumulated result of one generation.
#[derive(Debug, Clone, Default)]
pub struct GenerationOutput {
    captures: IndexMap<String, OutCapture>,
    list_captures: IndexMap<String, Vec<OutCapture>>,
    text: Vec<OutText>,
    warnings: Vec<String>,
    is_done: bool,
}

impl GenerationOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the output.
    pub fn handle(&mut self, output: ParserOutput) {
        match output {
            ParserOutput::Capture(capture) => {
                if let Some(name) = capture.name.strip_prefix(LIST_APPEND_PREFIX) {
                    self.list_captures
                        .entry(name.to_string())
                        .or_default()
                        .push(capture);
                } else {
                    self.captures.insert(capture.name.clone(), capture);
                }
            }
            ParserOutput::FinalText(_) => self.is_done = true,
            ParserOutput::Text(text) => self.text.push(text),
        }
    }

    /// Handle one log line of the engine's response.
    pub fn handle_log_line(&mut self, line: &str) -> Result<(), OutputError> {
        if let Some(json) = line.strip_prefix(JSON_OUT_PREFIX) {
            tracing::trace!(json, "engine output");
            let output: ParserOutput = serde_json::from_str(json)?;
            self.handle(output);
        } else if line.starts_with(WARNING_PREFIX) {
            tracing::warn!("{line}");
            self.warnings.push(line.to_string());
        } else if !line.is_empty() {
            tracing::debug!("{line}");
        }
        Ok(())
    }

    /// Handle every line of a multi-line log chunk.
    pub fn handle_logs(&mut self, logs: &str) -> Result<(), OutputError> {
        logs.lines().try_for_each(|line| self.handle_log_line(line))
    }

    pub fn is_done(&self) -> bool {
        self.is_done
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn text_events(&self) -> &[OutText] {
        &self.text
    }

    /// All output bytes so far, forced and generated.
    pub fn text_bytes(&self) -> Result<Vec<u8>, OutputError> {
        let mut bytes = Vec::new();
        for t in &self.text {
            bytes.extend(hex::decode(&t.hex)?);
        }
        Ok(bytes)
    }

    pub fn text(&self) -> Result<String, OutputError> {
        Ok(String::from_utf8_lossy(&self.text_bytes()?).into_owned())
    }

    pub fn capture(&self, name: &str) -> Option<&str> {
        self.captures.get(name).map(|c| c.str.as_str())
    }

    pub fn capture_bytes(&self, name: &str) -> Result<Option<Vec<u8>>, OutputError> {
        self.captures
            .get(name)
            .map(|c| hex::decode(&c.hex))
            .transpose()
            .map_err(OutputError::from)
    }

    /// Values of a list capture in arrival order.
    pub fn list_capture(&self, name: &str) -> Option<Vec<&str>> {
        self.list_captures
            .get(name)
            .map(|items| items.iter().map(|c| c.str.as_str()).collect())
    }

    pub fn captures(&self) -> impl Iterator<Item = (&str, &OutCapture)> {
        self.captures.iter().map(|(k, v)| (k.as_str(), v))
    }
}
