//! Cleaning and parsing generated text.
//!
//! Models often wrap JSON in markdown code fences despite being told not to.
//! We trim, drop every fence marker, and parse what is left. No repair beyond that.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ParseError;

const FENCE_JSON: &str = "```json";
const FENCE: &str = "```";

/// Remove surrounding whitespace and all code-fence markers.
pub fn strip_fences(raw: &str) -> String {
  raw.trim().replace(FENCE_JSON, "").replace(FENCE, "")
}

/// Parse generated text into an opaque JSON document.
pub fn parse_generated(raw: &str) -> Result<Value, ParseError> {
  parse_generated_as(raw)
}

/// Parse generated text into a typed document.
pub fn parse_generated_as<T: DeserializeOwned>(raw: &str) -> Result<T, ParseError> {
  Ok(serde_json::from_str(&strip_fences(raw))?)
}
