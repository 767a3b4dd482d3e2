//! Evaluation options.

use serde::Deserialize;

/// Default limit on expression nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Knobs that apply to a whole filter run.
///
/// Options can be built in code or deserialized from configuration, where
/// missing keys take their defaults:
///
/// ```
/// use standout_where::Options;
///
/// let options: Options = serde_json::from_str(r#"{"maxDepth": 8}"#).unwrap();
/// assert_eq!(options, Options::new().max_depth(8));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// Deepest nesting accepted before evaluation starts. Each combinator
    /// operand and each operator set counts as one level.
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Options {
    /// Creates options with every default.
    pub fn new() -> Self {
        Options::default()
    }

    /// Sets the nesting limit.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        assert_eq!(Options::new().max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn deserialize_fills_missing_keys() {
        let options: Options = serde_json::from_str("{}").unwrap();
        assert_eq!(options, Options::default());

        let options: Options = serde_json::from_str(r#"{"maxDepth": 3}"#).unwrap();
        assert_eq!(options.max_depth, 3);
    }

    #[test]
    fn deserialize_rejects_bad_types() {
        assert!(serde_json::from_str::<Options>(r#"{"maxDepth": "deep"}"#).is_err());
    }
}
