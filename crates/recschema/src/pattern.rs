//! # Pattern Capability
//!
//! A compiled regular expression usable two ways: testing a candidate
//! string, and synthesizing a random string the expression accepts.
//! Matching uses `regex`; synthesis uses `rand_regex` over the same
//! source with its outer anchors removed, since a sampled string is
//! always the whole match.
//!
//! A pattern built with [`Pattern::matcher_only`] skips synthesis, so
//! expressions the synthesizer cannot sample (word boundaries, inner
//! anchors) are still usable for matching.

use std::fmt;

use rand::distributions::Distribution;
use rand::Rng;

use crate::error::PatternError;

/// Upper bound on repetitions for unbounded quantifiers (`*`, `+`, `{n,}`)
/// during synthesis.
pub const DEFAULT_MAX_REPEAT: u32 = 16;

/// A pattern compiled for matching and synthesis.
pub struct Pattern {
    source: String,
    matcher: regex::Regex,
    synthesizer: Option<rand_regex::Regex>,
}

impl Pattern {
    /// Compile `source` with [`DEFAULT_MAX_REPEAT`].
    pub fn new(source: &str) -> Result<Self, PatternError> {
        Self::with_max_repeat(source, DEFAULT_MAX_REPEAT)
    }

    /// Compile `source`, bounding unbounded repetitions at `max_repeat`
    /// when synthesizing.
    ///
    /// # Errors
    ///
    /// [`PatternError::Compile`] if `source` is not a valid expression,
    /// [`PatternError::Synthesis`] if it uses constructs the synthesizer
    /// cannot sample (inner anchors, word boundaries).
    pub fn with_max_repeat(source: &str, max_repeat: u32) -> Result<Self, PatternError> {
        let mut pattern = Self::matcher_only(source)?;
        let synthesizer = rand_regex::Regex::compile(strip_anchors(source), max_repeat)
            .map_err(|e| PatternError::Synthesis {
                pattern: source.to_string(),
                reason: e.to_string(),
            })?;
        pattern.synthesizer = Some(synthesizer);
        Ok(pattern)
    }

    /// Compile `source` for matching only. [`Pattern::generate`] on the
    /// result yields `None`.
    pub fn matcher_only(source: &str) -> Result<Self, PatternError> {
        let matcher = regex::Regex::new(source).map_err(|e| PatternError::Compile {
            pattern: source.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            source: source.to_string(),
            matcher,
            synthesizer: None,
        })
    }

    /// The pattern source text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Test a candidate string.
    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }

    /// Whether this pattern was compiled for synthesis.
    pub fn can_generate(&self) -> bool {
        self.synthesizer.is_some()
    }

    /// Synthesize a conforming string from the thread-local generator.
    pub fn generate(&self) -> Option<String> {
        self.generate_with(&mut rand::thread_rng())
    }

    /// Synthesize a conforming string from a caller-supplied generator.
    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        self.synthesizer
            .as_ref()
            .map(|synthesizer| Distribution::<String>::sample(synthesizer, rng))
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

/// Remove a leading `^` and an unescaped trailing `$`.
fn strip_anchors(source: &str) -> &str {
    let body = source.strip_prefix('^').unwrap_or(source);
    match body.strip_suffix('$') {
        Some(rest) if !ends_with_escape(rest) => rest,
        _ => body,
    }
}

/// Whether `text` ends in an odd run of backslashes.
fn ends_with_escape(text: &str) -> bool {
    text.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}
