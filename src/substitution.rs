//! Longest-key-first substitution engine.
//!
//! Conversion runs one pass per dictionary key, longest key first. Each pass
//! replaces every non-overlapping occurrence of its key, left to right, in the
//! output of the previous pass. A replacement inserted by an earlier pass can
//! therefore be matched again by a later, shorter key; that is part of the
//! defined output and must not be "optimized" into a single simultaneous scan.
//!
//! ```
//! use mayek_normalize::dictionary_lib::Dictionary;
//! use mayek_normalize::substitution::convert;
//!
//! let dict = Dictionary::from_pairs([("ab", "X"), ("a", "Y")]).unwrap();
//! assert_eq!(convert("ab", &dict).unwrap(), "X");
//! assert_eq!(convert("a ab", &dict).unwrap(), "Y X");
//! ```

use std::borrow::Cow;
use std::cmp::Reverse;

use rayon::prelude::*;
use regex::{NoExpand, Regex};
use thiserror::Error;
use tracing::{debug, trace};

use crate::dictionary_lib::Dictionary;

/// Inputs shorter than this (in bytes) are always converted on the calling thread.
pub const PARALLEL_THRESHOLD: usize = 64 * 1024;

/// Approximate chunk size (in bytes) for parallel conversion. Chunks are
/// extended to the next line end.
pub const CHUNK_BYTES: usize = 16 * 1024;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// The input was empty or whitespace only.
    #[error("Please enter some text to convert")]
    EmptyInput,
    /// Substitution could not be carried out; no output was produced.
    #[error("Error converting text: {0}")]
    ConversionFailed(String),
    #[error("Input is too large: {chars} characters (limit {limit})")]
    InputTooLarge { chars: usize, limit: usize },
}

#[derive(Debug, Clone)]
struct ReplacePass {
    pattern: Regex,
    replacement: String,
}

/// The ordered, compiled pass list for one [`Dictionary`].
///
/// Built once per dictionary (see `Dictionary::plan`) and then shared by every
/// conversion that uses that dictionary.
#[derive(Debug, Clone)]
pub struct SubstitutionPlan {
    passes: Vec<ReplacePass>,
    // true if any applied key contains a line break
    spans_lines: bool,
}

impl SubstitutionPlan {
    /// Compiles one literal matcher per key, in [`ordered_keys`] order.
    ///
    /// Keys that map to themselves are left out: replacing every occurrence of
    /// a key with the same text cannot change the output of that pass or of
    /// any later pass.
    ///
    /// # Errors
    /// [`ConversionError::ConversionFailed`] if a key cannot be compiled.
    pub fn build(dictionary: &Dictionary) -> Result<Self, ConversionError> {
        let mut passes = Vec::with_capacity(dictionary.len());
        let mut spans_lines = false;
        let mut identity = 0usize;

        for key in ordered_keys(dictionary) {
            let replacement = dictionary.get(key).unwrap_or_default();
            if replacement == key {
                identity += 1;
                continue;
            }
            let pattern = Regex::new(&regex::escape(key)).map_err(|err| {
                ConversionError::ConversionFailed(format!("cannot compile key {:?}: {}", key, err))
            })?;
            spans_lines |= key.contains('\n');
            passes.push(ReplacePass {
                pattern,
                replacement: replacement.to_owned(),
            });
        }

        debug!(
            passes = passes.len(),
            skipped_identity = identity,
            spans_lines,
            "built substitution plan"
        );

        Ok(Self {
            passes,
            spans_lines,
        })
    }

    /// Number of passes that can change the text.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Runs every pass over `text`, sequentially.
    pub fn apply(&self, text: &str) -> String {
        let mut current = text.to_owned();
        for pass in &self.passes {
            let replaced = match pass
                .pattern
                .replace_all(&current, NoExpand(&pass.replacement))
            {
                Cow::Borrowed(_) => continue,
                Cow::Owned(replaced) => replaced,
            };
            current = replaced;
        }
        current
    }

    /// Same output as [`apply`](Self::apply), converting line-aligned chunks
    /// on the rayon pool when the input is large enough.
    ///
    /// No match can cross a line end unless a key contains one, so chunks are
    /// independent; plans with such keys always run sequentially.
    pub fn apply_parallel(&self, text: &str) -> String {
        if self.spans_lines || text.len() < PARALLEL_THRESHOLD {
            return self.apply(text);
        }

        let chunks = split_line_chunks(text, CHUNK_BYTES);
        trace!(chunks = chunks.len(), "converting in parallel");

        chunks
            .par_iter()
            .map(|chunk| self.apply(chunk))
            .collect::<Vec<String>>()
            .concat()
    }
}

/// Keys of `dictionary` in pass order: longest first by character count, ties
/// broken by ascending key so the order never depends on hash iteration.
pub fn ordered_keys(dictionary: &Dictionary) -> Vec<&str> {
    let mut keys: Vec<(usize, &str)> = dictionary
        .iter()
        .map(|(key, _)| (key.chars().count(), key))
        .collect();
    keys.sort_unstable_by(|(a_len, a), (b_len, b)| {
        (Reverse(a_len), a).cmp(&(Reverse(b_len), b))
    });
    keys.into_iter().map(|(_, key)| key).collect()
}

/// Converts `text` with `dictionary` on the calling thread.
///
/// # Errors
/// - [`ConversionError::EmptyInput`] if `text` is empty or whitespace only.
/// - [`ConversionError::ConversionFailed`] if the dictionary cannot be compiled.
pub fn convert(text: &str, dictionary: &Dictionary) -> Result<String, ConversionError> {
    ensure_not_blank(text)?;
    let plan = dictionary.plan()?;
    let output = plan.apply(text);
    debug!(
        input_bytes = text.len(),
        output_bytes = output.len(),
        "converted text"
    );
    Ok(output)
}

/// Like [`convert`], but large inputs are split into line-aligned chunks and
/// converted on the rayon pool. The output is identical.
pub fn convert_parallel(text: &str, dictionary: &Dictionary) -> Result<String, ConversionError> {
    ensure_not_blank(text)?;
    let plan = dictionary.plan()?;
    let output = plan.apply_parallel(text);
    debug!(
        input_bytes = text.len(),
        output_bytes = output.len(),
        "converted text (parallel)"
    );
    Ok(output)
}

fn ensure_not_blank(text: &str) -> Result<(), ConversionError> {
    if text.trim().is_empty() {
        return Err(ConversionError::EmptyInput);
    }
    Ok(())
}

/// Splits `text` into chunks of at least `target` bytes, each ending right
/// after a `\n` (the last chunk may end without one).
fn split_line_chunks(text: &str, target: usize) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut chunks = Vec::with_capacity(bytes.len() / target.max(1) + 1);
    let mut start = 0;

    while start < bytes.len() {
        let probe = (start + target.max(1)).min(bytes.len());
        // '\n' is never part of a multi-byte sequence, so `cut` is a char boundary
        let cut = bytes[probe..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(bytes.len(), |pos| probe + pos + 1);
        chunks.push(&text[start..cut]);
        start = cut;
    }

    chunks
}
