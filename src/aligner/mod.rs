/*!
 * Aligner implementations and the common aligner interface.
 *
 * The semantic sentence alignment itself is an external collaborator: given
 * two texts and a parameter set it returns an ordered sequence of alignment
 * groups. This module contains:
 * - The `Aligner` trait every backend implements
 * - `remote`: HTTP client for a sentence-alignment inference service
 * - `mock`: scripted backend for tests and offline runs
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::errors::AlignerError;

pub mod mock;
pub mod remote;

/// Tuning parameters passed through to the alignment search.
///
/// Defaults mirror the inference service's own defaults; `validate` enforces
/// the ranges the service accepts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlignerParams {
    /// Maximum number of sentences that may be grouped in one alignment (1-10)
    #[serde(default = "default_max_align")]
    pub max_align: u32,

    /// Number of top candidate alignments considered during search (1-10)
    #[serde(default = "default_top_k")]
    pub top_k: u32,

    /// Search window size for alignment candidates (1-20)
    #[serde(default = "default_window")]
    pub window: u32,

    /// Penalty for skipping sentences, in [-1.0, 0.0]
    #[serde(default = "default_skip_penalty")]
    pub skip_penalty: f32,

    /// Use margin-based scoring
    #[serde(default = "default_true")]
    pub use_margin: bool,

    /// Apply length-based penalties
    #[serde(default = "default_true")]
    pub use_length_penalty: bool,

    /// Treat the input as pre-split, one sentence per line. The TEI pipeline
    /// always passes false so a paragraph's sentences can align independently.
    #[serde(default)]
    pub pre_split: bool,
}

fn default_max_align() -> u32 {
    5
}

fn default_top_k() -> u32 {
    3
}

fn default_window() -> u32 {
    5
}

fn default_skip_penalty() -> f32 {
    -0.1
}

fn default_true() -> bool {
    true
}

impl Default for AlignerParams {
    fn default() -> Self {
        Self {
            max_align: default_max_align(),
            top_k: default_top_k(),
            window: default_window(),
            skip_penalty: default_skip_penalty(),
            use_margin: true,
            use_length_penalty: true,
            pre_split: false,
        }
    }
}

impl AlignerParams {
    /// Validate parameter ranges before sending them to a backend
    pub fn validate(&self) -> Result<(), AlignerError> {
        if !(1..=10).contains(&self.max_align) {
            return Err(AlignerError::AlignmentFailed(format!(
                "max_align must be between 1 and 10, got {}",
                self.max_align
            )));
        }
        if !(1..=10).contains(&self.top_k) {
            return Err(AlignerError::AlignmentFailed(format!(
                "top_k must be between 1 and 10, got {}",
                self.top_k
            )));
        }
        if !(1..=20).contains(&self.window) {
            return Err(AlignerError::AlignmentFailed(format!(
                "window must be between 1 and 20, got {}",
                self.window
            )));
        }
        if !(-1.0..=0.0).contains(&self.skip_penalty) {
            return Err(AlignerError::AlignmentFailed(format!(
                "skip_penalty must be between -1.0 and 0.0, got {}",
                self.skip_penalty
            )));
        }
        Ok(())
    }
}

/// One alignment group returned by a backend.
///
/// Pairs a possibly empty subset of source sentences with a possibly empty
/// subset of target sentences (empty on one side means insertion/deletion,
/// never both). Groups arrive ordered by first occurrence in the source
/// sequence and are immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlignmentGroup {
    /// Source sentences grouped together, in source order
    pub source_sentences: Vec<String>,

    /// Target sentences grouped together, in target order
    pub target_sentences: Vec<String>,

    /// Zero-based indices of the source sentences in the detected sentence list
    pub source_indices: Vec<usize>,

    /// Zero-based indices of the target sentences in the detected sentence list
    pub target_indices: Vec<usize>,

    /// Confidence score in [0, 1]
    #[serde(default, rename = "alignment_score")]
    pub score: f32,
}

impl AlignmentGroup {
    /// A side's sentences joined with a single space, trimmed. This is the
    /// span text the mapper resolves against document units.
    pub fn span_text(sentences: &[String]) -> String {
        sentences.join(" ").trim().to_string()
    }
}

/// Result of one aligner invocation
#[derive(Debug, Clone)]
pub struct AlignerOutcome {
    /// Alignment groups in source order
    pub groups: Vec<AlignmentGroup>,

    /// Number of sentences the backend detected in the source text
    pub source_sentence_count: usize,

    /// Number of sentences the backend detected in the target text
    pub target_sentence_count: usize,
}

/// Common trait for all aligner backends
///
/// The call is blocking from the pipeline's point of view: no cancellation is
/// exposed, and a caller-side timeout must wrap the whole pipeline invocation.
#[async_trait]
pub trait Aligner: Send + Sync + Debug {
    /// Align two texts and return the alignment groups
    ///
    /// # Arguments
    /// * `source_text` - Source-side text, raw or pre-split per `params`
    /// * `target_text` - Target-side text
    /// * `source_lang` / `target_lang` - ISO 639-1 codes from the supported set
    /// * `params` - Alignment search parameters
    ///
    /// # Returns
    /// * `Result<AlignerOutcome, AlignerError>` - Groups plus sentence counts, or an error
    async fn align(
        &self,
        source_text: &str,
        target_text: &str,
        source_lang: &str,
        target_lang: &str,
        params: &AlignerParams,
    ) -> Result<AlignerOutcome, AlignerError>;

    /// Test the connection to the backend
    ///
    /// # Returns
    /// * `Result<(), AlignerError>` - Ok if the backend is reachable
    async fn test_connection(&self) -> Result<(), AlignerError>;
}
