/*!
 * Mock aligner implementations for testing.
 *
 * This module provides mock backends that simulate different behaviors:
 * - `MockAligner::one_to_one()` - Pairs detected sentences index-wise
 * - `MockAligner::scripted(groups)` - Returns a fixed set of groups
 * - `MockAligner::failing()` - Always fails with an error
 * - `MockAligner::empty()` - Succeeds with no groups
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::aligner::{Aligner, AlignerOutcome, AlignerParams, AlignmentGroup};
use crate::errors::AlignerError;

/// Behavior mode for the mock aligner
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Detect sentences naively and pair them index-wise as 1:1 groups
    OneToOne,
    /// Return exactly these groups, ignoring the input texts
    Scripted(Vec<AlignmentGroup>),
    /// Always fail with an alignment error
    Failing,
    /// Succeed with an empty group list
    Empty,
}

/// Mock aligner for exercising the pipeline without a model
#[derive(Debug)]
pub struct MockAligner {
    /// Behavior mode
    behavior: MockBehavior,
    /// Number of align calls received, for asserting the pipeline aborted
    /// before invoking the backend
    call_count: Arc<AtomicUsize>,
}

impl MockAligner {
    /// Create a new mock aligner with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a mock that pairs detected sentences one-to-one
    pub fn one_to_one() -> Self {
        Self::new(MockBehavior::OneToOne)
    }

    /// Create a mock that returns a fixed set of groups
    pub fn scripted(groups: Vec<AlignmentGroup>) -> Self {
        Self::new(MockBehavior::Scripted(groups))
    }

    /// Create a failing mock that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns no groups
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Shared handle to the align-call counter
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.call_count)
    }

    /// Naive sentence boundary detection on terminal punctuation.
    /// Good enough to stand in for the real detector in tests.
    pub fn split_sentences(text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut current = String::new();

        for ch in text.chars() {
            current.push(ch);
            if matches!(ch, '.' | '!' | '?') {
                let trimmed = current.trim();
                if !trimmed.is_empty() {
                    sentences.push(trimmed.to_string());
                }
                current.clear();
            }
        }

        let trailing = current.trim();
        if !trailing.is_empty() {
            sentences.push(trailing.to_string());
        }

        sentences
    }

    fn align_one_to_one(source_text: &str, target_text: &str) -> AlignerOutcome {
        let source_sentences = Self::split_sentences(source_text);
        let target_sentences = Self::split_sentences(target_text);

        let paired = source_sentences.len().min(target_sentences.len());
        let mut groups = Vec::with_capacity(paired);
        for i in 0..paired {
            groups.push(AlignmentGroup {
                source_sentences: vec![source_sentences[i].clone()],
                target_sentences: vec![target_sentences[i].clone()],
                source_indices: vec![i],
                target_indices: vec![i],
                score: 0.9,
            });
        }

        AlignerOutcome {
            groups,
            source_sentence_count: source_sentences.len(),
            target_sentence_count: target_sentences.len(),
        }
    }
}

#[async_trait]
impl Aligner for MockAligner {
    async fn align(
        &self,
        source_text: &str,
        target_text: &str,
        _source_lang: &str,
        _target_lang: &str,
        params: &AlignerParams,
    ) -> Result<AlignerOutcome, AlignerError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        params.validate()?;

        match &self.behavior {
            MockBehavior::OneToOne => Ok(Self::align_one_to_one(source_text, target_text)),
            MockBehavior::Scripted(groups) => Ok(AlignerOutcome {
                source_sentence_count: groups.iter().map(|g| g.source_sentences.len()).sum(),
                target_sentence_count: groups.iter().map(|g| g.target_sentences.len()).sum(),
                groups: groups.clone(),
            }),
            MockBehavior::Failing => Err(AlignerError::AlignmentFailed(
                "mock aligner configured to fail".to_string(),
            )),
            MockBehavior::Empty => Ok(AlignerOutcome {
                groups: Vec::new(),
                source_sentence_count: 0,
                target_sentence_count: 0,
            }),
        }
    }

    async fn test_connection(&self) -> Result<(), AlignerError> {
        match self.behavior {
            MockBehavior::Failing => Err(AlignerError::ConnectionError(
                "mock aligner configured to fail".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
