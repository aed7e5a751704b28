use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};

use crate::aligner::{Aligner, AlignerParams, AlignmentGroup};
use crate::errors::AppError;
use crate::language_utils::{DEFAULT_LANGUAGE, validate_supported_language};
use crate::tei::{assemble, build_maps, parse_tei, project};

// @module: Request-scoped alignment pipeline over an aligner backend

/// Separator used when feeding unit texts to the aligner. A blank line keeps
/// every unit's sentences atomic for the boundary detector while still
/// letting it split inside a unit.
const UNIT_SEPARATOR: &str = "\n\n";

/// Result of a plain-text alignment
#[derive(Debug, Clone)]
pub struct AlignmentResult {
    /// Alignment groups in source order
    pub groups: Vec<AlignmentGroup>,

    /// Validated source language code
    pub source_language: String,

    /// Validated target language code
    pub target_language: String,

    /// Wall-clock pipeline time in seconds
    pub processing_time: f64,

    /// Sentences detected in the source text
    pub source_sentence_count: usize,

    /// Sentences detected in the target text
    pub target_sentence_count: usize,
}

/// Result of a TEI document alignment
#[derive(Debug, Clone)]
pub struct TeiAlignmentResult {
    /// Serialized aligned corpus XML
    pub aligned_xml: String,

    /// Source language used for the alignment
    pub source_language: String,

    /// Target language used for the alignment
    pub target_language: String,

    /// Number of standoff links in the output
    pub alignment_count: usize,

    /// Wall-clock pipeline time in seconds
    pub processing_time: f64,
}

/// The alignment pipeline: parse, align, map, project, assemble.
///
/// Stateless between calls; every invocation builds its own documents and
/// identifier scope, so instances can be shared freely across tasks.
pub struct AlignmentService {
    /// Backend performing the semantic sentence alignment
    aligner: Arc<dyn Aligner>,
}

impl AlignmentService {
    /// Create a service around an aligner backend
    pub fn new(aligner: Arc<dyn Aligner>) -> Self {
        Self { aligner }
    }

    /// Align two plain texts.
    ///
    /// Languages are validated against the supported set before any
    /// alignment work starts.
    pub async fn align_plain_text(
        &self,
        source_text: &str,
        target_text: &str,
        source_lang: &str,
        target_lang: &str,
        params: &AlignerParams,
    ) -> Result<AlignmentResult, AppError> {
        let start = Instant::now();

        let source_lang = validate_supported_language(source_lang)?;
        let target_lang = validate_supported_language(target_lang)?;
        params.validate()?;

        info!("Aligning plain text {} -> {}", source_lang, target_lang);
        let outcome = self
            .aligner
            .align(source_text, target_text, &source_lang, &target_lang, params)
            .await?;

        Ok(AlignmentResult {
            groups: outcome.groups,
            source_language: source_lang,
            target_language: target_lang,
            processing_time: start.elapsed().as_secs_f64(),
            source_sentence_count: outcome.source_sentence_count,
            target_sentence_count: outcome.target_sentence_count,
        })
    }

    /// Align two TEI documents and emit the standoff corpus.
    ///
    /// Omitted languages fall back to each document's metadata language,
    /// then to the fixed default when the metadata is the "unknown"
    /// sentinel. Parsing happens before the aligner is invoked, so malformed
    /// input aborts without any alignment work.
    pub async fn align_tei_documents(
        &self,
        source_xml: &str,
        target_xml: &str,
        source_lang: Option<&str>,
        target_lang: Option<&str>,
        params: &AlignerParams,
    ) -> Result<TeiAlignmentResult, AppError> {
        let start = Instant::now();

        let source_doc = parse_tei(source_xml)?;
        let target_doc = parse_tei(target_xml)?;

        let source_lang = resolve_language(source_lang, &source_doc.language)?;
        let target_lang = resolve_language(target_lang, &target_doc.language)?;
        info!(
            "Aligning TEI documents \"{}\" ({}) -> \"{}\" ({})",
            source_doc.title, source_lang, target_doc.title, target_lang
        );

        // Units are joined with blank lines and the backend detects sentence
        // boundaries itself; pre-split mode would force one sentence per unit
        // and defeat sub-paragraph alignment
        let source_payload = source_doc.unit_texts().join(UNIT_SEPARATOR);
        let target_payload = target_doc.unit_texts().join(UNIT_SEPARATOR);
        let mut aligner_params = params.clone();
        aligner_params.pre_split = false;

        let outcome = self
            .aligner
            .align(
                &source_payload,
                &target_payload,
                &source_lang,
                &target_lang,
                &aligner_params,
            )
            .await?;
        debug!(
            "Aligner produced {} groups for {} source / {} target units",
            outcome.groups.len(),
            source_doc.units.len(),
            target_doc.units.len()
        );

        let (source_map, target_map, links) =
            build_maps(&source_doc, &target_doc, &outcome.groups);

        let source_projection = project(&source_doc, &source_map, &source_lang)?;
        let target_projection = project(&target_doc, &target_map, &target_lang)?;

        let corpus = assemble(
            &source_projection,
            &target_projection,
            &links,
            &source_lang,
            &target_lang,
        )?;

        let processing_time = start.elapsed().as_secs_f64();
        info!(
            "TEI alignment finished: {} links in {:.2}s",
            corpus.link_count, processing_time
        );

        Ok(TeiAlignmentResult {
            aligned_xml: corpus.xml,
            source_language: source_lang,
            target_language: target_lang,
            alignment_count: corpus.link_count,
            processing_time,
        })
    }
}

/// Pick the language for one side: explicit request first, then document
/// metadata, then the fixed default for the "unknown" sentinel. The chosen
/// code is always validated against the supported set.
fn resolve_language(requested: Option<&str>, extracted: &str) -> Result<String, AppError> {
    let candidate = match requested {
        Some(code) => code,
        None if extracted == "unknown" => DEFAULT_LANGUAGE,
        None => extracted,
    };
    Ok(validate_supported_language(candidate)?)
}
