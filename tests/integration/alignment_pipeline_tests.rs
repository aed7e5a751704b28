/*!
 * End-to-end tests for the TEI alignment pipeline
 *
 * These tests drive the full parse -> align -> map -> project -> assemble
 * flow through `AlignmentService` with scripted mock aligners.
 */

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use tokio_test;

use teialign::aligner::AlignerParams;
use teialign::aligner::mock::MockAligner;
use teialign::alignment_service::AlignmentService;
use teialign::errors::{AlignerError, AppError, TeiError};
use teialign::xml_tree::{XmlElement, parse};

use crate::common::{collect_link_refs, collect_xml_ids, group, tei_document};

fn service_with(mock: MockAligner) -> (AlignmentService, Arc<std::sync::atomic::AtomicUsize>) {
    crate::common::init_test_logging();
    let counter = mock.call_counter();
    (AlignmentService::new(Arc::new(mock)), counter)
}

fn find_tei_documents(corpus: &XmlElement) -> Vec<&XmlElement> {
    corpus
        .child_elements()
        .filter(|e| e.local_name() == "TEI")
        .collect()
}

/// Scenario: every paragraph pairs one-to-one with a whole target paragraph
#[tokio::test]
async fn test_pipeline_withWholeParagraphAlignment_shouldTagParagraphs() {
    let source_xml = tei_document("en", "Source", &["The cat sat.", "The dog ran."]);
    let target_xml = tei_document("fr", "Cible", &["Le chat s'assit.", "Le chien courut."]);
    let groups = vec![
        group(&["The cat sat."], &["Le chat s'assit."], 0.95),
        group(&["The dog ran."], &["Le chien courut."], 0.92),
    ];
    let (service, _) = service_with(MockAligner::scripted(groups));

    let result = service
        .align_tei_documents(&source_xml, &target_xml, None, None, &AlignerParams::default())
        .await
        .unwrap();

    assert_eq!(result.source_language, "en");
    assert_eq!(result.target_language, "fr");
    assert_eq!(result.alignment_count, 2);

    let corpus = parse(&result.aligned_xml).unwrap();
    assert_eq!(corpus.name, "teiCorpus");

    let documents = find_tei_documents(&corpus);
    assert_eq!(documents.len(), 2);

    // Every paragraph carries an identifier; no seg splitting happened
    for doc in &documents {
        let body = doc.find_descendant("body").unwrap();
        for p in body.child_elements() {
            assert!(p.attr("xml:id").is_some());
        }
    }
    assert_eq!(corpus.count_descendants("seg"), 0);

    // Both links reference both sides, and every reference resolves
    let mut ids = HashSet::new();
    collect_xml_ids(&corpus, &mut ids);
    let mut refs = Vec::new();
    collect_link_refs(&corpus, &mut refs);
    assert_eq!(refs.len(), 4);
    for reference in &refs {
        assert!(ids.contains(reference), "dangling reference {}", reference);
    }
}

/// Scenario: one source sentence aligns to two target sentences inside one
/// target paragraph
#[tokio::test]
async fn test_pipeline_withOneToTwoAlignment_shouldSegmentTargetParagraph() {
    let source_xml = tei_document("en", "Source", &["Good morning everyone."]);
    let target_xml = tei_document("fr", "Cible", &["Bonjour à tous. Bonne journée."]);
    let groups = vec![group(
        &["Good morning everyone."],
        &["Bonjour à tous.", "Bonne journée."],
        0.88,
    )];
    let (service, _) = service_with(MockAligner::scripted(groups));

    let result = service
        .align_tei_documents(&source_xml, &target_xml, None, None, &AlignerParams::default())
        .await
        .unwrap();
    assert_eq!(result.alignment_count, 1);

    let corpus = parse(&result.aligned_xml).unwrap();
    let documents = find_tei_documents(&corpus);

    // Source paragraph is tagged whole
    let source_p = documents[0].find_descendant("body").unwrap().child("p").unwrap();
    assert!(source_p.attr("xml:id").is_some());

    // The target paragraph carries the span id and both sentences as segs
    let target_p = documents[1].find_descendant("body").unwrap().child("p").unwrap();
    assert!(target_p.attr("xml:id").is_some());
    let segs: Vec<&XmlElement> = target_p
        .child_elements()
        .filter(|e| e.local_name() == "seg")
        .collect();
    assert_eq!(segs.len(), 2);
    assert_eq!(segs[0].text_content(), "Bonjour à tous.");
    assert_eq!(segs[1].text_content(), "Bonne journée.");
    assert_eq!(target_p.text_content(), "Bonjour à tous. Bonne journée.");

    // The link joins the two whole-span identifiers
    let link = corpus.find_descendant("link").unwrap();
    let target_attr = link.attr("target").unwrap();
    assert!(target_attr.contains(source_p.attr("xml:id").unwrap()));
    assert!(target_attr.contains(target_p.attr("xml:id").unwrap()));
}

/// Scenario: a three-sentence source paragraph splits across three target
/// paragraphs, one seg and one link per sentence
#[tokio::test]
async fn test_pipeline_withSubParagraphAlignment_shouldSegmentSourceParagraph() {
    let source_xml = tei_document(
        "en",
        "Source",
        &["First sentence here. Second sentence there. Third sentence everywhere."],
    );
    let target_xml = tei_document(
        "fr",
        "Cible",
        &["Première phrase ici.", "Deuxième phrase là.", "Troisième phrase partout."],
    );
    let groups = vec![
        group(&["First sentence here."], &["Première phrase ici."], 0.9),
        group(&["Second sentence there."], &["Deuxième phrase là."], 0.9),
        group(&["Third sentence everywhere."], &["Troisième phrase partout."], 0.9),
    ];
    let (service, _) = service_with(MockAligner::scripted(groups));

    let result = service
        .align_tei_documents(&source_xml, &target_xml, None, None, &AlignerParams::default())
        .await
        .unwrap();
    assert_eq!(result.alignment_count, 3);

    let corpus = parse(&result.aligned_xml).unwrap();
    let documents = find_tei_documents(&corpus);

    // Source paragraph is split into three segs and itself stays untagged
    let source_p = documents[0].find_descendant("body").unwrap().child("p").unwrap();
    assert!(source_p.attr("xml:id").is_none());
    assert_eq!(source_p.count_descendants("seg"), 3);
    assert_eq!(
        source_p.text_content(),
        "First sentence here. Second sentence there. Third sentence everywhere."
    );

    // Target paragraphs are tagged whole
    let target_body = documents[1].find_descendant("body").unwrap();
    for p in target_body.child_elements() {
        assert!(p.attr("xml:id").is_some());
        assert_eq!(p.count_descendants("seg"), 0);
    }

    // Six distinct identifiers, all link references resolvable
    let mut ids = HashSet::new();
    collect_xml_ids(&corpus, &mut ids);
    assert_eq!(ids.len(), 6);
    let mut refs = Vec::new();
    collect_link_refs(&corpus, &mut refs);
    assert_eq!(refs.len(), 6);
    for reference in &refs {
        assert!(ids.contains(reference));
    }
}

/// Scenario: a many-to-many group followed by a one-to-many group produces
/// two links and no identifier reuse
#[tokio::test]
async fn test_pipeline_withManyToManyThenOneToMany_shouldKeepIdsDistinct() {
    let source_xml = tei_document("en", "Source", &["Alpha one. Alpha two.", "Beta single."]);
    let target_xml = tei_document("fr", "Cible", &["Un alpha. Deux alpha.", "Beta un. Beta deux."]);
    let groups = vec![
        group(&["Alpha one.", "Alpha two."], &["Un alpha.", "Deux alpha."], 0.91),
        group(&["Beta single."], &["Beta un.", "Beta deux."], 0.87),
    ];
    let (service, _) = service_with(MockAligner::scripted(groups));

    let result = service
        .align_tei_documents(&source_xml, &target_xml, None, None, &AlignerParams::default())
        .await
        .unwrap();
    assert_eq!(result.alignment_count, 2);

    let corpus = parse(&result.aligned_xml).unwrap();

    // Multi-sentence sides expose per-sentence segs on top of the whole-unit
    // identifier: 3 ids on the first source paragraph, 1 on the second,
    // 3 on each target paragraph
    let mut ids = HashSet::new();
    collect_xml_ids(&corpus, &mut ids);
    assert_eq!(ids.len(), 10);

    let mut refs = Vec::new();
    collect_link_refs(&corpus, &mut refs);
    assert_eq!(refs.len(), 4);
    for reference in &refs {
        assert!(ids.contains(reference));
    }
}

/// Test malformed input aborts before the aligner is ever invoked
#[tokio::test]
async fn test_pipeline_withMalformedXml_shouldFailBeforeAlignerCall() {
    let valid = tei_document("en", "S", &["Text."]);
    let (service, counter) = service_with(MockAligner::one_to_one());

    let result = service
        .align_tei_documents("<TEI><text><body>", &valid, None, None, &AlignerParams::default())
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, AppError::Tei(TeiError::InvalidXml(_))));
    assert!(err.is_client_error());
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

/// Test an unsupported requested language aborts before the aligner call
#[tokio::test]
async fn test_pipeline_withUnsupportedLanguage_shouldFailBeforeAlignerCall() {
    let source_xml = tei_document("en", "S", &["Text."]);
    let target_xml = tei_document("fr", "T", &["Texte."]);
    let (service, counter) = service_with(MockAligner::one_to_one());

    let result = service
        .align_tei_documents(&source_xml, &target_xml, Some("ja"), None, &AlignerParams::default())
        .await;

    let err = result.unwrap_err();
    assert!(matches!(
        err,
        AppError::Aligner(AlignerError::UnsupportedLanguage(_))
    ));
    assert!(err.is_client_error());
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

/// Test the language fallback chain: explicit argument, then document
/// metadata, then the fixed default
#[tokio::test]
async fn test_pipeline_languageFallback_shouldUseMetadataThenDefault() {
    let metadata_doc = tei_document("de", "S", &["Text."]);
    let no_metadata_doc = "<TEI><text><body><p>Texte.</p></body></text></TEI>";
    let (service, _) = service_with(MockAligner::empty());

    let result = service
        .align_tei_documents(&metadata_doc, no_metadata_doc, None, None, &AlignerParams::default())
        .await
        .unwrap();
    assert_eq!(result.source_language, "de");
    assert_eq!(result.target_language, "en");

    // An explicit argument wins over metadata
    let (service, _) = service_with(MockAligner::empty());
    let result = service
        .align_tei_documents(&metadata_doc, no_metadata_doc, Some("nl"), Some("sv"), &AlignerParams::default())
        .await
        .unwrap();
    assert_eq!(result.source_language, "nl");
    assert_eq!(result.target_language, "sv");
}

/// Test an aligner returning no groups still yields a valid corpus
#[tokio::test]
async fn test_pipeline_withEmptyAlignment_shouldProduceCorpusWithoutLinks() {
    let source_xml = tei_document("en", "S", &["Alpha.", "Beta."]);
    let target_xml = tei_document("fr", "T", &["Un.", "Deux."]);
    let (service, _) = service_with(MockAligner::empty());

    let result = service
        .align_tei_documents(&source_xml, &target_xml, None, None, &AlignerParams::default())
        .await
        .unwrap();

    assert_eq!(result.alignment_count, 0);
    let corpus = parse(&result.aligned_xml).unwrap();
    assert_eq!(find_tei_documents(&corpus).len(), 2);
    assert_eq!(corpus.count_descendants("link"), 0);
}

/// Test aligner failures propagate as aligner errors
#[tokio::test]
async fn test_pipeline_withFailingAligner_shouldPropagateError() {
    let source_xml = tei_document("en", "S", &["Text."]);
    let target_xml = tei_document("fr", "T", &["Texte."]);
    let (service, counter) = service_with(MockAligner::failing());

    let result = service
        .align_tei_documents(&source_xml, &target_xml, None, None, &AlignerParams::default())
        .await;

    assert!(matches!(
        result.unwrap_err(),
        AppError::Aligner(AlignerError::AlignmentFailed(_))
    ));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

/// Test the plain-text path returns groups and sentence counts
#[test]
fn test_align_plain_text_withOneToOneMock_shouldReturnGroups() {
    let (service, counter) = service_with(MockAligner::one_to_one());

    let result = tokio_test::block_on(async {
        service
            .align_plain_text(
                "Hello there. How are you?",
                "Bonjour. Comment allez-vous? Bien.",
                "en",
                "fr",
                &AlignerParams::default(),
            )
            .await
    })
    .unwrap();

    assert_eq!(result.groups.len(), 2);
    assert_eq!(result.source_sentence_count, 2);
    assert_eq!(result.target_sentence_count, 3);
    assert_eq!(result.source_language, "en");
    assert!(result.processing_time >= 0.0);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

/// Test plain-text alignment validates languages before the aligner call
#[test]
fn test_align_plain_text_withUnsupportedLanguage_shouldFailEarly() {
    let (service, counter) = service_with(MockAligner::one_to_one());

    let result = tokio_test::block_on(async {
        service
            .align_plain_text("Text.", "Texte.", "en", "tlh", &AlignerParams::default())
            .await
    });

    assert!(result.is_err());
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}
