use std::collections::HashMap;

use log::{debug, warn};
use uuid::Uuid;

use crate::aligner::AlignmentGroup;
use crate::tei::parser::{AlignableUnit, TeiDocument};
use crate::text_cleaner::clean;

// @module: Alignment-to-structure mapping, the core matching engine

/// Spans shorter than this fraction of their unit's text are classified as
/// sentence-level; an exact match is always paragraph-level. The residual
/// band (>= 0.9 but not exact) defaults to paragraph-level.
const SENTENCE_COVERAGE_THRESHOLD: f64 = 0.9;

/// Whether an aligned span corresponds to a whole unit or a part of one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// Span covers the unit's full text; the unit itself carries the id
    Paragraph,
    /// Span is a proper sub-span; projected as a `seg` child
    Sentence,
}

/// One aligned text span resolved to a document unit, with its generated
/// cross-reference identifier
#[derive(Debug, Clone)]
pub struct MapEntry {
    /// Globally unique xml:id value
    pub id: String,

    /// Position ordinal of the unit this span belongs to
    pub unit_position: usize,

    /// The aligned span text (cleaned)
    pub text: String,

    /// Whole-unit or sub-unit correspondence
    pub granularity: Granularity,
}

/// All map entries for one side of the alignment
#[derive(Debug, Clone, Default)]
pub struct AlignmentMap {
    /// Entries in group order; group spans first, sub-sentence entries after
    /// their group's span
    pub entries: Vec<MapEntry>,
}

impl AlignmentMap {
    /// Entries attached to the unit at the given position ordinal
    pub fn entries_for_position(&self, position: usize) -> impl Iterator<Item = &MapEntry> {
        self.entries
            .iter()
            .filter(move |e| e.unit_position == position)
    }
}

/// One prospective standoff link, one per alignment group. A side is `None`
/// when the group's span could not be attributed to any surviving unit;
/// a recoverable outcome, never an error.
#[derive(Debug, Clone)]
pub struct PendingLink {
    /// Id of the source-side span entry, if mapped
    pub source_id: Option<String>,

    /// Id of the target-side span entry, if mapped
    pub target_id: Option<String>,

    /// Confidence score carried over from the group
    pub score: f32,
}

/// Generate a fresh cross-reference identifier.
///
/// Random 128-bit ids make collisions structurally impossible within a
/// request and across concurrent requests. Never derived from content:
/// repeated sentence text in distinct groups must still get distinct ids.
/// The prefix keeps the value a valid NCName (xml:id cannot start with a digit).
fn new_id() -> String {
    format!("s-{}", Uuid::new_v4())
}

/// Resolves aligned span texts to the units of one document side
struct UnitResolver<'a> {
    units: &'a [AlignableUnit],
    /// Exact cleaned text -> index into `units`; first occurrence in document
    /// order wins, so duplicate-text units resolve to the earliest one
    by_text: HashMap<&'a str, usize>,
}

impl<'a> UnitResolver<'a> {
    fn new(units: &'a [AlignableUnit]) -> Self {
        let mut by_text = HashMap::new();
        for (idx, unit) in units.iter().enumerate() {
            by_text.entry(unit.text.as_str()).or_insert(idx);
        }
        Self { units, by_text }
    }

    /// Find the unit best containing the span: exact text match first, then
    /// the substring match with the highest coverage ratio (ties resolve to
    /// the first unit in document order). `None` means this side of the
    /// group cannot be attributed to any surviving unit.
    fn find_best_matching_unit(&self, span: &str) -> Option<&'a AlignableUnit> {
        if span.is_empty() {
            return None;
        }

        if let Some(&idx) = self.by_text.get(span) {
            return Some(&self.units[idx]);
        }

        let mut best: Option<(&AlignableUnit, f64)> = None;
        for unit in self.units {
            if unit.text.contains(span) {
                let ratio = span.len() as f64 / unit.text.len() as f64;
                // Strictly greater keeps the first unit on ties
                if best.map_or(true, |(_, best_ratio)| ratio > best_ratio) {
                    best = Some((unit, ratio));
                }
            }
        }
        best.map(|(unit, _)| unit)
    }
}

/// Decide the granularity of a span relative to the unit that contains it
fn classify(span: &str, unit: &AlignableUnit) -> Granularity {
    if span == unit.text {
        return Granularity::Paragraph;
    }
    if unit.text.contains(span)
        && (span.len() as f64) < SENTENCE_COVERAGE_THRESHOLD * unit.text.len() as f64
    {
        return Granularity::Sentence;
    }
    // Ambiguous residual: conservative paragraph-level default
    Granularity::Paragraph
}

/// Build one side's map and return the span-entry id for each group
fn build_side_map(
    units: &[AlignableUnit],
    groups: &[AlignmentGroup],
    side_sentences: fn(&AlignmentGroup) -> &[String],
    side_name: &str,
) -> (AlignmentMap, Vec<Option<String>>) {
    let resolver = UnitResolver::new(units);
    let mut map = AlignmentMap::default();
    let mut span_ids = Vec::with_capacity(groups.len());

    for (group_idx, group) in groups.iter().enumerate() {
        let sentences = side_sentences(group);
        let span = clean(&AlignmentGroup::span_text(sentences));

        let span_id = match resolver.find_best_matching_unit(&span) {
            Some(unit) => {
                let id = new_id();
                map.entries.push(MapEntry {
                    id: id.clone(),
                    unit_position: unit.position,
                    text: span.clone(),
                    granularity: classify(&span, unit),
                });
                Some(id)
            }
            None => {
                if !span.is_empty() {
                    warn!(
                        "Group {}: {} span could not be attributed to any unit: \"{}\"",
                        group_idx, side_name, span
                    );
                }
                None
            }
        };
        span_ids.push(span_id);

        // Second pass: multi-sentence groups also register each sentence on
        // its own, so a paragraph aligned as one block can still expose
        // per-sentence sub-identifiers
        if sentences.len() >= 2 {
            for sentence in sentences {
                let sentence = clean(sentence);
                match resolver.find_best_matching_unit(&sentence) {
                    Some(unit) => {
                        let granularity = classify(&sentence, unit);
                        map.entries.push(MapEntry {
                            id: new_id(),
                            unit_position: unit.position,
                            text: sentence,
                            granularity,
                        });
                    }
                    None => debug!(
                        "Group {}: {} sentence not attributable: \"{}\"",
                        group_idx, side_name, sentence
                    ),
                }
            }
        }
    }

    (map, span_ids)
}

/// Build both sides' alignment maps and the prospective links.
///
/// The two maps are independent; identifiers are unique across both (and
/// across the whole process). One [`PendingLink`] is produced per group,
/// with unmapped sides recorded as `None`.
pub fn build_maps(
    source: &TeiDocument,
    target: &TeiDocument,
    groups: &[AlignmentGroup],
) -> (AlignmentMap, AlignmentMap, Vec<PendingLink>) {
    fn source_side(group: &AlignmentGroup) -> &[String] {
        &group.source_sentences
    }
    fn target_side(group: &AlignmentGroup) -> &[String] {
        &group.target_sentences
    }

    let (source_map, source_ids) = build_side_map(&source.units, groups, source_side, "source");
    let (target_map, target_ids) = build_side_map(&target.units, groups, target_side, "target");

    let links = groups
        .iter()
        .zip(source_ids)
        .zip(target_ids)
        .map(|((group, source_id), target_id)| PendingLink {
            source_id,
            target_id,
            score: group.score,
        })
        .collect();

    (source_map, target_map, links)
}
