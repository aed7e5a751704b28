use std::collections::HashSet;

use log::{debug, warn};

use crate::errors::TeiError;
use crate::tei::mapper::{AlignmentMap, Granularity, MapEntry};
use crate::tei::parser::{TeiDocument, UnitKind};
use crate::text_cleaner::clean;
use crate::xml_tree::{XmlElement, XmlNode};

// @module: TEI tree projection, rewrites units with alignment identifiers

/// Minimum fraction of an element's text a paragraph-level entry must cover
/// when the texts are not identical. Guards the positional cross-check
/// against drifted content.
const OVERLAP_TOLERANCE: f64 = 0.8;

/// A document tree rewritten with alignment identifiers, plus the set of
/// identifiers actually emitted. The assembler uses the emitted set to drop
/// dangling link references.
#[derive(Debug)]
pub struct ProjectedDocument {
    /// The rewritten tree
    pub root: XmlElement,

    /// Every xml:id value present in the rewritten tree
    pub emitted_ids: HashSet<String>,
}

/// Project one side's alignment map onto a copy of the document tree.
///
/// Works on a structural clone of `document.root`; the parsed tree used for
/// matching is never touched. Every p/head element that participates in the
/// map is rewritten: sentence-level entries become `seg` children carrying
/// `xml:id`, a paragraph-level entry sets `xml:id` on the element itself,
/// and all original text content survives (whitespace-normalized). The
/// header's language declarations are replaced with a single declaration
/// for `language`, and an empty `facsimile` marker is appended.
pub fn project(
    document: &TeiDocument,
    map: &AlignmentMap,
    language: &str,
) -> Result<ProjectedDocument, TeiError> {
    let mut root = document.root.clone();
    let mut emitted_ids = HashSet::new();

    if let Some(body) = root.find_descendant_mut("body") {
        let mut position = 0usize;
        rewrite_units(body, &mut position, map, &mut emitted_ids);
    }

    replace_language(&mut root, language)?;

    // Marker for facsimile-less projected output
    let facsimile = XmlElement::new(with_prefix(name_prefix(&root.name), "facsimile"));
    root.push_element(facsimile);

    debug!(
        "Projected document with {} emitted identifiers (language {})",
        emitted_ids.len(),
        language
    );

    Ok(ProjectedDocument { root, emitted_ids })
}

/// Walk the body in the same pre-order as unit extraction, so position
/// ordinals line up between the parsed tree and this clone
fn rewrite_units(
    element: &mut XmlElement,
    position: &mut usize,
    map: &AlignmentMap,
    emitted_ids: &mut HashSet<String>,
) {
    for child in element.child_elements_mut() {
        if UnitKind::from_local_name(child.local_name()).is_some() {
            rewrite_one_unit(child, *position, map, emitted_ids);
            *position += 1;
        }
        rewrite_units(child, position, map, emitted_ids);
    }
}

fn rewrite_one_unit(
    element: &mut XmlElement,
    position: usize,
    map: &AlignmentMap,
    emitted_ids: &mut HashSet<String>,
) {
    let entries: Vec<&MapEntry> = map.entries_for_position(position).collect();
    if entries.is_empty() {
        return;
    }

    let flat = clean(&element.text_content());

    // Positional resolution is authoritative, but cross-check against the
    // recomputed text so a drifted tree cannot mis-tag content
    let mut paragraph_entries: Vec<&MapEntry> = Vec::new();
    let mut sentence_entries: Vec<&MapEntry> = Vec::new();
    for entry in entries {
        match entry.granularity {
            Granularity::Paragraph => {
                if paragraph_applies(&entry.text, &flat) {
                    paragraph_entries.push(entry);
                } else {
                    warn!(
                        "Paragraph entry {} does not match unit {} text, skipping",
                        entry.id, position
                    );
                }
            }
            Granularity::Sentence => {
                if flat.contains(&entry.text) {
                    sentence_entries.push(entry);
                } else {
                    warn!(
                        "Sentence entry {} not found in unit {} text, skipping",
                        entry.id, position
                    );
                }
            }
        }
    }

    let has_child_elements = element.child_elements().next().is_some();
    if !sentence_entries.is_empty() {
        if has_child_elements {
            // Never seg-split mixed content; inline structure (pb, hi...)
            // must survive untouched
            debug!(
                "Unit {} has child elements, keeping it whole instead of seg-splitting",
                position
            );
        } else {
            split_into_segments(element, &flat, &sentence_entries, emitted_ids);
        }
    }

    // A whole-unit identifier can coexist with seg children
    if let Some(entry) = paragraph_entries.first() {
        element.set_attr("xml:id", entry.id.clone());
        emitted_ids.insert(entry.id.clone());
    }
    for extra in paragraph_entries.iter().skip(1) {
        warn!(
            "Unit {} already carries an identifier; dropping duplicate paragraph entry {}",
            position, extra.id
        );
    }
}

fn paragraph_applies(entry_text: &str, flat: &str) -> bool {
    if entry_text == flat {
        return true;
    }
    flat.contains(entry_text) && entry_text.len() as f64 >= OVERLAP_TOLERANCE * flat.len() as f64
}

/// Rebuild the element's content as running text interleaved with `seg`
/// children, one per placed sentence entry. Placement is greedy left to
/// right over the cleaned text; on position ties the longer entry wins, so
/// a group span beats its own sub-sentences. Entries that no longer fit are
/// skipped (their ids stay unemitted and any link to them is dropped).
fn split_into_segments(
    element: &mut XmlElement,
    flat: &str,
    candidates: &[&MapEntry],
    emitted_ids: &mut HashSet<String>,
) {
    let mut placed: Vec<(usize, &MapEntry)> = Vec::new();
    let mut remaining: Vec<&MapEntry> = candidates.to_vec();
    let mut cursor = 0usize;

    while cursor < flat.len() && !remaining.is_empty() {
        let mut best: Option<(usize, usize)> = None; // (start, index into remaining)
        for (idx, entry) in remaining.iter().enumerate() {
            if let Some(found) = flat[cursor..].find(&entry.text) {
                let start = cursor + found;
                let better = match best {
                    None => true,
                    Some((best_start, best_idx)) => {
                        start < best_start
                            || (start == best_start
                                && entry.text.len() > remaining[best_idx].text.len())
                    }
                };
                if better {
                    best = Some((start, idx));
                }
            }
        }

        let Some((start, idx)) = best else { break };
        let entry = remaining.remove(idx);
        cursor = start + entry.text.len();
        placed.push((start, entry));
    }

    for entry in &remaining {
        debug!("Sentence entry {} did not fit the rebuilt unit, skipped", entry.id);
    }
    if placed.is_empty() {
        return;
    }

    let seg_name = with_prefix(name_prefix(&element.name), "seg");
    let mut children = Vec::new();
    let mut prev_end = 0usize;
    for (start, entry) in &placed {
        if *start > prev_end {
            children.push(XmlNode::Text(flat[prev_end..*start].to_string()));
        }
        let mut seg = XmlElement::new(seg_name.clone());
        seg.set_attr("xml:id", entry.id.clone());
        seg.push_text(entry.text.clone());
        children.push(XmlNode::Element(seg));
        emitted_ids.insert(entry.id.clone());
        prev_end = start + entry.text.len();
    }
    if prev_end < flat.len() {
        children.push(XmlNode::Text(flat[prev_end..].to_string()));
    }

    element.children = children;
}

/// Replace the header's language declarations with a single declaration for
/// the given language, creating the header path when absent. Pure rewrite of
/// the owned tree; no state outside the document is touched.
fn replace_language(root: &mut XmlElement, language: &str) -> Result<(), TeiError> {
    let prefix = name_prefix(&root.name).map(|p| p.to_string());
    let prefix = prefix.as_deref();

    if root.find_descendant("teiHeader").is_none() {
        let header = XmlElement::new(with_prefix(prefix, "teiHeader"));
        root.children.insert(0, XmlNode::Element(header));
    }
    let header = root
        .find_descendant_mut("teiHeader")
        .ok_or_else(|| TeiError::Projection("teiHeader vanished during rewrite".to_string()))?;

    if header.child("profileDesc").is_none() {
        header.push_element(XmlElement::new(with_prefix(prefix, "profileDesc")));
    }
    let profile = header
        .child_mut("profileDesc")
        .ok_or_else(|| TeiError::Projection("profileDesc vanished during rewrite".to_string()))?;

    if profile.child("langUsage").is_none() {
        profile.push_element(XmlElement::new(with_prefix(prefix, "langUsage")));
    }
    let usage = profile
        .child_mut("langUsage")
        .ok_or_else(|| TeiError::Projection("langUsage vanished during rewrite".to_string()))?;

    usage
        .children
        .retain(|node| !matches!(node, XmlNode::Element(e) if e.local_name() == "language"));

    let mut lang = XmlElement::new(with_prefix(prefix, "language"));
    lang.set_attr("ident", language);
    lang.push_text(language);
    usage.push_element(lang);

    Ok(())
}

fn name_prefix(name: &str) -> Option<&str> {
    name.rfind(':').map(|idx| &name[..idx])
}

fn with_prefix(prefix: Option<&str>, local: &str) -> String {
    match prefix {
        Some(p) => format!("{}:{}", p, local),
        None => local.to_string(),
    }
}
