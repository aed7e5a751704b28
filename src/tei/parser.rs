use log::debug;

use crate::errors::TeiError;
use crate::text_cleaner::clean;
use crate::xml_tree::{self, XmlElement};

// @module: TEI document parsing and alignable unit extraction

/// Kind of alignable unit: TEI `p` or `head`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Paragraph,
    Heading,
}

impl UnitKind {
    /// Map an element's local name to a unit kind, if it is alignable
    pub fn from_local_name(local: &str) -> Option<Self> {
        match local {
            "p" => Some(UnitKind::Paragraph),
            "head" => Some(UnitKind::Heading),
            _ => None,
        }
    }
}

/// One paragraph- or heading-level text unit extracted from a document.
///
/// `position` is the pre-order ordinal of the element among all p/head
/// elements of the body, counted before empty units are discarded, so it
/// stays valid as an address into any structural clone of the same tree.
#[derive(Debug, Clone)]
pub struct AlignableUnit {
    /// Paragraph or heading
    pub kind: UnitKind,

    /// Cleaned, whitespace-normalized text; never empty
    pub text: String,

    /// Attributes captured at extraction time (informational)
    pub attributes: Vec<(String, String)>,

    /// Pre-order ordinal among the body's p/head elements
    pub position: usize,
}

/// A parsed TEI document: the full tree plus extracted metadata and the
/// ordered list of alignable units.
///
/// The tree is mutated in place during projection; projection always starts
/// from a structural clone, so the parsed tree stays valid for matching.
#[derive(Debug, Clone)]
pub struct TeiDocument {
    /// The full parsed tree
    pub root: XmlElement,

    /// ISO 639-1 code from the header, or "unknown"
    pub language: String,

    /// Title from the header, or "Untitled"
    pub title: String,

    /// Alignable units in document order
    pub units: Vec<AlignableUnit>,
}

impl TeiDocument {
    /// Unit texts in document order, as fed to the aligner
    pub fn unit_texts(&self) -> Vec<&str> {
        self.units.iter().map(|u| u.text.as_str()).collect()
    }
}

/// Parse TEI XML content and extract metadata and alignable text units.
///
/// Fails with [`TeiError::InvalidXml`] if the input is not well-formed.
/// A missing `body` is not an error; it just yields an empty unit list.
pub fn parse_tei(xml: &str) -> Result<TeiDocument, TeiError> {
    let root = xml_tree::parse(xml)?;

    let language = extract_language(&root);
    let title = extract_title(&root);
    let units = extract_units(&root);

    debug!(
        "Parsed TEI document \"{}\" ({}): {} alignable units",
        title,
        language,
        units.len()
    );

    Ok(TeiDocument {
        root,
        language,
        title,
        units,
    })
}

/// Language code from `profileDesc/langUsage/language@ident`, default "unknown"
fn extract_language(root: &XmlElement) -> String {
    root.find_descendant("profileDesc")
        .and_then(|profile| profile.child("langUsage"))
        .and_then(|usage| usage.child("language"))
        .and_then(|lang| lang.attr("ident"))
        .unwrap_or("unknown")
        .to_string()
}

/// Title text from `titleStmt/title`, default "Untitled"
fn extract_title(root: &XmlElement) -> String {
    let title = root
        .find_descendant("titleStmt")
        .and_then(|stmt| stmt.child("title"))
        .map(|t| t.text_content())
        .unwrap_or_default();

    let trimmed = title.trim();
    if trimmed.is_empty() {
        "Untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Extract every p/head element under `body` in pre-order.
///
/// Units whose cleaned text is empty are discarded, but they still consume a
/// position ordinal so the bookkeeping of their siblings is unaffected.
fn extract_units(root: &XmlElement) -> Vec<AlignableUnit> {
    let mut units = Vec::new();
    let Some(body) = root.find_descendant("body") else {
        return units;
    };

    let mut position = 0usize;
    collect_units(body, &mut position, &mut units);
    units
}

fn collect_units(element: &XmlElement, position: &mut usize, units: &mut Vec<AlignableUnit>) {
    for child in element.child_elements() {
        if let Some(kind) = UnitKind::from_local_name(child.local_name()) {
            let text = clean(&child.text_content());
            if !text.is_empty() {
                units.push(AlignableUnit {
                    kind,
                    text,
                    attributes: child.attributes.clone(),
                    position: *position,
                });
            }
            *position += 1;
        }
        // p/head can nest (quotes, figure heads); descend either way
        collect_units(child, position, units);
    }
}
