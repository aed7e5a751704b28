use log::debug;

use crate::errors::TeiError;
use crate::language_utils::get_language_name;
use crate::tei::mapper::PendingLink;
use crate::tei::projector::ProjectedDocument;
use crate::xml_tree::XmlElement;

// @module: Final corpus assembly and serialization

/// TEI namespace applied to the corpus root
pub const TEI_NAMESPACE: &str = "http://www.tei-c.org/ns/1.0";

/// TEI version advertised on the corpus root
const TEI_VERSION: &str = "3.3.0";

/// Fixed corpus title
const CORPUS_TITLE: &str = "Aligned Parallel Texts";

/// Fixed publication statement
const PUBLICATION_NOTE: &str = "Aligned with teialign";

/// The assembled output: serialized corpus XML plus the number of links
/// that survived reference validation
#[derive(Debug)]
pub struct AssembledCorpus {
    /// Serialized corpus document with XML declaration
    pub xml: String,

    /// Number of link elements emitted in the standoff block
    pub link_count: usize,
}

/// Build the output corpus: header, standoff link group, then the two
/// projected documents in source-then-target order.
///
/// Link references are validated against the identifiers the projections
/// actually emitted: dangling references are dropped from the link's target
/// list, and a link with no surviving reference disappears entirely. This
/// keeps every emitted reference resolvable within the output document.
pub fn assemble(
    source: &ProjectedDocument,
    target: &ProjectedDocument,
    links: &[PendingLink],
    source_lang: &str,
    target_lang: &str,
) -> Result<AssembledCorpus, TeiError> {
    let mut corpus = XmlElement::new("teiCorpus");
    corpus.set_attr("xmlns", TEI_NAMESPACE);
    corpus.set_attr("version", TEI_VERSION);

    corpus.push_element(corpus_header(source_lang, target_lang));

    let (standoff, link_count) = standoff_block(source, target, links);
    corpus.push_element(standoff);

    corpus.push_element(source.root.clone());
    corpus.push_element(target.root.clone());

    debug!(
        "Assembled corpus with {} links ({} -> {})",
        link_count, source_lang, target_lang
    );

    Ok(AssembledCorpus {
        xml: corpus.to_document_string()?,
        link_count,
    })
}

/// Corpus-level header with fixed boilerplate and both languages declared
fn corpus_header(source_lang: &str, target_lang: &str) -> XmlElement {
    let mut header = XmlElement::new("teiHeader");

    let mut file_desc = XmlElement::new("fileDesc");
    let mut title_stmt = XmlElement::new("titleStmt");
    let mut title = XmlElement::new("title");
    title.push_text(CORPUS_TITLE);
    title_stmt.push_element(title);
    file_desc.push_element(title_stmt);

    let mut pub_stmt = XmlElement::new("publicationStmt");
    let mut pub_p = XmlElement::new("p");
    pub_p.push_text(PUBLICATION_NOTE);
    pub_stmt.push_element(pub_p);
    file_desc.push_element(pub_stmt);
    header.push_element(file_desc);

    let mut profile_desc = XmlElement::new("profileDesc");
    let mut lang_usage = XmlElement::new("langUsage");
    lang_usage.push_element(language_declaration(source_lang, "Source"));
    lang_usage.push_element(language_declaration(target_lang, "Target"));
    profile_desc.push_element(lang_usage);
    header.push_element(profile_desc);

    header
}

fn language_declaration(code: &str, role: &str) -> XmlElement {
    let display = get_language_name(code).unwrap_or_else(|_| code.to_string());
    let mut language = XmlElement::new("language");
    language.set_attr("ident", code);
    language.push_text(format!("{} language: {}", role, display));
    language
}

/// Standoff block with one link per group that still has at least one
/// resolvable reference
fn standoff_block(
    source: &ProjectedDocument,
    target: &ProjectedDocument,
    links: &[PendingLink],
) -> (XmlElement, usize) {
    let mut standoff = XmlElement::new("standOff");
    let mut link_grp = XmlElement::new("linkGrp");
    link_grp.set_attr("type", "translation");

    let mut link_count = 0usize;
    for (idx, link) in links.iter().enumerate() {
        let mut refs = Vec::new();
        if let Some(id) = link.source_id.as_ref().filter(|id| source.emitted_ids.contains(*id)) {
            refs.push(format!("#{}", id));
        }
        if let Some(id) = link.target_id.as_ref().filter(|id| target.emitted_ids.contains(*id)) {
            refs.push(format!("#{}", id));
        }

        if refs.is_empty() {
            debug!("Link {} has no resolvable reference, dropped", idx);
            continue;
        }

        let mut link_elem = XmlElement::new("link");
        link_elem.set_attr("target", refs.join(" "));
        link_elem.set_attr("type", "Linguistic");
        link_grp.push_element(link_elem);
        link_count += 1;
    }

    standoff.push_element(link_grp);
    (standoff, link_count)
}
