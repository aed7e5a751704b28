/*!
 * Common test utilities for the teialign test suite
 */

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use tempfile::TempDir;

use teialign::aligner::AlignmentGroup;
use teialign::xml_tree::{XmlElement, XmlNode};

/// Initializes logging for tests; output only shows up for failing tests
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &PathBuf, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Builds a minimal TEI document with the given metadata language, title and
/// body paragraphs
pub fn tei_document(language: &str, title: &str, paragraphs: &[&str]) -> String {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("      <p>{}</p>\n", p))
        .collect();

    format!(
        r#"<TEI xmlns="http://www.tei-c.org/ns/1.0">
  <teiHeader>
    <fileDesc>
      <titleStmt>
        <title>{}</title>
      </titleStmt>
    </fileDesc>
    <profileDesc>
      <langUsage>
        <language ident="{}">{}</language>
      </langUsage>
    </profileDesc>
  </teiHeader>
  <text>
    <body>
{}    </body>
  </text>
</TEI>"#,
        title, language, language, body
    )
}

/// Builds an alignment group pairing the given sentence lists, with
/// sequential zero-based indices
pub fn group(source: &[&str], target: &[&str], score: f32) -> AlignmentGroup {
    AlignmentGroup {
        source_sentences: source.iter().map(|s| s.to_string()).collect(),
        target_sentences: target.iter().map(|s| s.to_string()).collect(),
        source_indices: (0..source.len()).collect(),
        target_indices: (0..target.len()).collect(),
        score,
    }
}

/// Collects every xml:id value in the tree
pub fn collect_xml_ids(element: &XmlElement, ids: &mut HashSet<String>) {
    if let Some(id) = element.attr("xml:id") {
        ids.insert(id.to_string());
    }
    for node in &element.children {
        if let XmlNode::Element(child) = node {
            collect_xml_ids(child, ids);
        }
    }
}

/// Collects every identifier referenced from link targets ("#id" with the
/// hash stripped)
pub fn collect_link_refs(element: &XmlElement, refs: &mut Vec<String>) {
    if element.local_name() == "link" {
        if let Some(target) = element.attr("target") {
            for part in target.split_whitespace() {
                refs.push(part.trim_start_matches('#').to_string());
            }
        }
    }
    for node in &element.children {
        if let XmlNode::Element(child) = node {
            collect_link_refs(child, refs);
        }
    }
}
