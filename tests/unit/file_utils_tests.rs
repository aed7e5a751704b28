/*!
 * Tests for file system utilities
 */

use std::path::PathBuf;

use anyhow::Result;
use teialign::file_utils::FileManager;

use crate::common::{create_temp_dir, create_test_file};

/// Test existence checks distinguish files and directories
#[test]
fn test_file_exists_withFileAndDirectory_shouldDistinguish() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let dir_path = temp_dir.path().to_path_buf();
    let file_path = create_test_file(&dir_path, "doc.xml", "<TEI/>")?;

    assert!(FileManager::file_exists(&file_path));
    assert!(!FileManager::file_exists(&dir_path));
    assert!(FileManager::dir_exists(&dir_path));
    assert!(!FileManager::dir_exists(&file_path));
    assert!(!FileManager::file_exists(dir_path.join("missing.xml")));
    Ok(())
}

/// Test write creates parent directories and read round-trips content
#[test]
fn test_write_to_file_withNestedPath_shouldCreateParentsAndRoundTrip() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let nested = temp_dir.path().join("out").join("corpus.xml");

    FileManager::write_to_file(&nested, "<teiCorpus/>")?;
    assert!(FileManager::file_exists(&nested));
    assert_eq!(FileManager::read_to_string(&nested)?, "<teiCorpus/>");
    Ok(())
}

/// Test reading a missing file yields an error with context
#[test]
fn test_read_to_string_withMissingFile_shouldError() {
    let result = FileManager::read_to_string("/nonexistent/path/file.xml");
    assert!(result.is_err());
}

/// Test output path derivation from the source document path
#[test]
fn test_generate_output_path_withSourceFile_shouldAppendSuffix() {
    let output = FileManager::generate_output_path(PathBuf::from("/data/book.xml"), "aligned");
    assert_eq!(output, PathBuf::from("/data/book.aligned.xml"));

    let bare = FileManager::generate_output_path(PathBuf::from("book.xml"), "aligned");
    assert_eq!(bare.file_name().unwrap(), "book.aligned.xml");
}

/// Test the TEI input sniffer
#[test]
fn test_looks_like_tei_withVariousContent_shouldDetect() {
    assert!(FileManager::looks_like_tei("<?xml version=\"1.0\"?><TEI/>"));
    assert!(FileManager::looks_like_tei("  <TEI xmlns=\"http://www.tei-c.org/ns/1.0\">"));
    assert!(FileManager::looks_like_tei("<tei:TEI>"));
    assert!(!FileManager::looks_like_tei("just some plain text"));
    assert!(!FileManager::looks_like_tei(""));
}
