/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::path::PathBuf;

use twintext::file_utils::FileManager;

use crate::common;

/// Test output path generation next to the input
#[test]
fn test_generateOutputPath_withoutOutputDir_shouldPlaceBesideInput() {
    let output = FileManager::generate_output_path("/docs/guide/index.html", None);
    assert_eq!(output, PathBuf::from("/docs/guide/index_translated.html"));
}

/// Test output path generation into another directory
#[test]
fn test_generateOutputPath_withOutputDir_shouldKeepExtension() {
    let out_dir = PathBuf::from("/tmp/out");
    let output = FileManager::generate_output_path("/docs/page.htm", Some(&out_dir));
    assert_eq!(output, PathBuf::from("/tmp/out/page_translated.htm"));
}

#[test]
fn test_isHtmlFile_shouldMatchExtensionsCaseInsensitively() {
    assert!(FileManager::is_html_file("a.html"));
    assert!(FileManager::is_html_file("b.HTM"));
    assert!(FileManager::is_html_file("c.xhtml"));
    assert!(!FileManager::is_html_file("d.txt"));
    assert!(!FileManager::is_html_file("noext"));
}

#[test]
fn test_isTranslatedOutput_shouldDetectSuffix() {
    assert!(FileManager::is_translated_output("page_translated.html"));
    assert!(!FileManager::is_translated_output("page.html"));
}

/// Test recursive discovery skips previous outputs and other files
#[test]
fn test_findHtmlFiles_shouldSkipOutputsAndSort() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_file(root, "b.html", "<p>b</p>")?;
    common::create_test_file(root, "a.htm", "<p>a</p>")?;
    common::create_test_file(root, "a_translated.htm", "<p>a</p>")?;
    common::create_test_file(root, "notes.txt", "text")?;
    common::create_test_file(root, "nested/c.html", "<p>c</p>")?;

    let files = FileManager::find_html_files(root)?;
    let names: Vec<String> = files
        .iter()
        .map(|path| path.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();

    assert_eq!(names, vec!["a.htm", "b.html", "nested/c.html"]);
    Ok(())
}

/// Test writing creates missing parent directories
#[test]
fn test_writeToFile_shouldCreateParents() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let target = temp_dir.path().join("deep/er/out.html");

    FileManager::write_to_file(&target, "<p>x</p>")?;

    assert!(FileManager::file_exists(&target));
    assert_eq!(FileManager::read_to_string(&target)?, "<p>x</p>");
    Ok(())
}

#[test]
fn test_readBytes_withMissingFile_shouldFail() {
    assert!(FileManager::read_bytes("/definitely/not/here.html").is_err());
}
