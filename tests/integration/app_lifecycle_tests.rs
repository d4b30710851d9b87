/*!
 * Integration tests for the full application lifecycle
 */

use anyhow::Result;
use std::fs;

use twintext::app_config::TranslationMode;
use twintext::app_controller::{Controller, FolderSummary};
use twintext::errors::{AppError, ProcessingError};

use crate::common;

/// Test a single file is translated next to its input
#[tokio::test]
async fn test_controllerRun_withMockProvider_shouldWriteTranslatedFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_html(temp_dir.path(), "page.html")?;
    let controller = Controller::with_config(common::mock_config("fr"))?;
    assert!(controller.is_initialized());

    let report = controller.run(input.clone(), None, false).await?;

    let report = report.expect("a fresh output is always written");
    assert_eq!(report.inserted, 3);

    let output = temp_dir.path().join("page_translated.html");
    let html = fs::read_to_string(&output)?;
    assert!(html.contains("[fr] Welcome"));
    assert!(html.contains("[fr] It has two lines."));
    assert!(html.contains("<pre class=\"notranslate\">let x = 1;</pre>"));
    assert!(!html.contains("[fr] let x"));
    assert!(!html.contains("[fr] Test page"));

    let original = fs::read_to_string(&input)?;
    assert!(!original.contains("twintext"));
    Ok(())
}

/// Test an existing output is kept unless forced
#[tokio::test]
async fn test_controllerRun_withExistingOutput_shouldSkipWithoutForce() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "doc.htm", "<p>Hello</p>")?;
    let output = common::create_test_file(temp_dir.path(), "doc_translated.htm", "old")?;
    let controller = Controller::with_config(common::mock_config("de"))?;

    let skipped = controller.run(input.clone(), None, false).await?;
    assert!(skipped.is_none());
    assert_eq!(fs::read_to_string(&output)?, "old");

    let forced = controller.run(input, None, true).await?;
    assert!(forced.is_some());
    assert!(fs::read_to_string(&output)?.contains("[de] Hello"));
    Ok(())
}

/// Test an explicit output path and simple mode
#[tokio::test]
async fn test_controllerRun_withOutputPathInSimpleMode_shouldUsePlainTranslations() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "in.html", "<p>Good <b>morning</b></p>")?;
    let output = temp_dir.path().join("out/result.html");
    let mut config = common::mock_config("it");
    config.mode = TranslationMode::Simple;
    let controller = Controller::with_config(config)?;

    controller.run(input, Some(output.clone()), false).await?;

    let html = fs::read_to_string(&output)?;
    assert!(html.contains("[it] Good morning"));
    Ok(())
}

#[tokio::test]
async fn test_controllerRun_withMissingInput_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(common::mock_config("fr"))?;
    let result = controller.run(temp_dir.path().join("missing.html"), None, false).await;
    assert!(result.is_err());
    Ok(())
}

/// Test an undecodable input surfaces a typed parse error
#[tokio::test]
async fn test_controllerRun_withInvalidUtf8_shouldReportParseError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = temp_dir.path().join("latin1.html");
    fs::write(&input, [0x3c, 0x70, 0x3e, 0xe9, 0x3c, 0x2f, 0x70, 0x3e])?;
    let controller = Controller::with_config(common::mock_config("fr"))?;

    let error = controller.run(input, None, false).await.unwrap_err();

    assert!(matches!(
        error.downcast_ref::<AppError>(),
        Some(AppError::Processing(ProcessingError::Parse(_)))
    ));
    assert!(!temp_dir.path().join("latin1_translated.html").exists());
    Ok(())
}

#[test]
fn test_controllerWithConfig_withUnknownLanguage_shouldReportConfigError() {
    let mut config = common::mock_config("fr");
    config.target_language = "zz".to_string();
    let error = Controller::with_config(config).err().expect("invalid language is rejected");
    assert!(matches!(error.downcast_ref::<AppError>(), Some(AppError::Config(_))));
}

/// Test a folder run mirrors the layout and counts outcomes
#[tokio::test]
async fn test_controllerRunFolder_shouldMirrorLayoutAndSummarize() -> Result<()> {
    common::init_test_logging();
    let input_dir = common::create_temp_dir()?;
    let output_dir = common::create_temp_dir()?;
    common::create_test_file(input_dir.path(), "a.html", "<p>Alpha</p>")?;
    common::create_test_file(input_dir.path(), "guide/b.html", "<p>Beta</p>")?;
    common::create_test_file(input_dir.path(), "guide/notes.txt", "not html")?;
    common::create_test_file(input_dir.path(), "broken.html", "")?;
    fs::write(input_dir.path().join("latin1.html"), [0x3c, 0x70, 0x3e, 0xe9, 0x3c, 0x2f, 0x70, 0x3e])?;
    common::create_test_file(output_dir.path(), "a_translated.html", "kept")?;

    let controller = Controller::with_config(common::mock_config("fr"))?;
    let summary = controller
        .run_folder(input_dir.path().to_path_buf(), Some(output_dir.path().to_path_buf()), false)
        .await?;

    assert_eq!(
        summary,
        FolderSummary {
            translated: 2,
            skipped: 1,
            failed: 1,
        }
    );
    assert_eq!(fs::read_to_string(output_dir.path().join("a_translated.html"))?, "kept");
    let nested = fs::read_to_string(output_dir.path().join("guide/b_translated.html"))?;
    assert!(nested.contains("[fr] Beta"));
    assert!(output_dir.path().join("broken_translated.html").exists());
    assert!(!output_dir.path().join("latin1_translated.html").exists());
    Ok(())
}

#[tokio::test]
async fn test_controllerRunFolder_withoutHtmlFiles_shouldFail() -> Result<()> {
    let input_dir = common::create_temp_dir()?;
    common::create_test_file(input_dir.path(), "readme.md", "# nothing")?;
    let controller = Controller::with_config(common::mock_config("fr"))?;
    assert!(controller.run_folder(input_dir.path().to_path_buf(), None, false).await.is_err());
    Ok(())
}

#[test]
fn test_controllerNewForTest_shouldUseDefaults() -> Result<()> {
    let controller = Controller::new_for_test()?;
    assert_eq!(controller.config().target_language, "zh-CN");
    Ok(())
}
