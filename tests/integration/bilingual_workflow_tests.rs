/*!
 * Integration tests for the bilingual document workflow
 */

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use twintext::app_config::TranslationMode;
use twintext::bilingual::blocks::translatable_text_nodes;
use twintext::bilingual::{BlockExtractor, HtmlProcessor, MarkerNames, NodeMarks, ParagraphLocator, ProcessorOptions};
use twintext::document::{NodeId, TagClassifier, inner_html, parse_html, to_html};
use twintext::errors::ProcessingError;

use crate::common::{self, GatewayReply, RecordingGateway};

const WORKED_EXAMPLE: &str = "<p>Hello <strong>world</strong>, friend.<br>Next line.</p>";

const WRAPPER_CLASS: &str = "twintext-target-wrapper";

static SESSION_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r#" data-twintext-walked="[^"]*""#).unwrap());

fn processor(reply: GatewayReply) -> HtmlProcessor<RecordingGateway> {
    common::init_test_logging();
    HtmlProcessor::new(ProcessorOptions::new("fr"), RecordingGateway::new(reply))
}

/// Test the worked example end to end
#[tokio::test]
async fn test_translateDocument_withWorkedExample_shouldInsertTwoTranslations() -> Result<()> {
    let processor = processor(GatewayReply::Quote);
    let mut document = parse_html(WORKED_EXAMPLE)?;

    let report = processor.translate_document(&mut document).await?;

    let calls = processor.gateway().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0], vec!["Hello ", "world", ", friend.", "Next line."]);
    assert_eq!(report.units, 4);
    assert_eq!(report.blocks, 2);
    assert_eq!(report.inserted, 2);

    let wrappers = common::elements_with_class(&document, WRAPPER_CLASS);
    assert_eq!(wrappers.len(), 2);

    let p = document.find_element("p").unwrap();
    let first_next = document.next_sibling(wrappers[0]).unwrap();
    assert_eq!(document.tag_name(first_next), Some("br"));
    assert_eq!(document.parent(wrappers[0]), Some(p));

    let generated = document.parent(wrappers[1]).unwrap();
    assert_eq!(document.children(generated).last().copied(), Some(wrappers[1]));
    assert_eq!(document.children(p).last().copied(), Some(generated));
    assert_eq!(document.tag_name(generated), Some("span"));

    let first_inner = common::elements_with_class(&document, "twintext-target-inner")[0];
    assert_eq!(
        inner_html(&document, first_inner),
        "«Hello» <strong>«world»</strong>«, friend.»"
    );
    assert_eq!(document.text_content(wrappers[1]), "«Next line.»");
    Ok(())
}

/// Test the serialized output carries the document annotations
#[tokio::test]
async fn test_translateHtml_shouldAnnotateAndInjectStyles() -> Result<()> {
    let processor = processor(GatewayReply::Quote);

    let (html, report) = processor.translate_html(WORKED_EXAMPLE).await?;

    assert!(html.contains("<html twintext-state=\"dual\">"));
    assert!(html.contains(&format!("data-twintext-walked=\"{}\"", report.session_id)));
    assert!(html.contains("<p data-twintext-paragraph=\"1\">"));
    assert!(html.contains("<span data-twintext-paragraph=\"1\" data-twintext-generated=\"1\">"));
    assert!(html.contains("data-id=\"twintext-default-injected-css\""));
    assert!(html.contains("data-id=\"twintext-user-custom-style\""));
    assert!(html.contains("lang=\"fr\""));
    assert!(!html.contains("data-twintext-block-end-marker"));
    Ok(())
}

/// Test a text inside an inline-only container
#[tokio::test]
async fn test_translateHtml_withSpanInDiv_shouldTranslateOnce() -> Result<()> {
    let processor = processor(GatewayReply::Quote);

    let (html, report) = processor.translate_html("<div><span>Hi</span></div>").await?;

    assert_eq!(processor.gateway().calls(), vec![vec!["Hi".to_string()]]);
    assert_eq!(report.inserted, 1);
    assert!(html.contains("<div data-twintext-paragraph=\"1\"><span>Hi"));
    assert!(html.contains("«Hi»"));
    Ok(())
}

/// Test a document without text makes no gateway call
#[tokio::test]
async fn test_translateHtml_withWhitespaceOnly_shouldNotCallGateway() -> Result<()> {
    let processor = processor(GatewayReply::Quote);

    let (html, report) = processor.translate_html("<div>  <p>\n\t</p> </div>").await?;

    assert_eq!(processor.gateway().call_count(), 0);
    assert_eq!(report.units, 0);
    assert_eq!(report.inserted, 0);
    assert!(!html.contains(WRAPPER_CLASS));
    assert!(!html.contains("display:none"));
    Ok(())
}

/// Test original text nodes survive with the same content and order
#[tokio::test]
async fn test_translateDocument_shouldNotTouchOriginalText() -> Result<()> {
    let source = "<h1>Title</h1><p>One <a href=\"#\">two</a><br>three <em>four</em></p>\
                  <ul><li>five</li><li>six<br><b>seven</b></li></ul><p class=\"notranslate\">eight</p>";
    let mut document = parse_html(source)?;
    let originals: Vec<(NodeId, String)> = document
        .text_nodes()
        .into_iter()
        .map(|id| (id, document.text(id).unwrap_or_default().to_string()))
        .collect();

    processor(GatewayReply::Quote).translate_document(&mut document).await?;

    let order_after: Vec<NodeId> = document
        .text_nodes()
        .into_iter()
        .filter(|id| originals.iter().any(|(original, _)| original == id))
        .collect();
    let order_before: Vec<NodeId> = originals.iter().map(|(id, _)| *id).collect();
    assert_eq!(order_after, order_before);

    for (id, text) in &originals {
        assert!(document.is_attached(*id));
        assert_eq!(document.text(*id), Some(text.as_str()));
    }
    assert!(to_html(&document).contains("<p class=\"notranslate\">eight</p>"));
    Ok(())
}

/// Test repeated runs produce identical output apart from the session id
#[tokio::test]
async fn test_translateHtml_calledTwice_shouldBeDeterministic() -> Result<()> {
    let source = "<div>intro<p>Nested <i>text</i><br>after</p>outro</div><table><tr><td>cell</td></tr></table>";

    let (first, first_report) = processor(GatewayReply::Quote).translate_html(source).await?;
    let (second, second_report) = processor(GatewayReply::Quote).translate_html(source).await?;

    assert_ne!(first_report.session_id, second_report.session_id);
    assert_eq!(SESSION_ATTR.replace_all(&first, ""), SESSION_ATTR.replace_all(&second, ""));
    Ok(())
}

/// Test each paragraph's translatable texts are split over its blocks exactly once
#[test]
fn test_extract_shouldPartitionEveryParagraphText() -> Result<()> {
    let source = "<ul><li>one<ul><li>two <b>bold</b></li><li>three<br>four</li></ul></li></ul>\
                  <span>inline <div>block in inline</div> after</span>\
                  <p>run <code>cargo</code><br><code>make</code> then <kbd>Ctrl</kbd><br> <kbd>Esc</kbd> quits</p>\
                  <p>a<br> <b>y</b> z</p><div>loose<table><tr><td>cell</td></tr></table>tail</div>";
    let mut document = parse_html(source)?;
    let classifier = TagClassifier::default();
    let mut marks = NodeMarks::new();
    let paragraphs = ParagraphLocator::new(&classifier).locate(&mut document, &mut marks)?;
    let extractor = BlockExtractor::new(&classifier);

    let mut covered: HashSet<NodeId> = HashSet::new();
    for (index, &paragraph) in paragraphs.iter().enumerate() {
        let expected = translatable_text_nodes(&document, &marks, &classifier, paragraph);
        let blocks = extractor.extract(&mut document, &mut marks, paragraph, index)?;
        let nodes: Vec<NodeId> = blocks.iter().flat_map(|block| block.nodes.iter().copied()).collect();
        assert_eq!(nodes, expected, "paragraph {}", index);
        for id in nodes {
            assert!(covered.insert(id), "text {:?} belongs to two blocks", id);
        }
    }

    let all_text: HashSet<NodeId> = document
        .text_nodes()
        .into_iter()
        .filter(|&id| document.is_content_text(id))
        .collect();
    assert_eq!(covered, all_text);
    Ok(())
}

/// Test blank text after a break does not pull the next element into a wrapper
#[tokio::test]
async fn test_translateHtml_withBlankTextAfterBreak_shouldTranslateElementOnItsOwn() -> Result<()> {
    let processor = processor(GatewayReply::Quote);

    let (html, report) = processor.translate_html("<p>a<br> <b>y</b> z</p>").await?;

    assert_eq!(processor.gateway().calls(), vec![vec!["a".to_string(), " z".to_string(), "y".to_string()]]);
    assert_eq!(report.inserted, 3);
    assert!(!html.contains("data-twintext-generated"));
    assert!(html.contains("<b data-twintext-paragraph=\"1\">y"));
    Ok(())
}

/// Test a leading blank line of preformatted text survives the output
#[tokio::test]
async fn test_translateHtml_withPreLeadingNewline_shouldKeepOriginalText() -> Result<()> {
    let processor = processor(GatewayReply::Quote);

    let (html, _) = processor.translate_html("<pre>\n\nfirst line kept</pre>").await?;

    let reparsed = parse_html(&html)?;
    let pre = reparsed.find_element("pre").unwrap();
    let first = reparsed.children(pre)[0];
    assert_eq!(reparsed.text(first), Some("\nfirst line kept"));
    Ok(())
}

/// Test locating paragraphs twice gives the same result
#[test]
fn test_locate_calledTwice_shouldBeIdempotent() -> Result<()> {
    let mut document = parse_html("<p>a<br>b <i>c</i><br><em>d</em></p><div><span>e</span></div>")?;
    let classifier = TagClassifier::default();
    let mut marks = NodeMarks::new();

    let first = ParagraphLocator::new(&classifier).locate(&mut document, &mut marks)?;
    let html_after_first = to_html(&document);
    let second = ParagraphLocator::new(&classifier).locate(&mut document, &mut marks)?;

    assert_eq!(first, second);
    assert_eq!(to_html(&document), html_after_first);
    Ok(())
}

/// Test a failing backend leaves no translation behind
#[tokio::test]
async fn test_translateDocument_withFailingGateway_shouldReturnServiceError() -> Result<()> {
    let processor = processor(GatewayReply::Fail);
    let mut document = parse_html(WORKED_EXAMPLE)?;

    let result = processor.translate_document(&mut document).await;

    match result {
        Err(ProcessingError::Service { units, .. }) => assert_eq!(units, 4),
        other => panic!("expected a service error, got {:?}", other),
    }
    let html = to_html(&document);
    assert!(!html.contains(WRAPPER_CLASS));
    assert!(!html.contains("display:none"));
    assert!(!html.contains("twintext-state"));
    Ok(())
}

/// Test a short backend answer is rejected
#[tokio::test]
async fn test_translateDocument_withShortAnswer_shouldReportMismatch() -> Result<()> {
    let processor = processor(GatewayReply::DropLast);
    let mut document = parse_html(WORKED_EXAMPLE)?;

    let result = processor.translate_document(&mut document).await;

    assert!(matches!(
        result,
        Err(ProcessingError::TranslationCountMismatch { expected: 4, actual: 3 })
    ));
    assert!(common::elements_with_class(&document, WRAPPER_CLASS).is_empty());
    Ok(())
}

/// Test simple mode sends one joined text per block
#[tokio::test]
async fn test_translateHtml_inSimpleMode_shouldSendJoinedBlocks() -> Result<()> {
    let options = ProcessorOptions::new("fr").with_mode(TranslationMode::Simple);
    let processor = HtmlProcessor::new(options, RecordingGateway::quote());

    let (html, report) = processor.translate_html(WORKED_EXAMPLE).await?;

    assert_eq!(
        processor.gateway().calls(),
        vec![vec!["Hello world , friend.".to_string(), "Next line.".to_string()]]
    );
    assert_eq!(report.inserted, 2);
    assert!(html.contains("style=\"color:#2f4f4f;\">«Hello world , friend.»</font>"));
    Ok(())
}

/// Test a custom prefix renames every generated attribute
#[tokio::test]
async fn test_translateHtml_withCustomPrefix_shouldRenameMarkers() -> Result<()> {
    let mut options = ProcessorOptions::new("de");
    options.names = MarkerNames::new("tt");
    options.inject_styles = false;
    let processor = HtmlProcessor::new(options, RecordingGateway::quote());

    let (html, _) = processor.translate_html("<p>Hello</p>").await?;

    assert!(html.contains("tt-state=\"dual\""));
    assert!(html.contains("data-tt-paragraph=\"1\""));
    assert!(html.contains("tt-target-wrapper"));
    assert!(!html.contains("twintext"));
    assert!(!html.contains("<style"));
    Ok(())
}

/// Test the processor built from a config file drives the mock backend
#[tokio::test]
async fn test_processorFromConfig_withMockService_shouldTagTranslations() -> Result<()> {
    let config = common::mock_config("es");
    let service = twintext::TranslationService::new(
        config.translation.clone(),
        config.source_language.clone(),
        config.target_language.clone(),
    )?;
    let processor = HtmlProcessor::new(ProcessorOptions::from_config(&config), service);

    let (html, report) = processor.translate_html("<h1>Welcome</h1><p>Bye</p>").await?;

    assert_eq!(report.inserted, 2);
    assert!(html.contains("[es] Welcome"));
    assert!(html.contains("[es] Bye"));
    Ok(())
}
