/*!
 * Tests for paragraph location, block extraction and sanitizing
 */

use anyhow::Result;

use twintext::bilingual::blocks::{BlockEnd, SemanticBlock, common_ancestor};
use twintext::bilingual::{
    BlockExtractor, BlockSanitizer, MarkerNames, NodeMarks, ParagraphLocator, ResultReinserter,
    SanitizedBlock, TextCollector,
};
use twintext::document::{Document, NodeId, TagClass, TagClassifier, outer_html, parse_html};

/// Locate, extract and sanitize every block of a document
fn prepare(html: &str, classifier: &TagClassifier) -> Result<(Document, NodeMarks, Vec<(SemanticBlock, SanitizedBlock)>)> {
    let mut doc = parse_html(html)?;
    let mut marks = NodeMarks::new();
    let paragraphs = ParagraphLocator::new(classifier).locate(&mut doc, &mut marks)?;
    let extractor = BlockExtractor::new(classifier);
    let mut prepared = Vec::new();
    for (index, paragraph) in paragraphs.into_iter().enumerate() {
        for block in extractor.extract(&mut doc, &mut marks, paragraph, index)? {
            let sanitized = BlockSanitizer::sanitize(&doc, &block)?;
            prepared.push((block, sanitized));
        }
    }
    Ok((doc, marks, prepared))
}

fn unit_texts(prepared: &[(SemanticBlock, SanitizedBlock)]) -> Vec<String> {
    prepared
        .iter()
        .flat_map(|(_, sanitized)| sanitized.units.iter().map(|unit| unit.text.clone()))
        .collect()
}

fn tag_names(doc: &Document, ids: &[NodeId]) -> Vec<String> {
    ids.iter().map(|&id| doc.tag_name(id).unwrap_or("#").to_string()).collect()
}

/// Test every block-level element becomes a paragraph root
#[test]
fn test_locate_withNestedBlocks_shouldMarkAllBlocks() -> Result<()> {
    let mut doc = parse_html("<section><h2>T</h2><ul><li>a</li><li>b</li></ul></section>")?;
    let mut marks = NodeMarks::new();
    let classifier = TagClassifier::default();

    let paragraphs = ParagraphLocator::new(&classifier).locate(&mut doc, &mut marks)?;

    assert_eq!(tag_names(&doc, &paragraphs), vec!["body", "section", "h2", "ul", "li", "li"]);
    assert_eq!(marks.paragraph_count(), 6);
    Ok(())
}

/// Test inline-only content under a container treated as inline is still captured
#[test]
fn test_locate_withInlineOnlyContainer_shouldMarkEnclosingBlock() -> Result<()> {
    let classifier = TagClassifier::default().with("body", TagClass::InlineText).with("div", TagClass::InlineText);
    let mut doc = parse_html("<div><span>Hi</span></div>")?;
    let mut marks = NodeMarks::new();

    let paragraphs = ParagraphLocator::new(&classifier).locate(&mut doc, &mut marks)?;

    let html = doc.find_element("html").unwrap();
    assert!(paragraphs.contains(&html));
    assert_eq!(paragraphs.iter().filter(|&&id| doc.text_content(id).contains("Hi")).count(), 1);
    Ok(())
}

/// Test the only unit of an inline-wrapped text
#[test]
fn test_prepare_withSpanInDiv_shouldProduceSingleUnit() -> Result<()> {
    let (doc, marks, prepared) = prepare("<div><span>Hi</span></div>", &TagClassifier::default())?;

    assert_eq!(unit_texts(&prepared), vec!["Hi"]);
    let div = doc.find_element("div").unwrap();
    assert!(marks.is_paragraph(div));
    let span = doc.find_element("span").unwrap();
    assert_eq!(prepared[0].0.ancestor, span);
    Ok(())
}

/// Test the units of a paragraph with a line break
#[test]
fn test_prepare_withLineBreak_shouldSplitBlocksAndWrapTail() -> Result<()> {
    let (doc, marks, prepared) = prepare(
        "<p>Hello <strong>world</strong>, friend.<br>Next line.</p>",
        &TagClassifier::default(),
    )?;

    assert_eq!(unit_texts(&prepared), vec!["Hello ", "world", ", friend.", "Next line."]);
    assert_eq!(prepared.len(), 2);

    let p = doc.find_element("p").unwrap();
    let generated = *doc.children(p).last().unwrap();
    assert!(marks.is_generated(generated));
    assert_eq!(doc.tag_name(generated), Some("span"));

    let (first, _) = &prepared[0];
    assert_eq!(first.closed_by, BlockEnd::Natural);
    assert_eq!(doc.tag_name(doc.next_sibling(first.end_marker).unwrap()), Some("br"));

    let (second, _) = &prepared[1];
    assert_eq!(second.paragraph, generated);
    assert_eq!(doc.children(generated).last().copied(), Some(second.end_marker));
    Ok(())
}

/// Test nested paragraphs close the outer block before them
#[test]
fn test_extract_withNestedParagraph_shouldCloseBlockAtIt() -> Result<()> {
    let (doc, _, prepared) = prepare("<div>Before<p>Inside</p></div>", &TagClassifier::default())?;

    let texts = unit_texts(&prepared);
    assert_eq!(texts, vec!["Before", "Inside"]);
    let p = doc.find_element("p").unwrap();
    assert_eq!(prepared[0].0.closed_by, BlockEnd::NestedParagraph(p));
    assert_eq!(doc.next_sibling(prepared[0].0.end_marker), Some(p));
    Ok(())
}

/// Test skipped content is excluded from extraction
#[test]
fn test_prepare_withNoTranslateContent_shouldSkipIt() -> Result<()> {
    let html = "<p>Run <code>ls</code> now</p><pre class=\"notranslate\">raw</pre><script>var a;</script>";
    let (_, _, prepared) = prepare(html, &TagClassifier::default())?;
    assert_eq!(unit_texts(&prepared), vec!["Run ", "ls", " now"]);
    Ok(())
}

/// Test the sanitized copy keeps only the block's own branches
#[test]
fn test_sanitize_shouldKeepOnlyBlockBranches() -> Result<()> {
    let (_, _, prepared) = prepare(
        "<p>A <a href=\"#\">link</a><br>B <i>it</i></p>",
        &TagClassifier::default(),
    )?;
    let first = &prepared[0].1;
    assert_eq!(twintext::document::fragment_inner_html(&first.copy), "A <a href=\"#\">link</a>");
    assert_eq!(first.joined_text(), "A link");
    assert_eq!(TextCollector::collect(&first.copy), first.units);
    Ok(())
}

#[test]
fn test_commonAncestor_withDistinctBranches_shouldReturnSharedParent() -> Result<()> {
    let doc = parse_html("<div><p><b>x</b></p><p>y</p></div>")?;
    let div = doc.find_element("div").unwrap();
    let texts = doc.text_nodes();
    assert_eq!(common_ancestor(&doc, &texts), Some(div));
    Ok(())
}

/// Test structured reinsertion places the translated copy before the end marker
#[test]
fn test_reinsertStructured_shouldInsertWrapperBeforeMarker() -> Result<()> {
    let (mut doc, mut marks, mut prepared) = prepare("<p>Good <b>day</b></p>", &TagClassifier::default())?;
    let names = MarkerNames::default();
    let mut reinserter = ResultReinserter::new(&names, "fr");
    let (block, sanitized) = prepared.remove(0);

    let wrapper = reinserter.reinsert_structured(
        &mut doc,
        &mut marks,
        &block,
        sanitized,
        &["Bon".to_string(), "jour".to_string()],
    )?;

    assert_eq!(reinserter.inserted(), 1);
    assert!(marks.is_translation(wrapper));
    assert_eq!(doc.next_sibling(wrapper), Some(block.end_marker));
    let markup = outer_html(&doc, wrapper);
    assert!(markup.contains("lang=\"fr\""));
    assert!(markup.contains("Bon <b>jour</b>"));
    assert_eq!(doc.text_content(doc.find_element("b").unwrap()), "day");
    Ok(())
}

#[test]
fn test_reinsertStructured_withWrongCount_shouldFail() -> Result<()> {
    let (mut doc, mut marks, mut prepared) = prepare("<p>Good <b>day</b></p>", &TagClassifier::default())?;
    let names = MarkerNames::default();
    let mut reinserter = ResultReinserter::new(&names, "fr");
    let (block, sanitized) = prepared.remove(0);

    let result = reinserter.reinsert_structured(&mut doc, &mut marks, &block, sanitized, &["Bon".to_string()]);

    assert!(result.is_err());
    assert_eq!(reinserter.inserted(), 0);
    Ok(())
}

/// Test plain reinsertion uses a muted text container
#[test]
fn test_reinsertPlain_shouldInsertMutedText() -> Result<()> {
    let (mut doc, mut marks, mut prepared) = prepare("<p>Good <b>day</b></p>", &TagClassifier::default())?;
    let names = MarkerNames::default();
    let mut reinserter = ResultReinserter::new(&names, "fr");
    let (block, _) = prepared.remove(0);

    let wrapper = reinserter.reinsert_plain(&mut doc, &mut marks, &block, "  Bonjour  ")?;

    let markup = outer_html(&doc, wrapper);
    assert!(markup.contains("style=\"color:#2f4f4f;\">Bonjour</font>"));
    Ok(())
}
