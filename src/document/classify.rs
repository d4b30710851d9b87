/*!
 * Tag classification.
 *
 * The classifier is a plain lookup table from lowercase tag name to
 * `TagClass`. Tags that are not listed are block-level. The default table
 * can be replaced wholesale from configuration.
 */

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::node::ElementData;

/// How a tag participates in paragraph and block detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagClass {
    /// Inline formatting that stays inside the surrounding paragraph
    InlineText,
    /// Inline element that never starts a paragraph on its own
    InlineIgnore,
    /// Forced line break
    LineBreak,
    /// Content that is never translated
    NoTranslate,
    /// Everything else
    Block,
}

/// Tags treated as inline text formatting by default
pub const DEFAULT_INLINE_TEXT: &[&str] = &[
    "a", "abbr", "acronym", "b", "bdo", "big", "cite", "dfn", "em", "i", "label", "q", "s",
    "small", "span", "strong", "sub", "sup", "u", "tt", "var",
];

/// Inline tags that never become paragraphs by themselves
pub const DEFAULT_INLINE_IGNORE: &[&str] = &["code", "kbd", "wbr"];

pub const DEFAULT_LINE_BREAK: &[&str] = &["br"];

/// Tags whose content is skipped entirely
pub const DEFAULT_NO_TRANSLATE: &[&str] = &[
    "title", "script", "style", "textarea", "svg", "noscript", "template",
];

/// Class name that opts an element out of translation
pub const NO_TRANSLATE_CLASS: &str = "notranslate";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagClassifier {
    table: HashMap<String, TagClass>,
}

impl Default for TagClassifier {
    fn default() -> Self {
        Self::from_lists(
            DEFAULT_INLINE_TEXT,
            DEFAULT_INLINE_IGNORE,
            DEFAULT_LINE_BREAK,
            DEFAULT_NO_TRANSLATE,
        )
    }
}

impl TagClassifier {
    /// Classifier that treats every tag as block-level
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Build a classifier from one list per class
    ///
    /// When a tag appears in several lists the later list wins, so
    /// no-translate overrides everything else.
    pub fn from_lists<S: AsRef<str>>(
        inline_text: &[S],
        inline_ignore: &[S],
        line_break: &[S],
        no_translate: &[S],
    ) -> Self {
        [
            (inline_text, TagClass::InlineText),
            (inline_ignore, TagClass::InlineIgnore),
            (line_break, TagClass::LineBreak),
            (no_translate, TagClass::NoTranslate),
        ]
        .into_iter()
        .fold(Self::empty(), |classifier, (tags, class)| {
            tags.iter()
                .fold(classifier, |classifier, tag| classifier.with(tag.as_ref(), class))
        })
    }

    /// Add or override a single entry
    pub fn with(mut self, tag: &str, class: TagClass) -> Self {
        self.table.insert(tag.to_ascii_lowercase(), class);
        self
    }

    pub fn classify(&self, tag: &str) -> TagClass {
        self.table
            .get(tag)
            .or_else(|| self.table.get(&tag.to_ascii_lowercase()))
            .copied()
            .unwrap_or(TagClass::Block)
    }

    /// Inline text, inline-ignore and line-break tags
    pub fn is_inline(&self, tag: &str) -> bool {
        matches!(
            self.classify(tag),
            TagClass::InlineText | TagClass::InlineIgnore | TagClass::LineBreak
        )
    }

    /// Whether the element and its whole subtree are excluded from translation
    pub fn skips(&self, element: &ElementData) -> bool {
        self.classify(&element.name) == TagClass::NoTranslate
            || element.has_class(NO_TRANSLATE_CLASS)
            || element
                .attr("translate")
                .is_some_and(|value| value.trim().eq_ignore_ascii_case("no"))
    }
}
