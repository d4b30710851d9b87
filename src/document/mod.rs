/*!
 * Mutable HTML document model.
 *
 * - `node`: arena tree with stable node identities and structural mutation
 * - `fragment`: owned deep copies of subtrees
 * - `classify`: tag classification table
 * - `parser`: html5ever front end
 * - `serializer`: markup output
 */

pub mod classify;
pub mod fragment;
pub mod node;
pub mod parser;
pub mod serializer;

pub use classify::{TagClass, TagClassifier};
pub use fragment::{Fragment, NodePath};
pub use node::{Document, ElementData, NodeId, NodeKind};
pub use parser::{parse_html, parse_html_bytes};
pub use serializer::{fragment_inner_html, inner_html, outer_html, to_html};
