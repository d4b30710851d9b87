/*!
 * Error types for the twintext application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with translation backends
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Structural mutation rejected by the document tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The reference node has no parent to insert next to
    #[error("node {0} is detached from the tree")]
    Detached(usize),

    /// The target cannot hold children
    #[error("node {0} cannot contain children")]
    NotContainer(usize),

    /// Inserting would make a node its own ancestor
    #[error("moving node {0} would create a cycle")]
    Cycle(usize),

    /// A range operation was given nodes that are not ordered siblings
    #[error("nodes {0} and {1} are not ordered siblings")]
    NotSiblings(usize, usize),
}

/// Errors raised while turning a document into its bilingual form
#[derive(Error, Debug)]
pub enum ProcessingError {
    /// The input could not be read as an HTML document
    #[error("Failed to parse HTML document: {0}")]
    Parse(String),

    /// A tree mutation was rejected
    #[error("Document structure error: {0}")]
    Tree(#[from] TreeError),

    /// A block violated a structural invariant during extraction
    #[error("Extraction failed in paragraph {paragraph}, block {block}: {reason}")]
    Extraction {
        /// Index of the paragraph in document order
        paragraph: usize,
        /// Index of the block within the paragraph
        block: usize,
        /// What went wrong
        reason: String,
    },

    /// The translation backend failed; nothing was inserted
    #[error("Translation of {units} text units failed: {source}")]
    Service {
        /// Number of units in the rejected batch
        units: usize,
        /// Underlying backend error
        #[source]
        source: ProviderError,
    },

    /// The backend returned a batch of the wrong size
    #[error("Translation backend returned {actual} texts for {expected} inputs")]
    TranslationCountMismatch {
        /// Number of texts sent
        expected: usize,
        /// Number of texts received
        actual: usize,
    },
}

/// Errors surfaced by the application layer for one input file
#[derive(Error, Debug)]
pub enum AppError {
    /// The input could not be read or the output could not be written
    #[error("File error: {0}")]
    File(String),

    /// Invalid or inconsistent configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from document processing
    #[error("Processing error: {0}")]
    Processing(#[from] ProcessingError),
}

impl AppError {
    /// Whether the translation backend caused the failure
    pub fn is_service_failure(&self) -> bool {
        matches!(
            self,
            Self::Processing(ProcessingError::Service { .. } | ProcessingError::TranslationCountMismatch { .. })
        )
    }
}
