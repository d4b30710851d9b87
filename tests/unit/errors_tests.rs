/*!
 * Tests for error types
 */

use std::error::Error;

use twintext::errors::{AppError, ProcessingError, ProviderError, TreeError};

#[test]
fn test_providerError_display_shouldIncludeStatus() {
    let error = ProviderError::ApiError {
        status_code: 429,
        message: "slow down".to_string(),
    };
    assert_eq!(error.to_string(), "API responded with error: 429 - slow down");
}

/// Test the service failure keeps the backend error as its source
#[test]
fn test_processingError_service_shouldExposeSource() {
    let error = ProcessingError::Service {
        units: 3,
        source: ProviderError::ConnectionError("refused".to_string()),
    };

    assert_eq!(
        error.to_string(),
        "Translation of 3 text units failed: Connection error: refused"
    );
    let source = error.source().expect("service errors carry their cause");
    assert_eq!(source.to_string(), "Connection error: refused");
}

#[test]
fn test_processingError_fromTreeError_shouldWrap() {
    let error: ProcessingError = TreeError::Detached(7).into();
    assert!(matches!(error, ProcessingError::Tree(TreeError::Detached(7))));
    assert!(error.to_string().contains("node 7 is detached"));
}

#[test]
fn test_processingError_extraction_shouldNameLocation() {
    let error = ProcessingError::Extraction {
        paragraph: 2,
        block: 1,
        reason: "no text".to_string(),
    };
    assert_eq!(error.to_string(), "Extraction failed in paragraph 2, block 1: no text");
}

/// Test conversion into the application error
#[test]
fn test_appError_fromProcessingError_shouldConvert() {
    let app_error: AppError = ProcessingError::TranslationCountMismatch {
        expected: 4,
        actual: 3,
    }
    .into();

    assert!(matches!(app_error, AppError::Processing(_)));
    assert!(app_error.to_string().contains("returned 3 texts for 4 inputs"));
}

#[test]
fn test_appError_isServiceFailure_shouldOnlyMatchBackendErrors() {
    let service: AppError = ProcessingError::Service {
        units: 1,
        source: ProviderError::AuthenticationError("denied".to_string()),
    }
    .into();
    let parse: AppError = ProcessingError::Parse("bad".to_string()).into();

    assert!(service.is_service_failure());
    assert!(!parse.is_service_failure());
    assert!(!AppError::File("gone".to_string()).is_service_failure());
}
