/*!
 * Tests for error types and conversions
 */

use anyhow::anyhow;
use std::path::PathBuf;
use xmlpack::errors::{AppError, ErrorCategory, PackError, ProviderError};
use xmlpack::packager::Role;

#[test]
fn test_packError_lineCountMismatch_shouldNameBothFiles() {
    let error = PackError::LineCountMismatch {
        base: PathBuf::from("dialog_translate.txt"),
        base_lines: 10,
        anchor: PathBuf::from("dialog_unpacked.txt"),
        anchor_lines: 12,
    };
    let display = error.to_string();
    assert!(display.contains("dialog_translate.txt"));
    assert!(display.contains("12"));
    assert_eq!(error.category(), ErrorCategory::StructuralMismatch);
}

#[test]
fn test_packError_categories_shouldGroupFailures() {
    assert_eq!(PackError::DuplicateIndex { index: 1 }.category(), ErrorCategory::StructuralMismatch);
    assert_eq!(PackError::UnterminatedMultiline { start: 4 }.category(), ErrorCategory::TagGrammar);
    assert_eq!(
        PackError::MissingSpan {
            index: 2,
            role: Role::MultilineEnd,
            line: "x".to_string()
        }
        .category(),
        ErrorCategory::TagGrammar
    );
    assert_eq!(
        PackError::AlignmentConflict {
            line: 1,
            base_tag: "[1]".to_string(),
            anchor_tag: "[2]".to_string()
        }
        .category(),
        ErrorCategory::AlignmentConflict
    );
    assert_eq!(
        PackError::FilenameMismatch {
            base: "a.xml".to_string(),
            translated: "b_translate.txt".to_string(),
            expected: "a_translate.txt".to_string()
        }
        .category(),
        ErrorCategory::FilenameContract
    );
}

#[test]
fn test_packError_missingSpan_shouldDisplayRole() {
    let error = PackError::MissingSpan {
        index: 7,
        role: Role::MultilineStart,
        line: "plain".to_string(),
    };
    assert!(error.to_string().contains("multiline-start"));
}

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 429,
        message: "Too many requests".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("429"));
    assert!(display.contains("Too many requests"));
}

#[test]
fn test_appError_fromAnyhow_shouldRecoverPackError() {
    let wrapped = anyhow::Error::new(PackError::DuplicateIndex { index: 3 }).context("while merging");
    let app_error: AppError = wrapped.into();
    assert!(matches!(app_error, AppError::Pack(PackError::DuplicateIndex { index: 3 })));

    let other: AppError = anyhow!("something else").into();
    assert!(matches!(other, AppError::Unknown(_)));
}

#[test]
fn test_appError_fromIoError_shouldBeFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.xml");
    let app_error: AppError = io_error.into();
    assert!(matches!(app_error, AppError::File(_)));
    assert!(app_error.to_string().contains("missing.xml"));
}
