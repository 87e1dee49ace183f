/*!
 * Translation collaborator seam.
 *
 * The packer never talks to a translation service itself. Anything able to turn
 * one string into another for a target language can implement `LineTranslator`
 * and be driven by `translate_structured_lines`, which translates every simple
 * span of a structured file in place.
 */

use log::{debug, info};
use std::fmt::Debug;

use crate::errors::{AppError, ProviderError};
use crate::packager::tag_grammar::{classify_source_line, split_terminator, SourceLine};

pub mod mock;

/// A provider translating one text at a time
///
/// Calls are blocking and made once per span; there is no batching or retry.
pub trait LineTranslator: Debug {
    /// Translate `text` into `target_language`
    fn translate(&self, text: &str, target_language: &str) -> Result<String, ProviderError>;
}

/// Translate every single-line span of a structured file
///
/// Lines without a simple span are copied unchanged. The first provider error
/// aborts the whole file and identifies the offending line; a blank answer for
/// non-blank text counts as an error too.
pub fn translate_structured_lines<T: LineTranslator + ?Sized>(
    lines: &[String],
    translator: &T,
    target_language: &str,
) -> Result<Vec<String>, AppError> {
    let mut translated = Vec::with_capacity(lines.len());
    let mut spans = 0;

    for (position, line) in lines.iter().enumerate() {
        let (content, terminator) = split_terminator(line);

        let SourceLine::Simple(span) = classify_source_line(content) else {
            translated.push(line.clone());
            continue;
        };

        let text_raw = &content[span.clone()];
        let text_translate = translator.translate(text_raw, target_language).map_err(|e| {
            AppError::Provider(ProviderError::RequestFailed(format!("line {}: {}", position + 1, e)))
        })?;
        if text_translate.trim().is_empty() && !text_raw.trim().is_empty() {
            return Err(ProviderError::EmptyResponse(text_raw.to_string()).into());
        }
        debug!("Processing line: {}: {} -> {}", position + 1, text_raw, text_translate);

        translated.push(format!(
            "{}{}{}{}",
            &content[..span.start],
            text_translate,
            &content[span.end..],
            terminator
        ));
        spans += 1;
    }

    info!("Translated {} span(s) into {}", spans, target_language);
    Ok(translated)
}
