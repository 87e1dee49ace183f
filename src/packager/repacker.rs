use anyhow::{anyhow, Context, Result};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1251};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::errors::PackError;
use crate::file_utils::FileManager;
use crate::packager::tag_grammar::{parse_index_tag, split_terminator, unescape_newlines, Role};

// @module: Reinsertion of translated text into the structured file

/// Suffix appended to a base file root to name its translated stream
pub const TRANSLATE_SUFFIX: &str = "_translate";

// @struct: Translated payload for one source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedLine {
    // @field: Role the row was tagged with
    pub role: Role,

    // @field: Payload with newline placeholders decoded
    pub text: String,
}

/// Mapping from source line index to its translated payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationIndex {
    entries: BTreeMap<usize, TranslatedLine>,
}

impl TranslationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the rows of a translated stream
    ///
    /// Every row must start with an index tag; the row terminator is not part
    /// of the payload.
    pub fn parse(rows: &[String]) -> Result<Self, PackError> {
        let mut index = Self::new();

        for (position, row) in rows.iter().enumerate() {
            let (content, _) = split_terminator(row);
            let tag = parse_index_tag(content).ok_or_else(|| PackError::InvalidRow {
                line: position + 1,
                row: row.clone(),
            })?;

            let text = unescape_newlines(tag.payload(content));
            index.insert(tag.index, TranslatedLine { role: tag.role, text })?;
        }

        Ok(index)
    }

    /// Add one entry; an index seen before is fatal
    pub fn insert(&mut self, index: usize, line: TranslatedLine) -> Result<(), PackError> {
        if self.entries.contains_key(&index) {
            return Err(PackError::DuplicateIndex { index });
        }
        self.entries.insert(index, line);
        Ok(())
    }

    /// Fold another partition's entries into this index
    pub fn merge(&mut self, other: TranslationIndex) -> Result<(), PackError> {
        for (index, line) in other.entries {
            self.insert(index, line)?;
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&TranslatedLine> {
        self.entries.get(&index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &TranslatedLine)> {
        self.entries.iter().map(|(index, line)| (*index, line))
    }
}

/// Produce the translated file from the base lines and a translation index
pub fn apply_translation(
    base_lines: &[String],
    index: &TranslationIndex,
) -> Result<Vec<String>, PackError> {
    apply_entries(base_lines, index.iter())
}

/// Apply entries in the given order; distinct indices make the order irrelevant
pub fn apply_entries<'a, I>(base_lines: &[String], entries: I) -> Result<Vec<String>, PackError>
where
    I: IntoIterator<Item = (usize, &'a TranslatedLine)>,
{
    let mut lines = base_lines.to_vec();

    for (index, translated) in entries {
        if index == 0 || index > lines.len() {
            return Err(PackError::IndexOutOfRange {
                index,
                line_count: lines.len(),
            });
        }

        let replaced = replace_payload(&lines[index - 1], index, translated)?;
        lines[index - 1] = replaced;
    }

    Ok(lines)
}

fn replace_payload(line: &str, index: usize, translated: &TranslatedLine) -> Result<String, PackError> {
    let (content, terminator) = split_terminator(line);
    let span = translated
        .role
        .source_span(content)
        .ok_or_else(|| PackError::MissingSpan {
            index,
            role: translated.role,
            line: line.to_string(),
        })?;

    Ok(format!(
        "{}{}{}{}",
        &content[..span.start],
        translated.text,
        &content[span.end..],
        terminator
    ))
}

/// Check that `translated` is named after `base`
///
/// Accepts `<root>_translate.txt` and the partitioned `<root>_translate-<N>.txt`;
/// returns the partition number when there is one.
pub fn check_file_alignment(base: &Path, translated: &Path) -> Result<Option<usize>, PackError> {
    let base_name = FileManager::display_name(base);
    let translated_name = FileManager::display_name(translated);
    let root = FileManager::file_stem_root(base);
    let expected = format!("{}{}.txt", root, TRANSLATE_SUFFIX);

    let mismatch = || PackError::FilenameMismatch {
        base: base_name.clone(),
        translated: translated_name.clone(),
        expected: expected.clone(),
    };

    if translated_name == expected {
        return Ok(None);
    }

    let partition = translated_name
        .strip_prefix(&format!("{}{}-", root, TRANSLATE_SUFFIX))
        .and_then(|rest| rest.strip_suffix(".txt"))
        .filter(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
        .and_then(|digits| digits.parse::<usize>().ok())
        .ok_or_else(mismatch)?;

    Ok(Some(partition))
}

// @struct: Repacks translated stream(s) into one structured file
#[derive(Debug, Clone)]
pub struct Repacker {
    filename_base: PathBuf,
    filenames_translate: Vec<PathBuf>,
    output_dir: PathBuf,
    base_encoding: &'static Encoding,
    translation_encoding: &'static Encoding,
}

impl Repacker {
    /// Create a repacker, validating the file naming contract up front
    pub fn new<P1, P2, I>(filename_base: P1, filenames_translate: I, output_dir: P2) -> Result<Self>
    where
        P1: AsRef<Path>,
        P2: AsRef<Path>,
        I: IntoIterator,
        I::Item: AsRef<Path>,
    {
        let filename_base = filename_base.as_ref().to_path_buf();
        let filenames_translate: Vec<PathBuf> = filenames_translate
            .into_iter()
            .map(|p| p.as_ref().to_path_buf())
            .collect();

        if filenames_translate.is_empty() {
            return Err(anyhow!("No translated file given for {:?}", filename_base));
        }

        for translated in &filenames_translate {
            check_file_alignment(&filename_base, translated)?;
        }

        Ok(Self {
            filename_base,
            filenames_translate,
            output_dir: output_dir.as_ref().to_path_buf(),
            base_encoding: WINDOWS_1251,
            translation_encoding: UTF_8,
        })
    }

    /// Encoding of the structured base file and of the written output
    pub fn with_base_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.base_encoding = encoding;
        self
    }

    /// Encoding of the translated stream(s)
    pub fn with_translation_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.translation_encoding = encoding;
        self
    }

    /// Reinsert every translated row and write the result
    ///
    /// The output keeps the base file's name and is only written once the
    /// whole file has been rebuilt in memory.
    pub fn repack(&self) -> Result<PathBuf> {
        let base_name = FileManager::display_name(&self.filename_base);
        info!("Repacking... |{}| <- {} translated file(s)", base_name, self.filenames_translate.len());

        let base_lines = FileManager::read_lines(&self.filename_base, self.base_encoding)?;
        debug!("|{}| Loaded {} lines into memory", base_name, base_lines.len());

        let mut index = TranslationIndex::new();
        for translated in &self.filenames_translate {
            let rows = FileManager::read_lines(translated, self.translation_encoding)?;
            let partition = TranslationIndex::parse(&rows)
                .with_context(|| format!("Failed to parse translated file {:?}", translated))?;
            debug!("|{}| {} translated row(s)", FileManager::display_name(translated), partition.len());
            index
                .merge(partition)
                .with_context(|| format!("Failed to merge translated file {:?}", translated))?;
        }

        if index.is_empty() {
            warn!("|{}| Translated input is empty, output will match the base file", base_name);
        }

        let repacked = apply_translation(&base_lines, &index)
            .with_context(|| format!("Failed to repack {:?}", self.filename_base))?;

        let output = self.output_dir.join(&base_name);
        FileManager::write_encoded(&output, &repacked.concat(), self.base_encoding)?;
        info!("File: {} - Writing: {:?} - Successful", base_name, output);

        Ok(output)
    }
}
