use anyhow::{Context, Result};
use encoding_rs::{Encoding, WINDOWS_1251};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use crate::errors::PackError;
use crate::file_utils::FileManager;
use crate::packager::tag_grammar::{
    classify_source_line, close_span, escape_newlines, escapes_losslessly, open_span,
    split_terminator, Role, SourceLine,
};

// @module: Extraction of tagged text into an indexed stream

/// Default character budget per partition
pub const CHARACTER_LIMIT: usize = 5000;

// @struct: One extracted line with its source position and role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedUnit {
    // @field: 1-based source line number
    pub index: usize,

    // @field: Structural role
    pub role: Role,

    // @field: Raw payload, newlines not yet escaped
    pub text: String,
}

impl ExtractedUnit {
    pub fn new(index: usize, role: Role, text: impl Into<String>) -> Self {
        Self {
            index,
            role,
            text: text.into(),
        }
    }

    /// Render as one stream row: tag, single space, escaped payload, newline
    pub fn render(&self) -> String {
        format!("{} {}\n", self.role.tag(self.index), escape_newlines(&self.text))
    }
}

// Payloads that cannot survive newline escaping are refused up front
fn checked_unit(index: usize, role: Role, text: &str, line: &str) -> Result<ExtractedUnit, PackError> {
    if !escapes_losslessly(text) {
        return Err(PackError::ReservedPlaceholder {
            index,
            line: line.to_string(),
        });
    }
    Ok(ExtractedUnit::new(index, role, text))
}

/// Units extracted from one structural span
///
/// A simple span yields one unit; a multi-line span yields its start, middle
/// and end units together so that partitioning never splits it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedBlock {
    pub units: Vec<ExtractedUnit>,
}

impl ExtractedBlock {
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Stream rows for every unit in the block
    pub fn render(&self) -> String {
        self.units.iter().map(ExtractedUnit::render).collect()
    }
}

/// One output chunk of an extraction run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// Rendered stream rows
    pub contents: String,
    /// Characters counted against the budget
    pub characters: usize,
}

/// Walk the source lines and extract every tagged span
pub fn extract_blocks(lines: &[String]) -> Result<Vec<ExtractedBlock>, PackError> {
    let mut blocks = Vec::new();
    let mut cursor = 0;

    while cursor < lines.len() {
        let index = cursor + 1;
        let line = &lines[cursor];
        let (content, _) = split_terminator(line);

        match classify_source_line(content) {
            SourceLine::Simple(span) => {
                debug!("[{}] Match - Simple", index);
                blocks.push(ExtractedBlock {
                    units: vec![checked_unit(index, Role::Simple, &content[span], line)?],
                });
                cursor += 1;
            }
            SourceLine::Open(_) => {
                debug!("[{}] Match - Multiline", index);
                let (block, next) = consume_multiline(lines, cursor)?;
                if !block.is_empty() {
                    blocks.push(block);
                }
                cursor = next;
            }
            SourceLine::Close(_) | SourceLine::Plain => {
                cursor += 1;
            }
        }
    }

    Ok(blocks)
}

/// Consume a multi-line span whose opening line sits at `cursor` (0-based)
///
/// Returns the extracted block and the cursor of the first line after the
/// closing marker.
pub fn consume_multiline(
    lines: &[String],
    cursor: usize,
) -> Result<(ExtractedBlock, usize), PackError> {
    let start = cursor + 1;
    let opening = lines
        .get(cursor)
        .ok_or(PackError::UnterminatedMultiline { start })?;
    let (content, _) = split_terminator(opening);
    let span = open_span(content).ok_or_else(|| PackError::MissingSpan {
        index: start,
        role: Role::MultilineStart,
        line: opening.clone(),
    })?;

    let mut block = ExtractedBlock::default();
    if !span.is_empty() {
        block
            .units
            .push(checked_unit(start, Role::MultilineStart, &content[span], opening)?);
    }

    let mut position = cursor + 1;
    loop {
        let line = lines
            .get(position)
            .ok_or(PackError::UnterminatedMultiline { start })?;
        let (content, _) = split_terminator(line);
        let index = position + 1;

        if let Some(span) = close_span(content) {
            if !span.is_empty() {
                block
                    .units
                    .push(checked_unit(index, Role::MultilineEnd, &content[span], line)?);
            }
            return Ok((block, position + 1));
        }

        block
            .units
            .push(checked_unit(index, Role::MultilineMiddle, content, line)?);
        position += 1;
    }
}

/// Split rendered blocks into partitions of at most `limit` characters
///
/// Without a limit everything lands in one partition. A block larger than the
/// limit occupies a partition of its own.
pub fn partition_blocks(blocks: &[ExtractedBlock], limit: Option<usize>) -> Vec<Partition> {
    let mut partitions = Vec::new();
    let mut contents = String::new();
    let mut characters = 0;

    for block in blocks {
        let text = block.render();
        let length = text.chars().count();

        if let Some(limit) = limit {
            if !contents.is_empty() && characters + length > limit {
                partitions.push(Partition {
                    contents: std::mem::take(&mut contents),
                    characters,
                });
                characters = 0;
            }
        }

        contents.push_str(&text);
        characters += length;
    }

    if !contents.is_empty() {
        partitions.push(Partition {
            contents,
            characters,
        });
    }

    partitions
}

// @struct: Unpacks one structured file into indexed stream file(s)
#[derive(Debug, Clone)]
pub struct Unpacker {
    filename: PathBuf,
    output_dir: PathBuf,
    placeholder_dir: Option<PathBuf>,
    character_limit: Option<usize>,
    encoding: &'static Encoding,
}

impl Unpacker {
    // @creates: Unpacker writing a single, unpartitioned stream in windows-1251
    pub fn new<P1: AsRef<Path>, P2: AsRef<Path>>(filename: P1, output_dir: P2) -> Self {
        Self {
            filename: filename.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
            placeholder_dir: None,
            character_limit: None,
            encoding: WINDOWS_1251,
        }
    }

    /// Partition the output by a character budget
    pub fn with_character_limit(mut self, limit: usize) -> Self {
        self.character_limit = Some(limit);
        self
    }

    /// Create an empty `_translate` file per partition in `dir`
    pub fn with_placeholder_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.placeholder_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Encoding used for both the source file and the written stream
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Extract the file and write its partition(s)
    ///
    /// Returns the paths of the written stream files. Nothing is written when
    /// extraction fails or the file contains no tagged text.
    pub fn unpack(&self) -> Result<Vec<PathBuf>> {
        let name = FileManager::display_name(&self.filename);
        info!("|{}| - Unpacking...", name);

        let lines = FileManager::read_lines(&self.filename, self.encoding)?;
        debug!("|{}| Loaded {} lines into memory", name, lines.len());

        let blocks = extract_blocks(&lines)
            .with_context(|| format!("Failed to unpack {:?}", self.filename))?;

        if blocks.is_empty() {
            warn!("|{}| No tagged text found, nothing written", name);
            return Ok(Vec::new());
        }

        let partitions = partition_blocks(&blocks, self.character_limit);
        let root = FileManager::file_stem_root(&self.filename);
        let mut written = Vec::with_capacity(partitions.len());

        for (number, partition) in partitions.iter().enumerate() {
            let partition_number = self.character_limit.map(|_| number);

            let output = self
                .output_dir
                .join(FileManager::unpacked_filename(&root, partition_number));
            info!(
                "|{}| Writing: {:?} - Characters: {}",
                name, output, partition.characters
            );
            FileManager::write_encoded(&output, &partition.contents, self.encoding)?;

            if let Some(placeholder_dir) = &self.placeholder_dir {
                let placeholder =
                    placeholder_dir.join(FileManager::translate_filename(&root, partition_number));
                FileManager::create_placeholder_file(&placeholder)?;
            }

            written.push(output);
        }

        info!("|{}| Unpacked {} block(s) into {} file(s)", name, blocks.len(), written.len());
        Ok(written)
    }
}
