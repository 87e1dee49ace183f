use anyhow::{Context, Result};
use encoding_rs::{Encoding, WINDOWS_1251};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::errors::PackError;
use crate::file_utils::FileManager;
use crate::packager::tag_grammar::{parse_index_tag, split_terminator, NEWLINE_PLACEHOLDER};

// @module: Repair of damaged index tags against an untouched anchor file

/// A second index tag later on the line, with an optional newline marker right after it
static REDUNDANT_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[.*(\[\d+\](?:\s*;NEW_LINE;)?\s*)").expect("Invalid redundant tag regex")
});

/// Tag that lost its closing bracket, e.g. `[12 Hello` or `[12:MLS: Hello`
static MALFORMED_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\[\d+(?::ML[ES]?:)?)[^\]\d]").expect("Invalid malformed tag regex")
});

/// Tag whose digits are gone entirely, e.g. `[ Hello` or `[] Hello`
///
/// A digit right after the bracket means the index survived, so `[12` is not bare.
static BARE_BRACKET_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\[\]?)(?:[^\d\]]|$)").expect("Invalid bare bracket regex"));

/// Collapse a duplicated index tag into a newline marker
///
/// Lines whose break was lost end up concatenated with both tags intact,
/// e.g. `[150] Some text. [150] ;NEW_LINE;`. The later tag (and a marker
/// directly following it) becomes a single `;NEW_LINE; `.
pub fn remove_redundancy(content: &str) -> String {
    match REDUNDANT_TAG_REGEX.captures(content).and_then(|caps| caps.get(1)) {
        Some(span) => format!(
            "{}{} {}",
            &content[..span.start()],
            NEWLINE_PLACEHOLDER,
            &content[span.end()..]
        ),
        None => content.to_string(),
    }
}

/// Verify one base line against its anchor, repairing the tag when possible
///
/// `line` is the 1-based position among non-blank lines and only used for
/// error reporting. Terminators are preserved.
pub fn verify_or_repair_line(line: usize, base: &str, anchor: &str) -> Result<String, PackError> {
    let (anchor_content, _) = split_terminator(anchor);
    let anchor_tag = parse_index_tag(anchor_content).ok_or_else(|| PackError::MissingAnchorTag {
        line,
        anchor: anchor.to_string(),
    })?;
    let anchor_tag_text = &anchor_content[..anchor_tag.end];

    let (base_content, terminator) = split_terminator(base);
    let content = remove_redundancy(base_content);

    if let Some(base_tag) = parse_index_tag(&content) {
        if base_tag.index != anchor_tag.index || base_tag.role != anchor_tag.role {
            return Err(PackError::AlignmentConflict {
                line,
                base_tag: content[..base_tag.end].to_string(),
                anchor_tag: anchor_tag_text.to_string(),
            });
        }
        return Ok(format!("{}{}", content, terminator));
    }

    if let Some(fragment) = MALFORMED_TAG_REGEX.captures(&content).and_then(|caps| caps.get(1)) {
        let digits: String = fragment.as_str().chars().filter(char::is_ascii_digit).collect();
        if digits != anchor_tag.index.to_string() {
            warn!("Line {}: replacing malformed tag {:?} with {}", line, fragment.as_str(), anchor_tag_text);
        }
        debug!("Line {}: repairing malformed tag", line);
        let repaired = splice_tag(anchor_tag_text, &content[fragment.end()..]);
        return Ok(format!("{}{}", repaired, terminator));
    }

    if let Some(bracket) = BARE_BRACKET_REGEX.captures(&content).and_then(|caps| caps.get(1)) {
        debug!("Line {}: restoring lost tag", line);
        let repaired = splice_tag(anchor_tag_text, &content[bracket.end()..]);
        return Ok(format!("{}{}", repaired, terminator));
    }

    Err(PackError::UnrecoverableLine {
        line,
        base: base.to_string(),
        anchor: anchor.to_string(),
    })
}

fn splice_tag(tag: &str, rest: &str) -> String {
    if rest.starts_with(char::is_whitespace) {
        format!("{}{}", tag, rest)
    } else {
        format!("{} {}", tag, rest)
    }
}

/// Repair every base line against the anchor line at the same position
pub fn repair_lines(base: &[String], anchor: &[String]) -> Result<Vec<String>, PackError> {
    base.iter()
        .zip(anchor)
        .enumerate()
        .map(|(position, (line_base, line_anchor))| {
            verify_or_repair_line(position + 1, line_base, line_anchor)
        })
        .collect()
}

/// Root key used to pair base and anchor files
///
/// The last `_`-delimited segment of the file name is dropped; a trailing
/// `-<N>` partition number in that segment is kept on the key.
pub fn file_root_key(path: &Path) -> String {
    let name = FileManager::display_name(path);
    let Some((root, segment)) = name.rsplit_once('_') else {
        return String::new();
    };

    let segment = segment.split('.').next().unwrap_or_default();
    match segment.rsplit_once('-') {
        Some((_, number)) if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) => {
            format!("{}-{}", root, number)
        }
        _ => root.to_string(),
    }
}

fn generate_lookup(filenames: &[PathBuf]) -> Result<BTreeMap<String, PathBuf>, PackError> {
    let mut lookup: BTreeMap<String, PathBuf> = BTreeMap::new();
    for filename in filenames {
        let root = file_root_key(filename);
        if let Some(first) = lookup.get(&root) {
            return Err(PackError::DuplicateRoot {
                root,
                first: first.clone(),
                second: filename.clone(),
            });
        }
        lookup.insert(root, filename.clone());
    }
    Ok(lookup)
}

// @struct: A base file and its anchor sharing one root key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentPair {
    pub root: String,
    pub base: PathBuf,
    pub anchor: PathBuf,
}

/// Pair base and anchor files 1:1 by root key
pub fn pair_files(base: &[PathBuf], anchor: &[PathBuf]) -> Result<Vec<AlignmentPair>, PackError> {
    if base.len() != anchor.len() {
        return Err(PackError::FileCountMismatch {
            base: base.len(),
            anchor: anchor.len(),
        });
    }

    let base_lookup = generate_lookup(base)?;
    let anchor_lookup = generate_lookup(anchor)?;

    base_lookup
        .into_iter()
        .map(|(root, base)| match anchor_lookup.get(&root) {
            Some(anchor) => Ok(AlignmentPair {
                root,
                base,
                anchor: anchor.clone(),
            }),
            None => Err(PackError::MissingPair { root, base }),
        })
        .collect()
}

// @struct: Aligns a set of edited files against their untouched anchors
#[derive(Debug, Clone)]
pub struct Aligner {
    pairs: Vec<AlignmentPair>,
    output_dir: PathBuf,
    encoding: &'static Encoding,
}

impl Aligner {
    /// Pair the inputs; any pairing problem is fatal before a file is touched
    pub fn new<P: AsRef<Path>>(filenames_base: &[PathBuf], filenames_anchor: &[PathBuf], output_dir: P) -> Result<Self> {
        let pairs = pair_files(filenames_base, filenames_anchor)?;

        Ok(Self {
            pairs,
            output_dir: output_dir.as_ref().to_path_buf(),
            encoding: WINDOWS_1251,
        })
    }

    /// Encoding of the inputs and the repaired output
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn pairs(&self) -> &[AlignmentPair] {
        &self.pairs
    }

    /// Align every pair, stopping at the first failure
    pub fn align(&self) -> Result<Vec<PathBuf>> {
        let roots: Vec<&str> = self.pairs.iter().map(|p| p.root.as_str()).collect();
        info!("Beginning File Alignment: {:?}", roots);

        self.pairs.iter().map(|pair| self.align_pair(pair)).collect()
    }

    /// Repair one base file and write `<root>_aligned.txt`
    pub fn align_pair(&self, pair: &AlignmentPair) -> Result<PathBuf> {
        info!("{}: Processing...", pair.root);

        let contents_base = self.read_non_blank(&pair.base)?;
        let contents_anchor = self.read_non_blank(&pair.anchor)?;

        debug!("{}: Verifying line count...", pair.root);
        if contents_base.len() != contents_anchor.len() {
            return Err(PackError::LineCountMismatch {
                base: pair.base.clone(),
                base_lines: contents_base.len(),
                anchor: pair.anchor.clone(),
                anchor_lines: contents_anchor.len(),
            }
            .into());
        }

        debug!("{}: Repairing...", pair.root);
        let repaired = repair_lines(&contents_base, &contents_anchor)
            .with_context(|| format!("Failed to align {:?} against {:?}", pair.base, pair.anchor))?;

        let output = self.output_dir.join(FileManager::aligned_filename(&pair.root));
        FileManager::write_encoded(&output, &repaired.concat(), self.encoding)?;
        info!("{}: Alignment Successful", pair.root);

        Ok(output)
    }

    fn read_non_blank(&self, path: &Path) -> Result<Vec<String>> {
        let lines = FileManager::read_lines_lossy(path, self.encoding)?;
        Ok(lines.into_iter().filter(|line| !line.trim().is_empty()).collect())
    }
}
