use anyhow::{anyhow, Context, Result};
use encoding_rs::Encoding;
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @returns: File name component, lossily converted
    pub fn display_name<P: AsRef<Path>>(path: P) -> String {
        path.as_ref()
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    // @returns: File name up to its first dot (`dialog.en.xml` -> `dialog`)
    pub fn file_stem_root<P: AsRef<Path>>(path: P) -> String {
        let name = Self::display_name(path);
        name.split('.').next().unwrap_or_default().to_string()
    }

    // @generates: `<root>_unpacked.txt` or `<root>_unpacked-<N>.txt`
    pub fn unpacked_filename(root: &str, partition: Option<usize>) -> String {
        Self::suffixed_filename(root, "_unpacked", partition)
    }

    // @generates: `<root>_translate.txt` or `<root>_translate-<N>.txt`
    pub fn translate_filename(root: &str, partition: Option<usize>) -> String {
        Self::suffixed_filename(root, "_translate", partition)
    }

    // @generates: `<root>_aligned.txt`
    pub fn aligned_filename(root: &str) -> String {
        Self::suffixed_filename(root, "_aligned", None)
    }

    fn suffixed_filename(root: &str, suffix: &str, partition: Option<usize>) -> String {
        match partition {
            Some(number) => format!("{}{}-{}.txt", root, suffix, number),
            None => format!("{}{}.txt", root, suffix),
        }
    }

    /// Resolve an encoding label such as `windows-1251` or `utf-8`
    pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
        Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding: {}", label))
    }

    /// Find files with a specific extension in a directory
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let extension = extension.trim_start_matches('.');

        for entry in WalkDir::new(dir.as_ref()).follow_links(true).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && Self::has_extension(path, extension) {
                result.push(path.to_path_buf());
            }
        }

        Ok(result)
    }

    /// Expand a mix of files and directories into the files with `extension`
    ///
    /// Files are taken as given, directories are walked recursively.
    pub fn expand_inputs(inputs: &[PathBuf], extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        for input in inputs {
            if input.is_dir() {
                result.extend(Self::find_files(input, extension)?);
            } else if input.is_file() {
                result.push(input.clone());
            } else {
                return Err(anyhow!("Input path does not exist: {:?}", input));
            }
        }
        Ok(result)
    }

    // @checks: Case-insensitive extension match
    pub fn has_extension<P: AsRef<Path>>(path: P, extension: &str) -> bool {
        path.as_ref()
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension.trim_start_matches('.')))
    }

    /// Read a file in `encoding` and split it into lines, terminators kept
    ///
    /// Bytes that are invalid in the encoding are an error.
    pub fn read_lines<P: AsRef<Path>>(path: P, encoding: &'static Encoding) -> Result<Vec<String>> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("Failed to read file: {:?}", path))?;
        let (text, used, had_errors) = encoding.decode(&bytes);
        if had_errors {
            return Err(anyhow!("File {:?} is not valid {}", path, used.name()));
        }
        Ok(Self::split_lines(&text))
    }

    /// Like `read_lines`, but undecodable bytes become U+FFFD
    pub fn read_lines_lossy<P: AsRef<Path>>(path: P, encoding: &'static Encoding) -> Result<Vec<String>> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("Failed to read file: {:?}", path))?;
        let (text, _, _) = encoding.decode(&bytes);
        Ok(Self::split_lines(&text))
    }

    // @returns: Physical lines with their `\n` / `\r\n` terminators
    pub fn split_lines(text: &str) -> Vec<String> {
        text.split_inclusive('\n').map(String::from).collect()
    }

    /// Encode `content` and write it, creating the parent directory
    ///
    /// Characters the encoding cannot represent are an error rather than
    /// being silently replaced.
    pub fn write_encoded<P: AsRef<Path>>(path: P, content: &str, encoding: &'static Encoding) -> Result<()> {
        let path = path.as_ref();
        let (bytes, used, had_unmappable) = encoding.encode(content);
        if had_unmappable {
            return Err(anyhow!("Content for {:?} cannot be represented in {}", path, used.name()));
        }

        if let Some(parent) = path.parent() {
            Self::ensure_dir(parent)?;
        }
        fs::write(path, bytes).with_context(|| format!("Failed to write to file: {:?}", path))
    }

    /// Create an empty placeholder file
    ///
    /// An existing non-empty file is left alone and `false` is returned, so a
    /// translation already written into it survives a repeated run.
    pub fn create_placeholder_file<P: AsRef<Path>>(path: P) -> Result<bool> {
        let path = path.as_ref();
        if let Ok(metadata) = fs::metadata(path) {
            if metadata.len() > 0 {
                warn!("Placeholder {:?} already has content, leaving it untouched", path);
                return Ok(false);
            }
        }

        if let Some(parent) = path.parent() {
            Self::ensure_dir(parent)?;
        }
        fs::write(path, b"").with_context(|| format!("Failed to create file: {:?}", path))?;
        Ok(true)
    }
}
