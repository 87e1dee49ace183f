use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::packager::{Aligner, Repacker, Unpacker};
use crate::translation::{translate_structured_lines, LineTranslator};

// @module: Application controller for batch packing

/// Outcome of a batch run; one file failing does not stop the others
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Output files written
    pub written: Vec<PathBuf>,
    /// Inputs that failed, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Turn recorded failures into a single error
    pub fn into_result(self) -> Result<Vec<PathBuf>> {
        if self.failed.is_empty() {
            return Ok(self.written);
        }
        let details: Vec<String> = self
            .failed
            .iter()
            .map(|(path, reason)| format!("{:?}: {}", path, reason))
            .collect();
        Err(anyhow!("{} file(s) failed:\n{}", self.failed.len(), details.join("\n")))
    }
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Unpack every `.xml` file among `inputs`
    pub fn run_unpack(
        &self,
        inputs: &[PathBuf],
        output_dir: &Path,
        placeholder_dir: Option<&Path>,
    ) -> Result<BatchSummary> {
        let files = FileManager::expand_inputs(inputs, "xml")?;
        if files.is_empty() {
            warn!("No XML files found in {:?}", inputs);
            return Ok(BatchSummary::default());
        }

        let encoding = self.config.source_encoding()?;
        let character_limit = self.config.character_limit();
        let mut summary = BatchSummary::default();
        let progress = Self::progress_bar(files.len());

        for file in &files {
            progress.set_message(FileManager::display_name(file));

            let mut unpacker = Unpacker::new(file, output_dir).with_encoding(encoding);
            if let Some(limit) = character_limit {
                unpacker = unpacker.with_character_limit(limit);
            }
            if let Some(dir) = placeholder_dir {
                unpacker = unpacker.with_placeholder_dir(dir);
            }

            match unpacker.unpack() {
                Ok(written) => summary.written.extend(written),
                Err(e) => {
                    error!("Error unpacking {:?}: {:#}", file, e);
                    summary.failed.push((file.clone(), format!("{:#}", e)));
                }
            }
            progress.inc(1);
        }

        progress.finish_and_clear();
        info!(
            "Finished unpacking {} file(s), {} failed",
            files.len() - summary.failed.len(),
            summary.failed.len()
        );
        Ok(summary)
    }

    /// Repack one base file from its translated stream or partitions
    pub fn run_repack(&self, base: &Path, translated: &[PathBuf], output_dir: &Path) -> Result<PathBuf> {
        Repacker::new(base, translated, output_dir)?
            .with_base_encoding(self.config.source_encoding()?)
            .with_translation_encoding(self.config.translation_encoding()?)
            .repack()
    }

    /// Align every base `.txt` file against the anchor sharing its root key
    ///
    /// Pairing problems abort before any file is written; a failing pair is
    /// recorded and the remaining pairs are still aligned.
    pub fn run_align(&self, base: &[PathBuf], anchor: &[PathBuf], output_dir: &Path) -> Result<BatchSummary> {
        let base_files = FileManager::expand_inputs(base, "txt")?;
        let anchor_files = FileManager::expand_inputs(anchor, "txt")?;

        let aligner = Aligner::new(&base_files, &anchor_files, output_dir)?
            .with_encoding(self.config.source_encoding()?);

        let mut summary = BatchSummary::default();
        let progress = Self::progress_bar(aligner.pairs().len());

        for pair in aligner.pairs() {
            progress.set_message(pair.root.clone());
            match aligner.align_pair(pair) {
                Ok(written) => summary.written.push(written),
                Err(e) => {
                    error!("Error aligning {:?}: {:#}", pair.base, e);
                    summary.failed.push((pair.base.clone(), format!("{:#}", e)));
                }
            }
            progress.inc(1);
        }

        progress.finish_and_clear();
        Ok(summary)
    }

    /// Translate every simple span of one structured file through `translator`
    ///
    /// The target language comes from the config; the output keeps the input's
    /// name and encoding and is only written when every span succeeded.
    pub fn run_translate<T: LineTranslator + ?Sized>(
        &self,
        input: &Path,
        translator: &T,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let name = FileManager::display_name(input);
        let encoding = self.config.source_encoding()?;
        info!("|{}| - Translating into {}...", name, self.config.target_language);

        let lines = FileManager::read_lines(input, encoding)?;
        let translated = translate_structured_lines(&lines, translator, &self.config.target_language)
            .with_context(|| format!("Failed to translate {:?}", input))?;

        let output = output_dir.join(&name);
        FileManager::write_encoded(&output, &translated.concat(), encoding)?;
        info!("File: {} - Writing: {:?} - Successful", name, output);
        Ok(output)
    }

    fn progress_bar(total: usize) -> ProgressBar {
        let progress = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        progress.set_style(style);
        progress
    }
}
