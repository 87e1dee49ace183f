use anyhow::{anyhow, Context, Result};
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::file_utils::FileManager;
use crate::packager::unpacker::CHARACTER_LIMIT;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Encoding of structured files, unpacked streams and aligned output
    #[serde(default = "default_source_encoding")]
    pub source_encoding: String,

    /// Encoding of translated streams fed to the repacker
    #[serde(default = "default_translation_encoding")]
    pub translation_encoding: String,

    /// Target language code handed to the translator by `Controller::run_translate`
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Partitioning settings
    #[serde(default)]
    pub packing: PackingConfig,

    /// Default input/output directories
    #[serde(default)]
    pub directories: DirectoryConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Character-budget partitioning of unpacked output
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PackingConfig {
    /// Split unpacked output into partitions
    #[serde(default)]
    pub partition: bool,

    /// Maximum characters per partition
    #[serde(default = "default_character_limit")]
    pub character_limit: usize,
}

impl Default for PackingConfig {
    fn default() -> Self {
        Self {
            partition: false,
            character_limit: default_character_limit(),
        }
    }
}

/// Directories used when the command line does not name one
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DirectoryConfig {
    // @field: Unpacked stream output
    #[serde(default = "default_unpack_output")]
    pub unpack_output: PathBuf,

    // @field: Empty `_translate` placeholders for the repacker
    #[serde(default = "default_repack_input")]
    pub repack_input: PathBuf,

    // @field: Repacked structured files
    #[serde(default = "default_repack_output")]
    pub repack_output: PathBuf,

    // @field: Aligned stream output
    #[serde(default = "default_align_output")]
    pub align_output: PathBuf,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            unpack_output: default_unpack_output(),
            repack_input: default_repack_input(),
            repack_output: default_repack_output(),
            align_output: default_align_output(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching `log` filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_encoding() -> String {
    "windows-1251".to_string()
}

fn default_translation_encoding() -> String {
    "utf-8".to_string()
}

fn default_target_language() -> String {
    "EN-US".to_string()
}

fn default_character_limit() -> usize {
    CHARACTER_LIMIT
}

fn default_unpack_output() -> PathBuf {
    PathBuf::from("output-unpack")
}

fn default_repack_input() -> PathBuf {
    PathBuf::from("input-repack")
}

fn default_repack_output() -> PathBuf {
    PathBuf::from("output-repack")
}

fn default_align_output() -> PathBuf {
    PathBuf::from("output_align")
}

impl Config {
    /// Load the configuration at `path`, or write and return the default one
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path).context(format!("Failed to open config file: {:?}", path))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .context(format!("Failed to parse config file: {:?}", path))?;
            Ok(config)
        } else {
            log::warn!("Config file not found at {:?}, creating default config.", path);
            let config = Config::default();
            let config_json = serde_json::to_string_pretty(&config)
                .context("Failed to serialize default config to JSON")?;
            std::fs::write(path, config_json)
                .context(format!("Failed to write default config to file: {:?}", path))?;
            Ok(config)
        }
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let source = self.source_encoding()?;
        if source != source.output_encoding() {
            return Err(anyhow!(
                "Source encoding {} cannot be written back byte-for-byte",
                source.name()
            ));
        }
        self.translation_encoding()?;

        if self.packing.character_limit == 0 {
            return Err(anyhow!("Character limit must be greater than zero"));
        }

        if self.target_language.trim().is_empty() {
            return Err(anyhow!("Target language must not be empty"));
        }

        Ok(())
    }

    /// Resolved encoding of structured files
    pub fn source_encoding(&self) -> Result<&'static Encoding> {
        FileManager::resolve_encoding(&self.source_encoding)
    }

    /// Resolved encoding of translated streams
    pub fn translation_encoding(&self) -> Result<&'static Encoding> {
        FileManager::resolve_encoding(&self.translation_encoding)
    }

    /// Character limit when partitioning is enabled
    pub fn character_limit(&self) -> Option<usize> {
        self.packing.partition.then_some(self.packing.character_limit)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_encoding: default_source_encoding(),
            translation_encoding: default_translation_encoding(),
            target_language: default_target_language(),
            packing: PackingConfig::default(),
            directories: DirectoryConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
