//! Command-line arguments, config file, and the resolved run settings.
//!
//! Precedence for every setting: command-line flag, then environment
//! variable (handled by clap), then the TOML config file, then the default.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use office_core::{DocumentFormat, OracleConfig, PromptBuilder};
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_LANGUAGE: &str = "zh-CN";
pub const DEFAULT_CACHE_DIR: &str = "cache";
pub const DEFAULT_MODEL: &str = "Qwen/Qwen3-8B";
pub const DEFAULT_ENDPOINT: &str = "https://api.siliconflow.cn/v1";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_FONT: &str = "Microsoft YaHei";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "office-translate.toml";

/// Accepted shape of a target language code (`fr`, `zh-CN`, `sr-Latn-RS`).
const LANGUAGE_PATTERN: &str = r"^[A-Za-z]{2,3}(-[A-Za-z0-9]{2,8})*$";

/// Document type override for `--type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FileType {
    Ppt,
    Word,
}

impl FileType {
    pub fn format(self) -> DocumentFormat {
        match self {
            FileType::Ppt => DocumentFormat::Pptx,
            FileType::Word => DocumentFormat::Docx,
        }
    }
}

/// Translate PowerPoint and Word documents with an LLM, keeping their layout.
#[derive(Parser, Debug, Default)]
#[command(name = "office-translate")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input document (.pptx or .docx); the first matching file in the
    /// current directory when omitted
    pub input: Option<String>,

    /// Target language code (default: zh-CN)
    pub target_language: Option<String>,

    /// Document type, overriding the file extension
    #[arg(long = "type", value_enum)]
    pub file_type: Option<FileType>,

    /// Disable the translation cache
    #[arg(long)]
    pub no_cache: bool,

    /// Directory holding the per-language cache files
    #[arg(long, env = "CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Model name sent to the endpoint
    #[arg(long, env = "MODEL_NAME")]
    pub model: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "ENDPOINT")]
    pub endpoint: Option<String>,

    /// Sampling temperature
    #[arg(long, env = "TEMPERATURE")]
    pub temperature: Option<f32>,

    /// Ask reasoning models to think before answering
    #[arg(long, env = "ENABLE_THINKING")]
    pub enable_thinking: bool,

    /// Skip TLS certificate validation
    #[arg(long, env = "INSECURE_TLS")]
    pub insecure: bool,

    /// Font applied to translated text
    #[arg(long, env = "TRANSLATED_FONT")]
    pub font: Option<String>,

    /// File replacing the built-in translation instruction
    #[arg(long, env = "PROMPT_FILE")]
    pub prompt_file: Option<PathBuf>,

    /// TOML config file (default: ./office-translate.toml if present)
    #[arg(long, env = "OFFICE_TRANSLATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[arg(skip = std::env::var("LLM_API_KEY").unwrap_or_default())]
    pub api_key: String,
}

/// Optional settings read from the TOML config file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub cache_dir: Option<PathBuf>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub temperature: Option<f32>,
    pub enable_thinking: Option<bool>,
    pub insecure_tls: Option<bool>,
    pub font: Option<String>,
    pub prompt_file: Option<PathBuf>,
    /// Terms the model must leave untranslated; `*` marks a prefix.
    pub preserve_terms: Option<Vec<String>>,
    pub request_timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Load `explicit` if given (it must exist), else the default config
    /// file in `dir` if present, else an empty config.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let default = dir.join(DEFAULT_CONFIG_FILE);
        if default.is_file() {
            log::info!("Using config file {}", default.display());
            return Self::from_file(default);
        }
        Ok(Self::default())
    }
}

/// Everything a run needs, resolved once and passed by value.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Explicit input path; `None` means auto-discover.
    pub input: Option<PathBuf>,
    pub target_language: String,
    pub file_type: Option<FileType>,
    pub use_cache: bool,
    pub cache_dir: PathBuf,
    pub oracle: OracleConfig,
    pub temperature: f32,
    pub font: String,
    pub prompt: PromptBuilder,
}

impl Settings {
    /// Merge arguments and config file into final settings.
    pub fn resolve(args: Args, file: FileConfig) -> Result<Self> {
        let (input, target_language) = split_positionals(args.input, args.target_language);
        validate_language(&target_language)?;

        let prompt_file = args.prompt_file.or(file.prompt_file);
        let mut prompt = PromptBuilder::new();
        if let Some(path) = prompt_file {
            let template = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read prompt file {}", path.display()))?;
            prompt = prompt.with_template(template);
        }
        if let Some(terms) = file.preserve_terms {
            prompt = prompt.with_preserve_terms(terms);
        }

        let oracle = OracleConfig {
            endpoint: args
                .endpoint
                .or(file.endpoint)
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            model: args
                .model
                .or(file.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key: args.api_key,
            enable_thinking: args.enable_thinking || file.enable_thinking.unwrap_or(false),
            insecure_tls: args.insecure || file.insecure_tls.unwrap_or(false),
            timeout: Duration::from_secs(file.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        };

        Ok(Self {
            input: input.map(PathBuf::from),
            target_language,
            file_type: args.file_type,
            use_cache: !args.no_cache,
            cache_dir: args
                .cache_dir
                .or(file.cache_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR)),
            oracle,
            temperature: args
                .temperature
                .or(file.temperature)
                .unwrap_or(DEFAULT_TEMPERATURE),
            font: args
                .font
                .or(file.font)
                .unwrap_or_else(|| DEFAULT_FONT.to_string()),
            prompt,
        })
    }
}

/// Sort out the two positionals. A second argument that looks like a
/// relative path is taken as the input file, with the default language.
pub fn split_positionals(
    input: Option<String>,
    language: Option<String>,
) -> (Option<String>, String) {
    match language {
        Some(language) if language.starts_with("./") || language.starts_with(".\\") => {
            log::warn!(
                "Argument '{}' looks like a file path, not a language code; using it as the input file and translating to {}",
                language,
                DEFAULT_LANGUAGE
            );
            (Some(language), DEFAULT_LANGUAGE.to_string())
        }
        Some(language) => (input, language),
        None => (input, DEFAULT_LANGUAGE.to_string()),
    }
}

/// Reject anything that does not look like a language code; it ends up in
/// file names and in the prompt.
pub fn validate_language(language: &str) -> Result<()> {
    let pattern = Regex::new(LANGUAGE_PATTERN).context("Invalid language pattern")?;
    if !pattern.is_match(language) {
        anyhow::bail!(office_core::Error::InvalidInput(format!(
            "'{}' is not a valid target language code",
            language
        )));
    }
    Ok(())
}
