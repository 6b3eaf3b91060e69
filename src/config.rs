//! Configuration for feedkit paths and provider settings.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags (applied by the CLI on top of this)
//! 2. Environment variables (FEEDKIT_*, GROQ_*)
//! 3. Config file (.feedkit/config.yaml, or the user-level feedkit/config.yaml)
//! 4. Defaults relative to the project root
//!
//! Config file discovery:
//! - Searches the current directory and its parents for .feedkit/config.yaml
//! - Falls back to `<config dir>/feedkit/config.yaml` (e.g. ~/.config on Linux)
//! - Paths in a project config are relative to the project root (parent of .feedkit/)
//!
//! Everything is resolved to absolute paths once and passed explicitly;
//! nothing below the CLI reads the working directory.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::groq::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::core::naming::DEFAULT_MAX_SLUG_CHARS;
use crate::core::ConvertOptions;
use crate::images::DEFAULT_EXTENSIONS;

/// Directory holding the project config file
const CONFIG_DIR: &str = ".feedkit";
const CONFIG_FILE: &str = "config.yaml";

const DEFAULT_INPUT_DIR: &str = "articles_txt";
const DEFAULT_IMAGES_DIR: &str = "raw_images";
const DEFAULT_OUTPUT_FILE: &str = "articles.json";
const DEFAULT_IMAGES_OUT_DIR: &str = "public/images/articles";
const DEFAULT_PUBLIC_PREFIX: &str = "/images/articles";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub convert: Option<ConvertConfig>,
    #[serde(default)]
    pub groq: Option<GroqConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Directory of article .txt files
    pub input_dir: Option<String>,
    /// Raw image tree
    pub images_dir: Option<String>,
    /// JSON output file
    pub output_file: Option<String>,
    /// Published image directory
    pub images_out_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConvertConfig {
    pub public_prefix: Option<String>,
    pub max_slug_chars: Option<usize>,
    pub extensions: Option<Vec<String>>,
    pub require_images: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroqConfig {
    pub model: Option<String>,
    pub base_url: Option<String>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Project root all relative paths were resolved against
    pub root: PathBuf,
    pub input_dir: PathBuf,
    pub images_dir: PathBuf,
    pub output_file: PathBuf,
    pub images_out_dir: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// `version` declared in the config file
    pub config_version: Option<String>,
    pub convert: ConvertSettings,
    pub groq: GroqSettings,
}

#[derive(Debug, Clone)]
pub struct ConvertSettings {
    /// URL prefix written into `imageUrl`
    pub public_prefix: String,
    /// Character budget for the slug part of image file names
    pub max_slug_chars: usize,
    /// Image extensions indexed from the raw tree
    pub extensions: Vec<String>,
    /// Abort when no raw images exist at all
    pub require_images: bool,
}

impl Default for ConvertSettings {
    fn default() -> Self {
        Self {
            public_prefix: DEFAULT_PUBLIC_PREFIX.to_string(),
            max_slug_chars: DEFAULT_MAX_SLUG_CHARS,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            require_images: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GroqSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for GroqSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ResolvedConfig {
    /// Converter options derived from this configuration
    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            input_dir: self.input_dir.clone(),
            images_dir: self.images_dir.clone(),
            output_file: self.output_file.clone(),
            images_out_dir: self.images_out_dir.clone(),
            public_prefix: self.convert.public_prefix.clone(),
            max_slug_chars: self.convert.max_slug_chars,
            extensions: self.convert.extensions.clone(),
            require_images: self.convert.require_images,
        }
    }
}

/// Find a project config file by searching `start` and its parents
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// User-level config file, if present
fn user_config_file() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join("feedkit").join(CONFIG_FILE);
    path.exists().then_some(path)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to `base`
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Load configuration starting from the current directory and process environment
pub fn load_config() -> Result<ResolvedConfig> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let config_file = find_config_file(&cwd).or_else(user_config_file);

    resolve(&cwd, config_file, &|key| std::env::var(key).ok())
}

/// Load configuration discovered from `start` with an explicit environment lookup
pub fn load_config_in(start: &Path, env: &dyn Fn(&str) -> Option<String>) -> Result<ResolvedConfig> {
    resolve(start, find_config_file(start), env)
}

fn resolve(
    start: &Path,
    config_file: Option<PathBuf>,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<ResolvedConfig> {
    let config = match &config_file {
        Some(path) => load_config_file(path)?,
        None => ConfigFile::default(),
    };

    // A project config sits in <root>/.feedkit/; a user-level one does not anchor paths
    let root = config_file
        .as_deref()
        .filter(|p| p.parent().and_then(Path::file_name) == Some(OsStr::new(CONFIG_DIR)))
        .and_then(|p| p.parent())
        .and_then(|p| p.parent())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| start.to_path_buf());

    let pick = |env_key: &str, file_value: &Option<String>, default: &str| -> PathBuf {
        if let Some(value) = env(env_key) {
            resolve_path(&root, &value)
        } else if let Some(value) = file_value {
            resolve_path(&root, value)
        } else {
            root.join(default)
        }
    };

    let input_dir = pick("FEEDKIT_INPUT_DIR", &config.paths.input_dir, DEFAULT_INPUT_DIR);
    let images_dir = pick("FEEDKIT_IMAGES_DIR", &config.paths.images_dir, DEFAULT_IMAGES_DIR);
    let output_file = pick("FEEDKIT_OUTPUT_FILE", &config.paths.output_file, DEFAULT_OUTPUT_FILE);
    let images_out_dir = pick(
        "FEEDKIT_IMAGES_OUT_DIR",
        &config.paths.images_out_dir,
        DEFAULT_IMAGES_OUT_DIR,
    );

    let defaults = ConvertSettings::default();
    let section = config.convert.unwrap_or_default();
    let convert = ConvertSettings {
        public_prefix: section
            .public_prefix
            .map(|p| p.trim_end_matches('/').to_string())
            .unwrap_or(defaults.public_prefix),
        max_slug_chars: section.max_slug_chars.unwrap_or(defaults.max_slug_chars),
        extensions: section.extensions.unwrap_or(defaults.extensions),
        require_images: section.require_images.unwrap_or(defaults.require_images),
    };

    let config_version = config.version;
    let groq_section = config.groq.unwrap_or_default();
    let groq = GroqSettings {
        api_key: env("GROQ_API_KEY").filter(|k| !k.trim().is_empty()),
        model: env("GROQ_MODEL")
            .or(groq_section.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        base_url: env("GROQ_BASE_URL")
            .or(groq_section.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
    };

    Ok(ResolvedConfig {
        root,
        input_dir,
        images_dir,
        output_file,
        images_out_dir,
        config_file,
        config_version,
        convert,
        groq,
    })
}
