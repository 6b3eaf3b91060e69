//! Batch converter from article text files to the feed JSON.
//!
//! One run reads every `.txt` file of the input directory in filename
//! order, parses it, attaches a cover image and writes a single JSON array.
//! Images are copied incrementally; the JSON is written once at the end
//! through a temp file, so a failed run never leaves a partial JSON.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::article::{decode_text, parse_document, Article};
use crate::images::{find_match, ImageIndex, MatchKind};

use super::naming::{is_generated_name, safe_image_name};

/// File name referenced when no image exists at all
pub const PLACEHOLDER_IMAGE: &str = "placeholder.png";

/// Extension of article source files
const ARTICLE_EXTENSION: &str = "txt";

/// Mode of a freshly written JSON output
#[cfg(unix)]
const OUTPUT_FILE_MODE: u32 = 0o644;

/// Errors that abort a conversion run
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Input directory not found: {0}")]
    InputDirNotFound(PathBuf),

    #[error("Image output directory {out} is inside the raw image tree {images}")]
    OutputInsideImages { out: PathBuf, images: PathBuf },

    #[error("No images with extensions {extensions:?} found under {dir}")]
    NoImages { dir: PathBuf, extensions: Vec<String> },

    #[error("Failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid input pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConvertError {
    fn io(action: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.to_path_buf();
        move |source| ConvertError::Io {
            action,
            path,
            source,
        }
    }
}

/// Absolute paths and settings for one conversion run
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Directory of article .txt files
    pub input_dir: PathBuf,
    /// Raw image tree to index
    pub images_dir: PathBuf,
    /// JSON output file
    pub output_file: PathBuf,
    /// Destination for published images (cleared each run)
    pub images_out_dir: PathBuf,
    /// URL prefix for `imageUrl`, without trailing slash
    pub public_prefix: String,
    /// Character budget for the slug part of image names
    pub max_slug_chars: usize,
    /// Image extensions considered
    pub extensions: Vec<String>,
    /// Abort when the image index is empty
    pub require_images: bool,
}

/// How an article's cover image was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Matched(MatchKind),
    Random,
    Placeholder,
}

/// Outcome of a conversion run
#[derive(Debug, Clone)]
pub struct ConvertReport {
    /// Articles in output order
    pub articles: Vec<Article>,
    /// Articles whose image was matched by name
    pub matched: usize,
    /// Titles that received a randomly chosen image
    pub random_titles: Vec<String>,
    /// Titles that received the placeholder path
    pub placeholder_titles: Vec<String>,
    /// Where the JSON was written
    pub output_file: PathBuf,
}

impl ConvertReport {
    pub fn total(&self) -> usize {
        self.articles.len()
    }
}

/// Article converter
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Run the full conversion.
    ///
    /// `rng` drives the random image fallback; pass a seeded generator for
    /// reproducible output.
    #[instrument(skip(self, rng), fields(input = %self.options.input_dir.display()))]
    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<ConvertReport, ConvertError> {
        let options = &self.options;

        if !options.input_dir.is_dir() {
            return Err(ConvertError::InputDirNotFound(options.input_dir.clone()));
        }
        self.check_output_outside_images()?;

        let index = ImageIndex::build(&options.images_dir, &options.extensions);
        if index.is_empty() && options.require_images {
            return Err(ConvertError::NoImages {
                dir: options.images_dir.clone(),
                extensions: options.extensions.clone(),
            });
        }
        info!(
            keys = index.len(),
            files = index.file_count(),
            "Indexed raw images"
        );

        self.prepare_output_dir()?;

        let pool = index.pool();
        let mut published = HashSet::new();
        let files = self.list_article_files()?;
        info!(count = files.len(), "Converting articles");

        let mut report = ConvertReport {
            articles: Vec::with_capacity(files.len()),
            matched: 0,
            random_titles: Vec::new(),
            placeholder_titles: Vec::new(),
            output_file: options.output_file.clone(),
        };

        for path in &files {
            let mut article = self.read_article(path)?;

            let source = match find_match(&index, &article.slug) {
                Some(found) => {
                    article.image_url = self.publish_image(&article.slug, found.path, &mut published)?;
                    ImageSource::Matched(found.kind)
                }
                None => match pool.choose(rng) {
                    Some(random) => {
                        article.image_url = self.publish_image(&article.slug, random, &mut published)?;
                        ImageSource::Random
                    }
                    None => {
                        article.image_url =
                            format!("{}/{}", options.public_prefix, PLACEHOLDER_IMAGE);
                        ImageSource::Placeholder
                    }
                },
            };

            match source {
                ImageSource::Matched(kind) => {
                    debug!(slug = %article.slug, ?kind, "Matched image");
                    report.matched += 1;
                }
                ImageSource::Random => {
                    warn!(title = %article.title, "Used random image");
                    report.random_titles.push(article.title.clone());
                }
                ImageSource::Placeholder => {
                    warn!(title = %article.title, "No images available, using placeholder");
                    report.placeholder_titles.push(article.title.clone());
                }
            }

            report.articles.push(article);
        }

        self.write_json(&report.articles)?;
        info!(
            articles = report.total(),
            matched = report.matched,
            output = %options.output_file.display(),
            "Conversion finished"
        );

        Ok(report)
    }

    /// Read, decode and parse one article file
    pub fn read_article(&self, path: &Path) -> Result<Article, ConvertError> {
        let bytes = fs::read(path).map_err(ConvertError::io("read", path))?;
        let (text, encoding) = decode_text(&bytes);

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let article = parse_document(&text, &stem);

        debug!(
            file = %path.display(),
            encoding = encoding.as_str(),
            blocks = article.block_count(),
            "Parsed article"
        );
        Ok(article)
    }

    /// Article files in the input directory, sorted by file name
    pub fn list_article_files(&self) -> Result<Vec<PathBuf>, ConvertError> {
        let pattern = format!(
            "{}/*.{}",
            glob::Pattern::escape(&self.options.input_dir.to_string_lossy()),
            ARTICLE_EXTENSION
        );

        let mut files: Vec<PathBuf> = glob::glob(&pattern)?
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file())
            .collect();
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        Ok(files)
    }

    /// The image output directory must not be the raw image tree or lie inside it
    fn check_output_outside_images(&self) -> Result<(), ConvertError> {
        let out = resolved(&self.options.images_out_dir);
        let images = resolved(&self.options.images_dir);

        if out.starts_with(&images) {
            return Err(ConvertError::OutputInsideImages {
                out: self.options.images_out_dir.clone(),
                images: self.options.images_dir.clone(),
            });
        }
        Ok(())
    }

    /// Create the image output directory and remove previously generated images.
    ///
    /// Only names shaped like [`safe_image_name`] output are removed, so
    /// hand-placed files such as the placeholder survive. Removal failures
    /// are logged and skipped.
    fn prepare_output_dir(&self) -> Result<(), ConvertError> {
        let dir = &self.options.images_out_dir;
        fs::create_dir_all(dir).map_err(ConvertError::io("create", dir))?;

        let entries = fs::read_dir(dir).map_err(ConvertError::io("list", dir))?;
        let mut removed = 0usize;

        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() || !self.is_generated_image(&path) {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        }

        debug!(removed, dir = %dir.display(), "Cleared generated images");
        Ok(())
    }

    fn is_generated_image(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if name == PLACEHOLDER_IMAGE || !is_generated_name(name) {
            return false;
        }
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.options
            .extensions
            .iter()
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }

    /// Copy `source` under a safe name and return its public URL.
    ///
    /// A name already written in this run (duplicate slugs) gets a `-2`, `-3`, ...
    /// variant of the slug so earlier articles keep their image.
    fn publish_image(
        &self,
        slug: &str,
        source: &Path,
        published: &mut HashSet<String>,
    ) -> Result<String, ConvertError> {
        let max_chars = self.options.max_slug_chars;
        let mut name = safe_image_name(slug, max_chars, source);
        let mut variant = 2u32;
        while !published.insert(name.clone()) {
            warn!(slug, name = %name, "Image name already used in this run");
            name = safe_image_name(&format!("{}-{}", slug, variant), max_chars, source);
            variant += 1;
        }

        let destination = self.options.images_out_dir.join(&name);

        fs::copy(source, &destination)
            .map_err(ConvertError::io("copy image to", &destination))?;

        Ok(format!("{}/{}", self.options.public_prefix, name))
    }

    /// Write the article array as pretty JSON, atomically
    fn write_json(&self, articles: &[Article]) -> Result<(), ConvertError> {
        let output = &self.options.output_file;
        let parent = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        fs::create_dir_all(parent).map_err(ConvertError::io("create", parent))?;

        let json = serde_json::to_string_pretty(articles)?;

        let mut temp = tempfile::NamedTempFile::new_in(parent)
            .map_err(ConvertError::io("create temp file in", parent))?;
        temp.write_all(json.as_bytes())
            .map_err(ConvertError::io("write", temp.path()))?;
        set_output_permissions(&temp, output)?;
        temp.persist(output)
            .map_err(|e| ConvertError::io("write", output)(e.error))?;

        Ok(())
    }
}

/// `path` with its longest existing ancestor canonicalized
fn resolved(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut missing = Vec::new();

    loop {
        if let Ok(canonical) = fs::canonicalize(existing) {
            return missing
                .iter()
                .rev()
                .fold(canonical, |acc, part| acc.join(part));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                existing = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}

/// Keep the permissions of an existing output file, else make it world-readable.
///
/// Temp files are created owner-only.
#[cfg(unix)]
fn set_output_permissions(
    temp: &tempfile::NamedTempFile,
    output: &Path,
) -> Result<(), ConvertError> {
    use std::os::unix::fs::PermissionsExt;

    let permissions = match fs::metadata(output) {
        Ok(existing) => existing.permissions(),
        Err(_) => fs::Permissions::from_mode(OUTPUT_FILE_MODE),
    };
    temp.as_file()
        .set_permissions(permissions)
        .map_err(ConvertError::io("set permissions on", temp.path()))
}

#[cfg(not(unix))]
fn set_output_permissions(
    _temp: &tempfile::NamedTempFile,
    _output: &Path,
) -> Result<(), ConvertError> {
    Ok(())
}
