//! Article model and the text-to-article pipeline.
//!
//! # Flow
//!
//! ```text
//! bytes ─ decode ─> text ─ split_lines ─> lines ─ parse ─> Article
//! ```
//!
//! - `decode`: encoding fallback chain (UTF-8 with signature, UTF-8, Windows-1251, lossy)
//! - `parser`: label-driven line parser
//! - `slug`: normalization and slug generation
//! - `types`: `Article` and `ContentBlock`

pub mod decode;
pub mod parser;
pub mod slug;
pub mod types;

pub use decode::{decode_text, TextEncoding};
pub use parser::{parse, parse_document, split_lines, Label};
pub use slug::{normalize, slugify};
pub use types::{Article, ContentBlock};
