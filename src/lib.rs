//! feedkit - article text to feed JSON converter
//!
//! Turns a folder of loosely formatted article text files into a single
//! JSON array of structured articles, pairing each article with a cover
//! image from a raw image tree.
//!
//! # Pipeline
//!
//! - Each file is decoded (UTF-8 with BOM, UTF-8, Windows-1251)
//! - A label-driven parser builds an [`Article`]
//! - The article slug is matched against an index of image file stems
//! - Matched images are copied under a bounded, hash-suffixed name
//!
//! # Modules
//!
//! - `article`: Normalization, slugs, decoding and the label parser
//! - `images`: Image index and slug matcher
//! - `core`: Conversion driver and image naming
//! - `adapters` / `chat`: Chat passthrough to the Groq API
//! - `config`: Path and settings discovery
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Convert articles_txt/ into articles.json
//! feedkit convert
//!
//! # Reproducible run
//! feedkit convert --seed 42
//! ```

pub mod adapters;
pub mod article;
pub mod chat;
pub mod cli;
pub mod config;
pub mod core;
pub mod images;

// Re-export main types at crate root for convenience
pub use article::{parse, parse_document, slugify, Article, ContentBlock};
pub use chat::{ChatError, ChatReply, ChatService, ChatTurn, TitleReply};
pub use core::{ConvertError, ConvertOptions, ConvertReport, Converter};
pub use images::{match_image, ImageIndex};
