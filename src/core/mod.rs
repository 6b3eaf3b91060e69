//! Core conversion logic.
//!
//! This module contains:
//! - Converter: batch driver from text files to the feed JSON
//! - naming: bounded, hash-suffixed image file names

pub mod converter;
pub mod naming;

// Re-export commonly used types
pub use converter::{
    ConvertError, ConvertOptions, ConvertReport, Converter, ImageSource, PLACEHOLDER_IMAGE,
};
pub use naming::{safe_image_name, slug_hash};
