//! Cover image discovery and article-to-image matching.
//!
//! The raw image tree is scanned once per run into an [`ImageIndex`];
//! the matcher then resolves each article slug against it.

pub mod index;
pub mod matcher;

pub use index::{ImageIndex, DEFAULT_EXTENSIONS};
pub use matcher::{find_match, match_image, token_score, ImageMatch, MatchKind};
