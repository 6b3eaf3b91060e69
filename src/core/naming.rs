//! Filesystem-safe names for published images.

use std::path::Path;

use sha2::{Digest, Sha256};

/// Default character budget for the slug part of a generated file name
pub const DEFAULT_MAX_SLUG_CHARS: usize = 60;

/// Extension used when the source file has none
const DEFAULT_EXTENSION: &str = "png";

/// Length of the hex hash suffix
const HASH_HEX_CHARS: usize = 8;

/// First 8 hex chars of SHA256(slug)
pub fn slug_hash(slug: &str) -> String {
    let digest = Sha256::digest(slug.as_bytes());
    hex::encode(&digest[..4])
}

/// Bounded, collision-resistant image file name for `slug`.
///
/// The slug is cut to `max_chars` characters and suffixed with the hash of
/// the full slug, so slugs sharing a long prefix still get distinct names.
/// The source extension is kept, lower-cased.
pub fn safe_image_name(slug: &str, max_chars: usize, source: &Path) -> String {
    let truncated: String = slug.chars().take(max_chars).collect();
    let stem = truncated.trim_end_matches('-');

    let extension = source
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());

    if stem.is_empty() {
        format!("{}.{}", slug_hash(slug), extension)
    } else {
        format!("{}-{}.{}", stem, slug_hash(slug), extension)
    }
}

/// Whether `file_name` has the shape produced by [`safe_image_name`]:
/// `<stem>-<8 lowercase hex>.<ext>` or `<8 lowercase hex>.<ext>`.
pub fn is_generated_name(file_name: &str) -> bool {
    let Some((stem, extension)) = file_name.rsplit_once('.') else {
        return false;
    };
    if extension.is_empty() || extension.chars().any(|c| c.is_ascii_uppercase()) {
        return false;
    }

    let hash = match stem.rsplit_once('-') {
        Some((prefix, hash)) if !prefix.is_empty() => hash,
        Some(_) => return false,
        None => stem,
    };
    hash.len() == HASH_HEX_CHARS
        && hash
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, 'a'..='f'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_hash_is_stable_hex() {
        let a = slug_hash("kak-spat-luchshe");
        assert_eq!(a.len(), 8);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(a, slug_hash("kak-spat-luchshe"));
        assert_ne!(a, slug_hash("kak-spat-khuzhe"));
    }

    #[test]
    fn test_short_slug_kept_whole() {
        let name = safe_image_name("son", 60, Path::new("/raw/Son.PNG"));
        assert_eq!(name, format!("son-{}.png", slug_hash("son")));
    }

    #[test]
    fn test_truncated_slugs_stay_unique() {
        let a = "polza-sna-dlya-zdorovya-vzroslykh";
        let b = "polza-sna-dlya-zdorovya-detey";

        let name_a = safe_image_name(a, 20, Path::new("a.png"));
        let name_b = safe_image_name(b, 20, Path::new("b.png"));

        assert!(name_a.starts_with("polza-sna-dlya-zdoro-"));
        assert!(name_b.starts_with("polza-sna-dlya-zdoro-"));
        assert_ne!(name_a, name_b);
    }

    #[test]
    fn test_truncation_trims_dangling_hyphen() {
        let name = safe_image_name("abc-def", 4, Path::new("x.png"));
        assert_eq!(name, format!("abc-{}.png", slug_hash("abc-def")));
    }

    #[test]
    fn test_missing_extension_defaults_to_png() {
        let name = safe_image_name("son", 60, Path::new("/raw/son"));
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn test_generated_names_are_recognized() {
        let slug = "kak-spat-luchshe";
        let name = safe_image_name(slug, 60, Path::new("/raw/x.PNG"));
        assert!(is_generated_name(&name));
        assert!(is_generated_name(&safe_image_name("", 60, Path::new("x.png"))));

        assert!(!is_generated_name("placeholder.png"));
        assert!(!is_generated_name("Cover.PNG"));
        assert!(!is_generated_name("son.png"));
        assert!(!is_generated_name("stale-0000.png"));
        assert!(!is_generated_name("stale-0A1B2C3D.png"));
        assert!(!is_generated_name("stale-0a1b2c3d"));
        assert!(!is_generated_name("-0a1b2c3d.png"));
    }
}
