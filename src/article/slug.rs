//! Text normalization and slug generation.
//!
//! `normalize` is the canonical form used for label comparison; `slugify`
//! builds URL-safe identifiers used for article slugs and image keys.
//!
//! Slugs are transliterated to Latin so that `"Как спать лучше"` becomes
//! `kak-spat-luchshe` and matches image files named in either script.

/// Byte order mark, sometimes left at the start of files or lines
const BOM: char = '\u{feff}';

/// Lower-case, fold `ё` into `е`, unify dashes, strip BOMs and collapse whitespace.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .chars()
        .filter(|c| *c != BOM)
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'ё' => 'е',
            '\u{2014}' | '\u{2013}' => '-',
            other => other,
        })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Build a URL-safe slug over `[a-z0-9-]`.
///
/// Runs of anything that is not a Latin letter or digit (after
/// transliteration) become a single hyphen; leading and trailing hyphens
/// are trimmed. The function is idempotent.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in normalize(text).chars() {
        let piece = transliterate(c);
        let piece = match piece {
            Some(p) => p,
            None if c.is_ascii_lowercase() || c.is_ascii_digit() => {
                push_piece(&mut slug, &mut pending_hyphen, c.encode_utf8(&mut [0; 4]));
                continue;
            }
            None => {
                pending_hyphen = true;
                continue;
            }
        };

        // Hard and soft signs vanish without splitting the word
        if piece.is_empty() {
            continue;
        }
        push_piece(&mut slug, &mut pending_hyphen, piece);
    }

    slug
}

fn push_piece(slug: &mut String, pending_hyphen: &mut bool, piece: &str) {
    if *pending_hyphen && !slug.is_empty() {
        slug.push('-');
    }
    *pending_hyphen = false;
    slug.push_str(piece);
}

/// Latin rendering of a lower-case Cyrillic letter, `None` for anything else.
fn transliterate(c: char) -> Option<&'static str> {
    let latin = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(latin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_folds_case_dashes_and_whitespace() {
        assert_eq!(normalize("\u{feff}  Ёлка —  Зелёная\t–  ЁЖ "), "елка - зеленая - еж");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_slugify_transliterates() {
        assert_eq!(slugify("Как спать лучше"), "kak-spat-luchshe");
        assert_eq!(slugify("Польза сна для здоровья"), "polza-sna-dlya-zdorovya");
        assert_eq!(slugify("Щи и борщ: ЧТО выбрать?"), "shchi-i-borshch-chto-vybrat");
    }

    #[test]
    fn test_slugify_collapses_and_trims() {
        assert_eq!(slugify("  --Hello,   World!!--  "), "hello-world");
        assert_eq!(slugify("Sleep 101 — basics"), "sleep-101-basics");
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_slugify_signs_do_not_split_words() {
        assert_eq!(slugify("объём"), "obem");
        assert_eq!(slugify("соль"), "sol");
    }

    #[test]
    fn test_slugify_is_idempotent_and_clean() {
        let samples = [
            "Как спать лучше",
            "  Йога — для всех!  ",
            "file_name (2).png",
            "Ёжик в тумане 2020",
            "ABC--def__ghi",
            "\u{feff}Название",
        ];

        for sample in samples {
            let once = slugify(sample);
            assert_eq!(slugify(&once), once, "not idempotent for {:?}", sample);
            assert!(once
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            assert!(!once.starts_with('-') && !once.ends_with('-'));
            assert!(!once.contains("--"));
        }
    }
}
