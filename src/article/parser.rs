//! Label-driven article parser.
//!
//! Article files are flat text where section markers ("Название", "Автор",
//! ...) sit on their own line and introduce the value on the next line:
//!
//! ```text
//! Название
//! Как спать лучше
//! Автор
//! Иван Иванов
//! Эксперт по сну
//! Заголовок
//! Почему сон важен
//! * Совет 1
//! * Совет 2
//! Источники
//! ВОЗ, 2020
//! ```
//!
//! Parsing never fails: malformed documents degrade to partial articles.

use super::slug::{normalize, slugify};
use super::types::{Article, ContentBlock};

/// Prefix that marks a bullet line
const BULLET_MARKER: &str = "* ";

/// Standalone marker meaning "body text follows"; skipped
const BODY_MARKER: &str = "текст";

/// Slug used when neither the title nor the file stem yields one
const FALLBACK_SLUG: &str = "article";

/// Section marker recognized on its own line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Title,
    Author,
    Category,
    Annotation,
    Heading,
    Subheading,
    Sources,
}

impl Label {
    /// Recognize a label line, ignoring case, whitespace, `ё`, BOMs and a trailing colon
    pub fn detect(line: &str) -> Option<Self> {
        let normalized = normalize(line);
        let key = normalized.strip_suffix(':').unwrap_or(&normalized).trim_end();

        match key {
            "название" => Some(Label::Title),
            "автор" => Some(Label::Author),
            "категория" => Some(Label::Category),
            "аннотация" => Some(Label::Annotation),
            "заголовок" => Some(Label::Heading),
            "подзаголовок" => Some(Label::Subheading),
            "источники" => Some(Label::Sources),
            _ => None,
        }
    }
}

fn is_body_marker(line: &str) -> bool {
    let normalized = normalize(line);
    normalized.strip_suffix(':').unwrap_or(&normalized).trim_end() == BODY_MARKER
}

/// Split raw text into trimmed, non-empty lines (CRs and BOMs removed)
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.trim().trim_matches('\u{feff}').trim())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Parse a document, falling back to `file_stem` for the title of an empty file.
pub fn parse_document(text: &str, file_stem: &str) -> Article {
    let cleaned = text.replace('\r', "");
    let lines = split_lines(&cleaned);
    let mut article = parse(&lines);

    if article.title.is_empty() {
        article.set_title(file_stem.trim());
    }

    if article.slug.is_empty() {
        let stem_slug = slugify(file_stem);
        article.slug = if stem_slug.is_empty() {
            FALLBACK_SLUG.to_string()
        } else {
            stem_slug
        };
    }

    article
}

/// Parse a sequence of non-empty lines into an article.
///
/// If no title label is present, the first line becomes the title.
pub fn parse(lines: &[&str]) -> Article {
    let mut parser = LineParser {
        lines,
        cursor: 0,
        article: Article::default(),
    };
    parser.run();

    let mut article = parser.article;
    if article.title.is_empty() {
        if let Some(first) = lines.first() {
            article.set_title(*first);
        }
    }
    article
}

struct LineParser<'a> {
    lines: &'a [&'a str],
    cursor: usize,
    article: Article,
}

impl<'a> LineParser<'a> {
    fn run(&mut self) {
        while let Some(line) = self.current() {
            match Label::detect(line) {
                Some(Label::Sources) => {
                    self.article.sources = self.lines[self.cursor + 1..]
                        .iter()
                        .map(|s| s.to_string())
                        .collect();
                    return;
                }
                Some(label) => self.consume_label(label),
                None if line.starts_with(BULLET_MARKER) => self.consume_bullets(),
                None if is_body_marker(line) => self.cursor += 1,
                None => {
                    self.article.content.push(ContentBlock::paragraph(line));
                    self.cursor += 1;
                }
            }
        }
    }

    fn current(&self) -> Option<&'a str> {
        self.lines.get(self.cursor).copied()
    }

    /// Step past the label line and take the value line, if any
    fn take_value(&mut self) -> Option<&'a str> {
        self.cursor += 1;
        let value = self.current()?;
        self.cursor += 1;
        Some(value)
    }

    fn consume_label(&mut self, label: Label) {
        let Some(value) = self.take_value() else {
            return;
        };

        match label {
            Label::Title => self.article.set_title(value),
            Label::Author => {
                self.article.author_name = value.to_string();
                if let Some(bio) = self.current() {
                    if !matches!(
                        Label::detect(bio),
                        Some(Label::Category) | Some(Label::Annotation)
                    ) {
                        self.article.author_bio = bio.to_string();
                        self.cursor += 1;
                    }
                }
            }
            Label::Category => self.article.category = value.to_string(),
            Label::Annotation => self.article.annotation = value.to_string(),
            Label::Heading => self.article.content.push(ContentBlock::heading(value)),
            Label::Subheading => self.article.content.push(ContentBlock::subheading(value)),
            // Handled by the caller; terminal
            Label::Sources => {}
        }
    }

    fn consume_bullets(&mut self) {
        let mut items = Vec::new();
        while let Some(item) = self
            .current()
            .and_then(|line| line.strip_prefix(BULLET_MARKER))
        {
            items.push(item.trim().to_string());
            self.cursor += 1;
        }
        self.article.content.push(ContentBlock::BulletList { items });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Название\nКак спать лучше\nАвтор\nИван Иванов\nЭксперт по сну\n\
Категория\nСон\nАннотация\nКороткое описание\nЗаголовок\nПочему сон важен\n\
* Совет 1\n* Совет 2\nИсточники\nВОЗ, 2020";

    #[test]
    fn test_parse_sample_article() {
        let article = parse_document(SAMPLE, "sample");

        assert_eq!(article.title, "Как спать лучше");
        assert_eq!(article.slug, "kak-spat-luchshe");
        assert_eq!(article.image_alt, "Как спать лучше");
        assert_eq!(article.author_name, "Иван Иванов");
        assert_eq!(article.author_bio, "Эксперт по сну");
        assert_eq!(article.category, "Сон");
        assert_eq!(article.annotation, "Короткое описание");
        assert_eq!(
            article.content,
            vec![
                ContentBlock::heading("Почему сон важен"),
                ContentBlock::bullets(["Совет 1", "Совет 2"]),
            ]
        );
        assert_eq!(article.sources, vec!["ВОЗ, 2020"]);
        assert_eq!(article.image_url, "");
    }

    #[test]
    fn test_label_detection_is_lenient() {
        assert_eq!(Label::detect("Название"), Some(Label::Title));
        assert_eq!(Label::detect("  НАЗВАНИЕ:  "), Some(Label::Title));
        assert_eq!(Label::detect("\u{feff}Автор"), Some(Label::Author));
        assert_eq!(Label::detect("подзаголовок :"), Some(Label::Subheading));
        assert_eq!(Label::detect("Название статьи"), None);
        assert_eq!(Label::detect("Сон"), None);
    }

    #[test]
    fn test_author_without_bio_before_category() {
        let lines = ["Автор", "Мария", "Категория", "Питание"];
        let article = parse(&lines);

        assert_eq!(article.author_name, "Мария");
        assert_eq!(article.author_bio, "");
        assert_eq!(article.category, "Питание");
    }

    #[test]
    fn test_author_without_bio_before_annotation() {
        let lines = ["Автор", "Мария", "Аннотация:", "Кратко"];
        let article = parse(&lines);

        assert_eq!(article.author_bio, "");
        assert_eq!(article.annotation, "Кратко");
    }

    #[test]
    fn test_sources_are_terminal() {
        let lines = ["Название", "T", "Источники", "Первый", "Заголовок", "* пункт"];
        let article = parse(&lines);

        assert_eq!(article.sources, vec!["Первый", "Заголовок", "* пункт"]);
        assert!(article.content.is_empty());
    }

    #[test]
    fn test_bullets_collapse_into_one_block() {
        let lines = ["* a", "* b", "* c", "после", "* d"];
        let article = parse(&lines);

        assert_eq!(
            article.content,
            vec![
                ContentBlock::bullets(["a", "b", "c"]),
                ContentBlock::paragraph("после"),
                ContentBlock::bullets(["d"]),
            ]
        );
    }

    #[test]
    fn test_body_marker_is_skipped() {
        let lines = ["Название", "T", "Текст", "Первый абзац", "ТЕКСТ:", "Второй"];
        let article = parse(&lines);

        assert_eq!(
            article.content,
            vec![
                ContentBlock::paragraph("Первый абзац"),
                ContentBlock::paragraph("Второй"),
            ]
        );
    }

    #[test]
    fn test_missing_value_at_end() {
        let article = parse(&["Название", "Категория"]);
        // "Категория" is consumed as the title value; nothing follows
        assert_eq!(article.title, "Категория");
        assert_eq!(article.category, "");

        let article = parse(&["Просто текст", "Аннотация"]);
        assert_eq!(article.annotation, "");
        assert_eq!(article.title, "Просто текст");
    }

    #[test]
    fn test_title_falls_back_to_first_line() {
        let article = parse_document("Без меток\nВторая строка", "file");

        assert_eq!(article.title, "Без меток");
        assert_eq!(article.slug, "bez-metok");
        assert_eq!(
            article.content,
            vec![
                ContentBlock::paragraph("Без меток"),
                ContentBlock::paragraph("Вторая строка"),
            ]
        );
    }

    #[test]
    fn test_empty_document_uses_file_stem() {
        let article = parse_document("\r\n  \n\u{feff}\n", "Утренняя зарядка");

        assert_eq!(article.title, "Утренняя зарядка");
        assert_eq!(article.slug, "utrennyaya-zaryadka");
        assert_eq!(article.image_alt, "Утренняя зарядка");
    }

    #[test]
    fn test_slug_never_empty() {
        let article = parse_document("Название\n???", "!!!");
        assert_eq!(article.title, "???");
        assert_eq!(article.slug, "article");

        let article = parse_document("Название\n???", "zaryadka");
        assert_eq!(article.slug, "zaryadka");
    }

    #[test]
    fn test_crlf_input() {
        let article = parse_document("Название\r\nЗаголовок статьи\r\n\r\nАбзац\r\n", "x");
        assert_eq!(article.title, "Заголовок статьи");
        assert_eq!(article.content, vec![ContentBlock::paragraph("Абзац")]);
    }
}
