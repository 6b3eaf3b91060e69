//! Text shaping for chat replies.

use crate::adapters::ExecutedTool;

use super::Source;

const PLACEHOLDER: &str = " ...";

/// Collapse whitespace and fit `text` into `width` characters.
///
/// Whole words are packed while they fit alongside the `" ..."` placeholder;
/// text that already fits is returned collapsed but otherwise unchanged.
pub fn shorten(text: &str, width: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let collapsed = words.join(" ");
    if collapsed.chars().count() <= width {
        return collapsed;
    }

    let budget = width.saturating_sub(PLACEHOLDER.chars().count());
    let mut out = String::new();
    let mut used = 0;
    for word in words {
        let extra = word.chars().count() + usize::from(!out.is_empty());
        if used + extra > budget {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
        used += extra;
    }

    if out.is_empty() {
        return PLACEHOLDER.trim_start().to_string();
    }
    out.push_str(PLACEHOLDER);
    out
}

/// First line of a model answer with surrounding quotes stripped, capped at `max_chars`
pub fn clean_title(raw: &str, max_chars: usize) -> String {
    let line = raw
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("");
    let unquoted = line
        .trim_matches(|c| matches!(c, '"' | '\'' | '«' | '»' | '“' | '”'))
        .trim();

    unquoted.chars().take(max_chars).collect::<String>().trim_end().to_string()
}

/// Sources cited by the first executed tool.
///
/// Hits missing a title or url are skipped.
pub fn extract_sources(tools: &[ExecutedTool]) -> Vec<Source> {
    let Some(results) = tools.first().and_then(|t| t.search_results.as_ref()) else {
        return Vec::new();
    };

    results
        .hits()
        .iter()
        .filter_map(|hit| {
            let title = hit.title.as_deref()?.trim();
            let url = hit.url.as_deref()?.trim();
            if title.is_empty() || url.is_empty() {
                return None;
            }
            Some(Source {
                title: title.to_string(),
                url: url.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{SearchHit, SearchResults};

    fn hit(title: Option<&str>, url: Option<&str>) -> SearchHit {
        SearchHit {
            title: title.map(String::from),
            url: url.map(String::from),
        }
    }

    #[test]
    fn test_shorten_fits() {
        assert_eq!(shorten("  сон   и\nздоровье ", 50), "сон и здоровье");
    }

    #[test]
    fn test_shorten_packs_whole_words() {
        assert_eq!(shorten("Hello there big world", 15), "Hello there ...");
        assert!(shorten(&"слово ".repeat(200), 350).chars().count() <= 350);
    }

    #[test]
    fn test_shorten_single_long_word() {
        assert_eq!(shorten("Supercalifragilistic", 10), "...");
    }

    #[test]
    fn test_clean_title() {
        assert_eq!(clean_title("\n«Как спать лучше»\nПояснение", 80), "Как спать лучше");
        assert_eq!(clean_title("\"Quoted\"", 80), "Quoted");
        assert_eq!(clean_title(&"а".repeat(100), 80).chars().count(), 80);
        assert_eq!(clean_title("", 80), "");
    }

    #[test]
    fn test_extract_sources_first_tool_only() {
        let tools = vec![
            ExecutedTool {
                search_results: Some(SearchResults::List(vec![
                    hit(Some("ВОЗ"), Some("https://who.int")),
                    hit(None, Some("https://no-title.test")),
                    hit(Some("Без ссылки"), Some("  ")),
                ])),
            },
            ExecutedTool {
                search_results: Some(SearchResults::List(vec![hit(
                    Some("Second"),
                    Some("https://second.test"),
                )])),
            },
        ];

        assert_eq!(
            extract_sources(&tools),
            vec![Source {
                title: "ВОЗ".to_string(),
                url: "https://who.int".to_string(),
            }]
        );
    }

    #[test]
    fn test_extract_sources_without_tools() {
        assert!(extract_sources(&[]).is_empty());
        assert!(extract_sources(&[ExecutedTool::default()]).is_empty());
    }
}
