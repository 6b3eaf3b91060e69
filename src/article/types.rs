//! Article document types emitted to the front-end.

use serde::{Deserialize, Serialize};

/// A structured article parsed from one text file.
///
/// Field order matches the JSON consumed by the feed front-end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Article headline
    pub title: String,

    /// URL-safe identifier derived from the title
    pub slug: String,

    /// Author display name
    pub author_name: String,

    /// One-line author description
    pub author_bio: String,

    /// Feed category
    pub category: String,

    /// Short teaser shown in the feed
    pub annotation: String,

    /// Public URL of the cover image
    pub image_url: String,

    /// Alt text for the cover image (equal to the title)
    pub image_alt: String,

    /// Body blocks in source order
    pub content: Vec<ContentBlock>,

    /// Cited sources, verbatim
    pub sources: Vec<String>,
}

impl Article {
    /// Set title and the fields derived from it
    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        self.slug = super::slugify(&title);
        self.image_alt = title.clone();
        self.title = title;
    }

    /// Number of body blocks
    pub fn block_count(&self) -> usize {
        self.content.len()
    }
}

/// One unit of article body content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ContentBlock {
    /// Section heading (level 2) or subheading (level 3)
    Heading { level: u8, text: String },

    /// Plain paragraph
    Paragraph { text: String },

    /// Contiguous `* ` lines
    BulletList { items: Vec<String> },
}

impl ContentBlock {
    /// Level-2 heading
    pub fn heading(text: impl Into<String>) -> Self {
        Self::Heading {
            level: 2,
            text: text.into(),
        }
    }

    /// Level-3 heading
    pub fn subheading(text: impl Into<String>) -> Self {
        Self::Heading {
            level: 3,
            text: text.into(),
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph { text: text.into() }
    }

    pub fn bullets(items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::BulletList {
            items: items.into_iter().map(Into::into).collect(),
        }
    }
}
