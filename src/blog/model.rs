//! Post, draft and session types shared by the screens and the backends.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Authenticated identity held while a session is valid.
/// Carries no tokens; those stay inside the session provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Philosophy,
    Technology,
    Life,
}

impl Category {
    pub const ALL: [Self; 3] = [Self::Philosophy, Self::Technology, Self::Life];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Philosophy => "Philosophy",
            Self::Technology => "Technology",
            Self::Life => "Life",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::Life
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown category: {0}")]
pub struct ParseCategoryError(String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| ParseCategoryError(value.to_string()))
    }
}

/// Category selection for the feed. `All` shows every post.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Filter choices in display order.
    pub const CHOICES: [Self; 4] = [
        Self::All,
        Self::Only(Category::Philosophy),
        Self::Only(Category::Technology),
        Self::Only(Category::Life),
    ];

    #[must_use]
    pub fn matches(self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(selected) => selected == category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Only(category) => category.fmt(f),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = ParseCategoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            value.parse().map(Self::Only)
        }
    }
}

/// Store-assigned identifier. Opaque: the table may use integers or UUIDs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostId {
    Number(i64),
    Text(String),
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => id.fmt(f),
            Self::Text(id) => f.write_str(id),
        }
    }
}

/// A published post as returned by the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub category: Category,
    pub date: String,
    #[serde(default, deserialize_with = "nullable_tags")]
    pub tags: Vec<String>,
}

fn nullable_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Insert record for the `posts` table. The store assigns `id` and `created_at`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub category: Category,
    pub date: String,
    pub tags: Vec<String>,
}

impl NewPost {
    /// Attaches a store-assigned id, producing the row the store would return.
    #[must_use]
    pub fn into_post(self, id: PostId) -> Post {
        Post {
            id,
            title: self.title,
            content: self.content,
            category: self.category,
            date: self.date,
            tags: self.tags,
        }
    }
}

/// Unsaved post being composed in the admin creation panel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub content: String,
    pub category: Category,
    /// Raw comma-separated input.
    pub tags: String,
}

impl Draft {
    /// Title and content must be non-empty. No trimming happens first, so a
    /// whitespace-only title passes.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.title.is_empty() && !self.content.is_empty()
    }

    /// Splits the raw tag input on commas, trimming each segment and dropping
    /// empty ones.
    #[must_use]
    pub fn tag_list(&self) -> Vec<String> {
        parse_tags(&self.tags)
    }

    #[must_use]
    pub fn to_new_post(&self, date: NaiveDate) -> NewPost {
        NewPost {
            title: self.title.clone(),
            content: self.content.clone(),
            category: self.category,
            date: format_date(date),
            tags: self.tag_list(),
        }
    }
}

#[must_use]
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Formats a calendar date as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
