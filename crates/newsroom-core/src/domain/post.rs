use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of the inline preview shown in post listings.
const LISTING_PREVIEW_LEN: usize = 124;

/// The two kinds of published items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Article,
    News,
}

impl PostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostKind::Article => "article",
            PostKind::News => "news",
        }
    }
}

impl std::str::FromStr for PostKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "article" => Ok(PostKind::Article),
            "news" => Ok(PostKind::News),
            other => Err(format!("unknown post kind: {other}")),
        }
    }
}

/// Post entity - a published article or news item.
///
/// `created_at` is set once at construction and never updated; the daily
/// publication quota and the search `created_after` filter both key off it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub kind: PostKind,
    pub title: String,
    pub content: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post.
    pub fn new(author_id: Uuid, kind: PostKind, title: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            kind,
            title,
            content,
            rating: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Listing preview: the first 124 characters, ellipsized when truncated.
    pub fn preview(&self) -> String {
        truncate_chars(&self.content, LISTING_PREVIEW_LEN)
    }
}

/// Truncate to `max` characters, appending an ellipsis when anything was cut.
/// Counts chars, not bytes, so multi-byte content never splits mid-character.
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max).collect();
        out.push_str("...");
        out
    }
}

/// Search filter over posts. All provided fields must match (AND semantics);
/// absent fields impose no constraint.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    /// Case-insensitive substring match on the title.
    pub title: Option<String>,
    /// Case-insensitive substring match on the author's username.
    pub author_username: Option<String>,
    /// Strictly-greater-than match on `created_at`.
    pub created_after: Option<DateTime<Utc>>,
}

impl PostFilter {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author_username.is_none() && self.created_after.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_short_content_is_untouched() {
        let post = Post::new(
            Uuid::new_v4(),
            PostKind::News,
            "title".into(),
            "short body".into(),
        );
        assert_eq!(post.preview(), "short body");
    }

    #[test]
    fn preview_long_content_is_ellipsized_at_124_chars() {
        let content = "x".repeat(200);
        let post = Post::new(Uuid::new_v4(), PostKind::Article, "title".into(), content);
        let preview = post.preview();
        assert_eq!(preview.chars().count(), 124 + 3);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "日本語のテキスト".repeat(30);
        let out = truncate_chars(&s, 50);
        assert_eq!(out.chars().count(), 53);
    }

    #[test]
    fn post_kind_round_trips_through_str() {
        assert_eq!("news".parse::<PostKind>().unwrap(), PostKind::News);
        assert_eq!("article".parse::<PostKind>().unwrap(), PostKind::Article);
        assert!("podcast".parse::<PostKind>().is_err());
    }
}
