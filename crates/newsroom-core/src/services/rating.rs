//! Rating engine.
//!
//! An author's rating is a derived value recomputed on demand from current
//! post/comment rows. Likes and dislikes only touch the rated row; callers
//! that need a fresh author rating must recompute explicitly. Concurrent
//! recomputations race benignly - last write wins.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::{DomainError, RepoError};
use crate::ports::{AuthorRepository, BaseRepository, CommentRepository, PostRepository};

/// The three-term rating formula: post ratings weigh triple, the author's own
/// comments and the comments received on their posts count once each.
pub fn combined_rating(post_sum: i64, own_comment_sum: i64, received_comment_sum: i64) -> i64 {
    3 * post_sum + own_comment_sum + received_comment_sum
}

/// Computes author ratings and applies like/dislike deltas.
pub struct RatingService {
    authors: Arc<dyn AuthorRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl RatingService {
    pub fn new(
        authors: Arc<dyn AuthorRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            authors,
            posts,
            comments,
        }
    }

    /// Recompute the author's aggregate rating from current rows, persist it,
    /// and return it. Each aggregate is 0 when no matching rows exist.
    pub async fn recompute_author_rating(&self, author_id: Uuid) -> Result<i64, DomainError> {
        let author = self
            .authors
            .find_by_id(author_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Author", author_id))?;

        let post_sum = self.posts.sum_rating_by_author(author.id).await?;
        let own_comment_sum = self.comments.sum_rating_by_user(author.user_id).await?;
        let received_comment_sum = self.comments.sum_rating_on_author_posts(author.id).await?;

        let rating = combined_rating(post_sum, own_comment_sum, received_comment_sum);
        self.authors.set_rating(author.id, rating).await?;

        tracing::debug!(
            author_id = %author.id,
            post_sum,
            own_comment_sum,
            received_comment_sum,
            rating,
            "Recomputed author rating"
        );

        Ok(rating)
    }

    /// Increment the post's rating. Does not recompute the author rating.
    pub async fn like_post(&self, post_id: Uuid) -> Result<(), DomainError> {
        self.adjust_post(post_id, 1).await
    }

    /// Decrement the post's rating. No floor - ratings may go negative.
    pub async fn dislike_post(&self, post_id: Uuid) -> Result<(), DomainError> {
        self.adjust_post(post_id, -1).await
    }

    pub async fn like_comment(&self, comment_id: Uuid) -> Result<(), DomainError> {
        self.adjust_comment(comment_id, 1).await
    }

    pub async fn dislike_comment(&self, comment_id: Uuid) -> Result<(), DomainError> {
        self.adjust_comment(comment_id, -1).await
    }

    async fn adjust_post(&self, post_id: Uuid, delta: i32) -> Result<(), DomainError> {
        self.posts
            .adjust_rating(post_id, delta)
            .await
            .map_err(|e| match e {
                RepoError::NotFound => DomainError::not_found("Post", post_id),
                other => other.into(),
            })
    }

    async fn adjust_comment(&self, comment_id: Uuid, delta: i32) -> Result<(), DomainError> {
        self.comments
            .adjust_rating(comment_id, delta)
            .await
            .map_err(|e| match e {
                RepoError::NotFound => DomainError::not_found("Comment", comment_id),
                other => other.into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_author_rates_zero() {
        assert_eq!(combined_rating(0, 0, 0), 0);
    }

    #[test]
    fn post_ratings_weigh_triple() {
        // posts {2, -1}, own comments {3}, received comments {1, 1}
        assert_eq!(combined_rating(2 - 1, 3, 1 + 1), 8);
    }

    #[test]
    fn rating_is_unbounded_in_both_directions() {
        assert_eq!(combined_rating(-10, -5, -2), -37);
    }
}
