use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author entity - the publishing identity wrapping a user account.
///
/// `rating` is a derived value: it is only ever written by an explicit
/// recomputation over current post/comment rows, never incremented in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub user_id: Uuid,
    pub rating: i64,
    pub created_at: DateTime<Utc>,
}

impl Author {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            rating: 0,
            created_at: Utc::now(),
        }
    }
}
