use crate::model::id::{CommentId, ItemId, UserId};
use chrono::{DateTime, Utc};

pub mod event;

#[derive(Debug, Clone)]
pub struct Comment {
    pub comment_id: CommentId,
    pub item_id: ItemId,
    pub comment_text: String,
    pub author: CommentAuthor,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CommentAuthor {
    pub user_id: UserId,
    pub user_name: String,
}
