use kernel::model::{
    comment::{Comment, CommentAuthor},
    id::{CommentId, ItemId, UserId},
};
use sqlx::types::chrono::{DateTime, Utc};

/// comments テーブルと users を JOIN した結果を受ける型
pub struct CommentRow {
    pub comment_id: CommentId,
    pub item_id: ItemId,
    pub comment_text: String,
    pub commented_by: UserId,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(value: CommentRow) -> Self {
        let CommentRow {
            comment_id,
            item_id,
            comment_text,
            commented_by,
            user_name,
            created_at,
        } = value;
        Comment {
            comment_id,
            item_id,
            comment_text,
            author: CommentAuthor {
                user_id: commented_by,
                user_name,
            },
            created_at,
        }
    }
}
