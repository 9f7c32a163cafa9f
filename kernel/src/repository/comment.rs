use crate::model::{
    comment::{event::CreateComment, Comment},
    id::ItemId,
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, event: CreateComment) -> AppResult<Comment>;
    /// 複数アイテムのコメントをまとめて取得する。作成日時の降順。
    async fn find_by_item_ids(&self, item_ids: &[ItemId]) -> AppResult<Vec<Comment>>;
}
