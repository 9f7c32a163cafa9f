use crate::model::{
    id::{RequestId, UserId},
    item_request::{event::CreateItemRequest, ItemRequest},
    list::PageQuery,
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait ItemRequestRepository: Send + Sync {
    async fn create(&self, event: CreateItemRequest) -> AppResult<ItemRequest>;
    async fn find_by_id(&self, request_id: RequestId) -> AppResult<Option<ItemRequest>>;
    /// 自分のリクエスト一覧。作成日時の昇順。
    async fn find_by_requestor(&self, requested_by: UserId) -> AppResult<Vec<ItemRequest>>;
    /// 他ユーザーのリクエスト一覧。作成日時の昇順。
    async fn find_from_others(
        &self,
        requested_by: UserId,
        page: PageQuery,
    ) -> AppResult<Vec<ItemRequest>>;
}
