use crate::model::{
    id::{ItemId, RequestId, UserId},
    item::{
        event::{CreateItem, DeleteItem, UpdateItem},
        Item,
    },
    list::PageQuery,
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn create(&self, event: CreateItem) -> AppResult<Item>;
    async fn update(&self, event: UpdateItem) -> AppResult<Item>;
    async fn delete(&self, event: DeleteItem) -> AppResult<()>;
    async fn find_by_id(&self, item_id: ItemId) -> AppResult<Option<Item>>;
    /// 所有者のアイテム一覧。登録順。
    async fn find_by_owner(&self, owned_by: UserId, page: PageQuery) -> AppResult<Vec<Item>>;
    async fn find_by_request_ids(&self, request_ids: &[RequestId]) -> AppResult<Vec<Item>>;
    /// 名前または説明の部分一致検索。貸出可能なアイテムのみ。
    async fn search(&self, text: &str, page: PageQuery) -> AppResult<Vec<Item>>;
}
