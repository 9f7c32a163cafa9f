use kernel::model::{
    id::{RequestId, UserId},
    item_request::ItemRequest,
};
use sqlx::types::chrono::{DateTime, Utc};

pub struct ItemRequestRow {
    pub request_id: RequestId,
    pub description: String,
    pub requested_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl From<ItemRequestRow> for ItemRequest {
    fn from(value: ItemRequestRow) -> Self {
        let ItemRequestRow {
            request_id,
            description,
            requested_by,
            created_at,
        } = value;
        ItemRequest {
            request_id,
            description,
            requested_by,
            created_at,
        }
    }
}
