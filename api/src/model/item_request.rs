use chrono::{DateTime, Utc};
use garde::Validate;
use kernel::model::{
    id::{ItemId, RequestId, UserId},
    item::Item,
    item_request::{event::CreateItemRequest, ItemRequest},
    list::PageQuery,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterItemRequestRequest {
    #[garde(length(min = 1, max = 1024))]
    pub description: String,
}

impl RegisterItemRequestRequest {
    pub fn into_event(self, requested_by: UserId) -> CreateItemRequest {
        CreateItemRequest {
            description: self.description,
            requested_by,
        }
    }
}

fn default_size() -> i64 {
    10
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequestListQuery {
    #[garde(range(min = 0))]
    #[serde(default)]
    pub from: i64,
    #[garde(range(min = 1))]
    #[serde(default = "default_size")]
    pub size: i64,
}

impl ItemRequestListQuery {
    pub fn page(&self) -> PageQuery {
        PageQuery {
            from: self.from,
            size: self.size,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequestResponse {
    pub id: RequestId,
    pub description: String,
    pub created: DateTime<Utc>,
    /// このリクエストへの回答として登録されたアイテム
    pub items: Vec<OfferedItemResponse>,
}

impl ItemRequestResponse {
    pub fn new(request: ItemRequest, items: Vec<Item>) -> Self {
        let ItemRequest {
            request_id,
            description,
            created_at,
            ..
        } = request;
        Self {
            id: request_id,
            description,
            created: created_at,
            items: items.into_iter().map(OfferedItemResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferedItemResponse {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: UserId,
    pub request_id: Option<RequestId>,
}

impl From<Item> for OfferedItemResponse {
    fn from(value: Item) -> Self {
        Self {
            id: value.item_id,
            name: value.item_name,
            description: value.description,
            available: value.is_available,
            owner_id: value.owner.owner_id,
            request_id: value.request_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequestsResponse {
    pub requests: Vec<ItemRequestResponse>,
}
