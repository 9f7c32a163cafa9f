use crate::model::id::{ItemId, RequestId, UserId};

pub mod event;

#[derive(Debug, Clone)]
pub struct Item {
    pub item_id: ItemId,
    pub item_name: String,
    pub description: String,
    pub is_available: bool,
    pub owner: ItemOwner,
    pub request_id: Option<RequestId>,
}

#[derive(Debug, Clone)]
pub struct ItemOwner {
    pub owner_id: UserId,
    pub owner_name: String,
}
