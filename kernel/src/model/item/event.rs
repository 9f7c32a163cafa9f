use crate::model::id::{ItemId, RequestId, UserId};
use derive_new::new;

#[derive(new)]
pub struct CreateItem {
    pub item_name: String,
    pub description: String,
    pub is_available: bool,
    pub owned_by: UserId,
    pub request_id: Option<RequestId>,
}

#[derive(Debug, new)]
pub struct UpdateItem {
    pub item_id: ItemId,
    pub requested_user: UserId,
    pub item_name: Option<String>,
    pub description: Option<String>,
    pub is_available: Option<bool>,
}

#[derive(Debug, new)]
pub struct DeleteItem {
    pub item_id: ItemId,
    pub requested_user: UserId,
}
