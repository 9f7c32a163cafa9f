use crate::model::id::{RequestId, UserId};
use chrono::{DateTime, Utc};

pub mod event;

#[derive(Debug, Clone)]
pub struct ItemRequest {
    pub request_id: RequestId,
    pub description: String,
    pub requested_by: UserId,
    pub created_at: DateTime<Utc>,
}
