use crate::model::id::UserId;
use derive_new::new;

#[derive(new)]
pub struct CreateItemRequest {
    pub description: String,
    pub requested_by: UserId,
}
