use crate::model::id::{ItemId, UserId};
use derive_new::new;

#[derive(new)]
pub struct CreateComment {
    pub item_id: ItemId,
    pub commented_by: UserId,
    pub comment_text: String,
}
