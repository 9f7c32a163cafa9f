use kernel::model::{
    id::{ItemId, RequestId, UserId},
    item::{Item, ItemOwner},
};

/// items テーブルと users を JOIN した結果を受ける型
pub struct ItemRow {
    pub item_id: ItemId,
    pub item_name: String,
    pub description: String,
    pub is_available: bool,
    pub owned_by: UserId,
    pub owner_name: String,
    pub request_id: Option<RequestId>,
}

impl From<ItemRow> for Item {
    fn from(value: ItemRow) -> Self {
        let ItemRow {
            item_id,
            item_name,
            description,
            is_available,
            owned_by,
            owner_name,
            request_id,
        } = value;
        Item {
            item_id,
            item_name,
            description,
            is_available,
            owner: ItemOwner {
                owner_id: owned_by,
                owner_name,
            },
            request_id,
        }
    }
}
