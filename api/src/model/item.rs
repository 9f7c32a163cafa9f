use chrono::{DateTime, Utc};
use garde::Validate;
use kernel::model::{
    comment::{Comment, CommentAuthor},
    id::{CommentId, ItemId, RequestId, UserId},
    item::{
        event::{CreateItem, UpdateItem},
        Item, ItemOwner,
    },
    list::PageQuery,
};
use serde::{Deserialize, Serialize};

use super::booking::BookingSummaryResponse;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    #[garde(length(min = 1))]
    pub name: String,
    #[garde(length(min = 1))]
    pub description: String,
    #[garde(skip)]
    pub available: bool,
    #[garde(skip)]
    pub request_id: Option<RequestId>,
}

impl CreateItemRequest {
    pub fn into_event(self, owned_by: UserId) -> CreateItem {
        let CreateItemRequest {
            name,
            description,
            available,
            request_id,
        } = self;
        CreateItem {
            item_name: name,
            description,
            is_available: available,
            owned_by,
            request_id,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    #[garde(inner(length(min = 1)))]
    pub name: Option<String>,
    #[garde(inner(length(min = 1)))]
    pub description: Option<String>,
    #[garde(skip)]
    pub available: Option<bool>,
}

impl UpdateItemRequest {
    pub fn into_event(self, item_id: ItemId, requested_user: UserId) -> UpdateItem {
        let UpdateItemRequest {
            name,
            description,
            available,
        } = self;
        UpdateItem {
            item_id,
            requested_user,
            item_name: name,
            description,
            is_available: available,
        }
    }
}

fn default_size() -> i64 {
    10
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ItemListQuery {
    #[garde(range(min = 0))]
    #[serde(default)]
    pub from: i64,
    #[garde(range(min = 1))]
    #[serde(default = "default_size")]
    pub size: i64,
}

impl ItemListQuery {
    pub fn page(&self) -> PageQuery {
        PageQuery {
            from: self.from,
            size: self.size,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ItemSearchQuery {
    #[garde(skip)]
    #[serde(default)]
    pub text: String,
    #[garde(range(min = 0))]
    #[serde(default)]
    pub from: i64,
    #[garde(range(min = 1))]
    #[serde(default = "default_size")]
    pub size: i64,
}

impl ItemSearchQuery {
    /// 空文字・空白のみの検索語は問い合わせ対象外
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn page(&self) -> PageQuery {
        PageQuery {
            from: self.from,
            size: self.size,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner: ItemOwnerResponse,
    pub request_id: Option<RequestId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_booking: Option<BookingSummaryResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_booking: Option<BookingSummaryResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentResponse>>,
}

impl From<Item> for ItemResponse {
    fn from(value: Item) -> Self {
        let Item {
            item_id,
            item_name,
            description,
            is_available,
            owner,
            request_id,
        } = value;
        let ItemOwner {
            owner_id,
            owner_name,
        } = owner;
        Self {
            id: item_id,
            name: item_name,
            description,
            available: is_available,
            owner: ItemOwnerResponse {
                id: owner_id,
                name: owner_name,
            },
            request_id,
            last_booking: None,
            next_booking: None,
            comments: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemOwnerResponse {
    pub id: UserId,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsResponse {
    pub items: Vec<ItemResponse>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[garde(length(min = 1, max = 1024))]
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: CommentId,
    pub text: String,
    pub author_name: String,
    pub created: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(value: Comment) -> Self {
        let Comment {
            comment_id,
            comment_text,
            author,
            created_at,
            ..
        } = value;
        let CommentAuthor { user_name, .. } = author;
        Self {
            id: comment_id,
            text: comment_text,
            author_name: user_name,
            created: created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(text: &str) -> ItemSearchQuery {
        ItemSearchQuery {
            text: text.into(),
            from: 0,
            size: 10,
        }
    }

    #[test]
    fn blank_search_text_skips_lookup() {
        assert!(search("").is_blank());
        assert!(search("   ").is_blank());
        assert!(search("\t\n").is_blank());
    }

    #[test]
    fn non_blank_search_text_is_looked_up() {
        assert!(!search("drill").is_blank());
        assert!(!search(" drill ").is_blank());
    }
}
