pub mod booking;
pub mod comment;
pub mod id;
pub mod item;
pub mod item_request;
pub mod list;
pub mod user;
