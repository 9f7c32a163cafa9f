pub mod booking;
pub mod item;
pub mod item_request;
pub mod user;
