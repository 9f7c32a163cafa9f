pub mod booking;
pub mod comment;
pub mod health;
pub mod item;
pub mod item_request;
pub mod user;
