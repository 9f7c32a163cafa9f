use crate::model::id::{BookingId, ItemId, UserId};
use chrono::{DateTime, Utc};
use derive_new::new;

#[derive(new)]
pub struct CreateBooking {
    pub item_id: ItemId,
    pub booked_by: UserId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(new)]
pub struct DecideBooking {
    pub booking_id: BookingId,
    pub decided_by: UserId,
    pub approved: bool,
}
