use crate::model::id::{BookingId, ItemId, UserId};
use chrono::{DateTime, Utc};

pub mod event;

#[derive(Debug, Clone)]
pub struct Booking {
    pub booking_id: BookingId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub booked_by: BookingUser,
    pub item: BookingItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    Waiting,
    Approved,
    Rejected,
}

#[derive(Debug, Clone)]
pub struct BookingUser {
    pub user_id: UserId,
    pub user_name: String,
}

#[derive(Debug, Clone)]
pub struct BookingItem {
    pub item_id: ItemId,
    pub item_name: String,
    pub owned_by: UserId,
}

/// 承認済み予約の集合から、基準時刻の直前・直後の予約を切り出す。
/// last は start < as_of のうち start が最大のもの、
/// next は start > as_of のうち start が最小のもの。
pub fn last_and_next(
    bookings: &[Booking],
    as_of: DateTime<Utc>,
) -> (Option<&Booking>, Option<&Booking>) {
    let approved = bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Approved);
    let last = approved
        .clone()
        .filter(|b| b.start_time < as_of)
        .max_by_key(|b| b.start_time);
    let next = approved
        .filter(|b| b.start_time > as_of)
        .min_by_key(|b| b.start_time);
    (last, next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn booking(offset_weeks: i64, status: BookingStatus, now: DateTime<Utc>) -> Booking {
        let start = now + Duration::weeks(offset_weeks);
        Booking {
            booking_id: BookingId::new(),
            start_time: start,
            end_time: start + Duration::days(1),
            status,
            booked_by: BookingUser {
                user_id: UserId::new(),
                user_name: "booker".into(),
            },
            item: BookingItem {
                item_id: ItemId::new(),
                item_name: "drill".into(),
                owned_by: UserId::new(),
            },
        }
    }

    #[test]
    fn picks_nearest_past_and_future_starts() {
        let now = Utc::now();
        let bookings = vec![
            booking(-2, BookingStatus::Approved, now),
            booking(-1, BookingStatus::Approved, now),
            booking(1, BookingStatus::Approved, now),
            booking(2, BookingStatus::Approved, now),
        ];

        let (last, next) = last_and_next(&bookings, now);
        assert_eq!(last.unwrap().booking_id, bookings[1].booking_id);
        assert_eq!(next.unwrap().booking_id, bookings[2].booking_id);
    }

    #[test]
    fn ignores_bookings_that_are_not_approved() {
        let now = Utc::now();
        let bookings = vec![
            booking(-1, BookingStatus::Waiting, now),
            booking(-3, BookingStatus::Approved, now),
            booking(1, BookingStatus::Rejected, now),
        ];

        let (last, next) = last_and_next(&bookings, now);
        assert_eq!(last.unwrap().booking_id, bookings[1].booking_id);
        assert!(next.is_none());
    }

    #[test]
    fn empty_set_yields_neither_side() {
        let (last, next) = last_and_next(&[], Utc::now());
        assert!(last.is_none());
        assert!(next.is_none());
    }

    #[test]
    fn booking_starting_exactly_at_as_of_is_excluded() {
        let now = Utc::now();
        let mut b = booking(0, BookingStatus::Approved, now);
        b.start_time = now;

        let bookings = [b];
        let (last, next) = last_and_next(&bookings, now);
        assert!(last.is_none());
        assert!(next.is_none());
    }
}
