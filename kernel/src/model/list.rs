use strum::EnumString;

/// 予約一覧の絞り込み条件。時間条件は問い合わせ時点の now に対して評価する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum BookingFilter {
    All,
    Current,
    Past,
    Future,
    Waiting,
    Rejected,
}

#[derive(Debug, Clone, Copy)]
pub struct PageQuery {
    pub from: i64,
    pub size: i64,
}

impl PageQuery {
    /// from はページ境界に切り下げる（ページ番号 = from / size）
    pub fn offset(&self) -> i64 {
        (self.from / self.size) * self.size
    }

    pub fn limit(&self) -> i64 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn filter_parses_upper_case_tokens() {
        assert_eq!(BookingFilter::from_str("ALL").unwrap(), BookingFilter::All);
        assert_eq!(
            BookingFilter::from_str("CURRENT").unwrap(),
            BookingFilter::Current
        );
        assert_eq!(
            BookingFilter::from_str("REJECTED").unwrap(),
            BookingFilter::Rejected
        );
    }

    #[test]
    fn filter_rejects_unknown_tokens() {
        assert!(BookingFilter::from_str("UNSUPPORTED_STATUS").is_err());
        assert!(BookingFilter::from_str("waiting").is_err());
        assert!(BookingFilter::from_str("").is_err());
    }

    #[test]
    fn offset_rounds_down_to_page_boundary() {
        let page = PageQuery { from: 0, size: 10 };
        assert_eq!(page.offset(), 0);

        let page = PageQuery { from: 7, size: 10 };
        assert_eq!(page.offset(), 0);

        let page = PageQuery { from: 10, size: 10 };
        assert_eq!(page.offset(), 10);

        let page = PageQuery { from: 25, size: 10 };
        assert_eq!(page.offset(), 20);

        let page = PageQuery { from: 5, size: 2 };
        assert_eq!(page.offset(), 4);
    }
}
