use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use planbot_core::constants::DEFAULT_UTC_OFFSET_MINUTES;

/// Wall clock of the user's time zone (fixed offset, no DST).
#[derive(Debug, Clone, Copy)]
pub struct UserClock {
    offset: FixedOffset,
}

impl UserClock {
    /// Out-of-range offsets fall back to the default zone.
    pub fn from_offset_minutes(minutes: i32) -> Self {
        let offset = FixedOffset::east_opt(minutes.saturating_mul(60))
            .or_else(|| FixedOffset::east_opt(DEFAULT_UTC_OFFSET_MINUTES * 60))
            .unwrap_or_else(|| Utc.fix());
        Self { offset }
    }

    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// `date` at `time` in the user's zone.
    pub fn at(&self, date: NaiveDate, time: NaiveTime) -> Option<DateTime<FixedOffset>> {
        self.offset.from_local_datetime(&date.and_time(time)).single()
    }
}

impl Default for UserClock {
    fn default() -> Self {
        Self::from_offset_minutes(DEFAULT_UTC_OFFSET_MINUTES)
    }
}
