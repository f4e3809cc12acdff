//! # System clock capability and network-time parsing.
//!
//! The time service replies with a fixed-layout line such as
//! `2021-11-05 10:24:41.394 309 5 +0000 UTC`: date, time with a fractional
//! second, day-of-year, day-of-week, then zone fields the device ignores.
//! [`WallTime::parse`] picks that apart; [`SystemClock::set_time`] applies it.

use crate::error::HalError;

/// A broken-down wall-clock time, as applied to the device RTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallTime {
    pub year: u16,
    /// 1-based month.
    pub month: u8,
    /// 1-based day of month.
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// 1-based day of year.
    pub yearday: u16,
    /// Day of week as the time service counts it.
    pub weekday: u8,
}

impl WallTime {
    /// Parses the time service's timestamp line.
    ///
    /// Fractional seconds are truncated; the zone fields are ignored.
    /// Returns [`HalError::Protocol`] when the line does not have the
    /// expected fields.
    pub fn parse(timestamp: &str) -> Result<WallTime, HalError> {
        let malformed = || HalError::Protocol {
            reason: format!("unexpected timestamp: {timestamp:?}"),
        };

        let mut fields = timestamp.split_whitespace();
        let date = fields.next().ok_or_else(malformed)?;
        let time = fields.next().ok_or_else(malformed)?;
        let yearday = fields.next().ok_or_else(malformed)?;
        let weekday = fields.next().ok_or_else(malformed)?;

        let mut date_parts = date.split('-');
        let year = parse_num(date_parts.next(), malformed)?;
        let month = parse_num(date_parts.next(), malformed)?;
        let day = parse_num(date_parts.next(), malformed)?;
        if date_parts.next().is_some() {
            return Err(malformed());
        }

        let mut time_parts = time.split(':');
        let hour = parse_num(time_parts.next(), malformed)?;
        let minute = parse_num(time_parts.next(), malformed)?;
        let second_field = time_parts.next().ok_or_else(malformed)?;
        if time_parts.next().is_some() {
            return Err(malformed());
        }
        // "41.394" → 41
        let second = parse_num(second_field.split('.').next(), malformed)?;

        Ok(WallTime {
            year,
            month,
            day,
            hour,
            minute,
            second,
            yearday: parse_num(Some(yearday), malformed)?,
            weekday: parse_num(Some(weekday), malformed)?,
        })
    }
}

fn parse_num<T: std::str::FromStr>(
    field: Option<&str>,
    malformed: impl Fn() -> HalError,
) -> Result<T, HalError> {
    field
        .ok_or_else(&malformed)?
        .parse()
        .map_err(|_| malformed())
}

/// Capability contract for the device real-time clock.
pub trait SystemClock: Send {
    /// Sets the RTC to the given wall-clock time.
    fn set_time(&mut self, time: WallTime) -> Result<(), HalError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_time_service_line() {
        let t = WallTime::parse("2021-11-05 10:24:41.394 309 5 +0000 UTC").unwrap();
        assert_eq!(
            t,
            WallTime {
                year: 2021,
                month: 11,
                day: 5,
                hour: 10,
                minute: 24,
                second: 41,
                yearday: 309,
                weekday: 5,
            }
        );
    }

    #[test]
    fn parses_without_fractional_second() {
        let t = WallTime::parse("2022-01-31 23:59:59 31 1 +0000 UTC").unwrap();
        assert_eq!(t.second, 59);
        assert_eq!(t.yearday, 31);
    }

    #[test]
    fn rejects_truncated_lines() {
        for bad in ["", "2021-11-05", "2021-11-05 10:24:41.394", "not a time at all"] {
            let err = WallTime::parse(bad).unwrap_err();
            assert_eq!(err.as_label(), "hal_protocol", "input: {bad:?}");
        }
    }

    #[test]
    fn rejects_garbage_fields() {
        let err = WallTime::parse("2021-xx-05 10:24:41.394 309 5 +0000 UTC").unwrap_err();
        assert_eq!(err.as_label(), "hal_protocol");
    }
}
