use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::{BTreeSet, HashSet};

pub const DEFAULT_CADENCE: &str = "tue,thu";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CadenceError {
    #[error("unknown day '{0}'. Use: mon, tue, wed, thu, fri, sat, sun")]
    UnknownDay(String),
    #[error("cadence must name at least one day")]
    Empty,
}

/// Weekdays on which new articles go out, minus blackout dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishCalendar {
    publish_days: BTreeSet<u32>,
    blackouts: HashSet<NaiveDate>,
}

impl Default for PublishCalendar {
    fn default() -> Self {
        Self::from_weekdays([Weekday::Tue, Weekday::Thu])
    }
}

impl PublishCalendar {
    pub fn from_weekdays(days: impl IntoIterator<Item = Weekday>) -> Self {
        Self {
            publish_days: days
                .into_iter()
                .map(|day| day.num_days_from_monday())
                .collect(),
            blackouts: HashSet::new(),
        }
    }

    /// Parse a comma-separated list of three-letter day names, e.g. `mon,wed,fri`.
    pub fn parse_cadence(cadence: &str) -> Result<Self, CadenceError> {
        let mut days = Vec::new();
        for name in cadence.split(',') {
            let name = name.trim().to_ascii_lowercase();
            if name.is_empty() {
                continue;
            }
            days.push(day_from_name(&name).ok_or(CadenceError::UnknownDay(name))?);
        }
        if days.is_empty() {
            return Err(CadenceError::Empty);
        }
        Ok(Self::from_weekdays(days))
    }

    /// Publish weekdays in Monday-first order.
    pub fn publish_days(&self) -> Vec<Weekday> {
        self.publish_days
            .iter()
            .filter_map(|&n| weekday_from_index(n))
            .collect()
    }

    pub fn add_blackout(&mut self, date: NaiveDate) {
        self.blackouts.insert(date);
    }

    pub fn add_blackouts(&mut self, dates: &[NaiveDate]) {
        self.blackouts.extend(dates);
    }

    pub fn is_publish_day(&self, date: NaiveDate) -> bool {
        self.publish_days
            .contains(&date.weekday().num_days_from_monday())
            && !self.blackouts.contains(&date)
    }

    /// First publish day on or after `from`.
    ///
    /// Returns `None` when every cadence day of the coming year is blacked
    /// out, or when the search runs past the last representable date.
    pub fn next_publish_date(&self, from: NaiveDate) -> Option<NaiveDate> {
        let mut current = from;
        for _ in 0..=366 {
            if self.is_publish_day(current) {
                return Some(current);
            }
            current = current.succ_opt()?;
        }
        None
    }
}

fn day_from_name(name: &str) -> Option<Weekday> {
    match name {
        "mon" => Some(Weekday::Mon),
        "tue" => Some(Weekday::Tue),
        "wed" => Some(Weekday::Wed),
        "thu" => Some(Weekday::Thu),
        "fri" => Some(Weekday::Fri),
        "sat" => Some(Weekday::Sat),
        "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

fn weekday_from_index(n: u32) -> Option<Weekday> {
    u8::try_from(n)
        .ok()
        .and_then(|n| Weekday::try_from(n).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_and_sorts_cadence() {
        let calendar = PublishCalendar::parse_cadence("fri, Mon,wed").unwrap();
        assert_eq!(
            calendar.publish_days(),
            vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]
        );
    }

    #[test]
    fn rejects_unknown_day() {
        assert_eq!(
            PublishCalendar::parse_cadence("tue,funday"),
            Err(CadenceError::UnknownDay("funday".into()))
        );
        assert_eq!(PublishCalendar::parse_cadence(" , "), Err(CadenceError::Empty));
    }

    #[test]
    fn next_publish_date_includes_start_day() {
        let calendar = PublishCalendar::default();
        // 2026-02-24 is a Tuesday.
        assert_eq!(calendar.next_publish_date(d(2026, 2, 24)), Some(d(2026, 2, 24)));
        assert_eq!(calendar.next_publish_date(d(2026, 2, 25)), Some(d(2026, 2, 26)));
        assert_eq!(calendar.next_publish_date(d(2026, 2, 27)), Some(d(2026, 3, 3)));
    }

    #[test]
    fn blackout_dates_are_skipped() {
        let mut calendar = PublishCalendar::default();
        calendar.add_blackout(d(2026, 2, 24));
        assert_eq!(calendar.next_publish_date(d(2026, 2, 24)), Some(d(2026, 2, 26)));
        assert!(!calendar.is_publish_day(d(2026, 2, 24)));
        assert!(calendar.is_publish_day(d(2026, 2, 26)));
    }

    #[test]
    fn search_stops_at_the_last_date() {
        let calendar = PublishCalendar::default();
        let last = NaiveDate::MAX;
        let expected = calendar.is_publish_day(last).then_some(last);
        assert_eq!(calendar.next_publish_date(last), expected);
    }
}
