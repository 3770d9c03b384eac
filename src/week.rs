use crate::models::Periodicity;
use chrono::{Datelike, Duration, NaiveDate};

/// Monday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Week bucket a record falls into. Only weekly records have one.
pub fn week_bucket(date: NaiveDate, periodicity: Periodicity) -> Option<NaiveDate> {
    match periodicity {
        Periodicity::Weekly => Some(week_start(date)),
        Periodicity::Daily => None,
    }
}
