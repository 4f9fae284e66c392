//! Input checks shared by the request handlers.
//!
//! Dates and times are validated here and handed to Postgres as text with an
//! explicit cast, so the database never sees an unchecked value.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query,
    },
    Json,
};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;
use uuid::Uuid;

use super::storage::RequestError;
use super::{MAX_INSTALLMENTS, MAX_REASON_CHARS};

const DATE_PATTERN: &str = r"^(\d{4})-(\d{2})-(\d{2})$";
const TIME_PATTERN: &str = r"^([01]\d|2[0-3]):([0-5]\d)$";

static DATE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(DATE_PATTERN).ok());
static TIME_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(TIME_PATTERN).ok());

/// Calendar date ordered by year, then month, then day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(super) struct CalendarDate {
    year: u16,
    month: u8,
    day: u8,
}

impl CalendarDate {
    /// `YYYY-MM-DD`, suitable for a `::date` cast.
    pub(super) fn to_sql(self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Minutes since midnight for an `HH:MM` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(super) struct ClockTime {
    minutes: u16,
}

impl ClockTime {
    pub(super) fn to_sql(self) -> String {
        format!("{:02}:{:02}", self.minutes / 60, self.minutes % 60)
    }
}

/// Unwraps a JSON body, folding every extractor rejection into one
/// invalid-request error.
pub(super) fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, RequestError> {
    match payload {
        Ok(Json(payload)) => Ok(payload),
        Err(rejection) => {
            debug!("rejected request body: {rejection}");
            Err(RequestError::Invalid("invalid body"))
        }
    }
}

/// Unwraps list query parameters. A query string that does not deserialize
/// falls back to the defaults, the same as any other bad paging input.
pub(super) fn query<T: Default>(query: Result<Query<T>, QueryRejection>) -> T {
    match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            debug!("ignoring query string: {rejection}");
            T::default()
        }
    }
}

pub(super) fn parse_id(raw: &str) -> Result<Uuid, RequestError> {
    Uuid::parse_str(raw.trim()).map_err(|_| RequestError::Invalid("invalid id"))
}

pub(super) fn reason(raw: &str) -> Result<&str, RequestError> {
    let reason = raw.trim();
    if reason.is_empty() {
        return Err(RequestError::Invalid("reason is required"));
    }
    if reason.chars().count() > MAX_REASON_CHARS {
        return Err(RequestError::Invalid("reason is too long"));
    }
    Ok(reason)
}

pub(super) fn amount(value: i64) -> Result<i64, RequestError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(RequestError::Invalid("amount must be positive"))
    }
}

pub(super) fn installments(value: i32) -> Result<i32, RequestError> {
    if (1..=MAX_INSTALLMENTS).contains(&value) {
        Ok(value)
    } else {
        Err(RequestError::Invalid("installments out of range"))
    }
}

pub(super) fn date(raw: &str) -> Result<CalendarDate, RequestError> {
    let invalid = RequestError::Invalid("invalid date");
    let Some(captures) = DATE_RE.as_ref().and_then(|re| re.captures(raw.trim())) else {
        return Err(invalid);
    };
    let (Ok(year), Ok(month), Ok(day)) = (
        captures[1].parse::<u16>(),
        captures[2].parse::<u8>(),
        captures[3].parse::<u8>(),
    ) else {
        return Err(invalid);
    };
    if year == 0 || !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
        return Err(invalid);
    }
    Ok(CalendarDate { year, month, day })
}

pub(super) fn time(raw: &str) -> Result<ClockTime, RequestError> {
    let invalid = RequestError::Invalid("invalid time");
    let Some(captures) = TIME_RE.as_ref().and_then(|re| re.captures(raw.trim())) else {
        return Err(invalid);
    };
    let (Ok(hours), Ok(minutes)) = (captures[1].parse::<u16>(), captures[2].parse::<u16>()) else {
        return Err(invalid);
    };
    Ok(ClockTime {
        minutes: hours * 60 + minutes,
    })
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
