//! Validation of requested APOD dates.

use chrono::{Local, NaiveDate};

/// Date format accepted on the command line.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors for dates that cannot name an APOD.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// The input is not a `YYYY-MM-DD` calendar date.
    #[error("Invalid date string: {0}")]
    Malformed(String),

    /// The date lies after today.
    #[error("The date must be in the past or today: {0}")]
    InFuture(NaiveDate),

    /// The date lies before the first APOD was published.
    #[error("The date must not be before {first}: {date}")]
    BeforeFirst {
        /// Requested date
        date: NaiveDate,
        /// Date of the first APOD
        first: NaiveDate,
    },
}

/// Date of the first Astronomy Picture of the Day.
#[must_use]
pub fn first_apod_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1995, 6, 16).expect("1995-06-16 is a valid date")
}

/// Today's date in the local time zone.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Check that `date` lies between the first APOD and `today`, inclusive.
pub fn validate_apod_date(date: NaiveDate, today: NaiveDate) -> Result<NaiveDate, DateError> {
    let first = first_apod_date();
    if date > today {
        Err(DateError::InFuture(date))
    } else if date < first {
        Err(DateError::BeforeFirst { date, first })
    } else {
        Ok(date)
    }
}

/// Parse and validate an optional date argument; `None` means `today`.
///
/// # Example
///
/// ```
/// use apodcache::apod::date::parse_apod_date;
/// use chrono::NaiveDate;
///
/// let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// assert_eq!(parse_apod_date(None, today).unwrap(), today);
/// assert!(parse_apod_date(Some("2024-13-01"), today).is_err());
/// ```
pub fn parse_apod_date(input: Option<&str>, today: NaiveDate) -> Result<NaiveDate, DateError> {
    let date = match input {
        None => today,
        Some(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map_err(|_| DateError::Malformed(s.to_string()))?,
    };
    validate_apod_date(date, today)
}
