//! Batch expiry dates written as `MM/YY`

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::date_range::last_day_of_month;
use crate::error::InputError;

/// Month and year a batch expires in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Expiry {
    year: i32,
    month: u32,
}

impl Expiry {
    pub fn new(month: u32, year: i32) -> Result<Self, InputError> {
        if !(1..=12).contains(&month) {
            return Err(InputError::Invalid {
                field: "expiry",
                message: "month must be between 01 and 12",
            });
        }
        Ok(Self { year, month })
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Medicines stay usable until the end of the printed month
    pub fn last_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(last_day_of_month)
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn is_expired_on(&self, date: NaiveDate) -> bool {
        self.last_day() < date
    }

    /// Not yet expired, but expiring within `months` calendar months of `date`
    pub fn expires_within(&self, date: NaiveDate, months: u32) -> bool {
        if self.is_expired_on(date) {
            return false;
        }
        let current = date.year() * 12 + date.month0() as i32;
        let expiry = self.year * 12 + (self.month as i32 - 1);
        expiry - current <= months as i32
    }
}

impl FromStr for Expiry {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = InputError::Invalid {
            field: "expiry",
            message: "expected MM/YY",
        };

        let (month, year) = s.trim().split_once('/').ok_or(invalid.clone())?;
        if month.len() != 2 || year.len() != 2 {
            return Err(invalid);
        }
        let month: u32 = month.parse().map_err(|_| invalid.clone())?;
        let year: i32 = year.parse().map_err(|_| invalid)?;
        Expiry::new(month, 2000 + year)
    }
}

impl TryFrom<String> for Expiry {
    type Error = InputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Expiry> for String {
    fn from(expiry: Expiry) -> Self {
        expiry.to_string()
    }
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}", self.month, self.year.rem_euclid(100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        let expiry: Expiry = "03/26".parse().unwrap();
        assert_eq!(expiry.month(), 3);
        assert_eq!(expiry.year(), 2026);
        assert_eq!(expiry.to_string(), "03/26");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("13/26".parse::<Expiry>().is_err());
        assert!("00/26".parse::<Expiry>().is_err());
        assert!("3/26".parse::<Expiry>().is_err());
        assert!("03-26".parse::<Expiry>().is_err());
        assert!("03/2026".parse::<Expiry>().is_err());
        assert!("ab/cd".parse::<Expiry>().is_err());
    }

    #[test]
    fn test_last_day() {
        let expiry: Expiry = "02/28".parse().unwrap();
        assert_eq!(expiry.last_day(), date(2028, 2, 29));
    }

    #[test]
    fn test_expired() {
        let expiry: Expiry = "03/24".parse().unwrap();
        assert!(!expiry.is_expired_on(date(2024, 3, 31)));
        assert!(expiry.is_expired_on(date(2024, 4, 1)));
    }

    #[test]
    fn test_expires_within() {
        let expiry: Expiry = "06/24".parse().unwrap();
        assert!(expiry.expires_within(date(2024, 3, 15), 3));
        assert!(!expiry.expires_within(date(2024, 2, 15), 3));
        assert!(!expiry.expires_within(date(2024, 7, 1), 3));
    }

    #[test]
    fn test_serde_as_string() {
        let expiry: Expiry = serde_json::from_str("\"11/25\"").unwrap();
        assert_eq!(serde_json::to_string(&expiry).unwrap(), "\"11/25\"");
        assert!(serde_json::from_str::<Expiry>("\"2025-11\"").is_err());
    }
}
