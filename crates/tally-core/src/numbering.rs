//! # Daily Document Numbers
//!
//! Receipts, invoices and cash vouchers share one human-facing number
//! format per shop and calendar day:
//!
//! ```text
//!   2 5 0 3 0 9 0 0 0 7
//!   └─┘ └─┘ └─┘ └─────┘
//!   YY  MM  DD  NNNN      7th document issued on 2025-03-09
//! ```
//!
//! This module only formats and parses. The counter itself lives in
//! storage (`tally-db::CounterRepository`), which hands back the sequence
//! value for a date; the same date then becomes the prefix here, so the two
//! can never disagree.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Highest sequence that fits the four-digit suffix.
pub const MAX_DAILY_SEQUENCE: u32 = 9999;

/// Total length of a document number.
pub const DOCUMENT_NUMBER_LEN: usize = 10;

/// Storage key for a calendar day: `yymmdd`.
///
/// ```rust
/// use chrono::NaiveDate;
/// use tally_core::numbering::day_key;
///
/// assert_eq!(day_key(NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()), "250309");
/// ```
pub fn day_key(date: NaiveDate) -> String {
    format!(
        "{:02}{:02}{:02}",
        date.year().rem_euclid(100),
        date.month(),
        date.day()
    )
}

/// A validated `YYMMDDNNNN` number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentNumber {
    date: NaiveDate,
    sequence: u32,
}

impl DocumentNumber {
    /// Pairs a calendar day with the sequence issued for it.
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use tally_core::DocumentNumber;
    ///
    /// let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
    /// let number = DocumentNumber::new(date, 7).unwrap();
    /// assert_eq!(number.to_string(), "2503090007");
    /// ```
    pub fn new(date: NaiveDate, sequence: u32) -> CoreResult<Self> {
        if sequence == 0 {
            return Err(CoreError::InvalidDocumentNumber(format!(
                "{}0000",
                day_key(date)
            )));
        }
        if sequence > MAX_DAILY_SEQUENCE {
            return Err(CoreError::SequenceExhausted {
                day: day_key(date),
                sequence,
            });
        }
        Ok(DocumentNumber { date, sequence })
    }

    /// Parses a stored number back into its parts.
    ///
    /// The two-digit year is read as 20YY.
    pub fn parse(input: &str) -> CoreResult<Self> {
        let invalid = || CoreError::InvalidDocumentNumber(input.to_string());

        if input.len() != DOCUMENT_NUMBER_LEN || !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let field = |range: std::ops::Range<usize>| input[range].parse::<u32>().map_err(|_| invalid());
        let year = 2000 + field(0..2)? as i32;
        let month = field(2..4)?;
        let day = field(4..6)?;
        let sequence = field(6..10)?;

        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;
        if sequence == 0 {
            return Err(invalid());
        }
        DocumentNumber::new(date, sequence)
    }

    /// Calendar day encoded in the prefix.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Position within the day, starting at 1.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// The `yymmdd` prefix.
    pub fn day_key(&self) -> String {
        day_key(self.date)
    }
}

impl fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:04}", day_key(self.date), self.sequence)
    }
}

impl FromStr for DocumentNumber {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentNumber::parse(s)
    }
}

impl TryFrom<String> for DocumentNumber {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DocumentNumber::parse(&value)
    }
}

impl From<DocumentNumber> for String {
    fn from(number: DocumentNumber) -> Self {
        number.to_string()
    }
}
