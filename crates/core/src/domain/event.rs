use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub i64);

/// A stored reminder. Names are not unique; lookups match them exactly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub date: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub name: String,
    pub date: NaiveDate,
}

impl NewEvent {
    pub fn new(name: impl Into<String>, date: NaiveDate) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::EmptyName);
        }
        Ok(Self { name, date })
    }
}

impl Event {
    pub fn display_date(&self) -> String {
        format_display_date(self.date)
    }
}

pub fn parse_iso_date(value: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(value.trim(), ISO_DATE_FORMAT)
        .map_err(|_| DomainError::InvalidDate { value: value.to_owned() })
}

pub fn format_iso_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

pub fn format_display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}
