//! The hourly slot grid.
//!
//! A slot is one hour of facility time identified by `(facility, date,
//! start time)`. Slots start on the hour; the end time is always start +
//! 60 minutes and a single slot never crosses midnight. Multiple
//! contiguous slots form a booking's time range.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;

/// Parse a `"yyyy-MM-dd"` date key.
pub fn parse_date(s: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| AppError::validation(format!("Invalid date '{s}': {e}")))
}

/// The start of one hourly slot, on the fixed grid (minutes are always 00).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotKey {
    hour: u8,
}

impl SlotKey {
    /// Create a slot starting at the given hour of day (0..=23).
    pub fn from_hour(hour: u8) -> AppResult<Self> {
        if hour > 23 {
            return Err(AppError::validation(format!("Slot hour {hour} out of range")));
        }
        Ok(Self { hour })
    }

    /// The start hour of day.
    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// The start time as `"HH:MM"`.
    pub fn start_hm(&self) -> String {
        format!("{:02}:00", self.hour)
    }

    /// The end time as `"HH:MM"` (start + 60 minutes, `23:00` ends at `00:00`).
    pub fn end_hm(&self) -> String {
        format!("{:02}:00", (self.hour + 1) % 24)
    }

    /// The ledger key form `"HH:MM-HH:MM"` under which a claim is stored.
    pub fn ledger_key(&self) -> String {
        format!("{}-{}", self.start_hm(), self.end_hm())
    }

    /// The slot immediately after this one, if it stays within the day.
    pub fn next(&self) -> Option<Self> {
        if self.hour >= 23 {
            None
        } else {
            Some(Self { hour: self.hour + 1 })
        }
    }

    /// The start as a [`NaiveTime`], for comparisons against a clock.
    pub fn start_time(&self) -> NaiveTime {
        // hour is validated <= 23 at construction
        NaiveTime::from_hms_opt(u32::from(self.hour), 0, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl FromStr for SlotKey {
    type Err = AppError;

    /// Parse `"HH:MM"`. Minutes must be `00`; the grid is hourly.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s
            .split_once(':')
            .ok_or_else(|| AppError::validation(format!("Invalid slot time '{s}'")))?;
        let hour: u8 = h
            .parse()
            .map_err(|_| AppError::validation(format!("Invalid slot hour in '{s}'")))?;
        let minute: u8 = m
            .parse()
            .map_err(|_| AppError::validation(format!("Invalid slot minute in '{s}'")))?;
        if minute != 0 {
            return Err(AppError::validation(format!(
                "Slot '{s}' is off the hourly grid"
            )));
        }
        Self::from_hour(hour)
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start_hm())
    }
}

impl TryFrom<String> for SlotKey {
    type Error = AppError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<SlotKey> for String {
    fn from(key: SlotKey) -> String {
        key.start_hm()
    }
}

/// A non-empty ordered set of contiguous hourly slots on a single date.
///
/// Construction validates the invariants, so any `SlotSet` in hand is
/// known-good: ascending starts, no duplicates, no gaps, no midnight
/// crossing between consecutive slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SlotKey>", into = "Vec<SlotKey>")]
pub struct SlotSet {
    slots: Vec<SlotKey>,
}

impl SlotSet {
    /// Build a slot set from arbitrary order. Sorts, then validates
    /// non-emptiness, uniqueness, and contiguity.
    pub fn new(mut slots: Vec<SlotKey>) -> AppResult<Self> {
        if slots.is_empty() {
            return Err(AppError::validation("A booking needs at least one slot"));
        }
        slots.sort();
        for pair in slots.windows(2) {
            if pair[0] == pair[1] {
                return Err(AppError::validation(format!(
                    "Duplicate slot {}",
                    pair[0]
                )));
            }
            if pair[0].next() != Some(pair[1]) {
                return Err(AppError::validation(format!(
                    "Slots {} and {} are not contiguous",
                    pair[0], pair[1]
                )));
            }
        }
        Ok(Self { slots })
    }

    /// A set holding one slot.
    pub fn single(slot: SlotKey) -> Self {
        Self { slots: vec![slot] }
    }

    /// Parse a list of `"HH:MM"` starts.
    pub fn parse(starts: &[impl AsRef<str>]) -> AppResult<Self> {
        let slots = starts
            .iter()
            .map(|s| s.as_ref().parse())
            .collect::<AppResult<Vec<_>>>()?;
        Self::new(slots)
    }

    /// The earliest slot in the set.
    pub fn first(&self) -> SlotKey {
        self.slots[0]
    }

    /// Number of slots (booked hours).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always false; the set is non-empty by construction.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate slots in ascending start order.
    pub fn iter(&self) -> impl Iterator<Item = SlotKey> + '_ {
        self.slots.iter().copied()
    }

    /// Whether the set claims the given slot.
    pub fn contains(&self, slot: SlotKey) -> bool {
        self.slots.binary_search(&slot).is_ok()
    }
}

impl TryFrom<Vec<SlotKey>> for SlotSet {
    type Error = AppError;

    fn try_from(slots: Vec<SlotKey>) -> Result<Self, Self::Error> {
        Self::new(slots)
    }
}

impl From<SlotSet> for Vec<SlotKey> {
    fn from(set: SlotSet) -> Vec<SlotKey> {
        set.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_format() {
        let slot: SlotKey = "10:00".parse().expect("valid slot");
        assert_eq!(slot.hour(), 10);
        assert_eq!(slot.start_hm(), "10:00");
        assert_eq!(slot.end_hm(), "11:00");
        assert_eq!(slot.ledger_key(), "10:00-11:00");
    }

    #[test]
    fn test_last_slot_of_day_wraps_end_label_only() {
        let slot: SlotKey = "23:00".parse().expect("valid slot");
        assert_eq!(slot.ledger_key(), "23:00-00:00");
        assert_eq!(slot.next(), None);
    }

    #[test]
    fn test_off_grid_rejected() {
        assert!("10:30".parse::<SlotKey>().is_err());
        assert!("24:00".parse::<SlotKey>().is_err());
        assert!("ten".parse::<SlotKey>().is_err());
    }

    #[test]
    fn test_slot_set_sorts_input() {
        let set = SlotSet::parse(&["11:00", "10:00", "12:00"]).expect("contiguous");
        assert_eq!(set.first().start_hm(), "10:00");
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_slot_set_rejects_gaps_and_duplicates() {
        assert!(SlotSet::parse(&["10:00", "12:00"]).is_err());
        assert!(SlotSet::parse(&["10:00", "10:00"]).is_err());
        assert!(SlotSet::new(vec![]).is_err());
    }

    #[test]
    fn test_slot_set_rejects_midnight_crossing() {
        // 23:00 has no successor, so 23:00 followed by 00:00 is not contiguous.
        assert!(SlotSet::parse(&["23:00", "00:00"]).is_err());
    }

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2025-10-21").is_ok());
        assert!(parse_date("21/10/2025").is_err());
    }
}
