//! Calendar data model: slots, days, and the whole document.
//!
//! A day is an ordered list of [`Slot`]s. Order is preserved exactly as it
//! appears in the backing document and carries no scheduling meaning; it is
//! never sorted by hour.
//!
//! Within one day each hour string appears in exactly one slot. The engine
//! keeps that true by only ever turning an existing free slot into a booked
//! one and back, never inventing hours.

use serde::Serialize;

// ── Slot ────────────────────────────────────────────────────────────────────

/// One hour-long unit of a day, either free or booked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// A free hour, identified only by its `"HH:MM"` string.
    Free(String),
    /// A booked hour and the attendee holding it.
    Booked { hour: String, attendee: String },
}

impl Slot {
    pub fn free(hour: impl Into<String>) -> Self {
        Slot::Free(hour.into())
    }

    pub fn booked(hour: impl Into<String>, attendee: impl Into<String>) -> Self {
        Slot::Booked {
            hour: hour.into(),
            attendee: attendee.into(),
        }
    }

    /// The hour this slot occupies, regardless of state.
    pub fn hour(&self) -> &str {
        match self {
            Slot::Free(hour) => hour,
            Slot::Booked { hour, .. } => hour,
        }
    }

    pub fn attendee(&self) -> Option<&str> {
        match self {
            Slot::Free(_) => None,
            Slot::Booked { attendee, .. } => Some(attendee),
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self, Slot::Free(_))
    }
}

/// The ordered slot list of one day.
pub type DaySlots = Vec<Slot>;

// ── Listings ────────────────────────────────────────────────────────────────

/// The booked projection of a slot. Field order (hour, then attendee) is
/// also the serialized order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookedSlot {
    pub hour: String,
    pub attendee: String,
}

/// A day split into its free and booked projections.
///
/// Relative order inside each projection follows the day's slot order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SlotListing {
    pub free: Vec<String>,
    pub booked: Vec<BookedSlot>,
}

/// A listing with attendee names removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RedactedListing {
    pub free: Vec<String>,
    /// Hours that are taken, without saying by whom.
    pub busy: Vec<String>,
}

impl SlotListing {
    /// Drops attendee names, keeping only which hours are taken.
    pub fn redacted(&self) -> RedactedListing {
        RedactedListing {
            free: self.free.clone(),
            busy: self.booked.iter().map(|b| b.hour.clone()).collect(),
        }
    }
}

// ── CalendarDocument ────────────────────────────────────────────────────────

/// Mapping from ISO date key (`"2025-03-12"`) to that day's slots.
///
/// Days keep insertion order so a load/save cycle reproduces the document
/// layout without re-sorting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarDocument {
    days: Vec<(String, DaySlots)>,
}

impl CalendarDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn day(&self, date: &str) -> Option<&DaySlots> {
        self.days.iter().find(|(d, _)| d == date).map(|(_, s)| s)
    }

    pub fn day_mut(&mut self, date: &str) -> Option<&mut DaySlots> {
        self.days
            .iter_mut()
            .find(|(d, _)| d == date)
            .map(|(_, s)| s)
    }

    /// Returns the day's slots, appending an empty day at the end if absent.
    pub fn day_mut_or_insert(&mut self, date: &str) -> &mut DaySlots {
        let index = match self.days.iter().position(|(d, _)| d == date) {
            Some(index) => index,
            None => {
                self.days.push((date.to_string(), Vec::new()));
                self.days.len() - 1
            }
        };
        &mut self.days[index].1
    }

    /// Sets a day's slots. An existing day is replaced in place and its
    /// previous slots returned; a new day is appended.
    pub fn insert_day(&mut self, date: impl Into<String>, slots: DaySlots) -> Option<DaySlots> {
        let date = date.into();
        match self.day_mut(&date) {
            Some(existing) => Some(std::mem::replace(existing, slots)),
            None => {
                self.days.push((date, slots));
                None
            }
        }
    }

    /// Date keys in document order.
    pub fn dates(&self) -> impl Iterator<Item = &str> {
        self.days.iter().map(|(d, _)| d.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DaySlots)> {
        self.days.iter().map(|(d, s)| (d.as_str(), s))
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
