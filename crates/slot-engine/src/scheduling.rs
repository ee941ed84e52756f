//! Scheduling operations over the calendar store.
//!
//! Every operation is one bounded read-modify-write: load the whole
//! document, apply the change to one day, save the whole document. A failure
//! before the save leaves the backing file untouched.
//!
//! # Operations
//!
//! - [`Scheduler::list_slots`] — free hours and bookings for a day
//! - [`Scheduler::book_slot`] — turn a free hour into a booking
//! - [`Scheduler::cancel_slot`] — free the single booking matching the criteria
//!
//! # Concurrency
//!
//! A [`Scheduler`] serializes its own operations behind one mutex, so it can
//! be shared across threads. Other processes writing the same file are not
//! coordinated with and may lose updates.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use crate::error::{Result, SlotError};
use crate::slot::{Slot, SlotListing};
use crate::store::{classify_day, CalendarStore};

/// The day [`Scheduler::list_slots`] shows when no date is given: the day
/// after `anchor`, as `YYYY-MM-DD`.
pub fn default_list_date(anchor: DateTime<Utc>) -> String {
    (anchor.date_naive() + Duration::days(1))
        .format("%Y-%m-%d")
        .to_string()
}

/// Entry points for listing, booking and cancelling slots.
#[derive(Debug)]
pub struct Scheduler {
    store: CalendarStore,
    lock: Mutex<()>,
}

impl Scheduler {
    pub fn new(store: CalendarStore) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &CalendarStore {
        &self.store
    }

    /// List the free and booked slots of a day.
    ///
    /// Defaults to tomorrow (UTC), computed from the clock on every call. A
    /// day missing from the document lists as empty.
    ///
    /// Booked entries carry attendee names; see [`SlotListing::redacted`]
    /// for a view without them.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError::Parse`] or a storage error if the document
    /// cannot be read.
    pub fn list_slots(&self, date: Option<&str>) -> Result<SlotListing> {
        self.list_slots_at(date, Utc::now())
    }

    /// Like [`list_slots`](Self::list_slots) with an explicit "now" anchor
    /// for the default date.
    pub fn list_slots_at(&self, date: Option<&str>, anchor: DateTime<Utc>) -> Result<SlotListing> {
        let date = match date {
            Some(date) => date.to_string(),
            None => default_list_date(anchor),
        };

        let _guard = self.lock.lock();
        let doc = self.store.load()?;
        let listing = doc
            .day(&date)
            .map(|day| classify_day(day))
            .unwrap_or_default();

        tracing::debug!(
            date = %date,
            free = listing.free.len(),
            booked = listing.booked.len(),
            "listed slots"
        );
        Ok(listing)
    }

    /// Book `hour` on `date` for `attendee`.
    ///
    /// The hour must currently be listed as free on that day. The free entry
    /// is replaced in place by the booking, so the day's slot order does not
    /// change.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError::InvalidArgument`] if `attendee` is blank,
    /// [`SlotError::SlotUnavailable`] if the hour is not free (already booked
    /// or never listed), or a parse/storage error from the store. Nothing is
    /// written on error.
    pub fn book_slot(&self, date: &str, hour: &str, attendee: &str) -> Result<String> {
        if attendee.trim().is_empty() {
            return Err(SlotError::InvalidArgument(
                "attendee must not be empty".to_string(),
            ));
        }

        let _guard = self.lock.lock();
        let mut doc = self.store.load()?;

        let position = doc
            .day(date)
            .and_then(|day| day.iter().position(|slot| matches!(slot, Slot::Free(h) if h == hour)));
        let Some(index) = position else {
            tracing::warn!(date = %date, hour = %hour, "slot unavailable");
            return Err(SlotError::SlotUnavailable {
                date: date.to_string(),
                hour: hour.to_string(),
            });
        };

        doc.day_mut_or_insert(date)[index] = Slot::booked(hour, attendee);
        self.store.save(&doc)?;

        tracing::info!(date = %date, hour = %hour, "booked slot");
        Ok(format!("Booked {hour} on {date} for {attendee}"))
    }

    /// Cancel the one booking on `date` matching the given criteria.
    ///
    /// A booking matches when `hour` is `None` or equal to its hour, and
    /// `attendee` is `None` or equal to its attendee ignoring case. With
    /// exactly one match, the booking is removed and its hour appended to
    /// the day as free.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError::AmbiguousCancellation`] when zero or several
    /// bookings match, including when the day does not exist; the caller
    /// should ask for more specific criteria. Parse/storage errors come from
    /// the store. Nothing is written on error.
    pub fn cancel_slot(
        &self,
        date: &str,
        hour: Option<&str>,
        attendee: Option<&str>,
    ) -> Result<String> {
        let _guard = self.lock.lock();
        let mut doc = self.store.load()?;

        let wanted_attendee = attendee.map(str::to_lowercase);
        let matches: Vec<usize> = doc
            .day(date)
            .map(|day| {
                day.iter()
                    .enumerate()
                    .filter(|(_, slot)| match slot {
                        Slot::Free(_) => false,
                        Slot::Booked {
                            hour: booked_hour,
                            attendee: booked_attendee,
                        } => {
                            hour.map_or(true, |h| h == booked_hour)
                                && wanted_attendee
                                    .as_deref()
                                    .map_or(true, |a| a == booked_attendee.to_lowercase())
                        }
                    })
                    .map(|(index, _)| index)
                    .collect()
            })
            .unwrap_or_default();

        let [index] = matches[..] else {
            tracing::warn!(date = %date, matches = matches.len(), "ambiguous cancellation");
            return Err(SlotError::AmbiguousCancellation {
                date: date.to_string(),
                matches: matches.len(),
            });
        };

        let day = doc.day_mut_or_insert(date);
        let freed = day.remove(index).hour().to_string();
        day.push(Slot::Free(freed.clone()));
        self.store.save(&doc)?;

        tracing::info!(date = %date, hour = %freed, "cancelled booking");
        Ok(format!("Cancelled {freed} on {date}"))
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
