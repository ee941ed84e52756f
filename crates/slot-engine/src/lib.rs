//! # slot-engine
//!
//! Single-resource appointment calendar persisted as a YAML document.
//!
//! Each day is an ordered list of hour slots, either free (`"09:00"`) or
//! booked (`{"10:00": "Alice"}`). Three operations sit on top: list a day,
//! book a free hour, and cancel a booking from possibly incomplete criteria.
//! Failures are typed so a calling agent can react to the kind of failure
//! (re-prompt on ambiguity, offer another hour when unavailable) instead of
//! parsing messages.
//!
//! ## Modules
//!
//! - [`slot`] — Slot, day and document types
//! - [`store`] — Load, normalize and atomically save the YAML document
//! - [`scheduling`] — `list_slots`, `book_slot`, `cancel_slot`
//! - [`error`] — Error types
//!
//! ## Example
//!
//! ```no_run
//! use slot_engine::{CalendarStore, Scheduler};
//!
//! let scheduler = Scheduler::new(CalendarStore::new("calendar.yml"));
//! let listing = scheduler.list_slots(Some("2025-06-01")).unwrap();
//! if let Some(hour) = listing.free.first() {
//!     scheduler.book_slot("2025-06-01", hour, "Alice").unwrap();
//! }
//! ```

pub mod error;
pub mod scheduling;
pub mod slot;
pub mod store;

pub use error::{ErrorKind, SlotError};
pub use scheduling::{default_list_date, Scheduler};
pub use slot::{BookedSlot, CalendarDocument, DaySlots, RedactedListing, Slot, SlotListing};
pub use store::{
    classify_day, normalize_date_string, normalize_day_key, parse_document, render_document,
    CalendarStore, DEFAULT_CALENDAR_PATH,
};
