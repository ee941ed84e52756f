use std::fs;
use std::sync::Arc;
use std::thread;

use slot_engine::{
    CalendarStore, ErrorKind, Scheduler, Slot, SlotError, SlotListing, DEFAULT_CALENDAR_PATH,
};
use tempfile::TempDir;

fn scheduler_from_yaml(yaml: &str) -> (TempDir, Scheduler) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calendar.yml");
    fs::write(&path, yaml).unwrap();
    (dir, Scheduler::new(CalendarStore::new(path)))
}

#[test]
fn empty_store_never_fabricates_slots() {
    let dir = tempfile::tempdir().unwrap();
    let scheduler = Scheduler::new(CalendarStore::new(dir.path().join("calendar.yml")));

    let listing = scheduler.list_slots(Some("2025-06-01")).unwrap();
    assert_eq!(listing, SlotListing::default());

    let err = scheduler.book_slot("2025-06-01", "09:00", "Bob").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SlotUnavailable);
    assert!(!dir.path().join("calendar.yml").exists());
}

#[test]
fn ambiguous_then_unique_cancellation_by_attendee() {
    let (_dir, scheduler) = scheduler_from_yaml(
        "2025-06-01:\n  - \"10:00\": Alice\n  - \"14:00\": Alice\n  - \"16:00\"\n",
    );
    let err = scheduler
        .cancel_slot("2025-06-01", None, Some("Alice"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AmbiguousCancellation);

    let (_dir, scheduler) = scheduler_from_yaml("2025-06-01:\n  - \"10:00\": Alice\n");
    let message = scheduler
        .cancel_slot("2025-06-01", None, Some("Alice"))
        .unwrap();
    assert_eq!(message, "Cancelled 10:00 on 2025-06-01");
    assert_eq!(
        scheduler.list_slots(Some("2025-06-01")).unwrap().free,
        vec!["10:00"]
    );
}

#[test]
fn lowercase_attendee_cancels_capitalized_booking() {
    let (_dir, scheduler) = scheduler_from_yaml("2025-06-01:\n  - \"10:00\": Alice\n");
    scheduler
        .cancel_slot("2025-06-01", None, Some("alice"))
        .unwrap();
    assert!(scheduler
        .list_slots(Some("2025-06-01"))
        .unwrap()
        .booked
        .is_empty());
}

#[test]
fn hand_written_document_with_mixed_key_styles() {
    let (_dir, scheduler) = scheduler_from_yaml(
        "'2025-03-12':\n- '09:00'\n- '10:00': Alice\n2025-3-13:\n- '11:00'\n2025-03-14T00:00:00Z:\n- '12:00'\n",
    );

    scheduler.book_slot("2025-03-13", "11:00", "Bob").unwrap();

    let doc = scheduler.store().load().unwrap();
    assert_eq!(
        doc.dates().collect::<Vec<_>>(),
        vec!["2025-03-12", "2025-03-13", "2025-03-14"]
    );
    assert_eq!(
        doc.day("2025-03-13").unwrap(),
        &vec![Slot::booked("11:00", "Bob")]
    );

    let text = fs::read_to_string(scheduler.store().path()).unwrap();
    assert!(!text.contains("2025-3-13"));
    assert!(!text.contains("T00:00:00Z"));
}

#[test]
fn malformed_document_aborts_without_writing() {
    let yaml = "2025-06-01:\n  - \"09:00\"\n  - [\"10:00\", Alice]\n";
    let (_dir, scheduler) = scheduler_from_yaml(yaml);

    let err = scheduler.book_slot("2025-06-01", "09:00", "Bob").unwrap_err();
    assert!(matches!(err, SlotError::Parse(_)));
    assert_eq!(fs::read_to_string(scheduler.store().path()).unwrap(), yaml);

    let err = scheduler.list_slots(Some("2025-06-01")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[test]
fn other_days_survive_a_mutation_untouched() {
    let (_dir, scheduler) = scheduler_from_yaml(
        "2025-06-02:\n  - \"15:00\": Dana\n  - \"08:00\"\n2025-06-01:\n  - \"09:00\"\n",
    );

    scheduler.book_slot("2025-06-01", "09:00", "Eve").unwrap();

    let doc = scheduler.store().load().unwrap();
    assert_eq!(
        doc.dates().collect::<Vec<_>>(),
        vec!["2025-06-02", "2025-06-01"]
    );
    assert_eq!(
        doc.day("2025-06-02").unwrap(),
        &vec![Slot::booked("15:00", "Dana"), Slot::free("08:00")]
    );
}

#[test]
fn concurrent_bookings_through_one_scheduler_are_all_kept() {
    let hours: Vec<String> = (8..18).map(|h| format!("{h:02}:00")).collect();
    let yaml = format!(
        "2025-06-01:\n{}",
        hours
            .iter()
            .map(|h| format!("  - \"{h}\"\n"))
            .collect::<String>()
    );
    let (_dir, scheduler) = scheduler_from_yaml(&yaml);
    let scheduler = Arc::new(scheduler);

    let handles: Vec<_> = hours
        .iter()
        .cloned()
        .enumerate()
        .map(|(i, hour)| {
            let scheduler = Arc::clone(&scheduler);
            thread::spawn(move || {
                scheduler
                    .book_slot("2025-06-01", &hour, &format!("Guest {i}"))
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let listing = scheduler.list_slots(Some("2025-06-01")).unwrap();
    assert!(listing.free.is_empty());
    assert_eq!(listing.booked.len(), hours.len());
    let booked_hours: Vec<&str> = listing.booked.iter().map(|b| b.hour.as_str()).collect();
    assert_eq!(booked_hours, hours.iter().map(String::as_str).collect::<Vec<_>>());
}

#[test]
fn default_store_points_at_documented_path() {
    let store = CalendarStore::default();
    assert_eq!(store.path(), std::path::Path::new(DEFAULT_CALENDAR_PATH));
}
