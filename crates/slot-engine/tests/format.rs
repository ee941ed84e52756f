use std::fs;

use slot_engine::{CalendarStore, Scheduler, Slot};

const CANONICAL: &str = "\
'2025-06-01':
- '09:00'
- '10:00': 'Alice'
- '9:30'
- '11:00': 'yes'
'2025-06-02': []
'2025-05-30':
- '14:00': 'Conan O''Brien'
";

/// What `yaml.safe_dump(doc, sort_keys=False)` writes: ambiguous scalars
/// quoted, plain names left bare.
const SAFE_DUMP: &str = "\
'2025-06-01':
- '09:00'
- '10:00': Alice
- '9:30'
- '11:00': 'yes'
'2025-06-02': []
'2025-05-30':
- '14:00': Conan O'Brien
";

fn store_with(text: &str) -> (tempfile::TempDir, CalendarStore) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calendar.yml");
    fs::write(&path, text).unwrap();
    (dir, CalendarStore::new(path))
}

#[test]
fn canonical_text_survives_load_and_save_byte_for_byte() {
    let (_dir, store) = store_with(CANONICAL);
    let doc = store.load().unwrap();
    store.save(&doc).unwrap();
    assert_eq!(fs::read_to_string(store.path()).unwrap(), CANONICAL);
}

#[test]
fn safe_dump_text_loads_and_saves_in_canonical_form() {
    let (_dir, store) = store_with(SAFE_DUMP);
    let doc = store.load().unwrap();

    assert_eq!(
        doc.day("2025-06-01").unwrap(),
        &vec![
            Slot::free("09:00"),
            Slot::booked("10:00", "Alice"),
            Slot::free("9:30"),
            Slot::booked("11:00", "yes"),
        ]
    );
    assert_eq!(
        doc.day("2025-05-30").unwrap(),
        &vec![Slot::booked("14:00", "Conan O'Brien")]
    );

    store.save(&doc).unwrap();
    assert_eq!(fs::read_to_string(store.path()).unwrap(), CANONICAL);
}

#[test]
fn booking_writes_quoted_hour_and_attendee() {
    let (_dir, store) = store_with("'2025-06-01':\n- '10:00'\n- '11:00'\n");
    let scheduler = Scheduler::new(store);

    scheduler.book_slot("2025-06-01", "10:00", "no").unwrap();

    assert_eq!(
        fs::read_to_string(scheduler.store().path()).unwrap(),
        "'2025-06-01':\n- '10:00': 'no'\n- '11:00'\n"
    );
}
