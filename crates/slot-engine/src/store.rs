//! Durable, schema-normalized access to the calendar document.
//!
//! The backing file is YAML shaped as:
//!
//! ```yaml
//! '2025-03-12':
//! - '09:00'            # free hour
//! - '10:00': 'Alice'   # booked hour
//! ```
//!
//! Every top-level key is coerced to a plain `YYYY-MM-DD` string on load and
//! again on save, so a key written as a native date or timestamp never
//! survives a round-trip in that form.
//!
//! Writes go to a temporary file in the same directory which then replaces
//! the document, so a crash mid-write leaves the previous version intact.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_yaml::Value;
use tempfile::NamedTempFile;

use crate::error::{Result, SlotError};
use crate::slot::{BookedSlot, CalendarDocument, DaySlots, Slot, SlotListing};

/// Documented location of the backing document when the caller has no
/// better path.
pub const DEFAULT_CALENDAR_PATH: &str = "calendar.yml";

const NAIVE_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

// ── CalendarStore ───────────────────────────────────────────────────────────

/// File-backed calendar document.
///
/// Holds no cached state: every [`load`](Self::load) reads the file and every
/// [`save`](Self::save) rewrites it whole.
#[derive(Debug, Clone)]
pub struct CalendarStore {
    path: PathBuf,
}

impl Default for CalendarStore {
    fn default() -> Self {
        Self::new(DEFAULT_CALENDAR_PATH)
    }
}

impl CalendarStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole document.
    ///
    /// A missing file is an empty calendar, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError::Parse`] if the file is not UTF-8 text or not a
    /// mapping of date keys to slot lists, or [`SlotError::Io`] if it exists but cannot be read.
    pub fn load(&self) -> Result<CalendarDocument> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "calendar document absent, using empty calendar");
                return Ok(CalendarDocument::new());
            }
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                return Err(SlotError::Parse(format!(
                    "'{}' is not valid UTF-8 text",
                    self.path.display()
                )));
            }
            Err(e) => return Err(SlotError::io(&self.path, e)),
        };

        let doc = parse_document(&text)?;
        tracing::debug!(path = %self.path.display(), days = doc.len(), "loaded calendar document");
        Ok(doc)
    }

    /// Write the whole document, replacing the previous version atomically.
    ///
    /// Keys are re-normalized first; day order and slot order are kept as
    /// given.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError::Parse`] if two keys normalize to the same day, or
    /// [`SlotError::Io`] if
    /// the temporary file cannot be written or moved into place.
    pub fn save(&self, doc: &CalendarDocument) -> Result<()> {
        let text = render_document(doc)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| SlotError::io(dir, e))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| SlotError::io(dir, e))?;
        tmp.write_all(text.as_bytes())
            .map_err(|e| SlotError::io(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| SlotError::io(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| SlotError::io(&self.path, e.error))?;

        tracing::debug!(path = %self.path.display(), days = doc.len(), "saved calendar document");
        Ok(())
    }
}

// ── Classification ──────────────────────────────────────────────────────────

/// Split a day into its free hours and its bookings, each in slot order.
pub fn classify_day(day: &[Slot]) -> SlotListing {
    let mut listing = SlotListing::default();
    for slot in day {
        match slot {
            Slot::Free(hour) => listing.free.push(hour.clone()),
            Slot::Booked { hour, attendee } => listing.booked.push(BookedSlot {
                hour: hour.clone(),
                attendee: attendee.clone(),
            }),
        }
    }
    listing
}

// ── Decoding ────────────────────────────────────────────────────────────────

/// Parse YAML text into a normalized [`CalendarDocument`].
///
/// Empty text and a bare `null` document are an empty calendar.
///
/// # Errors
///
/// Returns [`SlotError::Parse`] for invalid YAML, a non-mapping top level,
/// an unusable key, two keys naming the same day, or a day that is not a
/// list of slots.
pub fn parse_document(text: &str) -> Result<CalendarDocument> {
    if text.trim().is_empty() {
        return Ok(CalendarDocument::new());
    }

    let value: Value = serde_yaml::from_str(text)
        .map_err(|e| SlotError::Parse(format!("invalid YAML: {e}")))?;

    let mapping = match value {
        Value::Null => return Ok(CalendarDocument::new()),
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(SlotError::Parse(format!(
                "top level must be a mapping of dates to slot lists, found {}",
                value_kind(&other)
            )));
        }
    };

    let mut doc = CalendarDocument::new();
    for (raw_key, raw_day) in &mapping {
        let date = normalize_day_key(raw_key)?;
        if doc.day(&date).is_some() {
            return Err(SlotError::Parse(format!(
                "duplicate day '{date}' after key normalization"
            )));
        }
        let slots = parse_day(&date, raw_day)?;
        doc.insert_day(date, slots);
    }
    Ok(doc)
}

fn parse_day(date: &str, value: &Value) -> Result<DaySlots> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| parse_slot(date, index, item))
            .collect(),
        other => Err(SlotError::Parse(format!(
            "day '{date}' must be a list of slots, found {}",
            value_kind(other)
        ))),
    }
}

fn parse_slot(date: &str, index: usize, value: &Value) -> Result<Slot> {
    match value {
        Value::String(hour) => Ok(Slot::Free(hour.clone())),
        Value::Mapping(entry) if entry.len() == 1 => {
            let (raw_hour, raw_attendee) = entry
                .iter()
                .next()
                .ok_or_else(|| SlotError::Parse(format!("day '{date}' slot {index} is empty")))?;
            match (raw_hour, raw_attendee) {
                (Value::String(hour), Value::String(attendee)) => {
                    Ok(Slot::booked(hour.clone(), attendee.clone()))
                }
                _ => Err(SlotError::Parse(format!(
                    "day '{date}' slot {index}: booking must map an hour string to an attendee string"
                ))),
            }
        }
        other => Err(SlotError::Parse(format!(
            "day '{date}' slot {index} must be an hour string or a single-entry mapping, found {}",
            value_kind(other)
        ))),
    }
}

// ── Key normalization ───────────────────────────────────────────────────────

/// Coerce a raw top-level key into its day-key string.
///
/// - date strings → canonical `YYYY-MM-DD` (`"2025-3-7"` → `"2025-03-07"`)
/// - timestamps (`2025-03-12T10:00:00Z`, `2025-03-12 10:00:00`) → their date
/// - tagged values (`!!timestamp 2025-03-12`) → the inner value, normalized
/// - numbers and booleans → their display form
/// - any other string → unchanged
///
/// # Errors
///
/// Returns [`SlotError::Parse`] for null, sequence and mapping keys.
pub fn normalize_day_key(key: &Value) -> Result<String> {
    match key {
        Value::String(s) => Ok(normalize_date_string(s)),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Tagged(tagged) => normalize_day_key(&tagged.value),
        other => Err(SlotError::Parse(format!(
            "day key must be a date or string, found {}",
            value_kind(other)
        ))),
    }
}

/// Normalize a string key: anything that reads as a date or timestamp
/// becomes `YYYY-MM-DD`, everything else is returned as is.
pub fn normalize_date_string(s: &str) -> String {
    parse_key_date(s.trim())
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| s.to_string())
}

fn parse_key_date(s: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

// ── Encoding ────────────────────────────────────────────────────────────────

/// Render a document as YAML, re-normalizing keys.
///
/// Output is block style with every date, hour and attendee quoted, so
/// YAML 1.1 readers cannot resolve `10:00` as a sexagesimal integer, `yes`
/// as a boolean or a date key as a native date:
///
/// ```yaml
/// '2025-06-01':
/// - '09:00'
/// - '10:00': 'Alice'
/// '2025-06-02': []
/// ```
///
/// # Errors
///
/// Returns [`SlotError::Parse`] if two keys normalize to the same day.
pub fn render_document(doc: &CalendarDocument) -> Result<String> {
    if doc.is_empty() {
        return Ok("{}\n".to_string());
    }

    let mut seen: Vec<String> = Vec::with_capacity(doc.len());
    let mut out = String::new();
    for (date, slots) in doc.iter() {
        let date = normalize_date_string(date);
        if seen.contains(&date) {
            return Err(SlotError::Parse(format!(
                "duplicate day '{date}' after key normalization"
            )));
        }

        out.push_str(&quote_scalar(&date));
        if slots.is_empty() {
            out.push_str(": []\n");
        } else {
            out.push_str(":\n");
            for slot in slots {
                match slot {
                    Slot::Free(hour) => {
                        out.push_str("- ");
                        out.push_str(&quote_scalar(hour));
                    }
                    Slot::Booked { hour, attendee } => {
                        out.push_str("- ");
                        out.push_str(&quote_scalar(hour));
                        out.push_str(": ");
                        out.push_str(&quote_scalar(attendee));
                    }
                }
                out.push('\n');
            }
        }
        seen.push(date);
    }
    Ok(out)
}

/// Quote a scalar so every YAML reader sees a string.
///
/// Single-quoted with `'` doubled, like `yaml.safe_dump`; double-quoted
/// with escapes when the text holds control characters, which single
/// quotes cannot carry verbatim.
fn quote_scalar(s: &str) -> String {
    if !s.chars().any(needs_escape) {
        return format!("'{}'", s.replace('\'', "''"));
    }

    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if needs_escape(c) => quoted.push_str(&format!("\\u{:04X}", c as u32)),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

// U+2028/U+2029 are line breaks to YAML 1.1 and get folded inside quotes.
fn needs_escape(c: char) -> bool {
    c.is_control() || matches!(c, '\u{2028}' | '\u{2029}' | '\u{FEFF}')
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
