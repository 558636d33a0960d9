/// Record identifiers are opaque strings. New records get UUID v7 keys;
/// legacy records keep the numeric timestamp strings they were saved with.
pub type RecordId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a fresh, time-ordered record id.
pub fn new_record_id() -> RecordId {
    uuid::Uuid::now_v7().to_string()
}
