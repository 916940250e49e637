/// Entity primary keys (assets, comments, markers, sessions) are UUIDv7 so they
/// sort by creation time.
pub type EntityId = uuid::Uuid;

/// User ids come from the identity provider and are treated as opaque strings.
pub type UserId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a new time-ordered entity id.
pub fn new_id() -> EntityId {
    uuid::Uuid::now_v7()
}
