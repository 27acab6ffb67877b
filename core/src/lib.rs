pub mod agents;
pub mod audit;
pub mod auth;
pub mod campaigns;
pub mod contracts;
pub mod dashboard;
pub mod decisions;
pub mod drip;
pub mod error;
pub mod leads;
pub mod time_entries;
pub mod users;
pub mod validation;

/// Server-assigned identifier: a UUIDv7 rendered as text, so ids sort by
/// creation time.
pub fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}
