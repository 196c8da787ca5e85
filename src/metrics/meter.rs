// Metric names and recording helpers for key-value operations.

pub const TOTAL: &str = "kv_requests_total";
pub const STORED: &str = "kv_stored_total";
pub const STORE_CONFLICTS: &str = "kv_store_conflicts_total";
pub const HITS: &str = "kv_hits_total";
pub const MISSES: &str = "kv_misses_total";
pub const DELETED: &str = "kv_deleted_total";
pub const ERRORED: &str = "kv_errors_total";
pub const PANICKED: &str = "kv_panics_total";
pub const ENTRIES: &str = "kv_entries";

/// Adds total requests.
pub fn add_total(value: u64) {
    metrics::counter!(TOTAL).increment(value);
}

/// Adds successful stores.
pub fn add_stored(value: u64) {
    metrics::counter!(STORED).increment(value);
}

/// Adds stores rejected because the key already existed.
pub fn add_store_conflicts(value: u64) {
    metrics::counter!(STORE_CONFLICTS).increment(value);
}

/// Adds lookup hits.
pub fn add_hits(value: u64) {
    metrics::counter!(HITS).increment(value);
}

/// Adds lookup misses.
pub fn add_misses(value: u64) {
    metrics::counter!(MISSES).increment(value);
}

/// Adds successful deletes.
pub fn add_deleted(value: u64) {
    metrics::counter!(DELETED).increment(value);
}

/// Adds internal errors (hash failures, undecodable bodies).
pub fn add_errors(value: u64) {
    metrics::counter!(ERRORED).increment(value);
}

/// Adds recovered panics.
pub fn add_panics(value: u64) {
    metrics::counter!(PANICKED).increment(value);
}

/// Sets the number of stored entries.
pub fn set_entries(count: usize) {
    metrics::gauge!(ENTRIES).set(count as f64);
}
