//! Storage is organized through [record_store::RecordStore] on top of a
//! [kv_store::KeyValueStore]. The basic idea is:
//!  - The medium is a flat string to string map with no ordering.
//!  - Every (week, representative) pair gets one JSON blob under a key built by [week_key].
//!  - Goals, roster and logo live under their own reserved keys.

pub mod entities;
pub mod kv_store;
pub mod record_store;
pub mod week_key;
