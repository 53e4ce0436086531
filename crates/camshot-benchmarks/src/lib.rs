//! Latency smoke checks for the capture pipeline.
//!
//! The crate has no runtime API; see `tests/snapshot_smoke.rs`.
