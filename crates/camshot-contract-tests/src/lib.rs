//! Contract checks for the `/capturar` wire format.
//!
//! The crate has no runtime API; see `tests/contract_validation.rs`, which
//! validates the fixtures under `contracts/` and bodies produced by
//! `camshot-core` against the frozen JSON schemas.
