//! RA-DNS-Check: RIPE Atlas DNS measurement comparison
//!
//! A library for comparing DNS-over-anycast measurement results from
//! RIPE Atlas, surfacing per-probe latency deltas and POP changes.

pub mod atlas;
pub mod compare;
pub mod config;
pub mod measurement;
pub mod probes;
pub mod report;
pub mod time;
