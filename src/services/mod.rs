//! Business logic services.

pub mod auth;
pub mod breakdown;
pub mod clock;
pub mod companies;
pub mod controller;
pub mod fingerprint;
pub mod metrics;
pub mod normalize;
pub mod pg_source;
pub mod pipeline;
pub mod record_filter;
pub mod retry;
pub mod roster;
pub mod scope;
pub mod source;
pub mod table;
pub mod timeseries;
