//! Domain models and DTOs shared by the pipeline and its collaborators.

pub mod appointment;
pub mod company;
pub mod filter;
pub mod metrics;
pub mod pagination;
pub mod user;
