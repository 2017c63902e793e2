//! Card limit module: three-layer architecture (domain, repository, service).
//!
//! The four tool operations live on [`CardLimitsService`]; persistence goes
//! through [`repository::CardLimitsRepository`].

pub mod domain;
pub mod repository;
pub mod service;

pub use domain::{CurrentLimits, LimitChange, PaymentInstruments, TemporaryLimitCreation};
pub use service::{attach_limits, CardLimitsService};
