//! Service layer for the card limit tools.
//! - Keeps business rules independent of the transport.
//! - Reuses the document types from the `models` crate.
//! - Reports environment faults through `ServiceError`.

pub mod errors;
pub mod runtime;
pub mod storage;
pub mod card_limits;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
