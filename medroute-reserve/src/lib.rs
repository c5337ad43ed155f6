//! Reservation coordination for medroute.
//!
//! [`SubscriberRegistry`] tracks connected sessions and the facility rooms
//! operators join. [`ReservationCoordinator`] runs the two booking protocols
//! on top of it:
//!
//! - instant booking claims a unit straight away and notifies everyone;
//! - mediated booking forwards the request to the facility's operators and
//!   claims only when one of them approves.
//!
//! Both rely on the store's conditional decrement for correctness under
//! concurrency, so two requesters racing for the last unit can never both
//! be granted.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod coordinator;
mod error;
mod registry;

pub use coordinator::ReservationCoordinator;
pub use error::ReservationError;
pub use registry::{SubscriberRegistry, Subscription};

#[cfg(test)]
mod tests;
