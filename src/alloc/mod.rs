//! Allocation boundary shared by every growable container in the crate.
//!
//! Growth never goes through the infallible `Vec` paths directly: it asks an
//! [`AllocPolicy`] to reserve the memory, which retries failed reservations
//! after a fixed backoff. The default policy never gives up, so an exhausted
//! machine stalls the caller instead of failing. Bounded policies turn the
//! same situation into an [`AllocError`].

mod policy;

pub use policy::*;
