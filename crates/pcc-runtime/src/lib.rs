//! # pcc-runtime
//!
//! The per-request pipeline and the shared state it reads.
//!
//! Each request pins one `Snapshot` (commitment, span store, sketch encoder,
//! bucket directory, PQ index) and runs embed, sketch, retrieve, fetch,
//! certify, generate and verify in that order under a `Budget`. Accepted
//! answers feed the online learner, which publishes new snapshot
//! generations without disturbing requests already in flight.

pub mod answer;
pub mod async_api;
pub mod budget;
pub mod cancellation;
pub mod engine;
pub mod publisher;
pub mod snapshot;
pub mod store;

pub use answer::{Answer, Disposition};
pub use async_api::AsyncPccEngine;
pub use budget::Budget;
pub use cancellation::RequestCancellation;
pub use engine::{PccEngine, PccEngineBuilder};
pub use publisher::SnapshotPublisher;
pub use snapshot::{Snapshot, SnapshotCell};
pub use store::InMemorySpanStore;
