//! Actor Model: Message-passing pipeline that applies list updates.
//!
//! This module implements the update pipeline with crossbeam channels:
//! - **Mailbox**: Single-slot conflated channel, newest request wins
//! - **Serializer Actor**: Takes one request at a time, owns the displayed state
//! - **Diff Worker**: Computes edit scripts off the serializer thread
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   Request (latest wins)   ┌──────────────────┐
//! │  Producers   │ ────────────────────────▶ │                  │
//! └──────────────┘                           │ Serializer Thread│
//!                                            │  (StateStore)    │
//! ┌──────────────┐   old + new sequence      │                  │
//! │ Diff Worker  │ ◀──────────────────────── │                  │
//! │              │ ────────────────────────▶ │                  │
//! └──────────────┘       EditScript          └──────────────────┘
//!                                                     │
//!                                                     │ EditOp
//!                                                     ▼
//!                                            ┌──────────────────┐
//!                                            │     Display      │
//!                                            └──────────────────┘
//! ```

mod cancel;
mod differ;
mod mailbox;
mod messages;
mod serializer;
mod stats;
mod store;
mod worker;

pub use cancel::CancelToken;
pub use differ::{AsyncListDiffer, DifferBuilder, DifferConfig};
pub use messages::Request;
pub use stats::DifferStats;
pub use store::CurrentListListener;
