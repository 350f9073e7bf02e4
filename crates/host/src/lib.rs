#![deny(unsafe_code)]
//! Host side of the flowtrail worker.
//!
//! [`protocol`] defines the `update` / tick / `iterate` messages and
//! [`worker::Worker`] owns an engine and processes those messages one at a
//! time. For headless use, [`source`] bakes procedural fields, [`run`]
//! replays a [`RunSpec`](flowtrail_core::RunSpec), and [`pixel`] /
//! `snapshot` turn emitted frames into images.

pub mod pixel;
pub mod protocol;
pub mod run;
#[cfg(feature = "png")]
pub mod snapshot;
pub mod source;
pub mod worker;

pub use protocol::{Inbound, Outbound, Update};
pub use run::{replay, RunReport};
pub use source::FieldKind;
pub use worker::Worker;
