//! Domain Layer
//!
//! Ports the library depends on for platform capabilities. Only the event
//! system needs one; futures and streams are consumed directly through the
//! `std::future::Future` and `futures::Stream` traits.

pub mod ports;

pub use ports::{EventTarget, Listener, ListenerId};
