//! pushstream - Cold, push-based Observables
//!
//! A lazy, subscribable value producer with transformation (`map`),
//! flattening (`merge_map`) and construction from common sources: in-memory
//! sequences, futures, sync and async generators, and event targets.
//!
//! # Architecture
//!
//! Everything is layered on a single subscribe contract:
//!
//! ```text
//! Sources (from_vec, from_future, from_stream, from_event)
//!     → Observable<T> ── operators (map, try_map, merge_map) ──▶ Observable<U>
//!         → subscribe(Observer) → Subscription
//! ```
//!
//! # Example
//!
//! ```
//! use pushstream::{Observable, Recorder};
//!
//! let recorder = Recorder::new();
//! Observable::from_vec(vec![1, 2, 3])
//!     .merge_map(|n| Observable::from_vec(vec![n; n]))
//!     .map(|n| n * 10)
//!     .subscribe(recorder.observer());
//!
//! assert_eq!(recorder.values(), vec![10, 20, 20, 30, 30, 30]);
//! assert!(recorder.is_complete());
//! ```
//!
//! # Modules
//!
//! - [`adapters`] - In-process implementations of the domain ports
//! - [`domain`] - Ports for platform capabilities (event targets)
//! - [`error`] - Error types
//! - [`observable`] - Observable core, observers and subscriptions
//! - [`operators`] - `map`, `try_map`, `merge_map`
//! - [`sources`] - Factories building observables from common sources

pub mod adapters;
pub mod domain;
pub mod error;
pub mod observable;
pub mod operators;
pub mod sources;

// Re-export commonly used types
pub use adapters::EventBus;
pub use domain::{EventTarget, Listener, ListenerId};
pub use error::{Error, Result};
pub use observable::{Notification, Observable, Observer, Recorder, Subscription};
