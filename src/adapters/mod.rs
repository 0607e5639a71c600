//! Infrastructure Adapters
//!
//! Implementations of the domain ports.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 Domain Layer                  │
//! │            EventTarget (port trait)           │
//! └──────────────────────────────────────────────┘
//!                        │
//!                        ▼
//! ┌──────────────────────────────────────────────┐
//! │              Adapters (This Module)           │
//! │                   EventBus                    │
//! └──────────────────────────────────────────────┘
//! ```

mod event_bus;

pub use event_bus::EventBus;
