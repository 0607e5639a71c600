//! Operators
//!
//! Each operator returns a new [`Observable`](crate::Observable) whose
//! subscribe function re-subscribes to the source with a forwarding
//! observer. Operators add no scheduling of their own.
//!
//! - [`map`](crate::Observable::map) / [`try_map`](crate::Observable::try_map)
//! - [`merge_map`](crate::Observable::merge_map) /
//!   [`merge_map_unchecked`](crate::Observable::merge_map_unchecked)
//!
//! Every user-supplied function is invoked inside a panic boundary; a panic
//! is delivered downstream as `error(Error::Projection)`.

mod map;
mod merge_map;
