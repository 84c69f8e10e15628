//! Request handlers, one module per resource.

mod marker_refs;

pub mod catches;
pub mod events;
pub mod spots;
