//! Catchlog domain logic.
//!
//! Everything in this crate is pure and synchronous: marker types, the map
//! click router, the spot editor's marker state machine, and validation
//! shared by the API server and the client.

pub mod catch;
pub mod click_router;
pub mod error;
pub mod event;
pub mod focus;
pub mod marker;
pub mod marker_manager;
pub mod spot;
pub mod types;
