//! Client side of the spot editor: an HTTP-backed spot store and the
//! editor page state that merges the form with the marker manager.

pub mod config;
pub mod editor;
pub mod error;
pub mod models;
pub mod store;
