//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Every query is scoped to the
//! owning user.

mod marker_refs;

pub mod catch_repo;
pub mod event_repo;
pub mod spot_repo;

pub use catch_repo::CatchRepo;
pub use event_repo::EventRepo;
pub use spot_repo::SpotRepo;
