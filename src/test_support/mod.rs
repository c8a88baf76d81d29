//! Test-only helpers shared by unit and integration tests.

pub mod collaborators;
pub mod socket_guard;
