//! Game implementations.

pub mod maze;
