//! Game implementations.

pub mod eriantys;
