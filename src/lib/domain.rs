//! Domain types and contracts

pub mod communication;
