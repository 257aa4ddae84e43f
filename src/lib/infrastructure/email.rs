//! Email delivery adapters

pub mod mailersend;
