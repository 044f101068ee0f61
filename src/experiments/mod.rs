//! Batch experiments built on top of [`crate::simulation`].

pub mod sweep;
