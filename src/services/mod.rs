//! Services shipped with the adapter.

pub mod hello;
