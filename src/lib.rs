//! Realm Sim - zoned tile-world simulation with weighted agent action scheduling

pub mod actions;
pub mod core;
pub mod entity;
pub mod spatial;
pub mod world;
