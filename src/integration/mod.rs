//! Wiring of engine, scheduler, policy store and command bus

pub mod narrator;

pub use narrator::Narrator;
