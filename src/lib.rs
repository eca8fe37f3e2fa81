//! Simulation core for a vertically scrolling arcade shooter.
//!
//! The library owns every rule of play: entity movement, collision,
//! spawning, the boss fight and the session state machine. Drawing,
//! sound output and raw input are left to the caller, which talks to the
//! core through [`compute::Game`].

pub mod audio;
pub mod collision;
pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod persistence;
pub mod spawn;
