//! Pitch Refiner - Iterative quality refinement for generated presentations
//!
//! This crate scores a slide deck across four quality dimensions, turns the
//! findings into a regeneration brief, regenerates the weak slides and keeps
//! the best-scoring version until a target, a plateau or the round cap stops
//! the loop.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
