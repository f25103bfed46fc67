//! Confetti burst engine for FETE
//!
//! A purpose-built particle system for one visual effect: a celebratory
//! burst that rises, falls under gravity, and fades out near the bottom
//! of the surface. Rendering is left to the caller; this crate only owns
//! the particle set and its per-frame physics.

mod engine;

pub use engine::{ConfettiConfig, ConfettiEngine, Particle, Shape, PALETTE};
