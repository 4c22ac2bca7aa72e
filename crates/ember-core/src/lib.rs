//! Ember Core - Foundational types for the Ember particle engine
//!
//! This crate provides the types that the other Ember crates depend on:
//! - `EntityId` - Stable identifiers for scene objects such as particle players
//! - `Transform2D`, `Color` - Spatial and color types built on `glam::Vec2`
//! - Oriented bounding box helpers used by particle rendering
//! - Error types and Result alias

mod error;
mod id;
mod types;

pub use error::{EmberError, Result};
pub use glam::Vec2;
pub use id::EntityId;
pub use types::{calculate_oobb, fmod_degrees, is_zero, Color, Transform2D, FLOAT_EPSILON};
