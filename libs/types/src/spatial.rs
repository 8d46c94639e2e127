//! Spatial reference frames.
//!
//! The runtime never interprets these values; they are captured at actor
//! creation and handed back to behaviors and the host engine unchanged.

use serde::{Deserialize, Serialize};

/// Position in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Orientation as Euler angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl Rotation {
    pub const fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }
}

/// Reference frame captured when an actor is created.
///
/// Some behaviors respawn or measure against this; the dispatch core only
/// stores it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpawnFrame {
    pub position: Vec3,
    pub rotation: Rotation,
}

impl SpawnFrame {
    pub const fn new(position: Vec3, rotation: Rotation) -> Self {
        Self { position, rotation }
    }
}
