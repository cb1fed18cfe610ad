//! Freerun movement library
//!
//! First-person character-movement simulation core: walking, sprinting,
//! jumping, crouch-sliding, and wall-running over a Rapier physics world.

pub mod config;
pub mod sim;
