//! Module for theme exports.
//!
//! This module re-exports all theme implementations.

pub mod default_light;
pub mod default_dark;
pub mod high_contrast;
