//! Core data structures for meshtopo
//!
//! This crate provides the types shared between the topology engine and the
//! rendering side: point aliases, the input and output meshes, the error
//! type, configuration structs and the face palette.

pub mod point;
pub mod mesh;
pub mod config;
pub mod palette;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use config::*;
pub use palette::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};
