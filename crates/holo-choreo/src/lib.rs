//! Holo Choreo - the presentation choreography engine
//!
//! This crate implements:
//! - The phase machine: a table-driven transition function over
//!   {gesture, speech ended, timer fired} with one cancellable timer
//! - Navigation: carousel selection and inspection rotation
//! - Poses: avatar placement, movement and camera per phase

pub mod machine;
pub mod navigation;
pub mod pose;

pub use machine::*;
pub use navigation::*;
pub use pose::*;
