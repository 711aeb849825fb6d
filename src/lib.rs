//! Gold Country: a branching visual-novel engine.
//!
//! A validated scene graph drives typewritten prose through a cooperative
//! reveal scheduler, while scored choices steer the play-through toward one
//! of several endings.

pub mod content;
pub mod core;
pub mod schema;
