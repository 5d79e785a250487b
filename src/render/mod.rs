//! Software rendering for the lock screen
//!
//! Frames are composed entirely in memory (canvas + glyph run), then
//! presented to the X server in a single pass by the lock module.

pub mod canvas;
pub mod glyph;
pub mod indicator;
