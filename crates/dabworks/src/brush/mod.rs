//! Brush tips and their rasterization into dabs

mod coloring;
mod outline;
mod tip;
pub mod transform;

pub use coloring::Coloring;
pub use outline::{OUTLINE_THRESHOLD, Outline};
pub use tip::{BrushKind, BrushTip, LodLimitation};
