//! dabworks - brush dab generation and caching
//!
//! This crate turns a brush tip image into positioned, rasterized dabs:
//! - [`brush`] - Brush tips, their transform and mask rasterization
//! - [`quantizer`] - Snapping of dab transforms per precision level
//! - [`dab_cache`] - Dab placement, mirroring and postprocessing
//! - [`options`] - Mirror, sharpness, texture and spacing options
//! - [`spacing`] - Distance between dabs along a stroke
//! - [`paintop`] - Stroke driver compositing dabs onto a [`surface::CpuSurface`]
//! - [`pixel`] - Pixel formats and fixed-size paint devices

pub mod brush;
pub mod color_source;
pub mod constants;
pub mod dab_cache;
pub mod error;
pub mod geometry;
pub mod options;
pub mod paintop;
pub mod pixel;
pub mod quantizer;
pub mod spacing;
pub mod surface;
pub mod types;

pub use brush::*;
pub use color_source::*;
pub use constants::*;
pub use dab_cache::*;
pub use error::*;
pub use options::{MirrorOption, SharpnessOption, SpacingOption, TextureOption};
pub use paintop::*;
pub use pixel::*;
pub use quantizer::*;
pub use spacing::*;
pub use surface::*;
pub use types::*;

pub use dabworks_config as config;
