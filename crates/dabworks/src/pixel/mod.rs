//! Pixel storage: formats and fixed-size paint devices

mod device;
mod format;

pub use device::FixedPaintDevice;
pub use format::PixelFormat;
