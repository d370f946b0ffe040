use dabworks_config::MirrorSettings;

use super::sensor_value;
use crate::types::{MirrorProperties, PaintInformation};

/// Flips dabs depending on the sensor and the canvas view's own mirroring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MirrorOption {
    settings: MirrorSettings,
}

impl MirrorOption {
    pub fn new(settings: MirrorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &MirrorSettings {
        &self.settings
    }

    /// Decide the flips for one dab. Each mirroring source adds one flip
    /// per axis; an even count cancels out.
    pub fn apply(&self, info: &PaintInformation) -> MirrorProperties {
        let mut flips_h = u32::from(info.canvas_mirrored_h);
        let mut flips_v = u32::from(info.canvas_mirrored_v);
        let mut coordinate_system_flipped = false;

        let MirrorSettings {
            enabled,
            horizontal,
            vertical,
            use_pressure,
        } = self.settings;

        if enabled && (horizontal || vertical) {
            let active = sensor_value(use_pressure, info) >= 0.5;
            flips_h += u32::from(active && horizontal);
            flips_v += u32::from(active && vertical);
            coordinate_system_flipped = active && (horizontal != vertical);
        }

        MirrorProperties {
            horizontal_mirror: flips_h % 2 == 1,
            vertical_mirror: flips_v % 2 == 1,
            coordinate_system_flipped,
        }
    }
}
