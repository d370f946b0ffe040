use dabworks_config::SpacingSettings;

use super::sensor_value;
use crate::types::PaintInformation;

/// Pressure-driven spacing multiplier and the isotropic switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpacingOption {
    settings: SpacingSettings,
}

impl SpacingOption {
    pub fn new(settings: SpacingSettings) -> Self {
        Self { settings }
    }

    pub fn is_isotropic(&self) -> bool {
        self.settings.isotropic
    }

    /// Multiplier for the spacing of the next dab
    pub fn apply(&self, info: &PaintInformation) -> f64 {
        sensor_value(self.settings.pressure_enabled, info)
    }
}
