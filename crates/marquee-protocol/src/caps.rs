//! Hardware model capability table.
//!
//! Pure lookups: which verbs, color depths, and LED complements each
//! model class supports. Command encoding consults these to reject
//! verb/model combinations before any bytes are built.

use crate::types::{HardwareModel, ModelClass};

impl HardwareModel {
    /// Whether this model has a display matrix.
    pub fn is_readerboard(&self) -> bool {
        matches!(
            self,
            HardwareModel::Readerboard3Rgb | HardwareModel::Readerboard3Mono
        )
    }

    /// Whether this model is a busylight (discrete LEDs only).
    pub fn is_busylight(&self) -> bool {
        matches!(self, HardwareModel::Busylight1 | HardwareModel::Busylight2)
    }

    /// Busylight hardware generation, or 0 for non-busylight models.
    pub fn busylight_version(&self) -> u8 {
        match self {
            HardwareModel::Busylight1 => 1,
            HardwareModel::Busylight2 => 2,
            _ => 0,
        }
    }

    /// Number of bitmap color planes the matrix carries: 2 for
    /// monochrome+flash, 4 for RGB+flash, `None` for models without a
    /// matrix.
    pub fn plane_count(&self) -> Option<usize> {
        match self {
            HardwareModel::Readerboard3Rgb => Some(4),
            HardwareModel::Readerboard3Mono => Some(2),
            _ => None,
        }
    }

    /// The discrete LEDs physically installed by default on this model.
    pub fn default_lights(&self) -> &'static str {
        if self.is_readerboard() {
            "GyYrRbBW"
        } else {
            "GyYrRBW"
        }
    }

    /// Whether the self-test verb is implemented by this model's
    /// firmware (readerboards and second-generation busylights).
    pub fn supports_test(&self) -> bool {
        self.is_readerboard() || self.busylight_version() > 1
    }

    /// The class code this model reports in query replies.
    pub fn class(&self) -> ModelClass {
        match self {
            HardwareModel::Busylight1 | HardwareModel::Busylight2 => ModelClass::Busylight,
            HardwareModel::Readerboard3Rgb => ModelClass::MatrixRgb,
            HardwareModel::Readerboard3Mono => ModelClass::MatrixMono,
            HardwareModel::Unknown => ModelClass::Unknown,
        }
    }
}
