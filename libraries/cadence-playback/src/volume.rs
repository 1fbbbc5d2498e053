//! Volume control
//!
//! Volume is a linear 0.0-1.0 level handed straight to the audio element.
//! Muting is a separate flag so the level survives a mute/unmute cycle.

use serde::{Deserialize, Serialize};

/// Icon bucket shown next to the volume slider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeLevel {
    /// Muted, or level at zero
    Muted,

    /// Below half
    Low,

    /// Half or above
    High,
}

/// Volume controller
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    /// Linear level (0.0-1.0)
    level: f32,

    /// Mute state (preserves level)
    muted: bool,
}

impl Volume {
    /// Create new volume controller, clamping `level` into 0.0-1.0
    pub fn new(level: f32) -> Self {
        Self {
            level: clamp_level(level),
            muted: false,
        }
    }

    /// Set volume level, clamped into 0.0-1.0
    pub fn set_level(&mut self, level: f32) {
        self.level = clamp_level(level);
    }

    /// Current level, regardless of mute
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Mute audio (preserves volume level)
    pub fn mute(&mut self) {
        self.muted = true;
    }

    /// Toggle mute state
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Level actually heard: 0.0 when muted
    pub fn effective(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.level
        }
    }

    /// Icon bucket for the current level and mute state
    pub fn indicator(&self) -> VolumeLevel {
        if self.effective() == 0.0 {
            VolumeLevel::Muted
        } else if self.level < 0.5 {
            VolumeLevel::Low
        } else {
            VolumeLevel::High
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(1.0)
    }
}

fn clamp_level(level: f32) -> f32 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_volume() {
        let vol = Volume::new(0.8);
        assert_eq!(vol.level(), 0.8);
        assert!(!vol.is_muted());
        assert_eq!(Volume::default().level(), 1.0);
    }

    #[test]
    fn set_level_clamps() {
        let mut vol = Volume::new(0.5);
        vol.set_level(1.5);
        assert_eq!(vol.level(), 1.0);

        vol.set_level(-0.2);
        assert_eq!(vol.level(), 0.0);

        vol.set_level(f32::NAN);
        assert_eq!(vol.level(), 0.0);
    }

    #[test]
    fn mute_preserves_level() {
        let mut vol = Volume::new(0.6);

        vol.mute();
        assert!(vol.is_muted());
        assert_eq!(vol.level(), 0.6);
        assert_eq!(vol.effective(), 0.0);

        vol.toggle_mute();
        assert_eq!(vol.effective(), 0.6);
        assert_eq!(vol.indicator(), VolumeLevel::High);
    }

    #[test]
    fn toggle_mute() {
        let mut vol = Volume::new(0.3);
        vol.toggle_mute();
        assert!(vol.is_muted());
        vol.toggle_mute();
        assert!(!vol.is_muted());
        assert_eq!(vol.level(), 0.3);
    }

    #[test]
    fn indicator_buckets() {
        assert_eq!(Volume::new(0.0).indicator(), VolumeLevel::Muted);
        assert_eq!(Volume::new(0.2).indicator(), VolumeLevel::Low);
        assert_eq!(Volume::new(0.49).indicator(), VolumeLevel::Low);
        assert_eq!(Volume::new(0.5).indicator(), VolumeLevel::High);
        assert_eq!(Volume::new(1.0).indicator(), VolumeLevel::High);

        let mut vol = Volume::new(0.9);
        vol.mute();
        assert_eq!(vol.indicator(), VolumeLevel::Muted);
    }
}
