//! Configuration type definitions

use dotbadge_protocol::demod::{DemodConfig, DEFAULT_SYNC_THRESHOLD};

use crate::anim::Termination;
use crate::display::Polarity;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Main-loop iterations both buttons must be held before sleeping
pub const DEFAULT_SHUTDOWN_THRESHOLD: u16 = 2048;

/// Button debounce delay around sleep entry and exit
pub const DEFAULT_DEBOUNCE_MS: u32 = 50;

/// Upper bound on waiting for the buttons to be released before sleep
pub const DEFAULT_RELEASE_TIMEOUT_MS: u32 = 5000;

/// Refresh period: one column every 256 µs, 4 kHz
pub const DEFAULT_REFRESH_PERIOD_US: u32 = 256;

/// Power and button handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PowerConfig {
    /// Long-press length, in main-loop iterations
    pub shutdown_threshold: u16,
    /// Debounce delay (ms)
    pub debounce_ms: u32,
    /// Release wait timeout (ms)
    pub release_timeout_ms: u32,
}

impl PowerConfig {
    pub const fn new() -> Self {
        Self {
            shutdown_threshold: DEFAULT_SHUTDOWN_THRESHOLD,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            release_timeout_ms: DEFAULT_RELEASE_TIMEOUT_MS,
        }
    }
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Matrix refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    /// Time between two column scans (µs)
    pub refresh_period_us: u32,
    /// Row line polarity
    pub polarity: Polarity,
}

impl DisplayConfig {
    pub const fn new() -> Self {
        Self {
            refresh_period_us: DEFAULT_REFRESH_PERIOD_US,
            polarity: Polarity::ActiveHigh,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Animation playback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnimationConfig {
    /// How the end of a text payload is found
    pub termination: Termination,
}

impl AnimationConfig {
    pub const fn new() -> Self {
        Self {
            termination: Termination::Length,
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Audio link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkConfig {
    /// Pulses longer than this (125 kHz ticks) are sync pulses
    pub sync_threshold: u16,
}

impl LinkConfig {
    pub const fn new() -> Self {
        Self {
            sync_threshold: DEFAULT_SYNC_THRESHOLD,
        }
    }

    /// Demodulator settings
    pub const fn demod(&self) -> DemodConfig {
        DemodConfig {
            sync_threshold: self.sync_threshold,
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Complete badge configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BadgeConfig {
    pub power: PowerConfig,
    pub display: DisplayConfig,
    pub animation: AnimationConfig,
    pub link: LinkConfig,
}

impl BadgeConfig {
    pub const fn new() -> Self {
        Self {
            power: PowerConfig::new(),
            display: DisplayConfig::new(),
            animation: AnimationConfig::new(),
            link: LinkConfig::new(),
        }
    }
}
