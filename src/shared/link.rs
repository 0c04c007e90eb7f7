// This is free and unencumbered software released into the public domain.

//! Lightbridge 2 bandwidth tracking and primary/secondary feed selection.

use derive_more::Display;

#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq, Hash)]
pub enum FeedId {
    #[default]
    #[display("primary")]
    Primary,
    #[display("secondary")]
    Secondary,
}

impl FeedId {
    pub fn other(self) -> Self {
        match self {
            Self::Primary => Self::Secondary,
            Self::Secondary => Self::Primary,
        }
    }
}

/// Air-link keys of the Lightbridge link sub-component (index 0).
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum AirLinkKey {
    #[display("EXTVideoInputPortEnabled")]
    ExtVideoInputPortEnabled,
    #[display("BandwidthAllocationForLBVideoInputPort")]
    LbVideoInputBandwidth,
    #[display("BandwidthAllocationForHDMIVideoInputPort")]
    HdmiVideoInputBandwidth,
}

impl AirLinkKey {
    pub const ALL: [Self; 3] = [
        Self::ExtVideoInputPortEnabled,
        Self::LbVideoInputBandwidth,
        Self::HdmiVideoInputBandwidth,
    ];
}

/// A value pushed by the key-value store.
#[derive(Clone, Debug, PartialEq)]
pub enum TelemetryValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl TelemetryValue {
    /// Only an exact 0/1 reads as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(b) => Some(b),
            Self::Int(0) => Some(false),
            Self::Int(1) => Some(true),
            Self::Float(f) if f == 0.0 => Some(false),
            Self::Float(f) if f == 1.0 => Some(true),
            _ => None,
        }
    }

    pub fn as_fraction(&self) -> Option<f32> {
        match *self {
            Self::Float(f) if f.is_finite() => Some(f as f32),
            Self::Int(n) => Some(n as f32),
            _ => None,
        }
    }
}

/// What the current bandwidth split asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedDecision {
    Primary,
    Secondary,
    Keep,
}

impl FeedDecision {
    /// The feed to swap to from `active`, if a swap is needed.
    pub fn target(self, active: FeedId) -> Option<FeedId> {
        match self {
            Self::Primary if active != FeedId::Primary => Some(FeedId::Primary),
            Self::Secondary if active == FeedId::Primary => Some(FeedId::Secondary),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LinkBandwidthState {
    pub ext_port_enabled: Option<bool>,
    /// Share of the bandwidth given to the LB input when the EXT port is enabled.
    pub lb_ext_percent: Option<f32>,
    /// Share given to the HDMI input when the EXT port is disabled.
    pub hdmi_av_percent: Option<f32>,
}

impl LinkBandwidthState {
    /// Records a pushed value; missing or malformed values become unknown.
    pub fn update(&mut self, key: AirLinkKey, value: Option<&TelemetryValue>) {
        match key {
            AirLinkKey::ExtVideoInputPortEnabled => {
                self.ext_port_enabled = value.and_then(TelemetryValue::as_bool)
            },
            AirLinkKey::LbVideoInputBandwidth => {
                self.lb_ext_percent = value.and_then(TelemetryValue::as_fraction)
            },
            AirLinkKey::HdmiVideoInputBandwidth => {
                self.hdmi_av_percent = value.and_then(TelemetryValue::as_fraction)
            },
        }
    }

    pub fn decide(&self) -> FeedDecision {
        let Some(ext_enabled) = self.ext_port_enabled else {
            return FeedDecision::Primary;
        };
        let percent = if ext_enabled {
            self.lb_ext_percent
        } else {
            self.hdmi_av_percent
        };
        match percent {
            None => FeedDecision::Primary,
            Some(p) if p == 1.0 => FeedDecision::Primary,
            Some(p) if p == 0.0 => FeedDecision::Secondary,
            Some(_) => FeedDecision::Keep,
        }
    }
}

/// Bandwidth state plus the feed currently subscribed to.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinkSwapTracker {
    state: LinkBandwidthState,
    active: FeedId,
}

impl LinkSwapTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LinkBandwidthState {
        &self.state
    }

    pub fn active_feed(&self) -> FeedId {
        self.active
    }

    pub fn set_active_feed(&mut self, feed: FeedId) {
        self.active = feed;
    }

    /// Records a value without deciding anything.
    pub fn record(&mut self, key: AirLinkKey, value: Option<&TelemetryValue>) {
        self.state.update(key, value);
    }

    /// Records a value and returns the feed to swap to, if any.
    pub fn apply(&mut self, key: AirLinkKey, value: Option<&TelemetryValue>) -> Option<FeedId> {
        self.record(key, value);
        self.evaluate()
    }

    pub fn evaluate(&self) -> Option<FeedId> {
        self.state.decide().target(self.active)
    }
}
