//! Controller configuration: feature toggles, timer table, switch variant.
//!
//! Grounded on `tetra-config::stack_config`: a plain struct of fields
//! (rather than a builder), constructed either programmatically
//! (`ControllerConfig::default()` + field assignment) or loaded from TOML
//! via [`toml_config`].

pub mod toml_config;

use pri_core::{
    CallCompletionRecallMode, DateTimeSendPolicy, DisplayFlags, Layer2Persistence, Layout, RetentionRequest, Side,
    SwitchVariant, TimerIndex, TimerTable, TimerValue,
};

/// Per-feature on/off toggles (spec §3 "feature toggles", §6 enumerated
/// list).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FeatureToggles {
    pub facility: bool,
    pub hold: bool,
    pub transfer: bool,
    pub call_completion: bool,
    pub aoc: bool,
    pub reroute: bool,
    pub overlap_dial: bool,
    pub in_band_disconnect_accept: bool,
    pub manual_connect_ack: bool,
    /// Legacy vs. Q.931-conformant hangup cause-to-message mapping.
    /// Defaults `false` (legacy mapping) — see DESIGN.md Open Question #1.
    pub hangup_fix: bool,
    pub service_message_support: bool,
    pub facility_send_enable: bool,
    pub logical_channel_mapping: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        FeatureToggles {
            facility: true,
            hold: true,
            transfer: false,
            call_completion: false,
            aoc: false,
            reroute: false,
            overlap_dial: false,
            in_band_disconnect_accept: false,
            manual_connect_ack: false,
            hangup_fix: false,
            service_message_support: false,
            facility_send_enable: true,
            logical_channel_mapping: false,
        }
    }
}

/// Full controller configuration (spec §3 "Controller", §6 "Controller
/// configuration options").
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ControllerConfig {
    pub side: Side,
    pub layout: Layout,
    pub switch_variant: SwitchVariant,
    pub features: FeatureToggles,
    pub layer2_persistence: Layer2Persistence,
    pub display_send: DisplayFlags,
    pub display_receive: DisplayFlags,
    pub date_time_send: DateTimeSendPolicy,
    pub call_completion_recall_mode: CallCompletionRecallMode,
    pub call_completion_retention_request: RetentionRequest,
    pub call_completion_retention_response: bool,
    /// NSF (network-specific facility) selector, 4ESS family only.
    pub nsf_selector: Option<u8>,
    #[serde(skip)]
    pub timers: TimerTable,
}

impl ControllerConfig {
    pub fn new(side: Side, layout: Layout, switch_variant: SwitchVariant) -> Self {
        ControllerConfig {
            side,
            layout,
            switch_variant,
            features: FeatureToggles::default(),
            layer2_persistence: Layer2Persistence::default(),
            display_send: DisplayFlags::default(),
            display_receive: DisplayFlags::default(),
            date_time_send: DateTimeSendPolicy::default(),
            call_completion_recall_mode: CallCompletionRecallMode::default(),
            call_completion_retention_request: RetentionRequest::default(),
            call_completion_retention_response: false,
            nsf_selector: None,
            timers: TimerTable::default(),
        }
    }

    /// Set a timer by index; mirrors the facade's `pri_set_timer`.
    /// Returns `false` (a no-op) if the value is unchanged (spec §8).
    pub fn set_timer(&mut self, idx: TimerIndex, value: TimerValue) -> bool {
        self.timers.set(idx, value)
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig::new(Side::User, Layout::Pri, SwitchVariant::NationalIsdn2)
    }
}
