//! TOML loading for [`ControllerConfig`], rejecting unrecognized keys.
//!
//! Grounded on `tetra-config::toml_config`: a `TomlConfigRoot` DTO with a
//! `#[serde(flatten)] extra: HashMap<String, Value>` catch-all per
//! sub-table, a `config_version` guard, and small `apply_*_patch`
//! functions translating each DTO into the real config.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use toml::Value;

use pri_core::{
    CallCompletionRecallMode, DateTimeSendPolicy, Layer2Persistence, Layout, RetentionRequest, Side, SwitchVariant,
};

use crate::{ControllerConfig, FeatureToggles};

const EXPECTED_CONFIG_VERSION: &str = "1";

/// Build a [`ControllerConfig`] from a TOML document.
pub fn from_toml_str(toml_str: &str) -> Result<ControllerConfig, Box<dyn std::error::Error>> {
    let root: TomlConfigRoot = toml::from_str(toml_str)?;

    if root.config_version != EXPECTED_CONFIG_VERSION {
        return Err(format!(
            "unrecognized config_version: {}, expected {}",
            root.config_version, EXPECTED_CONFIG_VERSION
        )
        .into());
    }
    if !root.extra.is_empty() {
        return Err(format!("unrecognized top-level fields: {:?}", sorted_keys(&root.extra)).into());
    }
    if let Some(ref f) = root.features {
        if !f.extra.is_empty() {
            return Err(format!("unrecognized fields: features::{:?}", sorted_keys(&f.extra)).into());
        }
    }
    if let Some(ref d) = root.display_send {
        if !d.extra.is_empty() {
            return Err(format!("unrecognized fields: display_send::{:?}", sorted_keys(&d.extra)).into());
        }
    }
    if let Some(ref d) = root.display_receive {
        if !d.extra.is_empty() {
            return Err(format!("unrecognized fields: display_receive::{:?}", sorted_keys(&d.extra)).into());
        }
    }

    let mut cfg = ControllerConfig::new(root.side, root.layout, root.switch_variant);

    if let Some(features) = root.features {
        apply_features_patch(&mut cfg.features, features);
    }
    if let Some(l2) = root.layer2_persistence {
        cfg.layer2_persistence = l2;
    }
    if let Some(d) = root.display_send {
        apply_display_flags_patch(&mut cfg.display_send, d);
    }
    if let Some(d) = root.display_receive {
        apply_display_flags_patch(&mut cfg.display_receive, d);
    }
    if let Some(v) = root.date_time_send {
        cfg.date_time_send = v;
    }
    if let Some(v) = root.call_completion_recall_mode {
        cfg.call_completion_recall_mode = v;
    }
    if let Some(v) = root.call_completion_retention_request {
        cfg.call_completion_retention_request = v;
    }
    if let Some(v) = root.call_completion_retention_response {
        cfg.call_completion_retention_response = v;
    }
    if let Some(v) = root.nsf_selector {
        cfg.nsf_selector = Some(v);
    }

    Ok(cfg)
}

/// Build a [`ControllerConfig`] from any reader.
pub fn from_reader<R: Read>(reader: R) -> Result<ControllerConfig, Box<dyn std::error::Error>> {
    let mut contents = String::new();
    let mut reader = BufReader::new(reader);
    reader.read_to_string(&mut contents)?;
    from_toml_str(&contents)
}

/// Build a [`ControllerConfig`] from a file path.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ControllerConfig, Box<dyn std::error::Error>> {
    let f = File::open(path)?;
    let r = BufReader::new(f);
    from_reader(r)
}

fn apply_features_patch(dst: &mut FeatureToggles, src: FeatureTogglesDto) {
    if let Some(v) = src.facility {
        dst.facility = v;
    }
    if let Some(v) = src.hold {
        dst.hold = v;
    }
    if let Some(v) = src.transfer {
        dst.transfer = v;
    }
    if let Some(v) = src.call_completion {
        dst.call_completion = v;
    }
    if let Some(v) = src.aoc {
        dst.aoc = v;
    }
    if let Some(v) = src.reroute {
        dst.reroute = v;
    }
    if let Some(v) = src.overlap_dial {
        dst.overlap_dial = v;
    }
    if let Some(v) = src.in_band_disconnect_accept {
        dst.in_band_disconnect_accept = v;
    }
    if let Some(v) = src.manual_connect_ack {
        dst.manual_connect_ack = v;
    }
    if let Some(v) = src.hangup_fix {
        dst.hangup_fix = v;
    }
    if let Some(v) = src.service_message_support {
        dst.service_message_support = v;
    }
    if let Some(v) = src.facility_send_enable {
        dst.facility_send_enable = v;
    }
    if let Some(v) = src.logical_channel_mapping {
        dst.logical_channel_mapping = v;
    }
}

fn apply_display_flags_patch(dst: &mut pri_core::DisplayFlags, src: DisplayFlagsDto) {
    if let Some(v) = src.block {
        dst.block = v;
    }
    if let Some(v) = src.name_initial {
        dst.name_initial = v;
    }
    if let Some(v) = src.name_update {
        dst.name_update = v;
    }
    if let Some(v) = src.text {
        dst.text = v;
    }
}

fn sorted_keys(map: &HashMap<String, Value>) -> Vec<&str> {
    let mut v: Vec<&str> = map.keys().map(|s| s.as_str()).collect();
    v.sort_unstable();
    v
}

/// ----------------------- DTOs for input shape -----------------------

#[derive(Deserialize)]
struct TomlConfigRoot {
    config_version: String,
    side: Side,
    layout: Layout,
    switch_variant: SwitchVariant,

    #[serde(default)]
    features: Option<FeatureTogglesDto>,

    #[serde(default)]
    layer2_persistence: Option<Layer2Persistence>,

    #[serde(default)]
    display_send: Option<DisplayFlagsDto>,

    #[serde(default)]
    display_receive: Option<DisplayFlagsDto>,

    #[serde(default)]
    date_time_send: Option<DateTimeSendPolicy>,

    #[serde(default)]
    call_completion_recall_mode: Option<CallCompletionRecallMode>,

    #[serde(default)]
    call_completion_retention_request: Option<RetentionRequest>,

    #[serde(default)]
    call_completion_retention_response: Option<bool>,

    #[serde(default)]
    nsf_selector: Option<u8>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Default, Deserialize)]
struct FeatureTogglesDto {
    facility: Option<bool>,
    hold: Option<bool>,
    transfer: Option<bool>,
    call_completion: Option<bool>,
    aoc: Option<bool>,
    reroute: Option<bool>,
    overlap_dial: Option<bool>,
    in_band_disconnect_accept: Option<bool>,
    manual_connect_ack: Option<bool>,
    hangup_fix: Option<bool>,
    service_message_support: Option<bool>,
    facility_send_enable: Option<bool>,
    logical_channel_mapping: Option<bool>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Default, Deserialize)]
struct DisplayFlagsDto {
    block: Option<bool>,
    name_initial: Option<bool>,
    name_update: Option<bool>,
    text: Option<bool>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_parses() {
        let toml_str = r#"
            config_version = "1"
            side = "network"
            layout = "pri"
            switch_variant = "national_isdn2"
        "#;
        let cfg = from_toml_str(toml_str).expect("parses");
        assert_eq!(cfg.side, Side::Network);
        assert_eq!(cfg.layout, Layout::Pri);
    }

    #[test]
    fn rejects_wrong_config_version() {
        let toml_str = r#"
            config_version = "99"
            side = "network"
            layout = "pri"
            switch_variant = "national_isdn2"
        "#;
        assert!(from_toml_str(toml_str).is_err());
    }

    #[test]
    fn rejects_unrecognized_top_level_field() {
        let toml_str = r#"
            config_version = "1"
            side = "network"
            layout = "pri"
            switch_variant = "national_isdn2"
            bogus_field = true
        "#;
        assert!(from_toml_str(toml_str).is_err());
    }

    #[test]
    fn feature_toggle_override_applies() {
        let toml_str = r#"
            config_version = "1"
            side = "user"
            layout = "bri_ptp"
            switch_variant = "euro_isdn_e1"

            [features]
            transfer = true
        "#;
        let cfg = from_toml_str(toml_str).expect("parses");
        assert!(cfg.features.transfer);
        assert!(cfg.features.facility);
    }
}
