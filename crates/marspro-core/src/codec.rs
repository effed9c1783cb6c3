// ── Value mapping between vendor encodings and host attributes ──
//
// Pure functions, no I/O. Lights report `lastBright` as a 0–100 percentage
// while hosts speak 0–255 brightness; fans report a raw `fanSpeed` where
// 840 is full speed and hosts speak percentages with a 25 % floor.
//
// Decoding never fails towards the catalog: a missing or malformed
// `deviceInfo` yields the neutral value `0` and a warning.

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// Lowest fan percentage the hardware accepts. "Off" is modeled as this.
pub const FAN_MIN_PERCENT: u8 = 25;
pub const FAN_MAX_PERCENT: u8 = 100;

/// Raw brightness used for `turn_on` when the last level is unknown.
pub const DEFAULT_LIGHT_PERCENT: u8 = 50;

/// Raw `fanSpeed` reported at 100 %.
pub const FAN_RAW_FULL_SCALE: i64 = 840;

/// The `deviceInfo` record, decoded.
///
/// Only the fields the controllers read are typed; the shape otherwise
/// varies by device family. Some firmware sends the numbers as floats or
/// numeric strings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Fans: raw speed, 0..=840.
    #[serde(default, deserialize_with = "marspro_api::models::lenient_i64")]
    pub fan_speed: Option<i64>,
    /// Lights: last brightness, 0..=100.
    #[serde(default, deserialize_with = "marspro_api::models::lenient_i64")]
    pub last_bright: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("device info is missing")]
    Missing,

    #[error("device info is not a JSON object: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Parse a `deviceInfo` string.
pub fn decode_device_info(raw: Option<&str>) -> Result<DeviceInfo, CodecError> {
    let raw = raw.filter(|s| !s.trim().is_empty()).ok_or(CodecError::Missing)?;
    Ok(serde_json::from_str(raw)?)
}

// ── Brightness ───────────────────────────────────────────────────────

/// Host brightness (0–255) to raw percentage (0–100), rounded.
pub fn brightness_to_raw(brightness: u8) -> u8 {
    let raw = (u16::from(brightness) * 100 + 127) / 255;
    u8::try_from(raw).unwrap_or(100)
}

/// Raw percentage to host brightness, rounded and clamped to 0–255.
pub fn raw_to_brightness(raw: i64) -> u8 {
    let host = raw.saturating_mul(255).saturating_add(50).div_euclid(100);
    u8::try_from(host.clamp(0, 255)).unwrap_or(u8::MAX)
}

/// Current host brightness of a light; `0` when undecodable.
pub fn light_brightness(device_id: &str, raw_info: Option<&str>) -> u8 {
    match decode_device_info(raw_info) {
        Ok(info) => raw_to_brightness(info.last_bright.unwrap_or(0)),
        Err(e) => {
            warn!(device_id, error = %e, "cannot decode light brightness, reporting 0");
            0
        }
    }
}

/// Last raw percentage a light reported, if it can be decoded.
pub fn light_last_raw(raw_info: Option<&str>) -> Option<u8> {
    let bright = decode_device_info(raw_info).ok()?.last_bright?;
    u8::try_from(bright.clamp(0, 100)).ok()
}

// ── Fan speed ────────────────────────────────────────────────────────

/// Raw `fanSpeed` to host percentage.
///
/// `0` stays `0`; anything else is `raw / 8.4` rounded and clamped to
/// `[25, 100]`, so low nonzero speeds report the hardware minimum.
pub fn fan_raw_to_percent(raw: i64) -> u8 {
    if raw == 0 {
        return 0;
    }
    let pct = raw
        .saturating_mul(100)
        .saturating_add(FAN_RAW_FULL_SCALE / 2)
        .div_euclid(FAN_RAW_FULL_SCALE);
    let pct = pct.clamp(i64::from(FAN_MIN_PERCENT), i64::from(FAN_MAX_PERCENT));
    u8::try_from(pct).unwrap_or(FAN_MAX_PERCENT)
}

/// Clamp a commanded percentage into the range the hardware accepts.
pub fn fan_command_percent(percentage: u8) -> u8 {
    percentage.clamp(FAN_MIN_PERCENT, FAN_MAX_PERCENT)
}

/// Current fan percentage; `0` when undecodable.
pub fn fan_percentage(device_id: &str, raw_info: Option<&str>) -> u8 {
    match decode_device_info(raw_info) {
        Ok(info) => fan_raw_to_percent(info.fan_speed.unwrap_or(0)),
        Err(e) => {
            warn!(device_id, error = %e, "cannot decode fan speed, reporting 0");
            0
        }
    }
}
