// MarsPro API request and response types
//
// Every response is wrapped in the `{ code, msg, data }` envelope; the
// client strips it before callers see the payload. Fields use
// `#[serde(default)]` liberally because the app API is inconsistent about
// field presence across device families. Device records go further: a
// field of the wrong type degrades to `None` instead of failing the page,
// and only an entry without a usable `id` is dropped.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

// ── Response Envelope ────────────────────────────────────────────────

/// Standard MarsPro response envelope.
///
/// ```json
/// { "code": "000", "msg": "success", "data": { ... } }
/// ```
///
/// `data` stays untyped here so that rejected responses (whose `data` is
/// often `null` or a bare string) still parse; the client decodes it into
/// the endpoint's record only after the code check.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default, deserialize_with = "string_or_number_opt")]
    pub code: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// The status code the service uses for success.
pub const SUCCESS_CODE: &str = "000";

// ── Profile ──────────────────────────────────────────────────────────

/// Account profile from `android/mine/info/v1`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default, deserialize_with = "string_or_number_opt")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub nick_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Device list ──────────────────────────────────────────────────────

/// Request body for `android/udm/getDeviceList/v1`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceListRequest {
    pub current_page: u32,
    /// Device type filter. Always `null` (unfiltered) in practice.
    #[serde(rename = "type")]
    pub device_type: Option<String>,
    pub device_product_group: u32,
}

/// One page of the device list. The devices live under `data.list`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceListPage {
    #[serde(default, deserialize_with = "device_entries")]
    pub list: Vec<RawDevice>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub current_page: Option<u32>,
}

/// Device record as listed by the service.
///
/// `device_info` is itself a JSON document serialized into a string; its
/// shape depends on the device family and is decoded by `marspro-core`.
/// Firmware that sends it as a nested object gets it re-serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDevice {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub device_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub device_product_group: Option<u32>,
    /// 1 = connected; anything else is treated as disconnected.
    #[serde(default, deserialize_with = "lenient_i64")]
    pub connect_status: Option<i64>,
    #[serde(default, deserialize_with = "json_text")]
    pub device_info: Option<String>,
    /// Model code, e.g. `MZL001` (dimmer) or `MH200-M` (fan).
    #[serde(default, deserialize_with = "lenient_text")]
    pub device_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub product_id: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Device detail ────────────────────────────────────────────────────

/// Device record from `android/udm/getDeviceDetail/v1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDetail {
    #[serde(default, deserialize_with = "string_or_number_opt")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub device_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub connect_status: Option<i64>,
    #[serde(default, deserialize_with = "json_text")]
    pub device_info: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub device_type: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Calculation ──────────────────────────────────────────────────────

/// Request body for `h5/product/getCalculateSum/v1`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    pub device_id: String,
    pub product_code: String,
    pub calculation_name: String,
    pub args_list: Vec<CalculateArg>,
}

/// A single named argument of a calculation request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateArg {
    pub arg_name: String,
    pub arg_value: serde_json::Value,
}

/// Airflow (CFM) and static pressure (PA) figures for a fan percentage.
///
/// The service returns these as loosely-typed values (numbers or numeric
/// strings depending on firmware), so they are kept as raw JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanCalculation {
    pub percentage: u8,
    pub cfm: serde_json::Value,
    pub pa: serde_json::Value,
}

// ── Helpers ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Int(i64),
    Float(f64),
}

impl From<StringOrNumber> for String {
    fn from(v: StringOrNumber) -> Self {
        match v {
            StringOrNumber::String(s) => s,
            StringOrNumber::Int(n) => n.to_string(),
            StringOrNumber::Float(f) => f.to_string(),
        }
    }
}

/// Identifiers arrive as either JSON strings or numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn string_or_number_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StringOrNumber>::deserialize(deserializer).map(|v| v.map(String::from))
}

/// Decode list entries one at a time, skipping those without a usable id.
fn device_entries<'de, D>(deserializer: D) -> Result<Vec<RawDevice>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(entries
        .into_iter()
        .filter_map(|entry| match RawDevice::deserialize(entry) {
            Ok(device) => Some(device),
            Err(e) => {
                warn!(error = %e, "skipping device entry without a usable id");
                None
            }
        })
        .collect())
}

/// Strings pass through and numbers are stringified; anything else is `None`.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Embedded JSON documents: a string is kept verbatim, any other non-null
/// value is re-serialized.
fn json_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Integers that may arrive as floats or numeric strings. Anything that
/// is not a number is `None`.
pub fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(number_value))
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_i64(deserializer)?.and_then(|n| u32::try_from(n).ok()))
}

#[allow(clippy::cast_possible_truncation)]
fn number_value(value: &Value) -> Option<i64> {
    let float = match value {
        Value::Number(n) => match n.as_i64() {
            Some(int) => return Some(int),
            None => n.as_f64()?,
        },
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    // `as` saturates at the i64 bounds and maps NaN to 0
    float.is_finite().then(|| float.round() as i64)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_device_accepts_numeric_id() {
        let dev: RawDevice = serde_json::from_value(json!({
            "id": 12345,
            "deviceName": "Tent Light",
            "connectStatus": 1,
            "deviceInfo": "{\"lastBright\":80}"
        }))
        .unwrap();
        assert_eq!(dev.id, "12345");
        assert_eq!(dev.device_name.as_deref(), Some("Tent Light"));
        assert_eq!(dev.connect_status, Some(1));
    }

    #[test]
    fn raw_device_keeps_unknown_fields() {
        let dev: RawDevice = serde_json::from_value(json!({
            "id": "abc",
            "firmwareVersion": "1.0.3"
        }))
        .unwrap();
        assert_eq!(dev.id, "abc");
        assert!(dev.device_info.is_none());
        assert_eq!(dev.extra["firmwareVersion"], "1.0.3");
    }

    #[test]
    fn raw_device_tolerates_odd_field_types() {
        let dev: RawDevice = serde_json::from_value(json!({
            "id": "bad",
            "deviceName": 7,
            "deviceProductGroup": "1",
            "connectStatus": "1",
            "deviceInfo": { "lastBright": 40 },
            "productId": { "nested": true }
        }))
        .unwrap();
        assert_eq!(dev.device_name.as_deref(), Some("7"));
        assert_eq!(dev.device_product_group, Some(1));
        assert_eq!(dev.connect_status, Some(1));
        assert_eq!(dev.device_info.as_deref(), Some(r#"{"lastBright":40}"#));
        assert_eq!(dev.product_id, None);
    }

    #[test]
    fn list_page_skips_entries_without_an_id() {
        let page: DeviceListPage = serde_json::from_value(json!({
            "list": [
                { "id": "good", "connectStatus": 1 },
                { "deviceName": "no id" },
                { "id": { "oops": 1 } },
                { "id": 42, "connectStatus": true }
            ]
        }))
        .unwrap();
        let ids: Vec<_> = page.list.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["good", "42"]);
        assert_eq!(page.list[1].connect_status, None);
    }

    #[test]
    fn list_page_accepts_null_list() {
        let page: DeviceListPage = serde_json::from_value(json!({ "list": null })).unwrap();
        assert!(page.list.is_empty());
    }

    #[test]
    fn lenient_numbers() {
        assert_eq!(number_value(&json!(40.0)), Some(40));
        assert_eq!(number_value(&json!(" 41 ")), Some(41));
        assert_eq!(number_value(&json!(39.6)), Some(40));
        assert_eq!(number_value(&json!("n/a")), None);
        assert_eq!(number_value(&json!([1])), None);
    }

    #[test]
    fn envelope_code_may_be_numeric() {
        let env: Envelope = serde_json::from_value(json!({ "code": 401, "msg": "nope" })).unwrap();
        assert_eq!(env.code.as_deref(), Some("401"));
        assert!(env.data.is_null());
    }

    #[test]
    fn list_request_serializes_null_type() {
        let body = serde_json::to_value(DeviceListRequest {
            current_page: 1,
            device_type: None,
            device_product_group: 2,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({ "currentPage": 1, "type": null, "deviceProductGroup": 2 })
        );
    }
}
