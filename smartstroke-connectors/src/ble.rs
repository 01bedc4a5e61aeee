//! BLE Telemetry Decoder
//!
//! ## Wire Format
//!
//! The pen firmware sends one JSON object per GATT notification:
//!
//! ```text
//! {"links":[{"A":"1786","R":"0.532"}, ...],   anchor short address (hex), range in meters
//!  "r":1, "i":0, "j":0, "k":0,                 orientation quaternion
//!  "p":350,                                    pressure ADC (0..4095)
//!  "d":0,                                      explicit contact flag
//!  "np":0}                                     next-page button level
//! ```
//!
//! Every field is optional. The firmware prints numbers inconsistently, so
//! each numeric field is accepted as a JSON number or a numeric string.
//!
//! ## Robustness
//!
//! - Anchor ids are hex short addresses; `"5B82"` and `"0786"` are both kept.
//!   A bare JSON number is read by its printed digits, so `1786` is `"1786"`
//! - A link with an unparsable id or range is dropped on its own; the rest of
//!   the frame is kept
//! - Flags (`d`, `np`) are high for any numeric 1: `1`, `1.0` and `"1"` all
//!   count. Every other value, including `true`, reads as low
//! - A payload that is not a JSON object is rejected as a whole
//! - Missing quaternion components default to the identity (`r = 1`, rest 0);
//!   an unparsable component becomes NaN so the core discards the orientation

use serde::Deserialize;
use serde_json::Value;
use smartstroke_core::{
    constants::hardware::MAX_LINKS,
    telemetry::{LinkReading, TelemetryFrame},
    time::Timestamp,
    AnchorId, Quaternion,
};

use crate::{ConnectorError, ConnectorResult, DecoderStats};

/// GATT service exposed by the pen
pub const SERVICE_UUID: &str = "4fafc201-1fb5-459e-8fcc-c5c9c331914b";

/// Notify characteristic carrying telemetry JSON
pub const CHARACTERISTIC_UUID: &str = "beb5483e-36e1-4688-b7f5-ea07361b26a8";

/// Advertised name prefixes of compatible pens
pub const DEVICE_NAME_PREFIXES: [&str; 2] = ["UWB", "Smart"];

#[derive(Debug, Deserialize)]
struct Notification {
    #[serde(default)]
    links: Option<Value>,
    #[serde(default)]
    r: Option<Value>,
    #[serde(default)]
    i: Option<Value>,
    #[serde(default)]
    j: Option<Value>,
    #[serde(default)]
    k: Option<Value>,
    #[serde(default)]
    p: Option<Value>,
    #[serde(default)]
    d: Option<Value>,
    #[serde(default)]
    np: Option<Value>,
}

/// Read a JSON number or numeric string
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Read an anchor short address from hex text or a JSON integer
fn anchor_address(value: &Value) -> Option<AnchorId> {
    match value {
        Value::String(s) => AnchorId::from_hex(s),
        Value::Number(n) if n.is_u64() => AnchorId::from_hex(&n.to_string()),
        _ => None,
    }
}

/// Read a 0/1 style flag; anything but 1 is low
fn flag(value: &Value) -> bool {
    numeric(value) == Some(1.0)
}

/// Decodes pen notifications into [`TelemetryFrame`]s
#[derive(Debug, Default)]
pub struct BleDecoder {
    stats: DecoderStats,
}

impl BleDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &DecoderStats {
        &self.stats
    }

    /// Decode one notification received at `received_at`
    pub fn decode(&mut self, payload: &[u8], received_at: Timestamp) -> ConnectorResult<TelemetryFrame> {
        self.stats.bytes_received += payload.len() as u64;

        match self.parse(payload, received_at) {
            Ok(frame) => {
                self.stats.frames_decoded += 1;
                Ok(frame)
            }
            Err(err) => {
                log::warn!("Dropped telemetry notification: {}", err);
                self.stats.frames_dropped += 1;
                self.stats.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    fn parse(&mut self, payload: &[u8], received_at: Timestamp) -> ConnectorResult<TelemetryFrame> {
        let value: Value = serde_json::from_slice(payload)?;
        if !value.is_object() {
            return Err(ConnectorError::Malformed("payload is not a JSON object".into()));
        }
        let notification: Notification = serde_json::from_value(value)?;

        let mut frame = TelemetryFrame::new(received_at);

        if let Some(links) = &notification.links {
            frame.links = Some(self.links(links));
        }

        let components = [&notification.r, &notification.i, &notification.j, &notification.k];
        if components.iter().any(|c| c.is_some()) {
            let component = |value: &Option<Value>, default: f32| match value {
                None => default,
                Some(v) => numeric(v).map_or(f32::NAN, |n| n as f32),
            };
            frame.orientation = Some(Quaternion::new(
                component(&notification.r, 1.0),
                component(&notification.i, 0.0),
                component(&notification.j, 0.0),
                component(&notification.k, 0.0),
            ));
        }

        frame.pressure = notification
            .p
            .as_ref()
            .and_then(numeric)
            .filter(|p| p.is_finite())
            .map(|p| p.round().clamp(0.0, f64::from(u16::MAX)) as u16);
        frame.contact = notification.d.as_ref().map(flag);
        frame.next_page = notification.np.as_ref().map(flag);

        Ok(frame)
    }

    fn links(&mut self, links: &Value) -> heapless::Vec<LinkReading, MAX_LINKS> {
        let mut readings = heapless::Vec::new();

        let Some(entries) = links.as_array() else {
            log::warn!("Ignoring non-array links field");
            return readings;
        };

        for entry in entries {
            let anchor = entry.get("A").and_then(anchor_address);
            let range_m = entry.get("R").and_then(numeric).filter(|r| r.is_finite());

            match (anchor, range_m) {
                (Some(anchor), Some(range_m)) => {
                    let reading = LinkReading { anchor, range_m: range_m as f32 };
                    if readings.push(reading).is_err() {
                        log::warn!("Link to anchor {} dropped: more than {} links", anchor, MAX_LINKS);
                        self.stats.links_dropped += 1;
                    }
                }
                _ => {
                    log::warn!("Dropped unparsable link entry: {}", entry);
                    self.stats.links_dropped += 1;
                }
            }
        }

        readings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_notification() {
        let mut decoder = BleDecoder::new();
        let payload = br#"{"links":[{"A":"1786","R":"0.532"},{"A":1685,"R":0.61}],
            "r":"0.9","i":0,"j":"0.1","k":0,"p":"350","d":0,"np":1}"#;

        let frame = decoder.decode(payload, 42).unwrap();
        assert_eq!(frame.timestamp, 42);

        let links = frame.links.unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].anchor, AnchorId(0x1786));
        assert!((links[0].range_m - 0.532).abs() < 1e-6);
        assert_eq!(links[1].anchor, AnchorId(0x1685));

        assert_eq!(frame.orientation, Some(Quaternion::new(0.9, 0.0, 0.1, 0.0)));
        assert_eq!(frame.pressure, Some(350));
        assert_eq!(frame.contact, Some(false));
        assert_eq!(frame.next_page, Some(true));
        assert_eq!(decoder.stats().frames_decoded, 1);
    }

    #[test]
    fn absent_fields_stay_absent() {
        let mut decoder = BleDecoder::new();
        let frame = decoder.decode(br#"{"p":12}"#, 0).unwrap();

        assert_eq!(frame.links, None);
        assert_eq!(frame.orientation, None);
        assert_eq!(frame.contact, None);
        assert_eq!(frame.next_page, None);
        assert_eq!(frame.pressure, Some(12));
    }

    #[test]
    fn partial_quaternion_defaults_to_identity() {
        let mut decoder = BleDecoder::new();
        let frame = decoder.decode(br#"{"k":"0.5"}"#, 0).unwrap();
        assert_eq!(frame.orientation, Some(Quaternion::new(1.0, 0.0, 0.0, 0.5)));

        let frame = decoder.decode(br#"{"r":"x"}"#, 0).unwrap();
        assert!(frame.orientation.unwrap().r.is_nan());
    }

    #[test]
    fn bad_links_are_dropped_individually() {
        let mut decoder = BleDecoder::new();
        let payload = br#"{"links":[{"A":"17x6","R":"0.5"},{"A":"1685","R":"far"},{"A":"1584","R":"0.25"}]}"#;

        let frame = decoder.decode(payload, 0).unwrap();
        let links = frame.links.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].anchor, AnchorId(0x1584));
        assert_eq!(decoder.stats().links_dropped, 2);
    }

    #[test]
    fn hex_short_addresses_stay_distinct() {
        let mut decoder = BleDecoder::new();
        let payload = br#"{"links":[{"A":"1786","R":"0.5"},{"A":"5B82","R":"0.6"},{"A":"0786","R":"0.7"}]}"#;

        let frame = decoder.decode(payload, 0).unwrap();
        let anchors: Vec<AnchorId> = frame.links.unwrap().iter().map(|l| l.anchor).collect();
        assert_eq!(anchors, vec![AnchorId(0x1786), AnchorId(0x5B82), AnchorId(0x0786)]);
        assert_eq!(decoder.stats().links_dropped, 0);
    }

    #[test]
    fn page_flag_accepts_any_numeric_one() {
        let mut decoder = BleDecoder::new();
        for payload in [&br#"{"np":1}"#[..], br#"{"np":1.0}"#, br#"{"np":"1"}"#] {
            assert_eq!(decoder.decode(payload, 0).unwrap().next_page, Some(true));
        }
        for payload in [&br#"{"np":2}"#[..], br#"{"np":true}"#, br#"{"np":"on"}"#] {
            assert_eq!(decoder.decode(payload, 0).unwrap().next_page, Some(false));
        }
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        let mut decoder = BleDecoder::new();

        assert!(matches!(decoder.decode(b"{not json", 0), Err(ConnectorError::Json(_))));
        assert!(matches!(decoder.decode(b"[1,2,3]", 0), Err(ConnectorError::Malformed(_))));
        assert!(matches!(decoder.decode(b"", 0), Err(ConnectorError::Json(_))));

        assert_eq!(decoder.stats().frames_dropped, 3);
        assert!(decoder.stats().last_error.is_some());
    }

    #[test]
    fn contact_flag_accepts_strings() {
        let mut decoder = BleDecoder::new();
        let frame = decoder.decode(br#"{"d":"1","np":"0"}"#, 0).unwrap();
        assert_eq!(frame.contact, Some(true));
        assert_eq!(frame.next_page, Some(false));
    }
}
