//! Transport-Side Adapters for SmartStroke
//!
//! ## Overview
//!
//! The fusion core knows nothing about radios or files. This crate sits at its
//! edges:
//!
//! ```text
//!  pen ──BLE notify──→ ble::BleDecoder ──TelemetryFrame──→ InkSession
//!                             ▲                               │
//!                     pump::SessionPump ◄─── RenderFrame ─────┘
//!                                                             │
//!                                        export ◄── Notebook ─┘
//! ```
//!
//! - [`ble`]: decodes the pen firmware's JSON notification
//! - [`pump`]: async loop that feeds payloads in and ticks at display rate
//! - [`export`]: writes a notebook to JSON
//!
//! ## Error Policy
//!
//! A bad notification is dropped and counted; it never stops the session. Only
//! I/O failures while exporting are surfaced to the caller as hard errors.
//!
//! ## Example Usage
//!
//! ```rust
//! use smartstroke_connectors::ble::BleDecoder;
//!
//! let mut decoder = BleDecoder::new();
//! let frame = decoder
//!     .decode(br#"{"links":[{"A":"1786","R":"0.532"}],"p":350,"d":0}"#, 0)
//!     .unwrap();
//! assert_eq!(frame.pressure, Some(350));
//! ```

pub mod ble;
pub mod export;

#[cfg(feature = "std")]
pub mod pump;

pub use ble::{BleDecoder, CHARACTERISTIC_UUID, SERVICE_UUID};
pub use export::{export_notebook, write_notebook};

#[cfg(feature = "std")]
pub use pump::{session_pump, NotificationSource, PumpConfig, PumpOutcome, SessionPump};

use thiserror::Error;

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Payload could not be decoded into a telemetry frame
    #[error("Malformed payload: {0}")]
    Malformed(String),

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing a file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The fusion core rejected the session configuration
    #[error("Session error: {0}")]
    Session(#[from] smartstroke_core::FusionError),

    /// The render-frame consumer went away
    #[error("Channel closed")]
    ChannelClosed,
}

/// Result alias for connector operations
pub type ConnectorResult<T> = Result<T, ConnectorError>;

/// Decoder statistics
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DecoderStats {
    /// Notifications turned into frames
    pub frames_decoded: u64,
    /// Notifications dropped as malformed
    pub frames_dropped: u64,
    /// Individual link entries dropped from otherwise good frames
    pub links_dropped: u64,
    /// Total payload bytes seen
    pub bytes_received: u64,
    /// Last decode error message
    pub last_error: Option<String>,
}

impl DecoderStats {
    /// Calculate drop rate over all notifications seen
    pub fn drop_rate(&self) -> f64 {
        let total = self.frames_decoded + self.frames_dropped;
        if total == 0 {
            0.0
        } else {
            self.frames_dropped as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_rate() {
        let mut stats = DecoderStats::default();
        assert_eq!(stats.drop_rate(), 0.0);

        stats.frames_decoded = 3;
        stats.frames_dropped = 1;
        assert_eq!(stats.drop_rate(), 0.25);
    }

    #[test]
    fn error_messages() {
        let err = ConnectorError::Malformed("not an object".into());
        assert_eq!(err.to_string(), "Malformed payload: not an object");
    }
}
