//! Async Session Pump
//!
//! Drives an [`InkSession`] from a stream of raw notifications. Two things
//! happen concurrently on one task:
//!
//! ```text
//! NotificationSource ──bytes──→ BleDecoder ──frame──→ session.ingest
//! interval (display rate) ────────────────────────→ session.tick ──→ frames tx
//! ```
//!
//! Both branches run on the same task, so `ingest` and `tick` never overlap.
//! Held ticks are skipped silently; decode failures are counted and dropped.
//! The pump ends when the source closes or the frame receiver is dropped, and
//! hands the session back so the caller can export the notebook.

use std::time::Duration;

use async_trait::async_trait;
use smartstroke_core::{
    time::{SystemTime, TimeSource},
    InkSession, RenderFrame,
};
use tokio::sync::mpsc;

use crate::{ble::BleDecoder, ConnectorError, ConnectorResult, DecoderStats};

/// Anything that yields raw pen notifications
#[async_trait]
pub trait NotificationSource: Send {
    /// Next payload, `None` once the link is closed
    async fn next_payload(&mut self) -> Option<Vec<u8>>;
}

#[async_trait]
impl NotificationSource for mpsc::Receiver<Vec<u8>> {
    async fn next_payload(&mut self) -> Option<Vec<u8>> {
        self.recv().await
    }
}

/// Pump tuning
#[derive(Debug, Clone)]
pub struct PumpConfig {
    /// Time between ticks
    pub tick_interval: Duration,
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            // ~60 Hz display refresh
            tick_interval: Duration::from_millis(16),
        }
    }
}

impl PumpConfig {
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }
}

/// Why the pump stopped, plus what it leaves behind
#[derive(Debug)]
pub struct PumpOutcome {
    /// The session, with its notebook intact
    pub session: InkSession,
    /// Decoder counters at shutdown
    pub stats: DecoderStats,
    /// `Some` if the pump stopped because of an error
    pub error: Option<ConnectorError>,
}

/// Owns a session and feeds it until the source closes
pub struct SessionPump<S> {
    session: InkSession,
    decoder: BleDecoder,
    source: S,
    frames: mpsc::Sender<RenderFrame>,
    config: PumpConfig,
    clock: Box<dyn TimeSource + Send + Sync>,
}

impl<S: NotificationSource> SessionPump<S> {
    pub fn new(session: InkSession, source: S, frames: mpsc::Sender<RenderFrame>) -> Self {
        Self {
            session,
            decoder: BleDecoder::new(),
            source,
            frames,
            config: PumpConfig::default(),
            clock: Box::new(SystemTime),
        }
    }

    /// Stamp frames and ticks from `clock` instead of the system clock
    pub fn with_clock(mut self, clock: impl TimeSource + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_config(mut self, config: PumpConfig) -> Self {
        self.config = config;
        self
    }

    /// Run until the source closes or the frame receiver is dropped
    pub async fn run(self) -> PumpOutcome {
        let Self {
            mut session,
            mut decoder,
            mut source,
            frames,
            config,
            clock,
        } = self;

        let mut ticker = tokio::time::interval(config.tick_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let error = loop {
            tokio::select! {
                payload = source.next_payload() => {
                    let Some(payload) = payload else {
                        log::info!("Notification source closed");
                        break None;
                    };
                    if let Ok(frame) = decoder.decode(&payload, clock.now()) {
                        session.ingest(&frame);
                    }
                }
                _ = ticker.tick() => {
                    match session.tick(clock.now()) {
                        Ok(frame) => {
                            if frames.send(frame).await.is_err() {
                                break Some(ConnectorError::ChannelClosed);
                            }
                        }
                        Err(nb::Error::WouldBlock) => {}
                        Err(nb::Error::Other(err)) => log::debug!("Tick held: {}", err),
                    }
                }
            }
        };

        PumpOutcome {
            session,
            stats: decoder.stats().clone(),
            error,
        }
    }
}

/// Convenience: spawn-ready pump over an mpsc byte channel
pub fn channel_pump(
    session: InkSession,
    capacity: usize,
) -> (
    mpsc::Sender<Vec<u8>>,
    mpsc::Receiver<RenderFrame>,
    SessionPump<mpsc::Receiver<Vec<u8>>>,
) {
    let (payload_tx, payload_rx) = mpsc::channel(capacity);
    let (frame_tx, frame_rx) = mpsc::channel(capacity);
    (payload_tx, frame_rx, SessionPump::new(session, payload_rx, frame_tx))
}

/// Build a session with `config` and wrap it in a channel pump
pub fn session_pump(
    config: smartstroke_core::FusionConfig,
    capacity: usize,
) -> ConnectorResult<(
    mpsc::Sender<Vec<u8>>,
    mpsc::Receiver<RenderFrame>,
    SessionPump<mpsc::Receiver<Vec<u8>>>,
)> {
    Ok(channel_pump(InkSession::new(config)?, capacity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartstroke_core::{time::FixedTime, FusionConfig};

    #[tokio::test]
    async fn stops_when_source_closes() {
        let (payloads, _frames, pump) = session_pump(FusionConfig::default(), 8).unwrap();
        let pump = pump.with_config(PumpConfig::default().with_tick_interval(Duration::from_millis(1)));

        payloads.send(br#"{"p":10,"np":1}"#.to_vec()).await.unwrap();
        payloads.send(b"garbage".to_vec()).await.unwrap();
        drop(payloads);

        let outcome = pump.run().await;
        assert!(outcome.error.is_none());
        assert_eq!(outcome.stats.frames_decoded, 1);
        assert_eq!(outcome.stats.frames_dropped, 1);
        assert!(outcome.session.slot().snapshot().is_some());
    }

    #[tokio::test]
    async fn frames_are_stamped_by_the_pump_clock() {
        let (payloads, _frames, pump) = session_pump(FusionConfig::default(), 8).unwrap();
        let pump = pump.with_clock(FixedTime::new(5_000));

        payloads.send(br#"{"p":10}"#.to_vec()).await.unwrap();
        drop(payloads);

        let outcome = pump.run().await;
        let snapshot = outcome.session.slot().snapshot().unwrap();
        assert_eq!(snapshot.timestamp, 5_000);
    }

    #[tokio::test]
    async fn uncalibrated_session_emits_nothing() {
        let (payloads, mut frames, pump) = session_pump(FusionConfig::default(), 8).unwrap();
        let pump = pump.with_config(PumpConfig::default().with_tick_interval(Duration::from_millis(1)));

        let handle = tokio::spawn(pump.run());
        payloads.send(br#"{"p":500}"#.to_vec()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(payloads);

        let outcome = handle.await.unwrap();
        assert!(outcome.error.is_none());
        assert!(frames.try_recv().is_err());
    }
}
