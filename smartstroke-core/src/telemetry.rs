//! Telemetry Intake
//!
//! ## Data Flow
//!
//! ```text
//! transport ──TelemetryFrame──→ TelemetrySlot ──TelemetrySnapshot──→ tick
//!   (partial, ranges in m)       (merge, latch)   (complete, ranges in mm)
//! ```
//!
//! Frames are partial: a notification may carry only links, only pen state,
//! or both. The slot merges each frame over the previous snapshot and replaces
//! it whole, so the tick always reads a consistent view.
//!
//! ## Merge Rules
//!
//! - A frame with links replaces the whole range set
//! - Absent orientation, pressure or contact fields keep their last value
//! - An absent next-page field reads as level 0
//! - Frames older than the current snapshot are ignored
//!
//! "Next page" is edge-triggered. Only a 0 → 1 transition of the level counts,
//! and each one is latched as a pending page turn until the tick takes it.

use heapless::Vec;

use crate::{
    constants::hardware::{MAX_LINKS, MM_PER_METER},
    errors::{FusionError, FusionResult},
    geometry::{AnchorId, Quaternion},
    time::Timestamp,
};

/// One anchor range in millimeters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeEntry {
    /// Anchor the range was measured to
    pub anchor: AnchorId,
    /// Distance in millimeters
    pub range_mm: f32,
}

/// Anchor ranges from one telemetry notification
///
/// Malformed entries are absent, never zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeSample {
    entries: Vec<RangeEntry, MAX_LINKS>,
}

impl RangeSample {
    /// Sample with no ranges
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from link readings in meters
    pub fn from_links(links: &[LinkReading]) -> Self {
        let mut sample = Self::new();
        for link in links {
            sample.insert_mm(link.anchor, link.range_m * MM_PER_METER);
        }
        sample
    }

    /// Record a range in millimeters
    ///
    /// Returns `false` when the value is unusable (non-finite or negative) or
    /// the sample is full. A repeated anchor overwrites its earlier entry.
    pub fn insert_mm(&mut self, anchor: AnchorId, range_mm: f32) -> bool {
        if !range_mm.is_finite() || range_mm < 0.0 {
            return false;
        }

        if let Some(entry) = self.entries.iter_mut().find(|e| e.anchor == anchor) {
            entry.range_mm = range_mm;
            return true;
        }

        self.entries.push(RangeEntry { anchor, range_mm }).is_ok()
    }

    /// Range to `anchor` in millimeters, if present
    pub fn get(&self, anchor: AnchorId) -> Option<f32> {
        self.entries
            .iter()
            .find(|e| e.anchor == anchor)
            .map(|e| e.range_mm)
    }

    /// Like [`get`](Self::get), but a missing range is an error
    pub fn require(&self, anchor: AnchorId) -> FusionResult<f32> {
        self.get(anchor)
            .ok_or(FusionError::MissingMeasurement { anchor })
    }

    /// Ranges in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &RangeEntry> {
        self.entries.iter()
    }

    /// Number of anchors with a range
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One decoded `{A, R}` link as the pen reports it
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkReading {
    /// Anchor the range was measured to
    pub anchor: AnchorId,
    /// Range in meters
    pub range_m: f32,
}

/// A partial telemetry update from the transport
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryFrame {
    /// When the frame was received
    pub timestamp: Timestamp,
    /// Anchor ranges in meters; replaces the previous set when present
    pub links: Option<Vec<LinkReading, MAX_LINKS>>,
    /// Pen attitude
    pub orientation: Option<Quaternion>,
    /// Raw pressure ADC reading
    pub pressure: Option<u16>,
    /// Explicit contact signal
    pub contact: Option<bool>,
    /// Level of the next-page button
    pub next_page: Option<bool>,
}

impl TelemetryFrame {
    /// Frame with every field absent
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            ..Self::default()
        }
    }

    /// Add a link reading; readings beyond `MAX_LINKS` are dropped
    pub fn with_link(mut self, anchor: AnchorId, range_m: f32) -> Self {
        let links = self.links.get_or_insert_with(Vec::new);
        if links.push(LinkReading { anchor, range_m }).is_err() {
            log_warn!("Link to anchor {} dropped: frame holds {} links", anchor, MAX_LINKS);
        }
        self
    }

    /// Attach an orientation
    pub fn with_orientation(mut self, orientation: Quaternion) -> Self {
        self.orientation = Some(orientation);
        self
    }

    /// Attach a pressure reading
    pub fn with_pressure(mut self, pressure: u16) -> Self {
        self.pressure = Some(pressure);
        self
    }

    /// Attach the contact signal
    pub fn with_contact(mut self, contact: bool) -> Self {
        self.contact = Some(contact);
        self
    }

    /// Next-page button level; only rising edges turn the page
    pub fn with_next_page(mut self, next_page: bool) -> Self {
        self.next_page = Some(next_page);
        self
    }
}

/// Pen contact and attitude for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenState {
    /// Pen is touching the surface
    pub down: bool,
    /// Raw pressure ADC reading
    pub pressure: u16,
    /// Pen attitude as last reported
    pub orientation: Option<Quaternion>,
    /// Timestamp of the snapshot this state came from
    pub timestamp: Timestamp,
}

/// The merged, immutable view a tick reads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetrySnapshot {
    /// Timestamp of the newest frame merged in
    pub timestamp: Timestamp,
    /// Current anchor ranges (mm)
    pub ranges: RangeSample,
    /// Last reported orientation
    pub orientation: Option<Quaternion>,
    /// Last reported pressure
    pub pressure: u16,
    /// Last reported contact signal
    pub contact: bool,
}

impl TelemetrySnapshot {
    /// Pen state with the contact rule applied
    ///
    /// The pen is down when pressure exceeds `pressure_threshold` or the
    /// explicit contact signal is set.
    pub fn pen_state(&self, pressure_threshold: u16) -> PenState {
        PenState {
            down: self.pressure > pressure_threshold || self.contact,
            pressure: self.pressure,
            orientation: self.orientation,
            timestamp: self.timestamp,
        }
    }

    fn merged(&self, frame: &TelemetryFrame) -> TelemetrySnapshot {
        TelemetrySnapshot {
            timestamp: frame.timestamp,
            ranges: match &frame.links {
                Some(links) => RangeSample::from_links(links),
                None => self.ranges.clone(),
            },
            orientation: frame.orientation.or(self.orientation),
            pressure: frame.pressure.unwrap_or(self.pressure),
            contact: frame.contact.unwrap_or(self.contact),
        }
    }
}

/// Latest-sample handoff between the transport and the tick
#[derive(Debug, Clone, Default)]
pub struct TelemetrySlot {
    snapshot: Option<TelemetrySnapshot>,
    next_page_level: bool,
    pending_pages: u16,
}

impl TelemetrySlot {
    /// Empty slot; ticks block until the first frame
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a frame into the slot
    ///
    /// Returns `false` if the frame was older than the current snapshot and
    /// therefore ignored.
    pub fn ingest(&mut self, frame: &TelemetryFrame) -> bool {
        let next = match &self.snapshot {
            Some(current) if frame.timestamp < current.timestamp => {
                log_debug!(
                    "Stale frame ignored: {} < {}",
                    frame.timestamp,
                    current.timestamp
                );
                return false;
            }
            Some(current) => current.merged(frame),
            None => TelemetrySnapshot::default().merged(frame),
        };
        self.snapshot = Some(next);

        let level = frame.next_page.unwrap_or(false);
        if level && !self.next_page_level {
            self.pending_pages = self.pending_pages.saturating_add(1);
        }
        self.next_page_level = level;

        true
    }

    /// Current snapshot, if any frame has arrived
    pub fn snapshot(&self) -> Option<&TelemetrySnapshot> {
        self.snapshot.as_ref()
    }

    /// Page turns latched since the last call
    pub fn take_page_turns(&mut self) -> u16 {
        core::mem::take(&mut self.pending_pages)
    }

    /// Page turns latched but not yet taken
    pub fn pending_page_turns(&self) -> u16 {
        self.pending_pages
    }

    /// Forget the snapshot and any latched page turns
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
