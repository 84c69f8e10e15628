//! Pan-to-marker effect for the spot editor map.
//!
//! Selecting a marker queues a focus request; once the short settle delay
//! has elapsed the request resolves to a concrete position and becomes a
//! [`PanCommand`] for the map widget. The delay keeps the pan from racing the
//! widget's own animation after a click.

use std::time::{Duration, Instant};

use crate::marker::{LatLng, Marker, MarkerIndex};

/// Delay between a selection change and the resulting pan.
pub const DEFAULT_FOCUS_DELAY: Duration = Duration::from_millis(50);

/// Instruction to move the map viewport without changing zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanCommand {
    pub target: MarkerIndex,
    pub position: LatLng,
}

#[derive(Debug, Clone, Copy)]
struct PendingFocus {
    index: MarkerIndex,
    due: Instant,
}

/// Holds at most one outstanding focus request.
#[derive(Debug, Clone)]
pub struct MarkerFocus {
    delay: Duration,
    pending: Option<PendingFocus>,
}

impl Default for MarkerFocus {
    fn default() -> Self {
        Self::with_delay(DEFAULT_FOCUS_DELAY)
    }
}

impl MarkerFocus {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Queue a pan to `index`, replacing any earlier request.
    pub fn request(&mut self, index: MarkerIndex, now: Instant) {
        self.pending = Some(PendingFocus {
            index,
            due: now + self.delay,
        });
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Keep a queued request pointing at the same marker after the
    /// additional marker at `removed` is deleted.
    ///
    /// A request for the removed marker is dropped; requests for later
    /// markers shift down by one.
    pub fn after_removal(&mut self, removed: usize) {
        let Some(pending) = self.pending else {
            return;
        };
        match pending.index {
            MarkerIndex::Additional(i) if i == removed => self.pending = None,
            MarkerIndex::Additional(i) if i > removed => {
                self.pending = Some(PendingFocus {
                    index: MarkerIndex::Additional(i - 1),
                    ..pending
                });
            }
            _ => {}
        }
    }

    /// Resolve the pending request if it is due.
    ///
    /// Returns `None` while the delay is still running. A due request whose
    /// marker no longer exists (e.g. removed in the meantime) is dropped.
    pub fn poll(&mut self, now: Instant, primary: LatLng, coordinates: &[Marker]) -> Option<PanCommand> {
        let pending = self.pending?;
        if now < pending.due {
            return None;
        }
        self.pending = None;

        let position = match pending.index {
            MarkerIndex::Primary => primary,
            MarkerIndex::Additional(i) => match coordinates.get(i) {
                Some(marker) => marker.position(),
                None => {
                    tracing::debug!(
                        index = i,
                        len = coordinates.len(),
                        "Skipping focus on marker that no longer exists"
                    );
                    return None;
                }
            },
        };

        if !position.is_finite() {
            tracing::debug!(target = %pending.index, "Skipping focus on marker without a position");
            return None;
        }

        Some(PanCommand {
            target: pending.index,
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers() -> Vec<Marker> {
        vec![Marker::new(54.6, 26.1, "Marker 2"), Marker::new(54.7, 26.2, "Marker 3")]
    }

    #[test]
    fn test_focus_waits_for_delay() {
        let start = Instant::now();
        let mut focus = MarkerFocus::default();
        focus.request(MarkerIndex::Additional(1), start);

        assert!(focus.poll(start, LatLng::new(0.0, 0.0), &markers()).is_none());
        assert!(focus.is_pending());

        let cmd = focus
            .poll(start + DEFAULT_FOCUS_DELAY, LatLng::new(0.0, 0.0), &markers())
            .expect("focus should resolve once due");
        assert_eq!(cmd.target, MarkerIndex::Additional(1));
        assert_eq!(cmd.position, LatLng::new(54.7, 26.2));
        assert!(!focus.is_pending());
    }

    #[test]
    fn test_focus_on_primary_uses_spot_position() {
        let start = Instant::now();
        let mut focus = MarkerFocus::with_delay(Duration::ZERO);
        focus.request(MarkerIndex::Primary, start);

        let cmd = focus.poll(start, LatLng::new(54.5, 26.0), &[]).unwrap();
        assert_eq!(cmd.position, LatLng::new(54.5, 26.0));
    }

    #[test]
    fn test_focus_skips_out_of_range_index() {
        let start = Instant::now();
        let mut focus = MarkerFocus::with_delay(Duration::ZERO);
        focus.request(MarkerIndex::Additional(5), start);

        assert!(focus.poll(start, LatLng::new(0.0, 0.0), &markers()).is_none());
        assert!(!focus.is_pending(), "stale request must be dropped");
    }

    #[test]
    fn test_newer_request_replaces_older() {
        let start = Instant::now();
        let mut focus = MarkerFocus::with_delay(Duration::ZERO);
        focus.request(MarkerIndex::Additional(0), start);
        focus.request(MarkerIndex::Primary, start);

        let cmd = focus.poll(start, LatLng::new(1.0, 2.0), &markers()).unwrap();
        assert_eq!(cmd.target, MarkerIndex::Primary);
    }

    #[test]
    fn test_removal_drops_or_shifts_pending_request() {
        let start = Instant::now();
        let mut focus = MarkerFocus::with_delay(Duration::ZERO);

        focus.request(MarkerIndex::Additional(1), start);
        focus.after_removal(1);
        assert!(!focus.is_pending());

        focus.request(MarkerIndex::Additional(1), start);
        focus.after_removal(0);
        let cmd = focus.poll(start, LatLng::new(0.0, 0.0), &markers()).unwrap();
        assert_eq!(cmd.target, MarkerIndex::Additional(0));
        assert_eq!(cmd.position, LatLng::new(54.6, 26.1));

        focus.request(MarkerIndex::Primary, start);
        focus.after_removal(0);
        assert_eq!(
            focus.poll(start, LatLng::new(1.0, 2.0), &markers()).unwrap().target,
            MarkerIndex::Primary
        );
    }

    #[test]
    fn test_primary_without_position_is_skipped() {
        let start = Instant::now();
        let mut focus = MarkerFocus::with_delay(Duration::ZERO);
        focus.request(MarkerIndex::Primary, start);

        assert!(focus.poll(start, LatLng::new(f64::NAN, f64::NAN), &[]).is_none());
    }
}
