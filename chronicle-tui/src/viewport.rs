//! The card pane viewport.
//!
//! Owns everything the tracker reads about the "page": scroll offset,
//! viewport height, document height and the card rectangles from the last
//! layout pass. Every change is published on a `watch` channel, which
//! coalesces bursts of scrolling into a single pending notification per
//! subscriber.

use tokio::sync::watch;

use crate::layout::CardLayout;
use crate::tracker::{CardRect, HostGeometry, ScrollSnapshot};

/// Fraction of the remaining distance covered per frame by a smooth scroll.
const SMOOTH_FACTOR: f64 = 0.35;
/// Distance (rows) under which a smooth scroll snaps to its target.
const SNAP_DISTANCE: f64 = 0.5;

/// Receiving end of the viewport's scroll notifications.
///
/// Dropping it unregisters the listener.
#[derive(Debug)]
pub struct ScrollSubscription {
    rx: watch::Receiver<u64>,
}

impl ScrollSubscription {
    /// Consume the pending notification, if any.
    pub fn take_notification(&mut self) -> bool {
        match self.rx.has_changed() {
            Ok(true) => {
                self.rx.borrow_and_update();
                true
            }
            // A closed channel means the viewport is gone; nothing to track.
            Ok(false) | Err(_) => false,
        }
    }
}

/// Navigation into the rendered card list.
pub trait ScrollHost {
    /// Smoothly scroll card `index` to the centre of the viewport.
    ///
    /// Returns `false` (and does nothing) when the card is not rendered.
    fn scroll_into_view(&mut self, index: usize) -> bool;
}

/// An in-flight smooth scroll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothScroll {
    pub index: usize,
    pub target: f64,
}

#[derive(Debug)]
pub struct Viewport {
    offset: f64,
    height: f64,
    document_height: f64,
    cards: Vec<CardRect>,
    laid_out: bool,
    pending: Option<SmoothScroll>,
    notifier: watch::Sender<u64>,
    generation: u64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    pub fn new() -> Self {
        let (notifier, _) = watch::channel(0);
        Self {
            offset: 0.0,
            height: 0.0,
            document_height: 0.0,
            cards: Vec::new(),
            laid_out: false,
            pending: None,
            notifier,
            generation: 0,
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn document_height(&self) -> f64 {
        self.document_height
    }

    pub fn cards(&self) -> &[CardRect] {
        &self.cards
    }

    pub fn pending(&self) -> Option<SmoothScroll> {
        self.pending
    }

    /// Number of live scroll subscriptions.
    #[cfg(test)]
    pub fn listener_count(&self) -> usize {
        self.notifier.receiver_count()
    }

    fn max_offset(&self) -> f64 {
        (self.document_height - self.height).max(0.0)
    }

    fn notify(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.notifier.send_replace(self.generation);
    }

    /// Install a fresh layout (new events or a resized pane).
    pub fn set_layout(&mut self, height: f64, layout: CardLayout) {
        self.height = height.max(0.0);
        self.document_height = layout.document_height;
        self.cards = layout.cards;
        self.laid_out = true;
        self.offset = self.offset.clamp(0.0, self.max_offset());

        // Re-aim an in-flight scroll at the card's new position.
        if let Some(pending) = self.pending.take() {
            self.scroll_into_view(pending.index);
        }
        self.notify();
    }

    /// Index of the card covering document row `row`.
    pub fn card_at(&self, row: f64) -> Option<usize> {
        self.cards.iter().position(|card| card.contains(row))
    }

    fn set_offset(&mut self, offset: f64) {
        let offset = offset.clamp(0.0, self.max_offset());
        if offset != self.offset {
            self.offset = offset;
            self.notify();
        }
    }

    /// Scroll directly by `delta` rows, cancelling any smooth scroll.
    pub fn scroll_by(&mut self, delta: f64) {
        self.pending = None;
        self.set_offset(self.offset + delta);
    }

    pub fn page_down(&mut self) {
        self.scroll_by((self.height - 2.0).max(1.0));
    }

    pub fn page_up(&mut self) {
        self.scroll_by(-(self.height - 2.0).max(1.0));
    }

    pub fn scroll_to_top(&mut self) {
        self.pending = None;
        self.set_offset(0.0);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.pending = None;
        self.set_offset(self.max_offset());
    }

    /// Advance the smooth scroll by one frame.
    pub fn tick(&mut self) {
        let Some(pending) = self.pending else {
            return;
        };
        let remaining = pending.target - self.offset;
        if remaining.abs() < SNAP_DISTANCE {
            self.pending = None;
            self.set_offset(pending.target);
        } else {
            self.set_offset(self.offset + remaining * SMOOTH_FACTOR);
        }
    }

    /// First document row visible at the top of the pane.
    pub fn first_visible_row(&self) -> i64 {
        self.offset.floor() as i64
    }
}

impl ScrollHost for Viewport {
    fn scroll_into_view(&mut self, index: usize) -> bool {
        if !self.laid_out {
            return false;
        }
        let Some(card) = self.cards.get(index) else {
            return false;
        };
        let target = (card.middle() - self.height / 2.0).clamp(0.0, self.max_offset());
        tracing::debug!(index, target, "scroll into view");
        self.pending = Some(SmoothScroll { index, target });
        true
    }
}

impl HostGeometry for Viewport {
    fn snapshot(&self) -> Option<ScrollSnapshot<'_>> {
        if !self.laid_out {
            return None;
        }
        Some(ScrollSnapshot {
            offset: self.offset,
            viewport_height: self.height,
            document_height: self.document_height,
            cards: &self.cards,
        })
    }

    fn subscribe(&self) -> ScrollSubscription {
        ScrollSubscription {
            rx: self.notifier.subscribe(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::ScrollTracker;

    fn laid_out(cards: usize) -> Viewport {
        let rects: Vec<CardRect> = (0..cards)
            .map(|i| CardRect::new(2.0 + i as f64 * 10.0, 9.0))
            .collect();
        let document_height = 2.0 + cards as f64 * 10.0 + 1.0;
        let mut viewport = Viewport::new();
        viewport.set_layout(
            20.0,
            CardLayout {
                cards: rects,
                document_height,
            },
        );
        viewport
    }

    fn settle(viewport: &mut Viewport) {
        for _ in 0..100 {
            viewport.tick();
        }
    }

    #[test]
    fn test_scroll_into_view_centres_card() {
        let mut viewport = laid_out(10);
        assert!(viewport.scroll_into_view(5));
        let pending = viewport.pending().unwrap();
        assert_eq!(pending.index, 5);
        // Card 5 middle = 52 + 4.5; minus half the viewport.
        assert_eq!(pending.target, 56.5 - 10.0);

        settle(&mut viewport);
        assert_eq!(viewport.offset(), 46.5);
        assert_eq!(viewport.pending(), None);
    }

    #[test]
    fn test_scroll_into_view_clamps_to_document() {
        let mut viewport = laid_out(10);
        viewport.scroll_into_view(0);
        assert_eq!(viewport.pending().unwrap().target, 0.0);
        viewport.scroll_into_view(9);
        assert_eq!(viewport.pending().unwrap().target, viewport.document_height() - 20.0);
    }

    #[test]
    fn test_most_recent_request_wins() {
        let mut viewport = laid_out(10);
        viewport.scroll_into_view(8);
        viewport.tick();
        viewport.scroll_into_view(3);
        assert_eq!(viewport.pending().unwrap().index, 3);

        settle(&mut viewport);
        assert_eq!(viewport.offset(), 36.5 - 10.0);
    }

    #[test]
    fn test_navigation_before_layout_is_a_no_op() {
        let mut viewport = Viewport::new();
        assert!(!viewport.scroll_into_view(0));
        assert_eq!(viewport.pending(), None);
    }

    #[test]
    fn test_navigation_to_missing_card_is_a_no_op() {
        let mut viewport = laid_out(3);
        assert!(!viewport.scroll_into_view(3));
        assert_eq!(viewport.pending(), None);
    }

    #[test]
    fn test_direct_scroll_cancels_smooth_scroll() {
        let mut viewport = laid_out(10);
        viewport.scroll_into_view(6);
        viewport.scroll_by(1.0);
        assert_eq!(viewport.pending(), None);
        assert_eq!(viewport.offset(), 1.0);
    }

    #[test]
    fn test_offsets_are_clamped() {
        let mut viewport = laid_out(10);
        viewport.scroll_by(-5.0);
        assert_eq!(viewport.offset(), 0.0);
        viewport.scroll_by(10_000.0);
        assert_eq!(viewport.offset(), viewport.document_height() - viewport.height());
    }

    #[test]
    fn test_smooth_scroll_lands_on_centred_card() {
        let mut viewport = laid_out(10);
        let mut tracker = ScrollTracker::mount(&viewport);
        viewport.scroll_into_view(4);
        for _ in 0..100 {
            viewport.tick();
            tracker.poll(&viewport);
        }
        assert_eq!(tracker.active(), 4);
    }

    #[test]
    fn test_card_hit_testing() {
        let viewport = laid_out(3);
        assert_eq!(viewport.card_at(0.0), None);
        assert_eq!(viewport.card_at(2.0), Some(0));
        assert_eq!(viewport.card_at(11.0), None);
        assert_eq!(viewport.card_at(12.5), Some(1));
    }

    #[test]
    fn test_bursts_coalesce_into_one_notification() {
        let mut viewport = laid_out(10);
        let mut subscription = viewport.subscribe();
        viewport.scroll_by(1.0);
        viewport.scroll_by(1.0);
        viewport.scroll_by(1.0);
        assert!(subscription.take_notification());
        assert!(!subscription.take_notification());
    }

    #[test]
    fn test_relayout_clamps_offset_and_notifies() {
        let mut viewport = laid_out(10);
        viewport.scroll_to_bottom();
        let mut subscription = viewport.subscribe();
        viewport.set_layout(
            20.0,
            CardLayout {
                cards: vec![CardRect::new(2.0, 9.0)],
                document_height: 13.0,
            },
        );
        assert_eq!(viewport.offset(), 0.0);
        assert!(subscription.take_notification());
    }
}
