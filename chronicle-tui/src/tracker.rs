//! Scroll-position tracking.
//!
//! Derives the active event from viewport geometry. The computation itself
//! is the pure [`active_index`]; [`ScrollTracker`] wraps it in a scroll
//! subscription and keeps the current index, updating it with a
//! compare-and-set whenever a notification arrives.

use crate::viewport::ScrollSubscription;

/// Fraction of the viewport height that counts as "at the top" or
/// "at the bottom" of the document.
pub const EDGE_FRACTION: f64 = 0.1;

/// Vertical extent of a rendered card, in document rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardRect {
    pub top: f64,
    pub height: f64,
}

impl CardRect {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn middle(&self) -> f64 {
        self.top + self.height / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn contains(&self, row: f64) -> bool {
        row >= self.top && row < self.bottom()
    }
}

/// Geometry needed for one recomputation.
#[derive(Debug, Clone, Copy)]
pub struct ScrollSnapshot<'a> {
    pub offset: f64,
    pub viewport_height: f64,
    pub document_height: f64,
    pub cards: &'a [CardRect],
}

/// Read-only geometry queries into the host that renders the cards.
pub trait HostGeometry {
    /// Current geometry, or `None` before the first layout.
    fn snapshot(&self) -> Option<ScrollSnapshot<'_>>;

    /// Register for scroll notifications. Dropping the subscription
    /// unregisters it.
    fn subscribe(&self) -> ScrollSubscription;
}

/// Index of the card considered in focus.
///
/// Returns `None` when there are no cards.
pub fn active_index(snapshot: &ScrollSnapshot<'_>) -> Option<usize> {
    let last = snapshot.cards.len().checked_sub(1)?;
    let edge = snapshot.viewport_height * EDGE_FRACTION;

    if snapshot.offset <= edge {
        return Some(0);
    }
    if snapshot.offset + snapshot.viewport_height >= snapshot.document_height - edge {
        return Some(last);
    }

    let viewport_middle = snapshot.offset + snapshot.viewport_height / 2.0;
    let mut closest = 0;
    let mut min_distance = f64::INFINITY;
    for (index, card) in snapshot.cards.iter().enumerate() {
        let distance = (card.middle() - viewport_middle).abs();
        if distance < min_distance {
            min_distance = distance;
            closest = index;
        }
    }
    Some(closest)
}

/// Keeps the active event index in sync with scroll notifications.
#[derive(Debug)]
pub struct ScrollTracker {
    subscription: ScrollSubscription,
    active: usize,
}

impl ScrollTracker {
    /// Subscribe to `host` and run the initial computation.
    pub fn mount<H: HostGeometry>(host: &H) -> Self {
        let mut tracker = Self {
            subscription: host.subscribe(),
            active: 0,
        };
        tracker.recompute(host);
        tracker
    }

    pub fn active(&self) -> usize {
        self.active
    }

    /// Recompute if a notification arrived since the last poll.
    ///
    /// Returns the new index when it changed.
    pub fn poll<H: HostGeometry>(&mut self, host: &H) -> Option<usize> {
        if !self.subscription.take_notification() {
            return None;
        }
        self.recompute(host)
    }

    /// Forget the current index (the event collection was replaced).
    pub fn reset<H: HostGeometry>(&mut self, host: &H) {
        self.active = 0;
        self.recompute(host);
    }

    fn recompute<H: HostGeometry>(&mut self, host: &H) -> Option<usize> {
        let snapshot = host.snapshot()?;
        let next = active_index(&snapshot)?;
        if next == self.active {
            return None;
        }
        self.active = next;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::CardLayout;
    use crate::viewport::Viewport;

    /// `count` cards of `height` rows separated by `gap`, starting at `top`.
    fn even_cards(count: usize, top: f64, height: f64, gap: f64) -> Vec<CardRect> {
        (0..count)
            .map(|i| CardRect::new(top + i as f64 * (height + gap), height))
            .collect()
    }

    fn snapshot(offset: f64, viewport: f64, document: f64, cards: &[CardRect]) -> ScrollSnapshot<'_> {
        ScrollSnapshot {
            offset,
            viewport_height: viewport,
            document_height: document,
            cards,
        }
    }

    #[test]
    fn test_top_of_document_selects_first() {
        let cards = even_cards(10, 2.0, 8.0, 1.0);
        assert_eq!(active_index(&snapshot(0.0, 30.0, 94.0, &cards)), Some(0));
        // Within the top edge (10% of 30 rows).
        assert_eq!(active_index(&snapshot(3.0, 30.0, 94.0, &cards)), Some(0));
    }

    #[test]
    fn test_top_clamp_ignores_geometry() {
        // The second card fills the viewport, but offset 0 still wins.
        let cards = vec![CardRect::new(500.0, 5.0), CardRect::new(0.0, 40.0)];
        assert_eq!(active_index(&snapshot(0.0, 40.0, 600.0, &cards)), Some(0));
    }

    #[test]
    fn test_bottom_of_document_selects_last() {
        let cards = even_cards(10, 2.0, 8.0, 1.0);
        let document = 94.0;
        let viewport = 30.0;
        assert_eq!(
            active_index(&snapshot(document - viewport, viewport, document, &cards)),
            Some(9)
        );
        // Inside the bottom edge.
        assert_eq!(
            active_index(&snapshot(document - viewport - 2.5, viewport, document, &cards)),
            Some(9)
        );
    }

    #[test]
    fn test_centered_card_is_active() {
        let cards = even_cards(20, 2.0, 8.0, 2.0);
        let document = 2.0 + 20.0 * 10.0;
        let viewport = 24.0;
        for k in 3..16 {
            let offset = cards[k].middle() - viewport / 2.0;
            assert_eq!(
                active_index(&snapshot(offset, viewport, document, &cards)),
                Some(k),
                "viewport centred on card {k}"
            );
        }
    }

    #[test]
    fn test_ties_resolve_to_lowest_index() {
        let cards = vec![
            CardRect::new(0.0, 10.0),
            CardRect::new(40.0, 10.0),
            CardRect::new(60.0, 10.0),
            CardRect::new(200.0, 10.0),
        ];
        // Viewport middle at 55: cards 1 and 2 are both 10 rows away.
        assert_eq!(active_index(&snapshot(45.0, 20.0, 300.0, &cards)), Some(1));
    }

    #[test]
    fn test_no_cards_is_none() {
        assert_eq!(active_index(&snapshot(50.0, 20.0, 100.0, &[])), None);
    }

    fn layout(cards: Vec<CardRect>, document_height: f64) -> CardLayout {
        CardLayout {
            cards,
            document_height,
        }
    }

    #[test]
    fn test_tracker_follows_scroll_notifications() {
        let mut viewport = Viewport::new();
        viewport.set_layout(20.0, layout(even_cards(10, 2.0, 8.0, 2.0), 102.0));
        let mut tracker = ScrollTracker::mount(&viewport);
        assert_eq!(tracker.active(), 0);
        assert_eq!(tracker.poll(&viewport), None);

        viewport.scroll_to_bottom();
        assert_eq!(tracker.poll(&viewport), Some(9));
        assert_eq!(tracker.active(), 9);

        // Same index again is not reported as a change.
        viewport.scroll_by(-1.0);
        assert_eq!(tracker.poll(&viewport), None);
        assert_eq!(tracker.active(), 9);
    }

    #[test]
    fn test_tracker_without_layout_is_a_no_op() {
        let mut viewport = Viewport::new();
        let mut tracker = ScrollTracker::mount(&viewport);
        viewport.scroll_by(10.0);
        assert_eq!(tracker.poll(&viewport), None);
        assert_eq!(tracker.active(), 0);
    }

    #[test]
    fn test_dropping_tracker_releases_subscription() {
        let viewport = Viewport::new();
        let tracker = ScrollTracker::mount(&viewport);
        assert_eq!(viewport.listener_count(), 1);
        drop(tracker);
        assert_eq!(viewport.listener_count(), 0);
    }

    #[test]
    fn test_subscription_released_on_unwind() {
        let viewport = Viewport::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _tracker = ScrollTracker::mount(&viewport);
            panic!("component torn down abnormally");
        }));
        assert!(result.is_err());
        assert_eq!(viewport.listener_count(), 0);
    }
}
