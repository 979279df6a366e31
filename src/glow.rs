//! Pointer-tracking glow overlay.
//!
//! Pointer moves are published to a [`PointerHub`]. A [`GlowOverlay`] holds
//! a [`PointerSubscription`] for as long as it lives and releases it when
//! dropped, so the listener is scoped to the overlay rather than global.

use std::sync::Arc;

use parking_lot::Mutex;

/// Last known pointer coordinates, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerPosition {
    pub x: f32,
    pub y: f32,
}

impl PointerPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

// ============================================================================
// PointerHub
// ============================================================================

/// One subscription's single-slot mailbox.
struct Slot {
    id: u64,
    tx: flume::Sender<PointerPosition>,
    rx: flume::Receiver<PointerPosition>,
}

impl Slot {
    /// Stores `position`, replacing any move the subscriber has not read yet.
    fn offer(&self, position: PointerPosition) -> bool {
        match self.tx.try_send(position) {
            Ok(()) => true,
            Err(flume::TrySendError::Full(position)) => {
                let _ = self.rx.try_recv();
                self.tx.try_send(position).is_ok()
            }
            Err(flume::TrySendError::Disconnected(_)) => false,
        }
    }
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: Vec<Slot>,
}

/// Fan-out of pointer-move events to live subscriptions.
#[derive(Clone, Default)]
pub struct PointerHub {
    registry: Arc<Mutex<Registry>>,
}

impl PointerHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener; it stays registered until the subscription drops.
    ///
    /// Only the newest unread move is kept per subscription.
    pub fn subscribe(&self) -> PointerSubscription {
        let (tx, rx) = flume::bounded(1);
        let mut registry = self.registry.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.subscribers.push(Slot {
            id,
            tx,
            rx: rx.clone(),
        });
        PointerSubscription {
            id,
            rx,
            registry: Arc::clone(&self.registry),
        }
    }

    /// Delivers a pointer move to every subscription.
    pub fn publish(&self, x: f32, y: f32) {
        let position = PointerPosition::new(x, y);
        self.registry
            .lock()
            .subscribers
            .retain(|slot| slot.offer(position));
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.registry.lock().subscribers.len()
    }
}

/// A registered pointer listener. Unsubscribes on drop.
pub struct PointerSubscription {
    id: u64,
    rx: flume::Receiver<PointerPosition>,
    registry: Arc<Mutex<Registry>>,
}

impl PointerSubscription {
    /// Takes the most recent unread position.
    pub fn latest(&self) -> Option<PointerPosition> {
        self.rx.try_recv().ok()
    }

    /// Number of unread moves; never more than one.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

impl Drop for PointerSubscription {
    fn drop(&mut self) {
        self.registry
            .lock()
            .subscribers
            .retain(|slot| slot.id != self.id);
    }
}

// ============================================================================
// GlowOverlay
// ============================================================================

/// Decorative glow centered on the pointer.
pub struct GlowOverlay {
    subscription: PointerSubscription,
    position: PointerPosition,
}

impl GlowOverlay {
    /// Starts tracking the pointer. Tracking stops when the overlay drops.
    pub fn attach(hub: &PointerHub) -> Self {
        Self {
            subscription: hub.subscribe(),
            position: PointerPosition::default(),
        }
    }

    /// Applies pending pointer moves. Returns true if the position changed.
    pub fn sync(&mut self) -> bool {
        match self.subscription.latest() {
            Some(position) if position != self.position => {
                self.position = position;
                true
            }
            _ => false,
        }
    }

    pub fn position(&self) -> PointerPosition {
        self.position
    }

    /// The two CSS gradients drawn at the pointer: a wide soft halo and a
    /// fine dot grid.
    pub fn gradients(&self) -> [String; 2] {
        let PointerPosition { x, y } = self.position;
        [
            format!(
                "radial-gradient(600px circle at {x}px {y}px, rgba(56, 189, 248, 0.15), transparent 40%)"
            ),
            format!("radial-gradient(2px 2px at {x}px {y}px, rgba(56, 189, 248, 0.5), transparent)"),
        ]
    }

    /// Tile size of the dot-grid gradient.
    pub fn dot_grid_size(&self) -> &'static str {
        "4px 4px"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_tracks_pointer() {
        let hub = PointerHub::new();
        let mut glow = GlowOverlay::attach(&hub);
        assert!(glow.gradients()[0].contains("at 0px 0px"));

        hub.publish(10.0, 20.0);
        hub.publish(120.5, 48.0);
        assert!(glow.sync());
        assert_eq!(glow.position(), PointerPosition::new(120.5, 48.0));

        let [halo, dots] = glow.gradients();
        assert!(halo.starts_with("radial-gradient(600px circle at 120.5px 48px"));
        assert!(dots.contains("at 120.5px 48px"));
    }

    #[test]
    fn sync_without_moves_is_noop() {
        let hub = PointerHub::new();
        let mut glow = GlowOverlay::attach(&hub);
        assert!(!glow.sync());
        hub.publish(0.0, 0.0);
        assert!(!glow.sync());
    }

    #[test]
    fn unread_moves_are_coalesced() {
        let hub = PointerHub::new();
        let mut glow = GlowOverlay::attach(&hub);

        for i in 0..10_000 {
            hub.publish(i as f32, 1.0);
        }
        assert_eq!(glow.subscription.pending(), 1);
        assert_eq!(hub.subscriber_count(), 1);

        assert!(glow.sync());
        assert_eq!(glow.position(), PointerPosition::new(9_999.0, 1.0));
        assert_eq!(glow.subscription.pending(), 0);
    }

    #[test]
    fn dropping_overlay_unsubscribes() {
        let hub = PointerHub::new();
        let first = GlowOverlay::attach(&hub);
        let second = GlowOverlay::attach(&hub);
        assert_eq!(hub.subscriber_count(), 2);

        drop(first);
        assert_eq!(hub.subscriber_count(), 1);

        drop(second);
        assert_eq!(hub.subscriber_count(), 0);
        hub.publish(1.0, 1.0);
    }
}
