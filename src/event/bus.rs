//! Synchronous publish/subscribe for robot events
//!
//! `publish` invokes every callback subscribed to the event's tag, in subscription
//! order, before returning. There is no queueing and no threading.

use ahash::AHashMap;

use super::{EventTag, RobotEvent};

/// Returned by [`EventBus::subscribe`]; pass to [`EventBus::unsubscribe`] to cancel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

type Callback = Box<dyn FnMut(&RobotEvent)>;

struct Subscription {
    handle: SubscriptionHandle,
    callback: Callback,
}

#[derive(Default)]
pub struct EventBus {
    subscriptions: AHashMap<EventTag, Vec<Subscription>>,
    next_handle: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        tag: EventTag,
        callback: impl FnMut(&RobotEvent) + 'static,
    ) -> SubscriptionHandle {
        let handle = SubscriptionHandle(self.next_handle);
        self.next_handle += 1;

        self.subscriptions.entry(tag).or_default().push(Subscription {
            handle,
            callback: Box::new(callback),
        });

        handle
    }

    /// Returns false if the handle was not subscribed
    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) -> bool {
        for subs in self.subscriptions.values_mut() {
            if let Some(pos) = subs.iter().position(|s| s.handle == handle) {
                subs.remove(pos);
                return true;
            }
        }
        false
    }

    /// Deliver an event to every subscriber of its tag; returns the delivery count
    pub fn publish(&mut self, event: &RobotEvent) -> usize {
        let Some(subs) = self.subscriptions.get_mut(&event.tag) else {
            tracing::debug!(tag = ?event.tag, "Event published with no subscribers");
            return 0;
        };

        for sub in subs.iter_mut() {
            (sub.callback)(event);
        }
        subs.len()
    }

    pub fn subscriber_count(&self, tag: EventTag) -> usize {
        self.subscriptions.get(&tag).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: Vec<(EventTag, usize)> = self
            .subscriptions
            .iter()
            .map(|(tag, subs)| (*tag, subs.len()))
            .collect();
        f.debug_struct("EventBus").field("subscriptions", &counts).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_publish_reaches_only_matching_tag() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = seen.clone();
        bus.subscribe(EventTag::CliffDetected, move |e| sink.borrow_mut().push(e.tag));

        assert_eq!(bus.publish(&RobotEvent::new(EventTag::CliffDetected)), 1);
        assert_eq!(bus.publish(&RobotEvent::new(EventTag::FaceObserved)), 0);
        assert_eq!(*seen.borrow(), vec![EventTag::CliffDetected]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));

        let sink = count.clone();
        let handle = bus.subscribe(EventTag::PetDetected, move |_| *sink.borrow_mut() += 1);

        bus.publish(&RobotEvent::new(EventTag::PetDetected));
        assert!(bus.unsubscribe(handle));
        assert!(!bus.unsubscribe(handle));
        bus.publish(&RobotEvent::new(EventTag::PetDetected));

        assert_eq!(*count.borrow(), 1);
        assert_eq!(bus.subscriber_count(EventTag::PetDetected), 0);
    }
}
