//! Host application lifecycle notifications.
//!
//! The host posts lifecycle events (currently only "entered background")
//! and interested parties subscribe with a callback. A subscription is a
//! guard: dropping it unsubscribes, so observers scoped to one transition
//! can never outlive it.
//!
//! State is thread-local, matching the single UI thread the engine runs on.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Lifecycle events the host environment broadcasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// The application was suspended / moved to the background.
    DidEnterBackground,
}

type SubscriberId = u64;
type Callback = Rc<dyn Fn(LifecycleEvent)>;

thread_local! {
    static SUBSCRIBERS: RefCell<Vec<(SubscriberId, Callback)>> = const { RefCell::new(Vec::new()) };
    static NEXT_ID: Cell<SubscriberId> = const { Cell::new(0) };
}

/// Guard for a lifecycle subscription. Unsubscribes on drop.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: SubscriberId,
}

impl Subscription {
    /// Explicitly end the subscription. Same as dropping it.
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let id = self.id;
        // try_with: the thread-local may already be gone during thread teardown
        let _ = SUBSCRIBERS.try_with(|subs| {
            subs.borrow_mut().retain(|(sub_id, _)| *sub_id != id);
        });
        log::trace!("lifecycle subscription {} released", id);
    }
}

/// Register a callback for lifecycle events posted on this thread.
pub fn subscribe<F>(callback: F) -> Subscription
where
    F: Fn(LifecycleEvent) + 'static,
{
    let id = NEXT_ID.with(|next| {
        let id = next.get();
        next.set(id + 1);
        id
    });
    SUBSCRIBERS.with(|subs| subs.borrow_mut().push((id, Rc::new(callback))));
    log::trace!("lifecycle subscription {} registered", id);
    Subscription { id }
}

/// Deliver an event to every current subscriber.
///
/// Subscribers are snapshotted first, so a callback may drop its own (or any
/// other) subscription, or subscribe again, while being notified.
pub fn post(event: LifecycleEvent) {
    let callbacks: Vec<Callback> =
        SUBSCRIBERS.with(|subs| subs.borrow().iter().map(|(_, cb)| cb.clone()).collect());
    log::debug!(
        "posting {:?} to {} lifecycle subscriber(s)",
        event,
        callbacks.len()
    );
    for callback in callbacks {
        callback(event);
    }
}

/// Number of live subscriptions on this thread.
pub fn subscriber_count() -> usize {
    SUBSCRIBERS.with(|subs| subs.borrow().len())
}
