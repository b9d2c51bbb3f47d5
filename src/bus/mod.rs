//! Bus domain: typed publish/subscribe channels between the scene and the app.
//!
//! Two independent channels live in [`EventBus`]: `world` carries scene events
//! to the application, `commands` carries application commands to the scene.
//! Delivery is synchronous and in registration order. There is no queueing or
//! replay, so a subscriber registered after an emission never sees it.

mod events;


pub use events::*;

use bevy::prelude::*;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Subscribes a handler to every event name on a channel.
pub const WILDCARD: &str = "*";

type Handler<E> = Box<dyn FnMut(&E) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber<E> {
    id: SubscriptionId,
    name: &'static str,
    handler: Handler<E>,
}

/// Multi-producer, multi-subscriber registry keyed by event name.
pub struct Channel<E> {
    next_id: u64,
    subscribers: Vec<Subscriber<E>>,
}

impl<E> Default for Channel<E> {
    fn default() -> Self {
        Self {
            next_id: 0,
            subscribers: Vec::new(),
        }
    }
}

impl<E> std::fmt::Debug for Channel<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.subscribers.iter().map(|s| s.name).collect();
        f.debug_struct("Channel").field("subscribers", &names).finish()
    }
}

impl<E: BusEvent> Channel<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&mut self, name: &'static str, handler: F) -> SubscriptionId
    where
        F: FnMut(&E) + Send + Sync + 'static,
    {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push(Subscriber {
            id,
            name,
            handler: Box::new(handler),
        });
        id
    }

    /// Removes a subscription. Returns false if it was already gone.
    pub fn off(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Delivers the event to every matching handler and returns how many ran.
    pub fn emit(&mut self, event: &E) -> usize {
        let name = event.name();
        let mut delivered = 0;
        for subscriber in &mut self.subscribers {
            if subscriber.name == name || subscriber.name == WILDCARD {
                (subscriber.handler)(event);
                delivered += 1;
            }
        }
        delivered
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.subscribers
            .iter()
            .filter(|s| s.name == name || s.name == WILDCARD)
            .count()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<E: BusEvent + Clone + Send + 'static> Channel<E> {
    /// Routes every named event into `inbox`, returning the handles for teardown.
    pub fn subscribe_inbox(&mut self, names: &[&'static str], inbox: &Inbox<E>) -> SubscriptionSet {
        let mut set = SubscriptionSet::default();
        for name in names {
            set.push(self.on(*name, inbox.sink()));
        }
        set
    }
}

/// Handles registered by one owner, released together on teardown.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    ids: Vec<SubscriptionId>,
}

impl SubscriptionSet {
    pub fn push(&mut self, id: SubscriptionId) {
        self.ids.push(id);
    }

    /// Unsubscribes everything. Safe to call more than once.
    pub fn release<E: BusEvent>(&mut self, channel: &mut Channel<E>) -> usize {
        self.ids.drain(..).filter(|id| channel.off(*id)).count()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A mailbox handler target: the handler copies events in, the owner drains them.
pub struct Inbox<E> {
    queue: Arc<Mutex<VecDeque<E>>>,
}

impl<E> Clone for Inbox<E> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
        }
    }
}

impl<E> Default for Inbox<E> {
    fn default() -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
        }
    }
}

impl<E> std::fmt::Debug for Inbox<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inbox").field("pending", &self.len()).finish()
    }
}

impl<E> Inbox<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<E> {
        lock(&self.queue).drain(..).collect()
    }

    pub fn clear(&self) {
        lock(&self.queue).clear();
    }

    pub fn len(&self) -> usize {
        lock(&self.queue).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: Clone + Send + 'static> Inbox<E> {
    pub fn sink(&self) -> impl FnMut(&E) + Send + Sync + 'static {
        let queue = Arc::clone(&self.queue);
        move |event: &E| lock(&queue).push_back(event.clone())
    }
}

fn lock<E>(queue: &Mutex<VecDeque<E>>) -> MutexGuard<'_, VecDeque<E>> {
    queue.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Both channels, alive for the whole app so the scene can be remounted freely.
#[derive(Resource, Debug, Default)]
pub struct EventBus {
    pub world: Channel<WorldEvent>,
    pub commands: Channel<SceneCommand>,
}

pub struct BusPlugin;

impl Plugin for BusPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EventBus>();
    }
}
