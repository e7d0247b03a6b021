//! EventBus — subscriber table + deferred queue
//!
//! # Architecture
//! - Подписчики хранятся по EventKind в порядке подписки
//! - Broadcast итерирует по SNAPSHOT списка → handler может подписываться,
//!   отписываться и делать re-entrant broadcast без deadlock/порчи итерации
//! - Deferred очередь забирается целиком (`mem::take`) до dispatch:
//!   события из handler'ов во время flush уходят в СЛЕДУЮЩИЙ flush
//!
//! Mutex держится только на время snapshot/push, handler вызывается без lock.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::events::{EventKind, UnitEvent};
use crate::logger;

/// Handler подписчика. Получает шину (для re-entrant broadcast) и событие.
///
/// `Err` и panic изолируются: логируются, попадают в report, доставка продолжается.
pub type EventHandler = Arc<dyn Fn(&EventBus, &UnitEvent) -> anyhow::Result<()> + Send + Sync>;

/// Handle подписки (нужен для unsubscribe)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// Упавший handler
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerFailure {
    pub subscription: SubscriptionId,
    pub event: UnitEvent,
    pub message: String,
}

/// Итог immediate broadcast
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BroadcastReport {
    /// Сколько handler'ов вызвано (включая упавшие)
    pub delivered: usize,
    pub failures: Vec<HandlerFailure>,
}

impl BroadcastReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Итог flush_delayed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlushReport {
    /// Сколько deferred событий отправлено
    pub dispatched: usize,
    /// Сколько handler вызовов суммарно
    pub delivered: usize,
    pub failures: Vec<HandlerFailure>,
}

impl FlushReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

struct Subscriber {
    id: SubscriptionId,
    handler: EventHandler,
}

#[derive(Default)]
struct BusState {
    next_id: u64,
    subscribers: HashMap<EventKind, Vec<Subscriber>>,
    pending: Vec<UnitEvent>,
}

/// Шина событий юнитов (один экземпляр на UnitWorld, в тестах — свой на тест)
#[derive(Default)]
pub struct EventBus {
    state: Mutex<BusState>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, BusState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Подписка на `kind`. Handler'ы вызываются в порядке подписки.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&EventBus, &UnitEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let mut state = self.state();
        state.next_id += 1;
        let id = SubscriptionId(state.next_id);
        state.subscribers.entry(kind).or_default().push(Subscriber {
            id,
            handler: Arc::new(handler),
        });
        id
    }

    /// Отписка. `false` если такой подписки на `kind` нет.
    ///
    /// Во время broadcast не влияет на уже взятый snapshot — только на следующий.
    pub fn unsubscribe(&self, kind: EventKind, id: SubscriptionId) -> bool {
        let mut state = self.state();
        let Some(subscribers) = state.subscribers.get_mut(&kind) else {
            return false;
        };

        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        let removed = subscribers.len() != before;

        if subscribers.is_empty() {
            state.subscribers.remove(&kind);
        }
        removed
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.state().subscribers.get(&kind).map_or(0, Vec::len)
    }

    /// Синхронная доставка всем текущим подписчикам `event.kind`.
    ///
    /// Нет подписчиков → no-op (пустой report).
    pub fn broadcast(&self, event: UnitEvent) -> BroadcastReport {
        let handlers = self.snapshot(event.kind);
        let mut report = BroadcastReport::default();

        for (id, handler) in handlers {
            report.delivered += 1;
            let message = match panic::catch_unwind(AssertUnwindSafe(|| handler(self, &event))) {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => format!("{:#}", err),
                Err(payload) => format!("handler panicked: {}", panic_message(payload.as_ref())),
            };

            logger::log_error(&format!(
                "❌ EventBus: handler {} failed on {:?} (unit {}): {}",
                id, event.kind, event.unit, message
            ));
            report.failures.push(HandlerFailure {
                subscription: id,
                event: event.clone(),
                message,
            });
        }

        report
    }

    /// Ставит событие в deferred очередь (без немедленной доставки)
    pub fn delayed_broadcast(&self, event: UnitEvent) {
        self.state().pending.push(event);
    }

    pub fn pending_len(&self) -> usize {
        self.state().pending.len()
    }

    /// Доставляет все накопленные deferred события в порядке постановки.
    ///
    /// Очередь забирается атомарно до dispatch: всё, что handler'ы ставят
    /// в очередь во время flush, будет доставлено в следующем flush.
    pub fn flush_delayed(&self) -> FlushReport {
        let pending = std::mem::take(&mut self.state().pending);
        let mut report = FlushReport::default();

        for event in pending {
            let broadcast = self.broadcast(event);
            report.dispatched += 1;
            report.delivered += broadcast.delivered;
            report.failures.extend(broadcast.failures);
        }

        report
    }

    fn snapshot(&self, kind: EventKind) -> Vec<(SubscriptionId, EventHandler)> {
        self.state()
            .subscribers
            .get(&kind)
            .map(|subs| subs.iter().map(|s| (s.id, Arc::clone(&s.handler))).collect())
            .unwrap_or_default()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "<non-string panic>"
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        let subscribers: usize = state.subscribers.values().map(Vec::len).sum();
        f.debug_struct("EventBus")
            .field("subscribers", &subscribers)
            .field("pending", &state.pending.len())
            .finish()
    }
}
