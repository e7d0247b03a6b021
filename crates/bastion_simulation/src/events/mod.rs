//! Events module — publish/subscribe шина юнитов
//!
//! Два режима доставки:
//! - `broadcast` — синхронный fan-out подписчикам до возврата из вызова
//! - `delayed_broadcast` — очередь, доставка в `flush_delayed` (раз в tick)
//!
//! Lifecycle события (init/died) идут immediate, изменения атрибутов — deferred.

pub mod bus;
pub mod kinds;


pub use bus::{BroadcastReport, EventBus, EventHandler, FlushReport, HandlerFailure, SubscriptionId};
pub use kinds::{EventKind, EventPayload, UnitEvent};
