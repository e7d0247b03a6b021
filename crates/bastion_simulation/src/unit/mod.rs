//! Unit — композиция двух FSM, ссылки на контроллер и атрибутов
//!
//! Lifecycle: Uninitialized → (init) → Active → (health ≤ 0 / destroy) →
//! TearingDown → (teardown) → Gone.
//!
//! - init: FSM wiring, register в контроллере, UnitInitialized (immediate)
//! - tick: health ≤ 0 → запрос на уничтожение
//! - teardown: unregister, UnitDied (immediate)
//! - setters health/mana/level → deferred *Changed события

pub mod actor;
pub mod states;


pub use actor::{TickOutcome, Unit, UnitSnapshot};
pub use states::{DamageState, Lifecycle, MovementState, UnitId};
