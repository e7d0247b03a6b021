//! Domain events юнитов.

use crate::unit::UnitId;

/// Вид события (ключ подписки)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    UnitInitialized,
    UnitDied,
    UnitHealthChanged,
    UnitManaChanged,
    UnitLevelChanged,
}

/// Контекст события: значение атрибута на момент присваивания
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventPayload {
    None,
    Health(f32),
    Mana(f32),
    Level(i32),
}

/// Событие на шине: вид + эмитирующий юнит + payload
#[derive(Debug, Clone, PartialEq)]
pub struct UnitEvent {
    pub kind: EventKind,
    pub unit: UnitId,
    pub payload: EventPayload,
}

impl UnitEvent {
    pub fn new(kind: EventKind, unit: UnitId) -> Self {
        Self {
            kind,
            unit,
            payload: EventPayload::None,
        }
    }

    pub fn initialized(unit: UnitId) -> Self {
        Self::new(EventKind::UnitInitialized, unit)
    }

    pub fn died(unit: UnitId) -> Self {
        Self::new(EventKind::UnitDied, unit)
    }

    pub fn health_changed(unit: UnitId, health: f32) -> Self {
        Self {
            kind: EventKind::UnitHealthChanged,
            unit,
            payload: EventPayload::Health(health),
        }
    }

    pub fn mana_changed(unit: UnitId, mana: f32) -> Self {
        Self {
            kind: EventKind::UnitManaChanged,
            unit,
            payload: EventPayload::Mana(mana),
        }
    }

    pub fn level_changed(unit: UnitId, level: i32) -> Self {
        Self {
            kind: EventKind::UnitLevelChanged,
            unit,
            payload: EventPayload::Level(level),
        }
    }
}
