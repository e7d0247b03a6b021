//! Идентификатор юнита и enum-состояния его FSM.

use std::fmt;

use serde::Serialize;

use crate::fsm::StateMachine;

/// Stable ID юнита внутри UnitWorld
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UnitId(u64);

impl UnitId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

/// Movement FSM: Init → Idle ⇄ Moving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MovementState {
    Init,
    Idle,
    Moving,
}

impl MovementState {
    pub fn machine() -> StateMachine<Self> {
        let mut fsm = StateMachine::new(Self::Init);
        fsm.add_transition(Self::Init, Self::Idle);
        fsm.add_transition(Self::Idle, Self::Moving);
        fsm.add_transition(Self::Moving, Self::Idle);
        fsm
    }
}

/// Damage FSM: Init → Idle, Dead достижим из любого состояния
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DamageState {
    Init,
    Idle,
    Dead,
}

impl DamageState {
    pub fn machine() -> StateMachine<Self> {
        let mut fsm = StateMachine::new(Self::Init);
        fsm.add_transition(Self::Init, Self::Idle);
        // Смерть прерывает что угодно
        fsm.add_transition_from_any(Self::Dead);
        fsm
    }
}

/// Жизненный цикл юнита как объекта (не путать с FSM внутри)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Lifecycle {
    Uninitialized,
    Active,
    TearingDown,
    Gone,
}
