//! UserController — юниты под вводом игрока (User + Fortress теги).

use bevy::math::Vec3;
use rand_chacha::ChaCha8Rng;

use crate::controller::{Controller, ControllerKind, Roster};
use crate::unit::{MovementState, Unit};

/// Применяет последний input вектор ко всем owned юнитам с `can_move_with_input`
#[derive(Default)]
pub struct UserController {
    roster: Roster,
    input: Vec3,
}

impl UserController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> Vec3 {
        self.input
    }
}

impl Controller for UserController {
    fn kind(&self) -> ControllerKind {
        ControllerKind::User
    }

    fn roster(&self) -> &Roster {
        &self.roster
    }

    fn roster_mut(&mut self) -> &mut Roster {
        &mut self.roster
    }

    /// Input от хоста (ось движения, не нормализуется)
    fn receive_input(&mut self, input: Vec3) -> bool {
        self.input = input;
        true
    }

    fn control(&mut self, unit: &mut Unit, _rng: &mut ChaCha8Rng) {
        // Fortress и прочие юниты без ввода — стоят
        if unit.is_dead() || !unit.is_active() || !unit.can_move_with_input() {
            unit.halt();
            return;
        }

        if self.input == Vec3::ZERO {
            unit.halt();
            return;
        }

        unit.set_velocity(self.input * unit.speed());
        if unit.movement().is_in(MovementState::Idle) {
            unit.movement_mut().transition(MovementState::Moving);
        }
    }
}
