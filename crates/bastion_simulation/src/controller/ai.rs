//! AiController — wander AI для Enemy юнитов
//!
//! Политика (раз в `wander_interval_ticks` на юнита):
//! - с вероятностью `wander_chance` выбираем случайное горизонтальное направление → Moving
//! - иначе стоим → Idle
//!
//! Мёртвых (damage FSM = Dead) держим на месте.
//! RNG — общий seeded ChaCha8 из UnitWorld (детерминизм).

use std::collections::HashMap;

use bevy::math::Vec3;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::config::AiConfig;
use crate::controller::{Controller, ControllerKind, Roster};
use crate::unit::{MovementState, Unit, UnitId};

pub struct AiController {
    config: AiConfig,
    roster: Roster,
    /// Тиков до следующего решения (per unit)
    countdowns: HashMap<UnitId, u32>,
}

impl AiController {
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            roster: Roster::new(),
            countdowns: HashMap::new(),
        }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    fn wander(&self, unit: &mut Unit, rng: &mut ChaCha8Rng) {
        if rng.gen::<f32>() < self.config.wander_chance {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let direction = Vec3::new(angle.cos(), 0.0, angle.sin());
            unit.set_velocity(direction * unit.speed());
            if unit.movement().is_in(MovementState::Idle) {
                unit.movement_mut().transition(MovementState::Moving);
            }
        } else {
            unit.halt();
        }
    }
}

impl Controller for AiController {
    fn kind(&self) -> ControllerKind {
        ControllerKind::Ai
    }

    fn roster(&self) -> &Roster {
        &self.roster
    }

    fn roster_mut(&mut self) -> &mut Roster {
        &mut self.roster
    }

    fn control(&mut self, unit: &mut Unit, rng: &mut ChaCha8Rng) {
        if unit.is_dead() || !unit.is_active() {
            unit.halt();
            return;
        }

        let countdown = self.countdowns.entry(unit.id()).or_insert(0);
        if *countdown > 0 {
            *countdown -= 1;
            return;
        }
        // Текущий tick — первый из интервала
        *countdown = self.config.wander_interval_ticks.saturating_sub(1);

        self.wander(unit, rng);
    }

    fn on_unregistered(&mut self, unit: UnitId) {
        self.countdowns.remove(&unit);
    }
}
