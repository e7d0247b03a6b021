//! UnitWorld — per-tick driver для юнитов
//!
//! # Architecture
//! - Владеет EventBus, ControllerRegistry, живыми юнитами и seeded RNG
//! - Tick (порядок фиксирован, см. UnitPlugin):
//!   1. control_units — контроллеры решают по owned юнитам
//!   2. tick_units — юниты проверяют health ≤ 0
//!   3. destroy_doomed — teardown + удаление запросивших уничтожения
//!   4. flush_delayed — ровно один flush deferred событий после всех тиков
//! - Все операции синхронные, в пределах одного tick

use std::collections::BTreeMap;

use bevy::math::Vec3;
use bevy::prelude::Resource;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::{SimulationConfig, UnitTemplate};
use crate::controller::{ControllerRegistry, ControllerType};
use crate::error::UnitError;
use crate::events::{EventBus, FlushReport};
use crate::logger;
use crate::unit::{TickOutcome, Unit, UnitId, UnitSnapshot};

/// Итог одного `step`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    pub destroyed: Vec<UnitId>,
    pub flushed: FlushReport,
}

#[derive(Resource)]
pub struct UnitWorld {
    bus: EventBus,
    controllers: ControllerRegistry,
    units: BTreeMap<UnitId, Unit>,
    /// Запросили уничтожение на этом tick
    doomed: Vec<UnitId>,
    next_id: u64,
    rng: ChaCha8Rng,
    seed: u64,
    tick: u64,
}

impl UnitWorld {
    pub fn new(config: &SimulationConfig) -> Self {
        Self::with_registry(config.seed, ControllerRegistry::with_defaults(config.ai.clone()))
    }

    /// Мир с произвольным registry (тесты, кастомные контроллеры)
    pub fn with_registry(seed: u64, controllers: ControllerRegistry) -> Self {
        Self {
            bus: EventBus::new(),
            controllers,
            units: BTreeMap::new(),
            doomed: Vec::new(),
            next_id: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            tick: 0,
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn controllers(&self) -> &ControllerRegistry {
        &self.controllers
    }

    pub fn controllers_mut(&mut self) -> &mut ControllerRegistry {
        &mut self.controllers
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Сколько тиков прошло
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    // ========================================================================
    // Units
    // ========================================================================

    /// Создаёт юнита из шаблона и сразу делает init.
    ///
    /// Если init упал (нет контроллера) — юнит в мир не попадает.
    pub fn spawn(&mut self, template: &UnitTemplate) -> Result<UnitId, UnitError> {
        self.next_id += 1;
        let id = UnitId::new(self.next_id);

        let mut unit = Unit::new(id, template);
        unit.init(&self.bus, &mut self.controllers)?;
        self.units.insert(id, unit);
        Ok(id)
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Урон: health -= amount через уведомляющий setter (без clamp)
    pub fn damage(&mut self, id: UnitId, amount: f32) -> Result<f32, UnitError> {
        let unit = self.units.get_mut(&id).ok_or(UnitError::UnknownUnit(id))?;
        let health = unit.health() - amount;
        unit.set_health(&self.bus, health);
        Ok(health)
    }

    /// Внешний destroy сигнал: teardown немедленно, юнит удаляется из мира
    ///
    /// Как и `destroy_doomed`: юнит удаляется даже при ошибке teardown.
    pub fn despawn(&mut self, id: UnitId) -> Result<(), UnitError> {
        let mut unit = self.units.remove(&id).ok_or(UnitError::UnknownUnit(id))?;
        self.doomed.retain(|doomed| *doomed != id);
        unit.request_destroy();
        unit.teardown(&self.bus, &mut self.controllers)
    }

    /// Input игрока → контроллер User/Fortress
    pub fn set_user_input(&mut self, input: Vec3) -> bool {
        match self.controllers.resolve(ControllerType::User) {
            Ok(controller) => controller.receive_input(input),
            Err(err) => {
                logger::log_warning(&format!("⚠️ User input dropped: {}", err));
                false
            }
        }
    }

    // ========================================================================
    // Tick phases
    // ========================================================================

    /// Фаза 1: каждый контроллер решает по своим owned юнитам
    pub fn control_units(&mut self) {
        for kind in self.controllers.active_kinds() {
            let Some(controller) = self.controllers.get_mut(kind) else {
                continue;
            };

            // Snapshot: политика может менять roster
            for id in controller.roster().snapshot() {
                if let Some(unit) = self.units.get_mut(&id) {
                    controller.control(unit, &mut self.rng);
                }
            }
        }
    }

    /// Фаза 2: Unit::tick для всех, собираем запросы на уничтожение
    pub fn tick_units(&mut self) {
        for unit in self.units.values_mut() {
            if unit.tick() == TickOutcome::DestroyRequested {
                self.doomed.push(unit.id());
            }
        }
    }

    /// Фаза 3: teardown + удаление (destruction primitive)
    pub fn destroy_doomed(&mut self) -> Vec<UnitId> {
        let doomed = std::mem::take(&mut self.doomed);
        let mut destroyed = Vec::with_capacity(doomed.len());

        for id in doomed {
            let Some(unit) = self.units.get_mut(&id) else {
                continue;
            };
            if let Err(err) = unit.teardown(&self.bus, &mut self.controllers) {
                logger::log_error(&format!("❌ Destroy of {} failed: {}", id, err));
            }
            self.units.remove(&id);
            destroyed.push(id);
        }

        destroyed
    }

    /// Фаза 4: единственный flush deferred событий за tick
    pub fn flush_events(&mut self) -> FlushReport {
        self.tick += 1;
        self.bus.flush_delayed()
    }

    /// Полный tick (все фазы по порядку)
    pub fn step(&mut self) -> StepReport {
        self.control_units();
        self.tick_units();
        let destroyed = self.destroy_doomed();
        let flushed = self.flush_events();
        StepReport { destroyed, flushed }
    }

    /// Срез всех юнитов в порядке UnitId
    pub fn snapshot(&self) -> Vec<UnitSnapshot> {
        self.units.values().map(Unit::snapshot).collect()
    }

    /// Конец сессии: teardown всех юнитов, затем shutdown registry
    pub fn shutdown(&mut self) {
        let ids: Vec<UnitId> = self.units.keys().copied().collect();
        for id in ids {
            if let Err(err) = self.despawn(id) {
                logger::log_error(&format!("❌ Shutdown teardown of {} failed: {}", id, err));
                self.units.remove(&id);
            }
        }
        self.bus.flush_delayed();
        self.controllers.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::config::AiConfig;
    use crate::controller::ControllerKind;
    use crate::error::ControllerError;
    use crate::events::{EventKind, UnitEvent};
    use crate::unit::Lifecycle;

    fn world() -> UnitWorld {
        UnitWorld::new(&SimulationConfig::default())
    }

    fn capture(world: &UnitWorld, kind: EventKind) -> Arc<Mutex<Vec<UnitEvent>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        world.bus().subscribe(kind, move |_, event| {
            sink.lock().unwrap().push(event.clone());
            Ok(())
        });
        seen
    }

    #[test]
    fn test_spawn_assigns_sequential_ids() {
        let mut world = world();
        let a = world.spawn(&UnitTemplate::enemy("A", 10.0)).unwrap();
        let b = world.spawn(&UnitTemplate::enemy("B", 10.0)).unwrap();

        assert_eq!(a, UnitId::new(1));
        assert_eq!(b, UnitId::new(2));
        assert_eq!(world.unit_count(), 2);
        assert_eq!(world.unit(a).unwrap().lifecycle(), Lifecycle::Active);
    }

    #[test]
    fn test_spawn_failure_leaves_world_untouched() {
        let mut world = UnitWorld::with_registry(1, ControllerRegistry::new());

        let err = world.spawn(&UnitTemplate::enemy("A", 10.0)).unwrap_err();

        assert_eq!(
            err,
            UnitError::Controller(ControllerError::Unresolved(ControllerType::Enemy))
        );
        assert_eq!(world.unit_count(), 0);
    }

    #[test]
    fn test_step_destroys_depleted_units_and_flushes_once() {
        let mut world = world();
        let died = capture(&world, EventKind::UnitDied);
        let health = capture(&world, EventKind::UnitHealthChanged);
        let doomed = world.spawn(&UnitTemplate::enemy("Doomed", 10.0)).unwrap();
        let survivor = world.spawn(&UnitTemplate::enemy("Survivor", 10.0)).unwrap();

        world.damage(doomed, 4.0).unwrap();
        world.damage(doomed, 6.0).unwrap();
        world.damage(survivor, 1.0).unwrap();

        let report = world.step();

        assert_eq!(report.destroyed, vec![doomed]);
        assert_eq!(report.flushed.dispatched, 3);
        assert_eq!(*died.lock().unwrap(), vec![UnitEvent::died(doomed)]);
        assert_eq!(health.lock().unwrap().len(), 3);
        assert!(world.unit(doomed).is_none());
        assert_eq!(world.controllers().owner_of(doomed), None);
        assert_eq!(world.controllers().owner_of(survivor), Some(ControllerKind::Ai));
        assert_eq!(world.tick_count(), 1);
    }

    #[test]
    fn test_damage_unknown_unit() {
        let mut world = world();
        assert_eq!(
            world.damage(UnitId::new(77), 1.0),
            Err(UnitError::UnknownUnit(UnitId::new(77)))
        );
    }

    #[test]
    fn test_despawn_is_immediate() {
        let mut world = world();
        let died = capture(&world, EventKind::UnitDied);
        let id = world.spawn(&UnitTemplate::user("Hero", 100.0)).unwrap();

        world.despawn(id).unwrap();

        assert_eq!(died.lock().unwrap().len(), 1);
        assert!(world.unit(id).is_none());
        assert_eq!(world.controllers().owner_of(id), None);
        assert_eq!(world.despawn(id), Err(UnitError::UnknownUnit(id)));
    }

    #[test]
    fn test_despawn_removes_unit_even_if_teardown_fails() {
        let mut world = world();
        let died = capture(&world, EventKind::UnitDied);
        let id = world.spawn(&UnitTemplate::enemy("Orc", 100.0)).unwrap();

        // Membership снесена в обход юнита → teardown упадёт на unregister
        world.controllers_mut().unregister(ControllerType::Enemy, id).unwrap();

        assert_eq!(
            world.despawn(id),
            Err(UnitError::Controller(ControllerError::NotRegistered {
                unit: id,
                controller: ControllerKind::Ai,
            }))
        );
        assert!(world.unit(id).is_none());
        assert_eq!(world.unit_count(), 0);
        assert!(died.lock().unwrap().is_empty());
        assert!(world.step().destroyed.is_empty());
    }

    #[test]
    fn test_user_input_moves_user_units() {
        let mut world = world();
        let hero = world.spawn(&UnitTemplate::user("Hero", 100.0)).unwrap();
        let keep = world.spawn(&UnitTemplate::fortress("Keep", 500.0)).unwrap();

        assert!(world.set_user_input(Vec3::X));
        world.step();

        let speed = world.unit(hero).unwrap().speed();
        assert_eq!(world.unit(hero).unwrap().velocity(), Vec3::X * speed);
        assert_eq!(world.unit(keep).unwrap().velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_handler_failure_does_not_break_step() {
        let mut world = world();
        world
            .bus()
            .subscribe(EventKind::UnitHealthChanged, |_, _| anyhow::bail!("hud offline"));
        let id = world.spawn(&UnitTemplate::enemy("A", 10.0)).unwrap();
        world.damage(id, 1.0).unwrap();

        let report = world.step();

        assert_eq!(report.flushed.failures.len(), 1);
        assert!(world.unit(id).is_some());
    }

    #[test]
    fn test_shutdown_tears_everything_down() {
        let mut world = UnitWorld::with_registry(
            5,
            ControllerRegistry::with_defaults(AiConfig::default()),
        );
        let died = capture(&world, EventKind::UnitDied);
        world.spawn(&UnitTemplate::enemy("A", 10.0)).unwrap();
        world.spawn(&UnitTemplate::user("B", 10.0)).unwrap();

        world.shutdown();

        assert_eq!(world.unit_count(), 0);
        assert_eq!(died.lock().unwrap().len(), 2);
        assert!(world.controllers().is_shut_down());
        assert!(world.spawn(&UnitTemplate::enemy("Late", 10.0)).is_err());
    }
}
