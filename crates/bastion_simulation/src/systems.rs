//! Bevy systems — тонкие обёртки над фазами UnitWorld.

use bevy::prelude::*;

use crate::config::SimulationConfig;
use crate::logger;
use crate::world::UnitWorld;

/// Unit Plugin
///
/// Регистрирует UnitWorld и фазы tick в FixedUpdate.
/// Порядок выполнения:
/// 1. control_units — контроллеры (AI wander, user input)
/// 2. tick_units — проверка health ≤ 0
/// 3. destroy_depleted_units — teardown + удаление
/// 4. flush_delayed_events — ровно один flush deferred событий за tick
pub struct UnitPlugin;

impl Plugin for UnitPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<SimulationConfig>()
            .cloned()
            .unwrap_or_default();

        logger::set_log_level(config.log_level);

        app.insert_resource(UnitWorld::new(&config)).add_systems(
            FixedUpdate,
            (
                control_units,
                tick_units,
                destroy_depleted_units,
                flush_delayed_events,
            )
                .chain(), // Последовательное выполнение для детерминизма
        );
    }
}

/// Система: per-tick решения контроллеров
pub fn control_units(mut world: ResMut<UnitWorld>) {
    world.control_units();
}

/// Система: Unit::tick для всех живых юнитов
pub fn tick_units(mut world: ResMut<UnitWorld>) {
    world.tick_units();
}

/// Система: уничтожение юнитов, запросивших destroy на этом tick
pub fn destroy_depleted_units(mut world: ResMut<UnitWorld>) {
    let destroyed = world.destroy_doomed();
    if !destroyed.is_empty() {
        logger::log(&format!(
            "🗑️ Tick {}: destroyed {:?}",
            world.tick_count(),
            destroyed
        ));
    }
}

/// Система: flush deferred событий (после всех тиков юнитов)
pub fn flush_delayed_events(mut world: ResMut<UnitWorld>) {
    let report = world.flush_events();
    if !report.is_clean() {
        logger::log_warning(&format!(
            "⚠️ Tick {}: {} handler failures during flush",
            world.tick_count(),
            report.failures.len()
        ));
    }
}
