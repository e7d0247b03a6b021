//! Unit lifecycle integration test
//!
//! Полный путь через Bevy App: spawn → tick → урон → destroy → UnitDied
//!
//! Проверяем:
//! - UnitInitialized синхронно на spawn
//! - HealthChanged висит в очереди до flush (flush — последняя фаза tick)
//! - UnitDied + удаление из roster контроллера после health ≤ 0

use std::sync::{Arc, Mutex};

use bevy::prelude::*;
use bastion_simulation::*;

type Seen = Arc<Mutex<Vec<UnitEvent>>>;

fn capture(world: &UnitWorld, kind: EventKind) -> Seen {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    world.bus().subscribe(kind, move |_, event| {
        sink.lock().unwrap().push(event.clone());
        Ok(())
    });
    seen
}

fn run_tick(app: &mut App) {
    app.world_mut().run_schedule(FixedUpdate);
}

#[test]
fn test_unit_dies_through_app_ticks() {
    let mut app = create_headless_app(42);

    let (initialized, health, died, id) = {
        let mut world = app.world_mut().resource_mut::<UnitWorld>();
        let initialized = capture(&world, EventKind::UnitInitialized);
        let health = capture(&world, EventKind::UnitHealthChanged);
        let died = capture(&world, EventKind::UnitDied);

        let id = world.spawn(&UnitTemplate::enemy("Orc", 100.0)).unwrap();
        (initialized, health, died, id)
    };

    // Init — синхронно
    assert_eq!(*initialized.lock().unwrap(), vec![UnitEvent::initialized(id)]);
    {
        let world = app.world().resource::<UnitWorld>();
        let unit = world.unit(id).unwrap();
        assert_eq!(unit.movement().current_state(), MovementState::Idle);
        assert_eq!(unit.damage().current_state(), DamageState::Idle);
        assert_eq!(world.controllers().owner_of(id), Some(ControllerKind::Ai));
    }

    // Урон до нуля: событие в очереди, юнит ещё жив
    app.world_mut()
        .resource_mut::<UnitWorld>()
        .damage(id, 100.0)
        .unwrap();
    assert!(health.lock().unwrap().is_empty());
    assert_eq!(app.world().resource::<UnitWorld>().bus().pending_len(), 1);

    run_tick(&mut app);

    let world = app.world().resource::<UnitWorld>();
    assert_eq!(health.lock().unwrap().len(), 1);
    assert_eq!(health.lock().unwrap()[0].payload, EventPayload::Health(0.0));
    assert_eq!(*died.lock().unwrap(), vec![UnitEvent::died(id)]);
    assert!(world.unit(id).is_none());
    assert_eq!(world.controllers().owner_of(id), None);
    assert_eq!(world.tick_count(), 1);
}

#[test]
fn test_events_from_flush_handlers_wait_one_tick() {
    let mut app = create_headless_app(7);

    let (levels, id) = {
        let mut world = app.world_mut().resource_mut::<UnitWorld>();

        // HealthChanged → deferred LevelChanged (не в том же flush)
        world.bus().subscribe(EventKind::UnitHealthChanged, |bus, event| {
            bus.delayed_broadcast(UnitEvent::level_changed(event.unit, 2));
            Ok(())
        });
        let levels = capture(&world, EventKind::UnitLevelChanged);

        let id = world.spawn(&UnitTemplate::user("Hero", 100.0)).unwrap();
        world.damage(id, 10.0).unwrap();
        (levels, id)
    };

    run_tick(&mut app);
    assert!(levels.lock().unwrap().is_empty());

    run_tick(&mut app);
    assert_eq!(*levels.lock().unwrap(), vec![UnitEvent::level_changed(id, 2)]);
}

#[test]
fn test_garrison_survives_many_ticks() {
    let mut app = create_headless_app(42);

    let ids: Vec<UnitId> = {
        let mut world = app.world_mut().resource_mut::<UnitWorld>();
        vec![
            world.spawn(&UnitTemplate::fortress("Keep", 1000.0)).unwrap(),
            world.spawn(&UnitTemplate::user("Hero", 150.0)).unwrap(),
            world.spawn(&UnitTemplate::enemy("Goblin", 30.0)).unwrap(),
        ]
    };

    for tick in 0..1000 {
        run_tick(&mut app);

        // Инварианты каждые 100 тиков
        if tick % 100 == 0 {
            let world = app.world().resource::<UnitWorld>();
            for id in &ids {
                let unit = world.unit(*id).unwrap();
                assert!(unit.is_active(), "{} inactive at tick {}", id, tick);
                assert_eq!(world.controllers().owner_of(*id), unit.controller());
            }
        }
    }

    let world = app.world().resource::<UnitWorld>();
    assert_eq!(world.unit_count(), 3);
    assert_eq!(world.tick_count(), 1000);
    // Fortress стоит на месте
    assert_eq!(world.unit(ids[0]).unwrap().velocity(), Vec3::ZERO);
}

#[test]
fn test_simulation_config_drives_world() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins).add_plugins(SimulationPlugin {
        config: SimulationConfig {
            seed: 99,
            tick_hz: 30.0,
            log_level: logger::LogLevel::Error,
            ai: AiConfig::default(),
        },
    });

    assert_eq!(app.world().resource::<UnitWorld>().seed(), 99);
    assert_eq!(app.world().resource::<SimulationConfig>().tick_hz, 30.0);
}
