//! Headless симуляция Bastion
//!
//! Спавнит гарнизон + волну врагов, гоняет tick'и без рендера.

use bevy::prelude::*;
use bastion_simulation::{create_headless_app, ControllerType, EventKind, UnitTemplate, UnitWorld};

fn main() {
    let seed = 42;
    println!("Starting Bastion headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);

    {
        let mut world = app.world_mut().resource_mut::<UnitWorld>();

        world.bus().subscribe(EventKind::UnitDied, |_, event| {
            println!("☠️ {} died", event.unit);
            Ok(())
        });

        let spawned = [
            world.spawn(&UnitTemplate::fortress("Keep", 1000.0)),
            world.spawn(&UnitTemplate::user("Hero", 150.0)),
            world.spawn(&UnitTemplate::enemy("Goblin", 30.0)),
            world.spawn(&UnitTemplate::enemy("Orc", 80.0)),
        ];
        for result in spawned {
            if let Err(err) = result {
                eprintln!("Spawn failed: {}", err);
            }
        }
    }

    // Запускаем 600 тиков симуляции, каждые 100 тиков — урон всем врагам
    for tick in 0..600 {
        app.world_mut().run_schedule(FixedUpdate);

        if tick % 100 == 0 {
            let mut world = app.world_mut().resource_mut::<UnitWorld>();
            let ids: Vec<_> = world
                .units()
                .filter(|unit| unit.controller_type() == ControllerType::Enemy)
                .map(|unit| unit.id())
                .collect();
            for id in ids {
                if let Err(err) = world.damage(id, 25.0) {
                    eprintln!("Damage failed: {}", err);
                }
            }
            println!("Tick {}: {} units", tick, world.unit_count());
        }
    }

    app.world_mut().resource_mut::<UnitWorld>().shutdown();
    println!("Simulation complete!");
}
