//! Bastion Simulation Core
//!
//! Координационный слой поведения юнитов:
//! - generic FSM (movement + damage на каждого юнита)
//! - EventBus: immediate + deferred (flush раз в tick)
//! - ControllerRegistry: стратегии управления по тегу + owned юниты
//! - Unit: composition root над всем этим
//!
//! Rendering, pathfinding и editor UI — снаружи (host engine);
//! ядро отдаёт velocity/speed и принимает tick через Bevy FixedUpdate.

use bevy::prelude::*;

// Публичные модули
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod fsm;
pub mod logger;
pub mod systems;
pub mod unit;
pub mod world;

// Re-export базовых типов для удобства
pub use config::{AiConfig, SimulationConfig, UnitTemplate};
pub use controller::{
    AiController, Controller, ControllerKind, ControllerRegistry, ControllerType, Roster, UserController,
};
pub use error::{ControllerError, UnitError};
pub use events::{BroadcastReport, EventBus, EventKind, EventPayload, FlushReport, SubscriptionId, UnitEvent};
pub use fsm::StateMachine;
pub use logger::{log, log_error, log_info, log_warning};
pub use systems::UnitPlugin;
pub use unit::{DamageState, Lifecycle, MovementState, TickOutcome, Unit, UnitId, UnitSnapshot};
pub use world::{StepReport, UnitWorld};

/// Главный plugin симуляции (config + тайминг + юниты)
#[derive(Default)]
pub struct SimulationPlugin {
    pub config: SimulationConfig,
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(self.config.tick_hz))
            .insert_resource(self.config.clone())
            .add_plugins(UnitPlugin);
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    logger::init_logger();

    let config = SimulationConfig {
        seed,
        ..Default::default()
    };

    app.add_plugins(MinimalPlugins)
        .add_plugins(SimulationPlugin { config });

    app
}
