//! Controller module — стратегии управления юнитами
//!
//! Юнит выбирает стратегию по тегу `ControllerType`, registry отдаёт
//! единственный экземпляр на `ControllerKind` (lazy, на время сессии).
//! Контроллер трекает owned юнитов (register/unregister) и раз в tick
//! принимает решение по каждому из них.
//!
//! Теги → экземпляры:
//! - Enemy → AiController
//! - Fortress, User → один общий UserController

use bevy::math::Vec3;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

use crate::error::ControllerError;
use crate::logger;
use crate::unit::{Unit, UnitId};

pub mod ai;
pub mod registry;
pub mod roster;
pub mod user;


pub use ai::AiController;
pub use registry::{ControllerFactory, ControllerRegistry};
pub use roster::Roster;
pub use user::UserController;

/// Тег контроллера, выбираемый юнитом (данные шаблона)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub enum ControllerType {
    Enemy,
    Fortress,
    User,
}

impl Default for ControllerType {
    fn default() -> Self {
        Self::Enemy
    }
}

impl ControllerType {
    /// Какой экземпляр обслуживает этот тег
    pub fn controller_kind(self) -> ControllerKind {
        match self {
            ControllerType::Enemy => ControllerKind::Ai,
            ControllerType::Fortress | ControllerType::User => ControllerKind::User,
        }
    }
}

/// Ключ singleton экземпляра в registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ControllerKind {
    Ai,
    User,
}

/// Стратегия управления
///
/// Контракт ядра — только membership (register/unregister/owns).
/// `control` — политика конкретного контроллера, вызывается драйвером
/// для каждого owned юнита раз в tick.
pub trait Controller: Send + Sync {
    fn kind(&self) -> ControllerKind;

    fn roster(&self) -> &Roster;

    fn roster_mut(&mut self) -> &mut Roster;

    /// Решение на этот tick для одного owned юнита
    fn control(&mut self, unit: &mut Unit, rng: &mut ChaCha8Rng);

    /// Hook для очистки per-unit состояния политики
    fn on_unregistered(&mut self, _unit: UnitId) {}

    /// Input игрока. `false` — контроллер ввод не принимает.
    fn receive_input(&mut self, _input: Vec3) -> bool {
        false
    }

    /// Добавляет юнита в owned set. Повторная регистрация — ошибка.
    fn register(&mut self, unit: UnitId) -> Result<(), ControllerError> {
        let kind = self.kind();
        self.roster_mut().insert(kind, unit)?;
        logger::log(&format!("📋 {:?} controller: registered {}", kind, unit));
        Ok(())
    }

    /// Убирает юнита из owned set. Юнит без регистрации — ошибка.
    fn unregister(&mut self, unit: UnitId) -> Result<(), ControllerError> {
        let kind = self.kind();
        self.roster_mut().remove(kind, unit)?;
        self.on_unregistered(unit);
        logger::log(&format!("🗑️ {:?} controller: unregistered {}", kind, unit));
        Ok(())
    }

    fn owns(&self, unit: UnitId) -> bool {
        self.roster().contains(unit)
    }
}
