//! ControllerRegistry — tag → singleton controller
//!
//! # Architecture
//! - Фабрики регистрируются по ControllerKind (`with_defaults` ставит AI + User)
//! - Экземпляр создаётся лениво при первом `resolve`, дальше переиспользуется
//! - Registry — явный объект (держит UnitWorld), не глобальная статика:
//!   в тестах у каждого свой registry
//! - `shutdown` = конец сессии: экземпляры удаляются, lazy re-create запрещён

use std::collections::BTreeMap;

use crate::config::AiConfig;
use crate::controller::{AiController, Controller, ControllerKind, ControllerType, UserController};
use crate::error::ControllerError;
use crate::logger;
use crate::unit::UnitId;

pub type ControllerFactory = Box<dyn Fn() -> Box<dyn Controller> + Send + Sync>;

#[derive(Default)]
pub struct ControllerRegistry {
    factories: BTreeMap<ControllerKind, ControllerFactory>,
    instances: BTreeMap<ControllerKind, Box<dyn Controller>>,
    shut_down: bool,
}

impl ControllerRegistry {
    /// Пустой registry без фабрик (каждый resolve → Unresolved)
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry со стандартными контроллерами
    pub fn with_defaults(ai_config: AiConfig) -> Self {
        let mut registry = Self::new();
        registry.register_factory(
            ControllerKind::Ai,
            Box::new(move || -> Box<dyn Controller> { Box::new(AiController::new(ai_config.clone())) }),
        );
        registry.register_factory(
            ControllerKind::User,
            Box::new(|| -> Box<dyn Controller> { Box::new(UserController::new()) }),
        );
        registry
    }

    pub fn register_factory(&mut self, kind: ControllerKind, factory: ControllerFactory) {
        self.factories.insert(kind, factory);
    }

    /// Единственный экземпляр для тега (создаётся при первом обращении)
    pub fn resolve(&mut self, tag: ControllerType) -> Result<&mut dyn Controller, ControllerError> {
        if self.shut_down {
            return Err(ControllerError::Unresolved(tag));
        }

        let kind = tag.controller_kind();
        if !self.instances.contains_key(&kind) {
            let factory = self
                .factories
                .get(&kind)
                .ok_or(ControllerError::Unresolved(tag))?;
            self.instances.insert(kind, factory());
            logger::log_info(&format!("🎮 Controller {:?} created (tag {:?})", kind, tag));
        }

        let controller: &mut dyn Controller = &mut **self
            .instances
            .get_mut(&kind)
            .ok_or(ControllerError::Unresolved(tag))?;
        Ok(controller)
    }

    /// Уже созданный экземпляр (без lazy создания)
    pub fn get(&self, kind: ControllerKind) -> Option<&dyn Controller> {
        let controller: &dyn Controller = &**self.instances.get(&kind)?;
        Some(controller)
    }

    pub fn get_mut(&mut self, kind: ControllerKind) -> Option<&mut dyn Controller> {
        let controller: &mut dyn Controller = &mut **self.instances.get_mut(&kind)?;
        Some(controller)
    }

    /// Kinds созданных экземпляров (детерминированный порядок)
    pub fn active_kinds(&self) -> Vec<ControllerKind> {
        self.instances.keys().copied().collect()
    }

    /// Какой контроллер сейчас владеет юнитом
    pub fn owner_of(&self, unit: UnitId) -> Option<ControllerKind> {
        self.instances
            .iter()
            .find(|(_, controller)| controller.owns(unit))
            .map(|(kind, _)| *kind)
    }

    /// Resolve + register. Юнит не может принадлежать двум контроллерам сразу.
    pub fn register(&mut self, tag: ControllerType, unit: UnitId) -> Result<ControllerKind, ControllerError> {
        let kind = tag.controller_kind();
        if let Some(owner) = self.owner_of(unit) {
            let err = if owner == kind {
                ControllerError::AlreadyRegistered {
                    unit,
                    controller: owner,
                }
            } else {
                ControllerError::OwnedElsewhere { unit, owner }
            };
            logger::log_error(&format!("❌ Controller register rejected: {}", err));
            return Err(err);
        }

        self.resolve(tag)?.register(unit)?;
        Ok(kind)
    }

    /// Unregister у контроллера тега.
    ///
    /// После `shutdown` membership уже снесена вместе с экземплярами — no-op.
    pub fn unregister(&mut self, tag: ControllerType, unit: UnitId) -> Result<(), ControllerError> {
        if self.shut_down {
            logger::log(&format!("Controller registry shut down, skip unregister of {}", unit));
            return Ok(());
        }

        let kind = tag.controller_kind();
        let result = match self.get_mut(kind) {
            Some(controller) => controller.unregister(unit),
            None => Err(ControllerError::NotRegistered {
                unit,
                controller: kind,
            }),
        };

        if let Err(err) = &result {
            logger::log_error(&format!("❌ Controller unregister rejected: {}", err));
        }
        result
    }

    /// Конец сессии: все экземпляры удаляются
    pub fn shutdown(&mut self) {
        let count = self.instances.len();
        self.instances.clear();
        self.shut_down = true;
        logger::log_info(&format!("🛑 Controller registry shut down ({} controllers)", count));
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}
