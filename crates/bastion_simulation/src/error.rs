//! Error types для lifecycle контрактов
//!
//! Нарушения контракта (double-register, double-init) — ошибки программиста:
//! возвращаем сразу, не пытаемся восстановиться.
//! Неудачный FSM переход и broadcast без подписчиков ошибками НЕ являются.

use thiserror::Error;

use crate::controller::{ControllerKind, ControllerType};
use crate::unit::UnitId;

/// Ошибки membership/lookup в ControllerRegistry
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// Для тега нет фабрики (или registry уже остановлен)
    #[error("No controller available for {0:?}")]
    Unresolved(ControllerType),

    #[error("Unit {unit} is already registered with {controller:?} controller")]
    AlreadyRegistered {
        unit: UnitId,
        controller: ControllerKind,
    },

    #[error("Unit {unit} is not registered with {controller:?} controller")]
    NotRegistered {
        unit: UnitId,
        controller: ControllerKind,
    },

    /// Юнит может принадлежать только одному контроллеру одновременно
    #[error("Unit {unit} is already owned by {owner:?} controller")]
    OwnedElsewhere { unit: UnitId, owner: ControllerKind },
}

/// Ошибки lifecycle юнита (init/teardown)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UnitError {
    #[error("Unit {0} is already initialized")]
    AlreadyInitialized(UnitId),

    #[error("Unit {0} was never initialized")]
    NotInitialized(UnitId),

    #[error("Unit {0} has already been torn down")]
    AlreadyGone(UnitId),

    #[error("Unknown unit {0}")]
    UnknownUnit(UnitId),

    #[error(transparent)]
    Controller(#[from] ControllerError),
}
