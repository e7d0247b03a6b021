//! Roster — owned set контроллера.

use std::collections::BTreeSet;

use crate::controller::ControllerKind;
use crate::error::ControllerError;
use crate::unit::UnitId;

/// Упорядоченный набор юнитов (детерминированный порядок обхода по UnitId)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    units: BTreeSet<UnitId>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, owner: ControllerKind, unit: UnitId) -> Result<(), ControllerError> {
        if !self.units.insert(unit) {
            return Err(ControllerError::AlreadyRegistered {
                unit,
                controller: owner,
            });
        }
        Ok(())
    }

    pub fn remove(&mut self, owner: ControllerKind, unit: UnitId) -> Result<(), ControllerError> {
        if !self.units.remove(&unit) {
            return Err(ControllerError::NotRegistered {
                unit,
                controller: owner,
            });
        }
        Ok(())
    }

    pub fn contains(&self, unit: UnitId) -> bool {
        self.units.contains(&unit)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.units.iter().copied()
    }

    /// Копия для итерации, пока roster может меняться
    pub fn snapshot(&self) -> Vec<UnitId> {
        self.iter().collect()
    }
}
