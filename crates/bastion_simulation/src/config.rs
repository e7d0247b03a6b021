//! Конфигурация симуляции и шаблоны юнитов
//!
//! Все структуры — serde Deserialize + Default (отсутствующие поля берутся из Default).

use bevy::prelude::*;
use serde::Deserialize;

use crate::controller::ControllerType;
use crate::logger::LogLevel;

/// Параметры симуляции (resource в App)
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed детерминистичного RNG
    pub seed: u64,
    /// Частота FixedUpdate (Гц)
    pub tick_hz: f64,
    pub log_level: LogLevel,
    pub ai: AiConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tick_hz: 60.0,
            log_level: LogLevel::Debug,
            ai: AiConfig::default(),
        }
    }
}

/// Параметры wander AI
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Тиков между решениями (на юнита)
    pub wander_interval_ticks: u32,
    /// Вероятность пойти (иначе стоим), 0.0..=1.0
    pub wander_chance: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            wander_interval_ticks: 120, // 2 сек при 60Hz
            wander_chance: 0.5,
        }
    }
}

/// Шаблон юнита — данные, из которых спавнится Unit
///
/// Health/mana/defense на init выставляются в max.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct UnitTemplate {
    pub name: String,
    pub nickname: String,
    pub controller: ControllerType,
    pub max_health: f32,
    pub max_mana: f32,
    pub max_defense: f32,
    /// Опыт, который юнит отдаёт при смерти
    pub experience: f32,
    pub level: i32,
    /// Скорость (м/с)
    pub speed: f32,
    pub can_move_with_input: bool,
}

impl Default for UnitTemplate {
    fn default() -> Self {
        Self {
            name: "Unit".to_string(),
            nickname: String::new(),
            controller: ControllerType::Enemy,
            max_health: 100.0,
            max_mana: 50.0,
            max_defense: 10.0,
            experience: 0.0,
            level: 1,
            speed: 2.0, // 2 m/s — базовая скорость ходьбы
            can_move_with_input: false,
        }
    }
}

impl UnitTemplate {
    pub fn enemy(name: impl Into<String>, max_health: f32) -> Self {
        Self {
            name: name.into(),
            max_health,
            ..Default::default()
        }
    }

    pub fn user(name: impl Into<String>, max_health: f32) -> Self {
        Self {
            name: name.into(),
            controller: ControllerType::User,
            max_health,
            can_move_with_input: true,
            ..Default::default()
        }
    }

    pub fn fortress(name: impl Into<String>, max_health: f32) -> Self {
        Self {
            name: name.into(),
            controller: ControllerType::Fortress,
            max_health,
            speed: 0.0,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_config_default() {
        let config = SimulationConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.tick_hz, 60.0);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.ai.wander_interval_ticks, 120);
    }

    #[test]
    fn test_simulation_config_partial_json() {
        let config: SimulationConfig = serde_json::from_str(
            r#"{ "seed": 7, "log_level": "Warning", "ai": { "wander_chance": 1.0 } }"#,
        )
        .unwrap();

        assert_eq!(config.seed, 7);
        assert_eq!(config.tick_hz, 60.0);
        assert_eq!(config.log_level, LogLevel::Warning);
        assert_eq!(config.ai.wander_chance, 1.0);
        assert_eq!(config.ai.wander_interval_ticks, 120);
    }

    #[test]
    fn test_unit_template_from_json() {
        let template: UnitTemplate = serde_json::from_str(
            r#"{ "name": "Gatehouse", "controller": "Fortress", "max_health": 500.0 }"#,
        )
        .unwrap();

        assert_eq!(template.name, "Gatehouse");
        assert_eq!(template.controller, ControllerType::Fortress);
        assert_eq!(template.max_health, 500.0);
        assert_eq!(template.max_mana, 50.0);
        assert_eq!(template.level, 1);
    }

    #[test]
    fn test_unit_template_presets() {
        let user = UnitTemplate::user("Hero", 120.0);
        assert_eq!(user.controller, ControllerType::User);
        assert!(user.can_move_with_input);

        let fortress = UnitTemplate::fortress("Keep", 1000.0);
        assert_eq!(fortress.controller, ControllerType::Fortress);
        assert_eq!(fortress.speed, 0.0);
    }
}
