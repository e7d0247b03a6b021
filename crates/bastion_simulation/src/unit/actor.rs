//! Unit — orchestrating entity.

use bevy::math::Vec3;
use serde::Serialize;

use crate::config::UnitTemplate;
use crate::controller::{ControllerKind, ControllerRegistry, ControllerType};
use crate::error::UnitError;
use crate::events::{EventBus, UnitEvent};
use crate::fsm::StateMachine;
use crate::logger;
use crate::unit::{DamageState, Lifecycle, MovementState, UnitId};

/// Результат `Unit::tick`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Жив, ничего не требуется
    Alive,
    /// Health ≤ 0 → юнит просит уничтожения (внешний слой вызывает teardown)
    DestroyRequested,
    /// Не Active (ещё не init или уже в teardown) — tick ничего не делает
    Inactive,
}

/// Юнит (Enemy / Fortress / User)
///
/// Инварианты:
/// - health/mana НЕ клампятся в [0, max]: tick реагирует на ≤ 0, остальное — на вызывающем
/// - ровно одна регистрация в контроллере между init и teardown
#[derive(Debug)]
pub struct Unit {
    id: UnitId,
    name: String,
    nickname: String,
    controller_type: ControllerType,
    /// Экземпляр, выданный registry на init (ссылка по ключу, не владение)
    controller: Option<ControllerKind>,
    lifecycle: Lifecycle,

    movement: StateMachine<MovementState>,
    damage: StateMachine<DamageState>,

    max_health: f32,
    health: f32,
    max_defense: f32,
    defense: f32,
    max_mana: f32,
    mana: f32,
    /// Сколько опыта юнит отдаёт при смерти
    experience: f32,
    level: i32,

    // Kinematics: читает/пишет внешний movement слой
    velocity: Vec3,
    total_velocity: Vec3,
    speed: f32,
    can_move_with_input: bool,
    following: Option<UnitId>,
}

impl Unit {
    pub fn new(id: UnitId, template: &UnitTemplate) -> Self {
        Self {
            id,
            name: template.name.clone(),
            nickname: template.nickname.clone(),
            controller_type: template.controller,
            controller: None,
            lifecycle: Lifecycle::Uninitialized,
            movement: StateMachine::new(MovementState::Init),
            damage: StateMachine::new(DamageState::Init),
            max_health: template.max_health,
            health: template.max_health,
            max_defense: template.max_defense,
            defense: template.max_defense,
            max_mana: template.max_mana,
            mana: template.max_mana,
            experience: template.experience,
            level: template.level,
            velocity: Vec3::ZERO,
            total_velocity: Vec3::ZERO,
            speed: template.speed,
            can_move_with_input: template.can_move_with_input,
            following: None,
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Uninitialized → Active
    ///
    /// Ресурсы = max (без событий), register в контроллере тега,
    /// FSM: movement Init→Idle, damage Init→Idle, затем UnitInitialized (immediate).
    /// Ошибка контроллера фатальна для init — юнит остаётся Uninitialized.
    pub fn init(&mut self, bus: &EventBus, controllers: &mut ControllerRegistry) -> Result<(), UnitError> {
        match self.lifecycle {
            Lifecycle::Uninitialized => {}
            Lifecycle::Gone => return Err(self.violation(UnitError::AlreadyGone(self.id))),
            Lifecycle::Active | Lifecycle::TearingDown => {
                return Err(self.violation(UnitError::AlreadyInitialized(self.id)))
            }
        }

        self.health = self.max_health;
        self.mana = self.max_mana;
        self.defense = self.max_defense;

        let kind = controllers
            .register(self.controller_type, self.id)
            .map_err(|err| self.violation(UnitError::from(err)))?;
        self.controller = Some(kind);

        self.movement = MovementState::machine();
        self.damage = DamageState::machine();
        self.movement.transition(MovementState::Idle);
        self.damage.transition(DamageState::Idle);

        self.lifecycle = Lifecycle::Active;
        logger::log_info(&format!(
            "✨ {} '{}' initialized ({:?} → {:?} controller)",
            self.id, self.name, self.controller_type, kind
        ));

        bus.broadcast(UnitEvent::initialized(self.id));
        Ok(())
    }

    /// Per-tick проверка терминального условия
    pub fn tick(&mut self) -> TickOutcome {
        match self.lifecycle {
            Lifecycle::Active if self.health <= 0.0 => {
                self.lifecycle = Lifecycle::TearingDown;
                logger::log(&format!(
                    "💀 {} '{}' depleted (health {}), destroy requested",
                    self.id, self.name, self.health
                ));
                TickOutcome::DestroyRequested
            }
            Lifecycle::Active => TickOutcome::Alive,
            _ => TickOutcome::Inactive,
        }
    }

    /// Внешний сигнал destroy (Active → TearingDown). `false` если не Active.
    pub fn request_destroy(&mut self) -> bool {
        if self.lifecycle != Lifecycle::Active {
            return false;
        }
        self.lifecycle = Lifecycle::TearingDown;
        true
    }

    /// Active/TearingDown → Gone: unregister + UnitDied (immediate)
    pub fn teardown(&mut self, bus: &EventBus, controllers: &mut ControllerRegistry) -> Result<(), UnitError> {
        match self.lifecycle {
            Lifecycle::Active | Lifecycle::TearingDown => {}
            Lifecycle::Uninitialized => return Err(self.violation(UnitError::NotInitialized(self.id))),
            Lifecycle::Gone => return Err(self.violation(UnitError::AlreadyGone(self.id))),
        }

        controllers
            .unregister(self.controller_type, self.id)
            .map_err(|err| self.violation(UnitError::from(err)))?;
        self.controller = None;
        self.lifecycle = Lifecycle::Gone;
        if !self.damage.is_in(DamageState::Dead) {
            self.damage.transition(DamageState::Dead);
        }
        self.halt();

        logger::log_info(&format!("☠️ {} '{}' torn down", self.id, self.name));
        bus.broadcast(UnitEvent::died(self.id));
        Ok(())
    }

    fn violation(&self, err: UnitError) -> UnitError {
        logger::log_error(&format!("❌ {} '{}': {}", self.id, self.name, err));
        err
    }

    // ========================================================================
    // Attributes с deferred уведомлением (шина передаётся явно на call site)
    // ========================================================================

    /// Присваивает health и ставит UnitHealthChanged в deferred очередь
    pub fn set_health(&mut self, bus: &EventBus, health: f32) {
        self.health = health;
        bus.delayed_broadcast(UnitEvent::health_changed(self.id, health));
    }

    pub fn set_mana(&mut self, bus: &EventBus, mana: f32) {
        self.mana = mana;
        bus.delayed_broadcast(UnitEvent::mana_changed(self.id, mana));
    }

    pub fn set_level(&mut self, bus: &EventBus, level: i32) {
        self.level = level;
        bus.delayed_broadcast(UnitEvent::level_changed(self.id, level));
    }

    pub fn set_defense(&mut self, defense: f32) {
        self.defense = defense;
    }

    pub fn set_experience(&mut self, experience: f32) {
        self.experience = experience;
    }

    pub fn set_nickname(&mut self, nickname: impl Into<String>) {
        self.nickname = nickname.into();
    }

    // ========================================================================
    // Kinematics (пишут контроллеры / movement слой)
    // ========================================================================

    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    pub fn set_total_velocity(&mut self, total_velocity: Vec3) {
        self.total_velocity = total_velocity;
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn set_can_move_with_input(&mut self, enabled: bool) {
        self.can_move_with_input = enabled;
    }

    pub fn set_following(&mut self, target: Option<UnitId>) {
        self.following = target;
    }

    /// Сброс velocity, Moving → Idle
    pub fn halt(&mut self) {
        self.velocity = Vec3::ZERO;
        if self.movement.is_in(MovementState::Moving) {
            self.movement.transition(MovementState::Idle);
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn controller_type(&self) -> ControllerType {
        self.controller_type
    }

    pub fn controller(&self) -> Option<ControllerKind> {
        self.controller
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    pub fn is_dead(&self) -> bool {
        self.damage.is_in(DamageState::Dead)
    }

    pub fn movement(&self) -> &StateMachine<MovementState> {
        &self.movement
    }

    pub fn movement_mut(&mut self) -> &mut StateMachine<MovementState> {
        &mut self.movement
    }

    pub fn damage(&self) -> &StateMachine<DamageState> {
        &self.damage
    }

    pub fn damage_mut(&mut self) -> &mut StateMachine<DamageState> {
        &mut self.damage
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn mana(&self) -> f32 {
        self.mana
    }

    pub fn max_mana(&self) -> f32 {
        self.max_mana
    }

    pub fn defense(&self) -> f32 {
        self.defense
    }

    pub fn max_defense(&self) -> f32 {
        self.max_defense
    }

    pub fn experience(&self) -> f32 {
        self.experience
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn total_velocity(&self) -> Vec3 {
        self.total_velocity
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn can_move_with_input(&self) -> bool {
        self.can_move_with_input
    }

    pub fn following(&self) -> Option<UnitId> {
        self.following
    }

    pub fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            id: self.id,
            name: self.name.clone(),
            lifecycle: self.lifecycle,
            movement: self.movement.current_state(),
            damage: self.damage.current_state(),
            health: self.health,
            mana: self.mana,
            level: self.level,
            velocity: self.velocity.to_array(),
        }
    }
}

/// Сериализуемый срез состояния (сравнение детерминизма, debug dump)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitSnapshot {
    pub id: UnitId,
    pub name: String,
    pub lifecycle: Lifecycle,
    pub movement: MovementState,
    pub damage: DamageState,
    pub health: f32,
    pub mana: f32,
    pub level: i32,
    pub velocity: [f32; 3],
}
