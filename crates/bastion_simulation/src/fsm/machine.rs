//! StateMachine<S>: current state + directed edges + wildcard targets.

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

/// Конечный автомат над закрытым enum `S`
///
/// Переход в `to` разрешён, если:
/// - есть явное ребро `(current, to)`, ИЛИ
/// - `to` зарегистрирован как wildcard target (достижим из любого состояния)
///
/// Граф не обязан быть связным или ацикличным.
/// Неудачный переход — обычный исход (возвращаем `false`), не ошибка.
#[derive(Debug, Clone)]
pub struct StateMachine<S> {
    current: S,
    previous: Option<S>,
    edges: HashSet<(S, S)>,
    wildcard_targets: HashSet<S>,
}

impl<S> StateMachine<S>
where
    S: Copy + Eq + Hash + Debug,
{
    /// Пустой граф, стартовое состояние `initial`
    pub fn new(initial: S) -> Self {
        Self {
            current: initial,
            previous: None,
            edges: HashSet::new(),
            wildcard_targets: HashSet::new(),
        }
    }

    /// Регистрирует ребро `from → to`.
    ///
    /// Идемпотентно: повторное добавление — no-op. Возвращает `true` если ребро новое.
    pub fn add_transition(&mut self, from: S, to: S) -> bool {
        self.edges.insert((from, to))
    }

    /// Регистрирует `to` как достижимое из любого состояния (включая ещё не использованные).
    pub fn add_transition_from_any(&mut self, to: S) -> bool {
        self.wildcard_targets.insert(to)
    }

    pub fn can_transition(&self, to: S) -> bool {
        self.wildcard_targets.contains(&to) || self.edges.contains(&(self.current, to))
    }

    /// Пытается перейти в `to`.
    ///
    /// При отсутствии ребра/wildcard состояние не меняется и возвращается `false`;
    /// что делать с отказом — решает вызывающий.
    pub fn transition(&mut self, to: S) -> bool {
        if !self.can_transition(to) {
            crate::logger::log(&format!(
                "🚫 FSM: no transition {:?} → {:?}",
                self.current, to
            ));
            return false;
        }

        self.previous = Some(self.current);
        self.current = to;
        true
    }

    pub fn current_state(&self) -> S {
        self.current
    }

    /// Состояние до последнего успешного перехода
    pub fn previous_state(&self) -> Option<S> {
        self.previous
    }

    pub fn is_in(&self, state: S) -> bool {
        self.current == state
    }

    pub fn has_transition(&self, from: S, to: S) -> bool {
        self.edges.contains(&(from, to))
    }

    pub fn is_wildcard_target(&self, state: S) -> bool {
        self.wildcard_targets.contains(&state)
    }
}
