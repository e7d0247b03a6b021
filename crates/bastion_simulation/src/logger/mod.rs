//! Глобальный logger симуляции
//!
//! Printer подменяется хостом (engine console, тесты), по умолчанию — stdout.
//! Уровень фильтрации задаётся через `set_log_level` (обычно из SimulationConfig).

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

// Потокобезопасный глобальный logger
static LOGGER: Lazy<Mutex<Option<Box<dyn LogPrinter>>>> = Lazy::new(|| Mutex::new(None));

static LOGGER_LEVEL: Lazy<Mutex<LogLevel>> = Lazy::new(|| Mutex::new(LogLevel::Debug));

/// Poisoned mutex не должен ронять логирование — берём данные как есть
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn set_logger(logger: Box<dyn LogPrinter>) {
    *lock(&LOGGER) = Some(logger);
}

pub fn set_log_level(level: LogLevel) {
    *lock(&LOGGER_LEVEL) = level;
}

pub fn log_level() -> LogLevel {
    *lock(&LOGGER_LEVEL)
}

pub fn set_logger_if_needed(logger: Box<dyn LogPrinter>) {
    let mut slot = lock(&LOGGER);
    if slot.is_none() {
        *slot = Some(logger);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Debug
    }
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

pub trait LogPrinter: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

pub fn log(message: &str) {
    log_with_level(LogLevel::Debug, message);
}

pub fn log_info(message: &str) {
    log_with_level(LogLevel::Info, message);
}

pub fn log_warning(message: &str) {
    log_with_level(LogLevel::Warning, message);
}

pub fn log_error(message: &str) {
    log_with_level(LogLevel::Error, message);
}

pub fn log_with_level(level: LogLevel, message: &str) {
    if level < log_level() {
        return;
    }

    // timestamp добавляем здесь, не в конкретном printer
    if let Some(logger) = lock(&LOGGER).as_ref() {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        logger.log(level, &format!("[{}] {}", timestamp, message));
    }
}

pub struct ConsoleLogger;

impl LogPrinter for ConsoleLogger {
    fn log(&self, level: LogLevel, message: &str) {
        println!("[{}] {}", level.as_str(), message);
    }
}

pub fn init_logger() {
    set_logger_if_needed(Box::new(ConsoleLogger));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
        assert_eq!(LogLevel::default(), LogLevel::Debug);
    }

    #[test]
    fn test_log_level_names() {
        assert_eq!(LogLevel::Warning.as_str(), "WARNING");
        assert_eq!(LogLevel::Error.as_str(), "ERROR");
    }

    struct CapturingLogger(std::sync::Arc<Mutex<Vec<(LogLevel, String)>>>);

    impl LogPrinter for CapturingLogger {
        fn log(&self, level: LogLevel, message: &str) {
            lock(&self.0).push((level, message.to_string()));
        }
    }

    #[test]
    fn test_messages_below_level_are_dropped() {
        let captured = std::sync::Arc::new(Mutex::new(Vec::new()));
        set_logger(Box::new(CapturingLogger(std::sync::Arc::clone(&captured))));
        set_log_level(LogLevel::Warning);

        log("level-filter: debug");
        log_info("level-filter: info");
        log_warning("level-filter: warning");
        log_error("level-filter: error");

        set_log_level(LogLevel::Debug);
        set_logger(Box::new(ConsoleLogger));

        // Другие тесты логируют параллельно — смотрим только свои строки
        let ours: Vec<LogLevel> = lock(&captured)
            .iter()
            .filter(|(_, message)| message.contains("level-filter:"))
            .map(|(level, _)| *level)
            .collect();
        assert_eq!(ours, vec![LogLevel::Warning, LogLevel::Error]);
    }
}
