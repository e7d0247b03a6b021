//! Generic finite state machine
//!
//! Используется юнитом дважды: movement FSM и damage FSM.
//! Машина не знает про домен — только граф переходов над enum-состояниями.

pub mod machine;


pub use machine::StateMachine;
