//! Snake on a pixel surface: a fixed-tick simulation, a rectangle renderer,
//! a start/game over/restart session and a persisted high score.
//!
//! The simulation (`game`, `snake`, `food`) knows nothing about terminals.
//! `session` ties it to a [`session::Presenter`]; `term` is the crossterm one.

pub mod config;
pub mod food;
pub mod game;
pub mod input;
pub mod render;
pub mod session;
pub mod snake;
pub mod store;
pub mod term;
pub mod ticker;

pub type TermInt = u16;
pub type Coords = (TermInt, TermInt);
