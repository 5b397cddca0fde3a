//! Shell state and key handling; the main loop runs the resulting actions.

pub mod action;
pub mod commands;
pub mod event;
pub mod handler;
pub mod state;
