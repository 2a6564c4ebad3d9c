//! Command implementations and terminal rendering

pub mod allocation;
pub mod history;
pub mod rate;
pub mod record;
pub mod remove;
pub mod setup;
pub mod show;
pub mod ui;
