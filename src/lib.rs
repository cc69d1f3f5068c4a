//! NurtureStrength: strength plans for preconception, pregnancy and postpartum
//! that adapt week by week to check-in feedback.
//!
//! Engine, leaf first: catalog -> dials -> selector -> templates -> dosage ->
//! planner -> adaptive (with narrative and the running gate). Storage and the
//! CLI sit on top.

pub mod adaptive;
pub mod catalog;
pub mod checkins;
pub mod clock;
pub mod commands;
pub mod config;
pub mod db;
pub mod dials;
pub mod dosage;
pub mod gate;
pub mod logs;
pub mod models;
pub mod narrative;
pub mod planner;
pub mod saved;
pub mod selector;
pub mod session;
pub mod store;
pub mod taxonomy;
pub mod templates;

#[cfg(test)]
mod test_utils;
