//! Lays rectangular boards out on fixed-size stock sheets.
//!
//! [`planner::Planner`] expands a cut list into single boards, orders them
//! largest first and fills one [`sheet::Sheet`] at a time with the
//! bottom-left heuristic, opening a new sheet whenever the current one is
//! full. Boards that fit on no empty sheet are reported, not fatal.

pub mod api;
pub mod error;
pub mod planner;
pub mod render;
pub mod sheet;
pub mod types;

pub use error::{Error, Result};
pub use planner::{Planner, plan};
