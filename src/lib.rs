//! CodeMaster game kernels: session gating, grid generation, sorting
//! playback, score simulation, countdown timers and the shared game
//! lifecycle. The terminal front-end lives in the binary.

pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod logging;
pub mod routes;
pub mod session;
pub mod sim;
