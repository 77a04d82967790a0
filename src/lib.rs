//! Symbolic equation synthesis for electrical networks.
//!
//! A model declares nodes, two-terminal edges and element relations through a
//! [`compiler::Session`]. Synthesis adds the loop (KVL), parallel and node (KCL)
//! equations derived from the topology, discretizes integrals and derivatives
//! with persistent auxiliaries, and the result can be solved symbolically and
//! rendered into simulation code.

use std::sync::Once;

use log::LevelFilter;

pub mod compiler;
pub mod generator;
pub mod ir;
pub mod models;
pub mod solver;

static INIT: Once = Once::new();

/// Installs the logger with `level` unless `RUST_LOG` says otherwise.
pub fn init_logger_with(level: LevelFilter) {
    INIT.call_once(|| {
        env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .init();
    });
}
