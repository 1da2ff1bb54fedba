//! Library side of the `data-release` binary: configuration, logging and
//! stage orchestration.

pub mod config;
pub mod logging;
pub mod pipeline;
