//! Game master-data server: dataVals decoding, entity assembly and reverse hydration.

pub mod assemble;
pub mod cli;
pub mod config;
pub mod data;
pub mod decode;
pub mod error;
pub mod hydrate;
pub mod logging;
pub mod server;

pub use error::EngineError;
