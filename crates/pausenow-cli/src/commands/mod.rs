pub mod config;
pub mod preview;
pub mod run;
pub mod stats;
