pub mod config;
pub mod logging;
pub mod run;
pub mod usage;
