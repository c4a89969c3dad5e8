pub mod config;
pub mod controller;
pub mod detection;
pub mod dialog;
pub mod error;
pub mod process;
pub mod reposition;
pub mod scheduler;
pub mod shutdown;
pub mod usage_monitor;
pub mod window;

pub use config::{MonitorConfig, MultiplePolicy, PersistencePolicy};
pub use controller::{MonitorHooks, MultipleResolution, PromptController, Recording, TickOutcome};
pub use error::MonitorError;
pub use process::{ProcessInfo, ProcessSource, SysinfoProcessSource};
pub use scheduler::Scheduler;
pub use shutdown::{ShutdownReason, ShutdownSignal};
pub use usage_monitor::UsageMonitor;
