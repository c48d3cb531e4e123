pub mod config;
pub mod error;
pub mod kernel;
pub mod monitor;
pub mod session;

pub use config::MonitorConfig;
pub use error::MonitorError;
pub use kernel::reactor::{MonitorHandle, MonitorOutput, Reactor};
pub use monitor::SessionMonitor;
