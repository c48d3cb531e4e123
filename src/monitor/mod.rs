pub mod bandwidth;
pub mod congestion;
pub mod monitor;
pub mod overload;
pub mod reconnect;
pub mod types;
pub mod window;

pub use self::monitor::{SessionMonitor, SessionTotals};
pub use self::types::StatusSnapshot;
