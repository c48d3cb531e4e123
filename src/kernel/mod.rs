pub mod effect;
pub mod event;
pub mod reactor;
pub mod telemetry;
pub mod time;
