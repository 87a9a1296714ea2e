//! Vehicle Telemetry Simulator
//!
//! Generates internally-consistent sensor readings following a causal chain
//! (throttle → rpm → temperature → vibration → battery) and overrides the
//! published values when a synthetic fault is injected.

mod fault;
mod generator;

pub use fault::{FaultError, FaultKind, FaultProfile};
pub use generator::{TelemetryGenerator, DEFAULT_VEHICLE_ID};
