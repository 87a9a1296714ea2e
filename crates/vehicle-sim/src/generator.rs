//! Causally-Coupled Telemetry Generator

use crate::fault::{FaultError, FaultKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ring_buffer::{Reading, SensorBlock};
use tracing::{debug, info};

/// Vehicle id used when none is supplied
pub const DEFAULT_VEHICLE_ID: &str = "HERO-MNM-01";

/// Idle speed the rpm target is built on
const IDLE_RPM: f64 = 800.0;
/// Rpm reached at wide-open throttle
const MAX_TARGET_RPM: f64 = 3400.0;
const RPM_RANGE: (f64, f64) = (750.0, 3500.0);
const RPM_RESPONSE: f64 = 0.3;
const RPM_NOISE: f64 = 40.0;

const AMBIENT_TEMP_C: f64 = 25.0;
const BASE_HEAT: f64 = 6.0;
const LOAD_HEAT: f64 = 0.5;
const COOLING_RATE: f64 = 0.1;
const TEMP_RANGE: (f64, f64) = (70.0, 105.0);
const TEMP_NOISE: f64 = 0.3;

const VIBRATION_RANGE: (f64, f64) = (0.05, 0.40);
const VIBRATION_NOISE: f64 = 0.015;

const BATTERY_RANGE: (f64, f64) = (13.2, 14.8);
const BATTERY_RESPONSE: f64 = 0.2;
const BATTERY_NOISE: f64 = 0.03;

const CRUISE_RANGE: (f64, f64) = (10.0, 70.0);
const CRUISE_CHANGE_PROBABILITY: f64 = 0.05;
const THROTTLE_RESPONSE: f64 = 0.15;
const THROTTLE_NOISE: f64 = 6.0;

/// Running values that drive the next step
#[derive(Debug, Clone)]
struct GeneratorState {
    cruise_throttle: f64,
    throttle: f64,
    rpm: f64,
    temp_c: f64,
    vibration_g: f64,
    battery_v: f64,
}

impl Default for GeneratorState {
    fn default() -> Self {
        Self {
            cruise_throttle: 30.0,
            throttle: 30.0,
            rpm: 1580.0,
            temp_c: 88.0,
            vibration_g: 0.2,
            battery_v: 13.9,
        }
    }
}

/// Synthetic sensor stream for one vehicle.
///
/// Each call to [`generate_reading`](Self::generate_reading) advances the
/// simulated driver and engine by one step. An active fault rewrites the
/// published sensor values only; the internal state keeps evolving as a
/// healthy engine would.
#[derive(Debug)]
pub struct TelemetryGenerator {
    vehicle_id: String,
    fault: Option<FaultKind>,
    state: GeneratorState,
    rng: StdRng,
}

impl TelemetryGenerator {
    pub fn new(vehicle_id: impl Into<String>) -> Self {
        Self {
            vehicle_id: vehicle_id.into(),
            fault: None,
            state: GeneratorState::default(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    pub fn set_vehicle_id(&mut self, vehicle_id: impl Into<String>) {
        self.vehicle_id = vehicle_id.into();
    }

    pub fn active_fault(&self) -> Option<FaultKind> {
        self.fault
    }

    /// Replace the active fault (`None` clears it)
    pub fn inject_fault(&mut self, fault: Option<FaultKind>) {
        if self.fault != fault {
            match fault {
                Some(kind) => info!("Injecting fault '{}' on {}", kind, self.vehicle_id),
                None => info!("Clearing fault on {}", self.vehicle_id),
            }
        }
        self.fault = fault;
    }

    /// Replace the active fault by tag; unknown tags leave the current fault in place
    pub fn inject_fault_named(&mut self, tag: &str) -> Result<(), FaultError> {
        let fault = FaultKind::parse_optional(tag)?;
        self.inject_fault(fault);
        Ok(())
    }

    pub fn clear_fault(&mut self) {
        self.inject_fault(None);
    }

    /// Advance one step and publish a reading
    pub fn generate_reading(&mut self) -> Reading {
        self.step();

        let mut sensors = SensorBlock {
            engine_rpm: self.state.rpm,
            engine_temp_c: self.state.temp_c,
            vibration_level_g: self.state.vibration_g,
            throttle_pos_pct: self.state.throttle.round() as u8,
            battery_voltage_v: self.state.battery_v,
        };

        if let Some(fault) = self.fault {
            fault.profile().apply(&mut sensors, &mut self.rng);
        }

        let sensors = round_published(sensors);
        debug!(
            "Generated reading: rpm={:.0} temp={:.1} vib={:.3} throttle={} battery={:.2} fault={:?}",
            sensors.engine_rpm,
            sensors.engine_temp_c,
            sensors.vibration_level_g,
            sensors.throttle_pos_pct,
            sensors.battery_voltage_v,
            self.fault
        );

        Reading::new(self.vehicle_id.clone(), sensors)
    }

    fn step(&mut self) {
        let rng = &mut self.rng;
        let state = &mut self.state;

        // Driver input: settle toward a cruise setting that changes now and then
        if rng.gen_bool(CRUISE_CHANGE_PROBABILITY) {
            state.cruise_throttle = rng.gen_range(CRUISE_RANGE.0..CRUISE_RANGE.1);
        }
        state.throttle += THROTTLE_RESPONSE * (state.cruise_throttle - state.throttle)
            + rng.gen_range(-THROTTLE_NOISE..THROTTLE_NOISE);
        state.throttle = state.throttle.clamp(0.0, 100.0);

        // Engine speed follows throttle with first-order lag
        let target_rpm = IDLE_RPM + state.throttle / 100.0 * (MAX_TARGET_RPM - IDLE_RPM);
        state.rpm += RPM_RESPONSE * (target_rpm - state.rpm) + rng.gen_range(-RPM_NOISE..RPM_NOISE);
        state.rpm = state.rpm.clamp(RPM_RANGE.0, RPM_RANGE.1);

        // Heat grows superlinearly with speed above idle, cooling with excess over ambient
        let load = (state.rpm - RPM_RANGE.0).max(0.0) / 1000.0;
        let heat = BASE_HEAT + LOAD_HEAT * load.powf(1.5);
        let cooling = COOLING_RATE * (state.temp_c - AMBIENT_TEMP_C);
        state.temp_c += heat - cooling + rng.gen_range(-TEMP_NOISE..TEMP_NOISE);
        state.temp_c = state.temp_c.clamp(TEMP_RANGE.0, TEMP_RANGE.1);

        state.vibration_g = 0.08
            + 0.06 * state.rpm / 1000.0
            + 0.001 * state.throttle
            + rng.gen_range(-VIBRATION_NOISE..VIBRATION_NOISE);
        state.vibration_g = state.vibration_g.clamp(VIBRATION_RANGE.0, VIBRATION_RANGE.1);

        // Alternator output rises with speed, electrical load with throttle
        let speed_ratio = (state.rpm - RPM_RANGE.0) / (RPM_RANGE.1 - RPM_RANGE.0);
        let target_battery = 13.7 + 0.6 * speed_ratio - 0.002 * state.throttle;
        state.battery_v += BATTERY_RESPONSE * (target_battery - state.battery_v)
            + rng.gen_range(-BATTERY_NOISE..BATTERY_NOISE);
        state.battery_v = state.battery_v.clamp(BATTERY_RANGE.0, BATTERY_RANGE.1);
    }
}

impl Default for TelemetryGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_VEHICLE_ID)
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn round_published(sensors: SensorBlock) -> SensorBlock {
    SensorBlock {
        engine_rpm: round_to(sensors.engine_rpm, 2),
        engine_temp_c: round_to(sensors.engine_temp_c, 2),
        vibration_level_g: round_to(sensors.vibration_level_g, 3),
        throttle_pos_pct: sensors.throttle_pos_pct,
        battery_voltage_v: round_to(sensors.battery_voltage_v, 2),
    }
}
