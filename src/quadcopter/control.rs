use nalgebra::Vector3;

use super::{params::SimulationParams, state::Action};

/// Roll and pitch torque per unit of command [N m]
pub const ROLL_PITCH_TORQUE_GAIN: f64 = 0.5;
/// Yaw torque per unit of command [N m]
pub const YAW_TORQUE_GAIN: f64 = 0.1;

/// Collective thrust along body +Z and body frame torque, in physical units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlCommand {
    /// [N]
    pub thrust: f64,
    /// [N m]
    pub torque_b: Vector3<f64>,
}

/// Maps a normalized action to thrust and torques.
///
/// Throttle -1 is zero thrust, 0 is hover thrust and +1 twice the hover
/// thrust. Thrust never goes negative; nothing else is clamped.
pub fn map_action(action: &Action, params: &SimulationParams) -> ControlCommand {
    let thrust = f64::max(0.0, (action.throttle + 1.0) * params.mass * params.gravity);

    ControlCommand {
        thrust,
        torque_b: Vector3::new(
            action.roll * ROLL_PITCH_TORQUE_GAIN,
            action.pitch * ROLL_PITCH_TORQUE_GAIN,
            action.yaw * YAW_TORQUE_GAIN,
        ),
    }
}
