use nalgebra::{SVector, Vector3, Vector4};
use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    math::rotation::{normalize_quaternion, try_normalize_quaternion},
};

pub const STATE_SIZE: usize = 13;

/// Full rigid body state of one vehicle.
///
/// Position and velocity are in the world frame (Z up), the quaternion is
/// body -> world in `(w, x, y, z)` order and the angular velocity is in the
/// body frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuadcopterState {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub quaternion: Vector4<f64>,
    pub angular_velocity: Vector3<f64>,
}

impl Default for QuadcopterState {
    /// At rest in the origin, level.
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            quaternion: Vector4::new(1.0, 0.0, 0.0, 0.0),
            angular_velocity: Vector3::zeros(),
        }
    }
}

impl QuadcopterState {
    /// Flat `[pos(3), vel(3), quat(4), angvel(3)]` layout.
    ///
    /// This order is also the observation layout fed to external policies.
    pub fn to_array(&self) -> [f64; STATE_SIZE] {
        StateVector::from(self).0.into()
    }

    pub fn from_array(arr: &[f64; STATE_SIZE]) -> Self {
        StateVector(SVector::from_column_slice(arr)).into()
    }

    /// Checks the state can be integrated: all values finite and a
    /// quaternion that can be normalized.
    pub fn validate(&self) -> Result<(), Error> {
        let finite = |v: &[f64]| v.iter().all(|c| c.is_finite());

        if !finite(self.position.as_slice()) {
            return Err(Error::NonFiniteState { field: "position" });
        }
        if !finite(self.velocity.as_slice()) {
            return Err(Error::NonFiniteState { field: "velocity" });
        }
        if !finite(self.angular_velocity.as_slice()) {
            return Err(Error::NonFiniteState {
                field: "angular_velocity",
            });
        }

        try_normalize_quaternion(&self.quaternion).map(|_| ())
    }

    pub fn is_finite(&self) -> bool {
        StateVector::from(self).0.iter().all(|c| c.is_finite())
    }
}

/// Flat 13 element state used by the integrator.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct StateVector(pub SVector<f64, STATE_SIZE>);

impl StateVector {
    pub fn pos_n(&self) -> Vector3<f64> {
        self.0.fixed_rows::<3>(0).clone_owned()
    }

    pub fn vel_n(&self) -> Vector3<f64> {
        self.0.fixed_rows::<3>(3).clone_owned()
    }

    /// Quaternion as stored, `(w, x, y, z)`, not necessarily unit norm.
    pub fn quat_nb_vec(&self) -> Vector4<f64> {
        self.0.fixed_rows::<4>(6).clone_owned()
    }

    pub fn angvel_b(&self) -> Vector3<f64> {
        self.0.fixed_rows::<3>(10).clone_owned()
    }

    pub fn set_pos_n(&mut self, pos_n: &Vector3<f64>) {
        self.0.fixed_rows_mut::<3>(0).copy_from(pos_n);
    }

    pub fn set_vel_n(&mut self, vel_n: &Vector3<f64>) {
        self.0.fixed_rows_mut::<3>(3).copy_from(vel_n);
    }

    pub fn set_quat_nb_vec(&mut self, quat_nb: &Vector4<f64>) {
        self.0.fixed_rows_mut::<4>(6).copy_from(quat_nb);
    }

    pub fn set_angvel_b(&mut self, angvel_b: &Vector3<f64>) {
        self.0.fixed_rows_mut::<3>(10).copy_from(angvel_b);
    }

    pub fn normalize_quat(&mut self) {
        let n = normalize_quaternion(&self.quat_nb_vec());
        self.set_quat_nb_vec(&n);
    }
}

impl From<&QuadcopterState> for StateVector {
    fn from(state: &QuadcopterState) -> Self {
        let mut v = StateVector::default();
        v.set_pos_n(&state.position);
        v.set_vel_n(&state.velocity);
        v.set_quat_nb_vec(&state.quaternion);
        v.set_angvel_b(&state.angular_velocity);
        v
    }
}

impl From<StateVector> for QuadcopterState {
    fn from(v: StateVector) -> Self {
        QuadcopterState {
            position: v.pos_n(),
            velocity: v.vel_n(),
            quaternion: v.quat_nb_vec(),
            angular_velocity: v.angvel_b(),
        }
    }
}

/// Normalized command. Nominal range of every channel is [-1, 1] but values
/// outside it are passed through as is.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Action {
    pub throttle: f64,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl Action {
    pub fn new(throttle: f64, roll: f64, pitch: f64, yaw: f64) -> Self {
        Self {
            throttle,
            roll,
            pitch,
            yaw,
        }
    }

    /// Zero command: hover thrust, no torque.
    pub fn hover() -> Self {
        Self::default()
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.throttle, self.roll, self.pitch, self.yaw]
    }
}

impl From<[f64; 4]> for Action {
    fn from(a: [f64; 4]) -> Self {
        Action::new(a[0], a[1], a[2], a[3])
    }
}

/// Quantities derived while stepping, not part of the state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDebug {
    /// Thrust force in the world frame [N]
    pub thrust_world: Vector3<f64>,
    /// Linear acceleration in the world frame [m/s^2]
    pub acceleration: Vector3<f64>,
    /// Angular acceleration in the body frame [rad/s^2]
    pub angular_acceleration: Vector3<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsStepResult {
    #[serde(flatten)]
    pub state: QuadcopterState,
    pub debug: StepDebug,
}
