use log::debug;
use nalgebra::{Matrix3, Vector3, Vector4};
use serde::{Deserialize, Serialize};

use super::state::QuadcopterState;
use crate::{
    error::Error,
    parameters::{Parameter, ParameterMap},
};

/// Physical configuration of one vehicle.
///
/// `arm_length`, `thrust_coefficient`, `torque_coefficient` and
/// `max_motor_speed` describe the motors. They are carried along for
/// motor level models and not used by the rigid body dynamics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParams {
    /// [kg]
    pub mass: f64,
    /// Diagonal of the body inertia tensor [kg m^2]
    pub inertia: Vector3<f64>,
    /// Magnitude of the gravitational acceleration, acting along -Z [m/s^2]
    pub gravity: f64,
    /// Default integration step [s]
    pub dt: f64,
    /// [m]
    pub arm_length: f64,
    pub thrust_coefficient: f64,
    pub torque_coefficient: f64,
    /// [rad/s]
    pub max_motor_speed: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            mass: 2.5,
            inertia: Vector3::new(0.0023, 0.0023, 0.004),
            gravity: 9.81,
            dt: 0.04,
            arm_length: 0.25,
            thrust_coefficient: 8.54858e-6,
            torque_coefficient: 2.137e-7,
            max_motor_speed: 10000.0,
        }
    }
}

impl SimulationParams {
    /// Defaults with every `Some` field of `overrides` applied on top.
    pub fn with_overrides(overrides: &ParamOverrides) -> Self {
        let mut params = SimulationParams::default();
        params.apply(overrides);
        params
    }

    pub fn apply(&mut self, overrides: &ParamOverrides) {
        let ParamOverrides {
            mass,
            inertia,
            gravity,
            dt,
            arm_length,
            thrust_coefficient,
            torque_coefficient,
            max_motor_speed,
        } = overrides;

        self.mass = mass.unwrap_or(self.mass);
        self.inertia = inertia.unwrap_or(self.inertia);
        self.gravity = gravity.unwrap_or(self.gravity);
        self.dt = dt.unwrap_or(self.dt);
        self.arm_length = arm_length.unwrap_or(self.arm_length);
        self.thrust_coefficient = thrust_coefficient.unwrap_or(self.thrust_coefficient);
        self.torque_coefficient = torque_coefficient.unwrap_or(self.torque_coefficient);
        self.max_motor_speed = max_motor_speed.unwrap_or(self.max_motor_speed);
    }

    /// Rejects values that would make the dynamics produce NaNs.
    pub fn validate(&self) -> Result<(), Error> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(Error::invalid_param(name, v))
            }
        };
        let finite = |name: &str, v: f64| {
            if v.is_finite() {
                Ok(())
            } else {
                Err(Error::invalid_param(name, v))
            }
        };

        positive("mass", self.mass)?;
        positive("inertia.x", self.inertia.x)?;
        positive("inertia.y", self.inertia.y)?;
        positive("inertia.z", self.inertia.z)?;
        positive("gravity", self.gravity)?;
        positive("dt", self.dt)?;

        finite("arm_length", self.arm_length)?;
        finite("thrust_coefficient", self.thrust_coefficient)?;
        finite("torque_coefficient", self.torque_coefficient)?;
        finite("max_motor_speed", self.max_motor_speed)?;

        Ok(())
    }
}

/// Partial set of [`SimulationParams`]; `None` keeps the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamOverrides {
    pub mass: Option<f64>,
    pub inertia: Option<Vector3<f64>>,
    pub gravity: Option<f64>,
    pub dt: Option<f64>,
    pub arm_length: Option<f64>,
    pub thrust_coefficient: Option<f64>,
    pub torque_coefficient: Option<f64>,
    pub max_motor_speed: Option<f64>,
}

impl ParamOverrides {
    /// Reads overrides from a parameter map, e.g. the `quadcopter` table.
    /// Keys that are not present stay `None`.
    pub fn from_params(params: &ParameterMap) -> Result<Self, Error> {
        let float = |key: &str| -> Result<Option<f64>, Error> {
            match params.get_param_opt(key)? {
                Some(p) => {
                    debug!("Parameter override {p}");
                    Ok(Some(p.value_float()?))
                }
                None => Ok(None),
            }
        };

        let inertia = params
            .get_param_opt("inertia")?
            .map(vector3_from_param)
            .transpose()?;

        Ok(ParamOverrides {
            mass: float("mass")?,
            inertia,
            gravity: float("gravity")?,
            dt: float("dt")?,
            arm_length: float("arm_length")?,
            thrust_coefficient: float("thrust_coefficient")?,
            torque_coefficient: float("torque_coefficient")?,
            max_motor_speed: float("max_motor_speed")?,
        })
    }
}

impl QuadcopterState {
    /// Initial conditions from a parameter map, e.g. the `quadcopter.init`
    /// table. Missing entries keep the [`QuadcopterState::default`] value.
    pub fn from_params(params: &ParameterMap) -> Result<Self, Error> {
        let mut state = QuadcopterState::default();

        if let Some(p) = params.get_param_opt("position")? {
            state.position = vector3_from_param(p)?;
        }
        if let Some(p) = params.get_param_opt("velocity")? {
            state.velocity = vector3_from_param(p)?;
        }
        if let Some(p) = params.get_param_opt("quaternion")? {
            let q = p.value_float_arr()?;
            if q.len() != 4 {
                return Err(Error::invalid_param(p.path(), format!("{q:?}")));
            }
            state.quaternion = Vector4::from_column_slice(q);
        }
        if let Some(p) = params.get_param_opt("angular_velocity")? {
            state.angular_velocity = vector3_from_param(p)?;
        }

        Ok(state)
    }
}

fn vector3_from_param(p: &Parameter) -> Result<Vector3<f64>, Error> {
    let v = p.value_float_arr()?;
    if v.len() != 3 {
        return Err(Error::invalid_param(p.path(), format!("{v:?}")));
    }

    Ok(Vector3::from_column_slice(v))
}

/// Inertia tensor and its inverse, computed once per vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct MassProperties {
    pub mass: f64,
    pub inertia: Matrix3<f64>,
    pub inv_inertia: Matrix3<f64>,
}

impl MassProperties {
    pub fn from_params(params: &SimulationParams) -> Result<Self, Error> {
        if params.inertia.iter().any(|i| !i.is_finite() || *i <= 0.0) {
            return Err(Error::invalid_param("inertia", params.inertia));
        }

        // Diagonal, so the inverse is the exact reciprocal of each moment
        let inertia = Matrix3::from_diagonal(&params.inertia);
        let inv_inertia = Matrix3::from_diagonal(&params.inertia.map(|i| 1.0 / i));

        Ok(MassProperties {
            mass: params.mass,
            inertia,
            inv_inertia,
        })
    }
}
