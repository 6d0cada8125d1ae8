//! Rigid body flight dynamics of a quadcopter.
//!
//! A normalized `[throttle, roll, pitch, yaw]` command is mapped to collective
//! thrust and body torques, and the 13 element state
//! `[position, velocity, quaternion, angular velocity]` is advanced with a
//! fixed step RK4 integrator. See [`quadcopter::Quadcopter`].

pub mod error;
pub mod math;
pub mod parameters;
pub mod quadcopter;

pub use error::Error;
pub use quadcopter::{
    Action, ParamOverrides, PhysicsStepResult, Quadcopter, QuadcopterState, SimulationParams,
};
