use nalgebra::{SVector, Vector3, Vector4};

use super::{
    control::ControlCommand,
    params::MassProperties,
    state::{STATE_SIZE, StateVector},
};
use crate::math::{
    ode::OdeProblem,
    rotation::{cross, mat_vec_mul, normalize_quaternion, quat_vec_to_rotation_matrix},
};

/// Rigid body equations of motion of the vehicle with a control command that
/// is held constant over one integration step.
pub struct QuadcopterDynamics<'a> {
    mass_props: &'a MassProperties,
    gravity: f64,
    command: ControlCommand,
}

impl<'a> QuadcopterDynamics<'a> {
    pub fn new(mass_props: &'a MassProperties, gravity: f64, command: ControlCommand) -> Self {
        Self {
            mass_props,
            gravity,
            command,
        }
    }

    pub fn command(&self) -> &ControlCommand {
        &self.command
    }

    /// Thrust rotated into the world frame. The quaternion of `state` does not
    /// need to be normalized.
    pub fn thrust_world(&self, state: &StateVector) -> Vector3<f64> {
        let q = normalize_quaternion(&state.quat_nb_vec());
        let r_nb = quat_vec_to_rotation_matrix(&q);

        mat_vec_mul(&r_nb, &Vector3::new(0.0, 0.0, self.command.thrust))
    }

    pub fn derivative(&self, state: &StateVector) -> StateVector {
        let mut dstate = StateVector::default();

        // Local copy only, the integrator renormalizes once per step
        let q = normalize_quaternion(&state.quat_nb_vec());
        let w_b = state.angvel_b();

        // Translation
        let thrust_n = mat_vec_mul(
            &quat_vec_to_rotation_matrix(&q),
            &Vector3::new(0.0, 0.0, self.command.thrust),
        );
        let acc_n = thrust_n / self.mass_props.mass - Vector3::new(0.0, 0.0, self.gravity);

        // Attitude kinematics, q_dot = 1/2 q * (0, w)
        let (qw, qx, qy, qz) = (q[0], q[1], q[2], q[3]);
        let (wx, wy, wz) = (w_b[0], w_b[1], w_b[2]);
        let qdot = Vector4::new(
            0.5 * (-qx * wx - qy * wy - qz * wz),
            0.5 * (qw * wx + qy * wz - qz * wy),
            0.5 * (qw * wy - qx * wz + qz * wx),
            0.5 * (qw * wz + qx * wy - qy * wx),
        );

        // Euler's equation, I w_dot = tau - w x (I w)
        let i_w = mat_vec_mul(&self.mass_props.inertia, &w_b);
        let gyro = cross(&w_b, &i_w);
        let w_dot = mat_vec_mul(&self.mass_props.inv_inertia, &(self.command.torque_b - gyro));

        dstate.set_pos_n(&state.vel_n());
        dstate.set_vel_n(&acc_n);
        dstate.set_quat_nb_vec(&qdot);
        dstate.set_angvel_b(&w_dot);

        dstate
    }
}

impl OdeProblem<f64, STATE_SIZE> for QuadcopterDynamics<'_> {
    fn odefun(&self, _t: f64, y: SVector<f64, STATE_SIZE>) -> SVector<f64, STATE_SIZE> {
        self.derivative(&StateVector(y)).0
    }
}
