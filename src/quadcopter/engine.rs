use log::{debug, trace, warn};

use super::{
    control::map_action,
    dynamics::QuadcopterDynamics,
    params::{MassProperties, ParamOverrides, SimulationParams},
    state::{Action, PhysicsStepResult, QuadcopterState, STATE_SIZE, StateVector, StepDebug},
};
use crate::{
    error::Error,
    math::ode::{OdeSolver, RungeKutta4},
    parameters::ParameterMap,
};

/// Flight dynamics of a single vehicle.
///
/// Owns the vehicle state; [`Quadcopter::step`] is the only way it evolves.
/// Independent vehicles need independent instances.
#[derive(Debug, Clone)]
pub struct Quadcopter {
    params: SimulationParams,
    mass_props: MassProperties,
    state: QuadcopterState,
}

impl Quadcopter {
    /// Default parameters with `overrides` applied.
    pub fn new(initial_state: QuadcopterState, overrides: &ParamOverrides) -> Result<Self, Error> {
        Self::with_params(initial_state, SimulationParams::with_overrides(overrides))
    }

    pub fn with_params(
        initial_state: QuadcopterState,
        params: SimulationParams,
    ) -> Result<Self, Error> {
        params.validate()?;
        initial_state.validate()?;

        let mass_props = MassProperties::from_params(&params)?;

        debug!("New quadcopter with {params:?}");

        Ok(Quadcopter {
            params,
            mass_props,
            state: initial_state,
        })
    }

    /// Builds a vehicle from a `quadcopter` parameter table. Overrides are read
    /// from the table itself, initial conditions from its `init` sub table.
    pub fn from_params(params: &ParameterMap) -> Result<Self, Error> {
        let overrides = ParamOverrides::from_params(params)?;
        let initial_state = match params.get_map_opt("init")? {
            Some(init) => QuadcopterState::from_params(init)?,
            None => QuadcopterState::default(),
        };

        Self::new(initial_state, &overrides)
    }

    /// Advances the state by `dt` seconds (the configured step if `None`)
    /// holding `action` constant.
    ///
    /// The debug quantities are evaluated on the state before the step.
    pub fn step(&mut self, action: impl Into<Action>, dt: Option<f64>) -> PhysicsStepResult {
        let action = action.into();
        let dt = dt.unwrap_or(self.params.dt);

        let command = map_action(&action, &self.params);
        let dynamics = QuadcopterDynamics::new(&self.mass_props, self.params.gravity, command);

        let y0 = StateVector::from(&self.state);

        let dy0 = dynamics.derivative(&y0);
        let debug = StepDebug {
            thrust_world: dynamics.thrust_world(&y0),
            acceleration: dy0.vel_n(),
            angular_acceleration: dy0.angvel_b(),
        };

        let mut next = StateVector(RungeKutta4.solve(&dynamics, 0.0, dt, y0.0));
        next.normalize_quat();

        self.state = next.into();

        trace!("step dt={dt} action={action:?} -> {:?}", self.state);
        if !self.state.is_finite() {
            warn!("Quadcopter state is no longer finite after step with {action:?}, dt={dt}");
        }

        PhysicsStepResult {
            state: self.state.clone(),
            debug,
        }
    }

    pub fn state(&self) -> QuadcopterState {
        self.state.clone()
    }

    /// State flattened as `[pos, vel, quat, angvel]`.
    pub fn state_array(&self) -> [f64; STATE_SIZE] {
        self.state.to_array()
    }

    pub fn state_vector(&self) -> StateVector {
        StateVector::from(&self.state)
    }

    pub fn reset(&mut self, state: QuadcopterState) -> Result<(), Error> {
        state.validate()?;

        debug!("Quadcopter reset to {state:?}");
        self.state = state;
        Ok(())
    }

    pub fn params(&self) -> SimulationParams {
        self.params.clone()
    }

    pub fn mass_properties(&self) -> &MassProperties {
        &self.mass_props
    }
}
