pub mod control;
pub mod dynamics;
pub mod engine;
pub mod params;
pub mod state;

pub use control::{ControlCommand, map_action};
pub use dynamics::QuadcopterDynamics;
pub use engine::Quadcopter;
pub use params::{MassProperties, ParamOverrides, SimulationParams};
pub use state::{Action, PhysicsStepResult, QuadcopterState, STATE_SIZE, StateVector, StepDebug};
