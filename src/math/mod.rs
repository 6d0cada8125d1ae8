pub mod ode;
pub mod rotation;

pub use ode::{OdeProblem, OdeSolver, RungeKutta4};
