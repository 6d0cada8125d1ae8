use nalgebra::{RealField, SVector};

pub trait OdeSolver<T, const S: usize> {
    fn solve(
        &self,
        problem: &dyn OdeProblem<T, S>,
        t0: T,
        dt: T,
        y0: SVector<T, S>,
    ) -> SVector<T, S>;
}

pub trait OdeProblem<T, const S: usize>
where
    T: RealField,
{
    fn odefun(&self, t: T, y: SVector<T, S>) -> SVector<T, S>;
}

/// Classical explicit fourth order Runge-Kutta.
///
/// The combination is `y0 + dt/6 * (k1 + 2 k2 + 2 k3 + k4)`, evaluated in that
/// order so trajectories are reproducible bit for bit.
pub struct RungeKutta4;

impl<T: RealField + From<f64> + Copy, const S: usize> OdeSolver<T, S> for RungeKutta4 {
    fn solve(
        &self,
        problem: &dyn OdeProblem<T, S>,
        t0: T,
        dt: T,
        y0: SVector<T, S>,
    ) -> SVector<T, S> {
        let hdt = dt / T::from(2.0);
        let k1 = problem.odefun(t0, y0);
        let k2 = problem.odefun(t0 + hdt, y0 + k1 * hdt);
        let k3 = problem.odefun(t0 + hdt, y0 + k2 * hdt);
        let k4 = problem.odefun(t0 + dt, y0 + k3 * dt);

        let sum = k1 + k2 * T::from(2.0) + k3 * T::from(2.0) + k4;
        y0 + sum * (dt / T::from(6.0))
    }
}
