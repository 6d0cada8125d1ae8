use approx::assert_abs_diff_eq;
use quadcopter_dynamics::{
    Action, ParamOverrides, PhysicsStepResult, Quadcopter, QuadcopterState, SimulationParams,
};
use serde::Deserialize;

const STATE_TOL: f64 = 1e-10;
const DERIVATIVE_TOL: f64 = 1e-8;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Fixture {
    dt: f64,
    initial_state: QuadcopterState,
    steps: Vec<FixtureStep>,
}

#[derive(Debug, Deserialize)]
struct FixtureStep {
    action: [f64; 4],
    expected: PhysicsStepResult,
}

fn load_fixture() -> Fixture {
    serde_json::from_str(include_str!("data/reference_trajectory.json"))
        .expect("Reference trajectory fixture must parse")
}

#[test]
fn test_reference_trajectory() {
    let fixture = load_fixture();
    assert_eq!(fixture.steps.len(), 10);
    assert_eq!(fixture.dt, SimulationParams::default().dt);

    let mut quad = Quadcopter::new(fixture.initial_state, &ParamOverrides::default()).unwrap();

    for (i, step) in fixture.steps.iter().enumerate() {
        let res = quad.step(step.action, Some(fixture.dt));
        let exp = &step.expected;

        println!("step {i}");
        assert_abs_diff_eq!(res.state.position, exp.state.position, epsilon = STATE_TOL);
        assert_abs_diff_eq!(res.state.velocity, exp.state.velocity, epsilon = STATE_TOL);
        assert_abs_diff_eq!(res.state.quaternion, exp.state.quaternion, epsilon = STATE_TOL);
        assert_abs_diff_eq!(
            res.state.angular_velocity,
            exp.state.angular_velocity,
            epsilon = STATE_TOL
        );

        assert_abs_diff_eq!(
            res.debug.acceleration,
            exp.debug.acceleration,
            epsilon = DERIVATIVE_TOL
        );
        assert_abs_diff_eq!(
            res.debug.angular_acceleration,
            exp.debug.angular_acceleration,
            epsilon = DERIVATIVE_TOL
        );
        assert_abs_diff_eq!(
            res.debug.thrust_world,
            exp.debug.thrust_world,
            epsilon = DERIVATIVE_TOL
        );

        assert_abs_diff_eq!(res.state.quaternion.norm(), 1.0, epsilon = 1e-10);
    }
}

#[test]
fn test_reference_trajectory_after_reset() {
    let fixture = load_fixture();

    let mut quad = Quadcopter::new(QuadcopterState::default(), &ParamOverrides::default()).unwrap();
    for _ in 0..7 {
        quad.step(Action::new(0.4, 0.3, -0.2, 0.1), None);
    }

    // A reset fully replaces the history
    quad.reset(fixture.initial_state.clone()).unwrap();

    for step in &fixture.steps {
        let res = quad.step(step.action, None);
        assert_abs_diff_eq!(
            res.state.position,
            step.expected.state.position,
            epsilon = STATE_TOL
        );
        assert_abs_diff_eq!(
            res.state.quaternion,
            step.expected.state.quaternion,
            epsilon = STATE_TOL
        );
    }
}
