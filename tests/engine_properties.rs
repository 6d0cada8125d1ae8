use approx::{assert_abs_diff_eq, assert_relative_eq};
use nalgebra::{Vector3, Vector4, vector};
use pretty_assertions::assert_eq;
use quadcopter_dynamics::{
    Action, Error, ParamOverrides, Quadcopter, QuadcopterState, SimulationParams,
    quadcopter::map_action,
};

fn tumbling_state() -> QuadcopterState {
    QuadcopterState {
        position: vector![1.0, -2.0, 5.0],
        velocity: vector![0.3, 0.1, -0.4],
        quaternion: vector![0.9, 0.2, -0.1, 0.3],
        angular_velocity: vector![1.5, -0.7, 2.2],
    }
}

fn new_quad(state: QuadcopterState) -> Quadcopter {
    Quadcopter::new(state, &ParamOverrides::default()).unwrap()
}

#[test]
fn test_step_is_deterministic() {
    let mut a = new_quad(tumbling_state());
    let mut b = new_quad(tumbling_state());

    for i in 0..20 {
        let action = Action::new(0.1 * i as f64 - 1.0, 0.3, -0.2, 0.05 * i as f64);
        let ra = a.step(action, Some(0.02));
        let rb = b.step(action, Some(0.02));

        // Bit identical, not just close
        assert_eq!(ra, rb);
    }
    assert_eq!(a.state_array(), b.state_array());
}

#[test]
fn test_quaternion_is_unit_after_step() {
    let start = QuadcopterState {
        quaternion: vector![2.0, 0.0, 0.0, 0.0],
        ..Default::default()
    };
    let mut quad = new_quad(start);

    let res = quad.step(Action::hover(), None);
    assert_abs_diff_eq!(res.state.quaternion.norm(), 1.0, epsilon = 1e-10);

    let mut quad = new_quad(QuadcopterState {
        quaternion: vector![3.0, -1.0, 0.5, 7.0],
        ..tumbling_state()
    });
    for _ in 0..50 {
        let res = quad.step([0.5, 0.1, -0.1, 0.05], None);
        assert_abs_diff_eq!(res.state.quaternion.norm(), 1.0, epsilon = 1e-10);
    }
}

#[test]
fn test_state_before_step_is_not_normalized() {
    let start = QuadcopterState {
        quaternion: vector![2.0, 0.0, 0.0, 0.0],
        ..Default::default()
    };
    let quad = new_quad(start.clone());

    assert_eq!(quad.state(), start);
}

#[test]
fn test_hover_equilibrium() {
    let mut quad = new_quad(QuadcopterState::default());
    let params = quad.params();

    let res = quad.step([0.0, 0.0, 0.0, 0.0], None);

    assert_relative_eq!(
        res.debug.thrust_world.z,
        params.mass * params.gravity,
        epsilon = f64::EPSILON * 100.0
    );
    assert_abs_diff_eq!(res.debug.acceleration, Vector3::zeros(), epsilon = 1e-12);
    assert_abs_diff_eq!(res.debug.angular_acceleration, Vector3::zeros(), epsilon = 1e-12);
    assert_abs_diff_eq!(res.state.position, Vector3::zeros(), epsilon = 1e-12);
    assert_abs_diff_eq!(res.state.velocity, Vector3::zeros(), epsilon = 1e-12);
    assert_eq!(res.state.quaternion, vector![1.0, 0.0, 0.0, 0.0]);
}

#[test]
fn test_throttle_mapping() {
    let params = SimulationParams::default();
    let thrust = |t: f64| map_action(&Action::new(t, 0.0, 0.0, 0.0), &params).thrust;

    assert_eq!(thrust(-1.0), 0.0);
    assert_relative_eq!(thrust(0.0), params.mass * params.gravity);
    assert_relative_eq!(thrust(1.0), 2.0 * params.mass * params.gravity);

    let mut last = thrust(-1.0);
    for i in 1..=100 {
        let next = thrust(-1.0 + 0.02 * i as f64);
        assert!(next >= last);
        last = next;
    }
}

#[test]
fn test_free_fall_with_zero_throttle() {
    let mut quad = new_quad(QuadcopterState::default());

    let res = quad.step([-1.0, 0.0, 0.0, 0.0], Some(0.1));

    assert_eq!(res.debug.thrust_world, Vector3::zeros());
    assert_relative_eq!(res.state.velocity, vector![0.0, 0.0, -0.981], epsilon = 1e-12);
}

#[test]
fn test_torque_mapping() {
    let params = SimulationParams::default();

    for throttle in [-1.0, -0.3, 0.0, 0.8, 1.0] {
        for (roll, pitch, yaw) in [(0.0, 0.0, 0.0), (1.0, -1.0, 0.5), (-0.25, 0.75, -1.0)] {
            let cmd = map_action(&Action::new(throttle, roll, pitch, yaw), &params);
            assert_eq!(cmd.torque_b, vector![roll * 0.5, pitch * 0.5, yaw * 0.1]);
        }
    }
}

#[test]
fn test_out_of_range_actions_are_not_clamped() {
    let mut quad = new_quad(QuadcopterState::default());

    let res = quad.step([3.0, 2.0, 0.0, 0.0], None);

    // 4x hover thrust, 2x the nominal roll torque
    assert_relative_eq!(res.debug.acceleration.z, 3.0 * 9.81, epsilon = 1e-9);
    assert_relative_eq!(res.debug.angular_acceleration.x, 1.0 / 0.0023, epsilon = 1e-9);
}

#[test]
fn test_copy_isolation() {
    let mut quad = new_quad(QuadcopterState::default());
    let s = tumbling_state();

    quad.reset(s.clone()).unwrap();

    let mut first = quad.state();
    let second = quad.state();
    assert_eq!(first, s);
    assert_eq!(second, s);

    // Mutating a returned copy changes neither the engine nor other copies
    first.position[0] = 1000.0;
    first.quaternion[0] = -5.0;
    assert_eq!(quad.state(), s);
    assert_eq!(second, s);

    let mut arr = quad.state_array();
    arr[0] = 42.0;
    assert_eq!(quad.state_array(), s.to_array());

    let mut params = quad.params();
    params.mass = 100.0;
    assert_eq!(quad.params().mass, 2.5);
}

#[test]
fn test_reset_rejects_zero_quaternion() {
    let mut quad = new_quad(tumbling_state());
    quad.step([0.2, 0.1, -0.1, 0.0], None);
    let before = quad.state();

    let degenerate = QuadcopterState {
        quaternion: Vector4::zeros(),
        ..tumbling_state()
    };
    assert_eq!(
        quad.reset(degenerate),
        Err(Error::DegenerateQuaternion { norm: 0.0 })
    );

    // The previous state is kept and stepping still works
    assert_eq!(quad.state(), before);
    let res = quad.step(Action::hover(), None);
    assert!(res.state.is_finite());
    assert_abs_diff_eq!(res.state.quaternion.norm(), 1.0, epsilon = 1e-10);
}

#[test]
fn test_reset_ignores_caller_mutation() {
    let mut quad = new_quad(QuadcopterState::default());
    let mut s = tumbling_state();

    quad.reset(s.clone()).unwrap();
    s.velocity[2] = 99.0;

    assert_eq!(quad.state(), tumbling_state());
}

#[test]
fn test_step_changes_scale_with_dt() {
    let action = Action::new(0.3, 0.2, -0.1, 0.4);

    let delta = |dt: f64| {
        let mut quad = new_quad(tumbling_state());
        let before = quad.state_array();
        let after = quad.step(action, Some(dt));
        // Quaternion renormalization is not a dt effect
        let mut unit_before = QuadcopterState::from_array(&before);
        unit_before.quaternion = unit_before.quaternion.normalize();
        let before = unit_before.to_array();
        let after = after.state.to_array();

        before
            .iter()
            .zip(after.iter())
            .map(|(b, a)| (a - b).abs())
            .fold(0.0, f64::max)
    };

    let d1 = delta(1e-6);
    let d2 = delta(1e-7);

    assert!(d1 > 0.0);
    assert!(d1 < 1e-3);
    assert_relative_eq!(d1 / d2, 10.0, epsilon = 1e-3);

    let mut quad = new_quad(tumbling_state());
    let res = quad.step(action, Some(0.0));
    assert_abs_diff_eq!(res.state.position, tumbling_state().position);
    assert_abs_diff_eq!(res.state.angular_velocity, tumbling_state().angular_velocity);
}

#[test]
fn test_independent_vehicles() {
    let mut a = new_quad(QuadcopterState::default());
    let mut b = Quadcopter::new(
        tumbling_state(),
        &ParamOverrides {
            mass: Some(1.0),
            ..Default::default()
        },
    )
    .unwrap();

    let b_before = b.state();
    a.step([1.0, 0.0, 0.0, 0.0], None);
    assert_eq!(b.state(), b_before);

    b.step([0.0, 0.0, 0.0, 0.0], None);
    assert_eq!(a.params().mass, 2.5);
    assert_eq!(b.params().mass, 1.0);
}

#[test]
fn test_invalid_construction() {
    for overrides in [
        ParamOverrides {
            mass: Some(0.0),
            ..Default::default()
        },
        ParamOverrides {
            gravity: Some(-9.81),
            ..Default::default()
        },
        ParamOverrides {
            inertia: Some(vector![0.0023, -0.0023, 0.004]),
            ..Default::default()
        },
    ] {
        assert!(matches!(
            Quadcopter::new(QuadcopterState::default(), &overrides),
            Err(Error::InvalidParameter { .. })
        ));
    }
}
