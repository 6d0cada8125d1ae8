use std::{env, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use quadcopter_dynamics::{Action, Quadcopter, parameters};

/// Steps a single quadcopter with a constant command and logs the trajectory.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/params.toml")]
    config: PathBuf,

    #[arg(short, long, default_value_t = 50)]
    steps: usize,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    throttle: f64,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    roll: f64,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pitch: f64,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    yaw: f64,
}

fn main() -> Result<()> {
    // Default log level to "info"
    if env::var("RUST_LOG").is_err() {
        unsafe { env::set_var("RUST_LOG", "info") }
    }

    pretty_env_logger::init();

    let args = Args::parse();

    let params = parameters::parse_file(&args.config)
        .with_context(|| format!("Loading {}", args.config.display()))?;
    let mut quad = Quadcopter::from_params(params.get_map("quadcopter")?)?;

    let action = Action::new(args.throttle, args.roll, args.pitch, args.yaw);
    let dt = quad.params().dt;
    info!("Running {} steps of {dt} s with {action:?}", args.steps);

    for i in 1..=args.steps {
        let res = quad.step(action, None);
        info!(
            "t={:.3} pos={:?} vel={:?} quat={:?} acc={:?}",
            i as f64 * dt,
            res.state.position.as_slice(),
            res.state.velocity.as_slice(),
            res.state.quaternion.as_slice(),
            res.debug.acceleration.as_slice(),
        );
    }

    println!("{:?}", quad.state_array());

    Ok(())
}
