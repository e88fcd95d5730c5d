//! Canonical move example.
//!
//! Builds the forward/dwell/return S-curve move from configuration,
//! discretizes it for the controller resolution and uploads it on the X axis.
//!
//! Without `--send` the upload goes to an in-memory link, so the example runs
//! without hardware attached.
//!
//! ```text
//! cargo run --example canonical_move -- [config.toml] [--send]
//! ```

use std::time::Duration;

use stepper_trajectory::{
    codec::StepPulseTrain,
    config::{load_config, ControllerResolution, SystemConfig},
    motion::CanonicalMove,
    trajectory::Discretizer,
    transport::{Axis, MemoryLink, SerialSession},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let send = args.iter().any(|a| a == "--send");
    let config = match args.iter().find(|a| !a.starts_with("--")) {
        Some(path) => load_config(path)?,
        None => SystemConfig::default(),
    };

    println!("=== Canonical Move Example ===\n");

    let discretizer = Discretizer::from_config(&config.controller);
    let mv = CanonicalMove::from_config(&config.profile);
    let composition = mv.discretize(&discretizer)?;

    println!(
        "Resolution: {:.4} deg/step, total time {:.1} s",
        discretizer.resolution().theta_res(),
        mv.total_time()
    );
    for segment in &composition.segments {
        println!(
            "  segment {}: dt = {:.5} s, {} samples",
            segment.index, segment.dt, segment.samples
        );
    }
    println!(
        "Trajectory: {} samples, max step {:.4} deg",
        composition.trajectory.len(),
        composition.trajectory.max_step()
    );

    let res = ControllerResolution::from_config(&config.controller);
    let pulses = StepPulseTrain::from_trajectory(&composition.trajectory, &res)?;
    println!(
        "Step pulses: {} ({} net), {} bytes as records\n",
        pulses.len(),
        pulses.net_steps(),
        pulses.encode().len()
    );

    let transfers = if send {
        let mut session = SerialSession::open(&config.serial)?;
        session.stage(Axis::X, composition.trajectory);
        session.transfer()?.to_vec()
    } else {
        println!("Dry run (pass --send to use {})", config.serial.port);
        let link = MemoryLink::with_responses("OK\n");
        let timeout = Duration::from_millis(config.serial.ack_timeout_ms);
        let mut session = SerialSession::new(link, timeout, config.serial.ack_policy);
        session.stage(Axis::X, composition.trajectory);
        session.transfer()?.to_vec()
    };

    for t in transfers {
        println!("  axis {}: {} bytes, {:?}", t.axis, t.payload_len, t.outcome);
    }

    Ok(())
}
