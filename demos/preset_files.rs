//! Preset trajectory files example.
//!
//! Writes the ramp, triangle and sine presets as fixed-rate files, then reads
//! each one back and prints its header.
//!
//! ```text
//! cargo run --example preset_files -- [output_dir] [duration_s]
//! ```

use std::path::PathBuf;

use stepper_trajectory::{
    codec::{self, FixedRateTrajectory, TrajectoryFormat, TrajectoryPayload},
    config::EncodingConfig,
    motion::Preset,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| ".".into()));
    let duration: f64 = match args.next() {
        Some(s) => s.parse()?,
        None => 8.0,
    };

    let encoding = EncodingConfig::default();
    let period = encoding.sample_period_us;
    let total = (duration * 1e6 / period as f64).round() as usize;

    println!("=== Preset Files Example ===\n");
    println!(
        "dt = {} us ({:.1} Hz), {} samples per file\n",
        period,
        1e6 / period as f64,
        total
    );

    for preset in Preset::ALL {
        let mut traj = FixedRateTrajectory::sample(&preset, period, total)?;
        traj.angle_scale = encoding.angle_scale;

        let path = out_dir.join(format!("{}.traj", preset.name()));
        codec::save(TrajectoryFormat::FixedRate, &traj.into(), &path)?;

        let TrajectoryPayload::FixedRate(loaded) = codec::load(TrajectoryFormat::FixedRate, &path)? else {
            unreachable!("fixed-rate decode returns a fixed-rate payload");
        };
        let header = loaded.header();

        println!("{} -> {}", preset.description(), path.display());
        println!("  magic        : 0x{:08X}", header.magic);
        println!("  version      : {}", header.version);
        println!("  axis_count   : {}", header.axis_count);
        println!("  sample_dt_us : {}", header.sample_period_us);
        println!("  total        : {}", header.total_samples);
        println!("  angle_scale  : {}", header.angle_scale);
        println!("  flags        : {}", header.flags);
        let first: Vec<String> = loaded.samples.iter().take(5).map(|v| format!("{:.6}", v)).collect();
        println!("  first        : {}\n", first.join(", "));
    }

    Ok(())
}
