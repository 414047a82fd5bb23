use anyhow::Result;
use clap::Parser;
use junction::{run, run_parallel, JunctionConfig, RunOptions};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Configuration file in YAML. Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ticks of each run, overriding the configuration
    #[arg(long)]
    steps: Option<usize>,

    /// Number of independent runs, executed in parallel
    #[arg(long, default_value_t = 1)]
    runs: usize,

    /// Seed of the first run; run `i` uses `seed + i`
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Agent parameters to start from
    #[arg(long)]
    load_params: Option<PathBuf>,

    /// Directory where agent parameters are saved after each run
    #[arg(long)]
    save_params: Option<PathBuf>,

    /// Writes the effective configuration to this file and exits
    #[arg(long)]
    write_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => JunctionConfig::load(path)?,
        None => JunctionConfig::default(),
    };
    if let Some(steps) = args.steps {
        config = config.step_budget(steps);
    }

    if let Some(path) = &args.write_config {
        config.save(path)?;
        info!("Saved the configuration in {:?}", path);
        return Ok(());
    }

    let reports = match args.runs {
        0 | 1 => {
            let options = RunOptions::with_seed(args.seed)
                .load_params(args.load_params.clone())
                .save_dir(args.save_params.clone());
            vec![run(&config, &options)?]
        }
        n => {
            let seeds = (0..n as u64).map(|i| args.seed + i).collect::<Vec<_>>();
            run_parallel(
                &config,
                &seeds,
                args.load_params.as_deref(),
                args.save_params.as_deref(),
            )?
        }
    };

    print!("{}", serde_yaml::to_string(&reports)?);

    Ok(())
}
