mod commands;
mod events;
mod terrain;

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use spades_world::Vec3;

#[derive(Parser, Debug)]
#[command(name = "spades", version, about = "Voxel map tools and headless world simulation")]
struct Cli {
    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Also write the log to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print dimensions and voxel statistics of a map file.
    Info { map: PathBuf },
    /// Generate a noise terrain map.
    Gen {
        #[arg(long, default_value_t = 1337)]
        seed: i32,
        #[arg(long)]
        out: PathBuf,
        /// Write the blank map (bottom dirt layer only) instead of terrain.
        #[arg(long)]
        ground: bool,
    },
    /// Decode, re-encode and decode again; fail if anything visible changed.
    Roundtrip { map: PathBuf },
    /// Cast a ray through a map.
    Ray {
        map: PathBuf,
        /// Origin as `x,y,z`.
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        from: Vec3,
        /// Direction as `x,y,z`.
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        dir: Vec3,
        #[arg(long, default_value_t = 256)]
        steps: u32,
        /// Use the wrapping fixed-point caster.
        #[arg(long)]
        fast: bool,
    },
    /// Run scripted bots through the world simulation.
    Simulate {
        #[arg(long)]
        map: Option<PathBuf>,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 600)]
        ticks: u32,
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f32,
    },
}

fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, z] = parts[..] else {
        return Err(format!("expected x,y,z, got '{s}'"));
    };
    let f = |v: &str| v.parse::<f32>().map_err(|e| format!("'{v}': {e}"));
    Ok(Vec3::new(f(x)?, f(y)?, f(z)?))
}

fn init_logging(verbose: u8, log_file: Option<&PathBuf>) -> Result<()> {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    match log_file {
        Some(path) => {
            use simplelog::{
                ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode, WriteLogger,
            };
            let file = File::create(path)
                .with_context(|| format!("create log file {}", path.display()))?;
            CombinedLogger::init(vec![
                TermLogger::new(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto),
                WriteLogger::new(level, Config::default(), file),
            ])?;
        }
        None => {
            env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or(level.as_str()),
            )
            .init();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_file.as_ref())?;
    match cli.cmd {
        Command::Info { map } => commands::info(&map),
        Command::Gen { seed, out, ground } => commands::generate(seed, &out, ground),
        Command::Roundtrip { map } => commands::roundtrip(&map),
        Command::Ray {
            map,
            from,
            dir,
            steps,
            fast,
        } => commands::ray(&map, from, dir, steps, fast),
        Command::Simulate {
            map,
            config,
            ticks,
            dt,
        } => commands::simulate(map.as_deref(), config.as_deref(), ticks, dt),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_vectors() {
        assert_eq!(parse_vec3("1, -2.5,3").unwrap(), Vec3::new(1.0, -2.5, 3.0));
        assert!(parse_vec3("1,2").is_err());
        assert!(parse_vec3("a,b,c").is_err());
    }

    #[test]
    fn cli_shape_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
