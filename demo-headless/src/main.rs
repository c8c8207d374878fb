use clap::{Parser, ValueEnum};
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::EnvFilter;
use wildfire_ca_core::{
    CellState, Environment, RandomSource, RemainderPolicy, Simulation, SimulationConfig, Snapshot,
};

/// Parallel cellular-automaton wildfire demo with terminal output
#[derive(Parser, Debug)]
#[command(name = "wildfire-ca")]
#[command(about = "Stochastic cellular-automaton wildfire spread demo", long_about = None)]
struct Args {
    /// Simulated rows of the grid
    #[arg(long, default_value_t = 300)]
    rows: usize,

    /// Columns of the grid (margin columns included)
    #[arg(long, default_value_t = 300)]
    columns: usize,

    /// Number of generations to run
    #[arg(short, long, default_value_t = 300)]
    generations: usize,

    /// Probability that a burning cell keeps burning
    #[arg(short, long, default_value_t = 0.5)]
    p_continue_burn: f64,

    /// Enable direction-dependent wind
    #[arg(long)]
    wind: bool,

    /// Band vegetation classes across the columns
    #[arg(long)]
    vegetation: bool,

    /// Band vegetation density across the columns
    #[arg(long)]
    density: bool,

    /// Altitude rising with the column index
    #[arg(long)]
    altitude: bool,

    /// Enable wind, vegetation, density and altitude together
    #[arg(short, long)]
    all_factors: bool,

    /// Worker threads (defaults to available parallelism)
    #[arg(short, long)]
    workers: Option<usize>,

    /// What to do with rows that do not divide evenly among workers
    #[arg(long, value_enum, default_value_t = Remainder::Reject)]
    remainder: Remainder,

    /// Seed for reproducible runs (OS entropy when omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Print state digits without ANSI colors
    #[arg(long)]
    plain: bool,

    /// Print every Nth generation
    #[arg(short, long, default_value_t = 1)]
    every: usize,

    /// Pause between printed generations in milliseconds
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,

    /// Print the factor maps and wind table before running
    #[arg(long)]
    show_maps: bool,

    /// Only print the final census
    #[arg(short, long)]
    quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Remainder {
    Reject,
    Truncate,
    Distribute,
}

impl From<Remainder> for RemainderPolicy {
    fn from(value: Remainder) -> Self {
        match value {
            Remainder::Reject => RemainderPolicy::Reject,
            Remainder::Truncate => RemainderPolicy::Truncate,
            Remainder::Distribute => RemainderPolicy::Distribute,
        }
    }
}

/// Largest worker count up to `available` that splits `rows` evenly
fn even_worker_count(rows: usize, available: usize) -> usize {
    (1..=available.min(rows))
        .rev()
        .find(|workers| rows % workers == 0)
        .unwrap_or(1)
}

impl Args {
    fn config(&self) -> SimulationConfig {
        let available =
            std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
        self.config_for(available)
    }

    /// Build the run configuration for a machine with `available` cores
    ///
    /// Without `--workers` the worker count follows the core count, lowered
    /// to a divisor of `--rows` when leftover rows would be rejected.
    fn config_for(&self, available: usize) -> SimulationConfig {
        let workers = self.workers.unwrap_or(match self.remainder {
            Remainder::Reject => even_worker_count(self.rows, available),
            Remainder::Truncate | Remainder::Distribute => available,
        });
        SimulationConfig {
            total_rows: self.rows,
            columns: self.columns,
            generations: self.generations,
            p_continue_burn: self.p_continue_burn,
            wind_enabled: self.wind || self.all_factors,
            vegetation_enabled: self.vegetation || self.all_factors,
            density_enabled: self.density || self.all_factors,
            altitude_enabled: self.altitude || self.all_factors,
            worker_count: workers,
            remainder_policy: self.remainder.into(),
            random: self.seed.map_or(RandomSource::Entropy, RandomSource::Seeded),
        }
    }
}

/// ANSI cell rendering: blue non-fuel, green fuel, red burning, black burnt
fn colored(state: CellState) -> &'static str {
    match state {
        CellState::NonFuel => "\x1b[1;34;40m 1\x1b[0m",
        CellState::Fuel => "\x1b[1;32;40m 2\x1b[0m",
        CellState::Burning => "\x1b[1;31;40m 3\x1b[0m",
        CellState::Burnt => "\x1b[1;30;40m 4\x1b[0m",
    }
}

fn print_snapshot(out: &mut impl Write, snapshot: &Snapshot, plain: bool) -> io::Result<()> {
    writeln!(out, "-----------Generation: {} ---------------", snapshot.generation())?;
    for row in snapshot.cells().iter_rows() {
        for &state in row {
            if plain {
                write!(out, "{}", state.code())?;
            } else {
                out.write_all(colored(state).as_bytes())?;
            }
        }
        writeln!(out)?;
    }
    writeln!(out, "{}", snapshot.census())?;
    out.flush()
}

fn print_maps(out: &mut impl Write, maps: &Environment) -> io::Result<()> {
    writeln!(out, "Vegetation Map")?;
    for row in maps.vegetation().iter_rows() {
        let line: String = row.iter().map(|c| char::from(b'0' + c.value())).collect();
        writeln!(out, "{line}")?;
    }
    writeln!(out, "Density Map")?;
    for row in maps.density().iter_rows() {
        let line: String = row.iter().map(|c| char::from(b'0' + c.value())).collect();
        writeln!(out, "{line}")?;
    }
    writeln!(out, "Altitude Map")?;
    for row in maps.altitude().iter_rows() {
        let line: Vec<String> = row.iter().map(|a| format!("{a:.0}")).collect();
        writeln!(out, "{}", line.join(" "))?;
    }
    writeln!(out, "Wind table:")?;
    let wind = maps.wind();
    for r in 0..3 {
        writeln!(
            out,
            "[{:.4}, {:.4}, {:.4}]",
            wind.factor(r, 0),
            wind.factor(r, 1),
            wind.factor(r, 2)
        )?;
    }
    writeln!(out, "--------------------")?;
    out.flush()
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let simulation = match Simulation::new(args.config()) {
        Ok(simulation) => simulation,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if args.show_maps {
        if let Err(err) = print_maps(&mut out, &simulation.factor_maps()) {
            error!("Failed to print factor maps: {err}");
            return ExitCode::FAILURE;
        }
    }

    let every = args.every.max(1);
    let delay = Duration::from_millis(args.delay_ms);
    let mut output_error: Option<io::Error> = None;

    let result = simulation.run(|snapshot| {
        if args.quiet || output_error.is_some() || snapshot.generation() % every != 0 {
            return;
        }
        if let Err(err) = print_snapshot(&mut out, &snapshot, args.plain) {
            output_error = Some(err);
            return;
        }
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    });
    drop(out);

    match result {
        Ok(summary) => {
            if let Some(err) = output_error {
                error!("Failed to write snapshots: {err}");
                return ExitCode::FAILURE;
            }
            println!(
                "Finished {} generations on {} workers: {}",
                summary.generations, summary.worker_count, summary.final_census
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Simulation aborted: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("wildfire-ca").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_default_workers_divide_rows() {
        let args = parse(&[]);
        for available in [1, 7, 8, 9, 11, 14, 16, 64] {
            let config = args.config_for(available);
            assert!(config.worker_count <= available);
            assert_eq!(config.total_rows % config.worker_count, 0);
            assert!(Simulation::new(config).is_ok());
        }
        assert_eq!(args.config_for(8).worker_count, 6);
        assert_eq!(args.config_for(16).worker_count, 15);
        assert_eq!(args.config_for(7).worker_count, 6);
    }

    #[test]
    fn test_explicit_workers_are_kept() {
        let config = parse(&["--workers", "8"]).config_for(16);
        assert_eq!(config.worker_count, 8);
        assert!(Simulation::new(config).is_err());

        let config = parse(&["--remainder", "distribute"]).config_for(8);
        assert_eq!(config.worker_count, 8);
        assert!(Simulation::new(config).is_ok());
    }

    #[test]
    fn test_even_worker_count_small_grids() {
        assert_eq!(even_worker_count(7, 16), 7);
        assert_eq!(even_worker_count(7, 4), 1);
        assert_eq!(even_worker_count(12, 5), 4);
    }
}
