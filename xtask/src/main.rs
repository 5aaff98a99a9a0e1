use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::process::{Command, Stdio};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "x")]
#[command(about = "Development automation for rvtimer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Format check, clippy, tests and a short harness run
    Ci,
    /// Format code
    Fmt {
        #[arg(long)]
        check: bool,
    },
    /// Run clippy with warnings denied
    Clippy,
    /// Run tests, optionally limited to one or more components
    Test {
        /// Only doc tests
        #[arg(long)]
        doc: bool,
        /// Components to test (default: everything)
        #[arg(short, long, value_enum)]
        component: Vec<Component>,
    },
    /// Run the criterion benchmarks
    Bench,
    /// Run the rvtimer harness
    Run {
        /// Path to a TOML run configuration
        config: Option<String>,
        /// Number of reference-clock cycles (overrides the config)
        #[arg(short = 'n', long)]
        cycles: Option<u64>,
        /// Build in release mode
        #[arg(long)]
        release: bool,
    },
}

/// Library components with their own test modules
#[derive(Clone, Copy, ValueEnum)]
enum Component {
    Timer,
    Register,
    Counter,
    Interrupt,
    Memory,
    Config,
    Snapshot,
}

impl Component {
    fn module_path(self) -> &'static str {
        match self {
            Component::Timer => "core::timer",
            Component::Register => "core::register",
            Component::Counter => "core::counter",
            Component::Interrupt => "core::interrupt",
            Component::Memory => "core::memory",
            Component::Config => "core::config",
            Component::Snapshot => "core::save_state",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci => run_ci(),
        Commands::Fmt { check } => run_fmt(check),
        Commands::Clippy => cargo(&["clippy", "--all-targets", "--", "-D", "warnings"]),
        Commands::Test { doc, component } => run_test(doc, &component),
        Commands::Bench => cargo(&["bench"]),
        Commands::Run {
            config,
            cycles,
            release,
        } => run_harness(config.as_deref(), cycles, release),
    }
}

fn run_ci() -> Result<()> {
    println!("{}", "=== rvtimer CI ===".bold().blue());
    let start = Instant::now();

    step("Format Check", || run_fmt(true))?;
    step("Clippy", || {
        cargo(&["clippy", "--all-targets", "--", "-D", "warnings"])
    })?;
    step("Test", || run_test(false, &[]))?;
    step("Harness smoke run", || run_harness(None, Some(10_000), false))?;

    println!(
        "\n{} {}",
        "✓ CI passed in".green().bold(),
        format!("{:.2}s", start.elapsed().as_secs_f64()).bold()
    );
    Ok(())
}

fn run_fmt(check: bool) -> Result<()> {
    if check {
        cargo(&["fmt", "--all", "--", "--check"])
    } else {
        cargo(&["fmt", "--all"])
    }
}

fn run_test(doc: bool, components: &[Component]) -> Result<()> {
    if doc {
        return cargo(&["test", "--doc"]);
    }
    if components.is_empty() {
        return cargo(&["test", "--workspace"]);
    }

    let mut failed = Vec::new();
    for component in components {
        let path = component.module_path();
        println!("{} {}", "→".blue(), path.bold());

        if cargo(&["test", "--lib", path]).is_err() {
            failed.push(path);
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("Tests failed in: {}", failed.join(", "))
    }
}

fn run_harness(config: Option<&str>, cycles: Option<u64>, release: bool) -> Result<()> {
    if let Some(path) = config {
        if !std::path::Path::new(path).exists() {
            println!("{} Config file not found: {}", "✗".red().bold(), path.yellow());
            anyhow::bail!("Config file not found");
        }
    }

    let cycles = cycles.map(|n| n.to_string());

    let mut args = vec!["run", "--quiet", "--bin", "rvtimer"];
    if release {
        args.push("--release");
    }
    args.push("--");
    if let Some(path) = config {
        args.push(path);
    }
    if let Some(cycles) = cycles.as_deref() {
        args.extend(["-n", cycles]);
    }

    cargo(&args)
}

/// Print a status line around one CI step
fn step<F>(name: &str, task: F) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    println!("{} {}", "→".blue(), name.bold());
    let start = Instant::now();

    match task() {
        Ok(()) => {
            println!(
                "{} {} ({:.2}s)",
                "✓".green().bold(),
                name,
                start.elapsed().as_secs_f64()
            );
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "✗".red().bold(), name);
            Err(e)
        }
    }
}

/// Run `cargo` with the given arguments, inheriting stdio
fn cargo(args: &[&str]) -> Result<()> {
    let status = Command::new("cargo")
        .args(args)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;

    if !status.success() {
        anyhow::bail!("cargo {} failed: {}", args.join(" "), status);
    }

    Ok(())
}
