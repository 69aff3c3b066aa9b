use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for cubegrid")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: fmt, clippy, tests, doc, smoke
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Build rustdoc for the workspace
    Doc,
    /// Build the entire workspace
    Build,
    /// Drive the headless CLI through scripted turns and check the results
    Smoke,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            run_fmt()?;
            run_clippy()?;
            run_tests()?;
            run_doc()?;
            run_smoke()?;
        }
        Commands::Fmt => run_fmt()?,
        Commands::Clippy => run_clippy()?,
        Commands::Test => run_tests()?,
        Commands::Doc => run_doc()?,
        Commands::Build => cargo("build", &["build", "--workspace"])?,
        Commands::Smoke => run_smoke()?,
    }

    Ok(())
}

fn cargo(step: &str, args: &[&str]) -> Result<()> {
    println!("==> Running cargo {}", args.join(" "));
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("cargo {step} failed");
    }
    Ok(())
}

fn run_fmt() -> Result<()> {
    cargo("fmt", &["fmt", "--all", "--", "--check"])
}

fn run_clippy() -> Result<()> {
    cargo(
        "clippy",
        &[
            "clippy",
            "--workspace",
            "--all-targets",
            "--",
            "-D",
            "warnings",
        ],
    )
}

fn run_tests() -> Result<()> {
    cargo("test", &["test", "--workspace"])
}

fn run_doc() -> Result<()> {
    cargo("doc", &["doc", "--workspace", "--no-deps"])
}

/// Run `cubegrid-cli turn` with `args` and return the parsed JSON report.
fn cli_turn(args: &[&str]) -> Result<serde_json::Value> {
    let mut full = vec!["run", "-q", "-p", "cubegrid-cli", "--", "turn", "--json"];
    full.extend_from_slice(args);
    let output = Command::new("cargo").args(&full).output()?;
    if !output.status.success() {
        anyhow::bail!(
            "cubegrid-cli turn {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    serde_json::from_slice(&output.stdout).context("parse cubegrid-cli JSON report")
}

fn run_smoke() -> Result<()> {
    println!("==> Running cubegrid-cli smoke turns");
    let cases: [(&[&str], u64, bool); 4] = [
        (&["--turns", "1"], 1, false),
        (&["--turns", "4"], 4, true),
        (&["--turns", "4", "--counter-clockwise"], 4, true),
        // Requests during a running turn are dropped.
        (&["--turns", "3", "--no-wait"], 1, false),
    ];
    for (args, turns, solved) in cases {
        let report = cli_turn(args)?;
        let got_turns = report["turns_completed"].as_u64();
        let got_solved = report["solved"].as_bool();
        if got_turns != Some(turns) || got_solved != Some(solved) {
            anyhow::bail!(
                "turn {}: expected turns={turns} solved={solved}, got {got_turns:?} {got_solved:?}",
                args.join(" ")
            );
        }
        println!("    turn {} ok", args.join(" "));
    }
    Ok(())
}
