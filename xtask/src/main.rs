use std::process;

use anyhow::Result;
use clap::{ArgMatches, Command};

const BIN_NAME: &str = "rebrand";

fn main() -> Result<()> {
    let args = clap::command!()
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(Command::new("install").about("Install rebrand binary locally"))
        .subcommand(
            Command::new("run")
                .about("Build and run rebrand with arguments")
                .trailing_var_arg(true)
                .allow_hyphen_values(true)
                .arg(clap::Arg::new("args")
                    .help("Arguments to pass to rebrand")
                    .action(clap::ArgAction::Append)
                    .num_args(0..))
        )
        .subcommand(
            Command::new("test")
                .about("Test Operations")
                .subcommand(Command::new("all").about("Run all tests for the entire project"))
                .subcommand(Command::new("core").about("Run unit tests for rebrand-core"))
                .subcommand(Command::new("bin").about("Run tests for rebrand-bin"))
                .subcommand(Command::new("integration").about("Run fixture project tests and CLI smoke checks"))
        )
        .get_matches();

    match args.subcommand() {
        Some(("install", _args)) => install(),
        Some(("run", args)) => run(args),
        Some(("test", args)) => handle_test_commands(args),
        Some((command, _)) => anyhow::bail!("Unexpected command: {command}"),
        None => anyhow::bail!("Expected subcommand"),
    }
}

fn cargo(args: &[&str], failure: &str) -> Result<()> {
    let status = process::Command::new("cargo").args(args).status()?;

    if !status.success() {
        anyhow::bail!("{failure}");
    }
    Ok(())
}

fn install() -> Result<()> {
    println!("Installing {BIN_NAME}...");
    cargo(&["install", "--path", "crates/rebrand-bin"], "Failed to install rebrand")?;
    println!("✓ {BIN_NAME} installed successfully");
    Ok(())
}

fn run(args: &ArgMatches) -> Result<()> {
    let run_args: Vec<String> = args.get_many::<String>("args")
        .map_or(Vec::new(), |vals| vals.cloned().collect());

    let mut cargo_args = vec!["run", "--bin", BIN_NAME, "--"];
    cargo_args.extend(run_args.iter().map(String::as_str));

    cargo(&cargo_args, "Failed to run rebrand")
}

fn handle_test_commands(args: &ArgMatches) -> Result<()> {
    match args.subcommand() {
        Some(("all", _args)) => test_all(),
        Some(("core", _args)) => test_core(),
        Some(("bin", _args)) => test_bin(),
        Some(("integration", _args)) => test_integration(),
        _ => {
            println!("Available test commands:");
            println!("  all          - Run all tests for the entire project");
            println!("  core         - Run unit tests for rebrand-core");
            println!("  bin          - Run tests for rebrand-bin");
            println!("  integration  - Run fixture project tests and CLI smoke checks");
            Ok(())
        }
    }
}

fn test_all() -> Result<()> {
    println!("🧪 Running all tests for the rebrand project...\n");

    let suites: [(&str, fn() -> Result<()>); 4] = [
        ("rebrand-core", test_core),
        ("rebrand-bin", test_bin),
        ("integration", test_integration),
        ("documentation", test_docs),
    ];

    let mut all_passed = true;
    for (name, suite) in suites {
        match suite() {
            Ok(()) => println!("✅ {name} tests passed\n"),
            Err(e) => {
                all_passed = false;
                println!("❌ {name} tests failed: {e:?}\n");
            }
        }
    }

    if !all_passed {
        println!("💥 Some tests failed. Please check the output above.");
        anyhow::bail!("Test suite failed");
    }

    println!("🎉 All tests passed successfully!");
    Ok(())
}

fn test_core() -> Result<()> {
    println!("📚 Running rebrand-core unit tests...");
    cargo(&["test", "--package", "rebrand-core", "--lib"], "Core tests failed")
}

fn test_bin() -> Result<()> {
    println!("🔧 Running rebrand-bin tests...");
    cargo(&["test", "--package", "rebrand-bin"], "Binary tests failed")
}

fn test_docs() -> Result<()> {
    println!("📖 Running documentation tests...");
    cargo(&["test", "--doc", "--package", "rebrand-core"], "Documentation tests failed")
}

fn test_integration() -> Result<()> {
    println!("🔗 Running integration tests...");
    cargo(
        &["test", "--package", "rebrand-core", "--test", "integration_tests"],
        "Fixture project tests failed",
    )?;

    cargo(&["build", "--bin", BIN_NAME], "Failed to build rebrand binary")?;
    let smoke_checks: [&[&str]; 4] = [
        &["--help"],
        &["rename-app", "--help"],
        &["change-bundle-id", "--help"],
        &["--version"],
    ];
    for check in smoke_checks {
        let mut cargo_args = vec!["run", "--bin", BIN_NAME, "--"];
        cargo_args.extend_from_slice(check);
        cargo(&cargo_args, "CLI smoke check failed")?;
    }

    Ok(())
}
