use anyhow::Context;
use clap::{Parser, Subcommand};
use std::process::Command as ProcessCommand;

#[derive(Debug, Parser)]
#[command(name = "xtask", about = "Workspace helper tasks")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print schema identifiers used by scf.
    PrintSchemas,
    /// Print the embedded buildstate JSON schema.
    DumpSchema,
    /// Validate the buildstate in the current directory via the CLI.
    Validate,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::PrintSchemas => {
            println!("{}", scf_types::schema::SCF_BUILDSTATE_V1);
            println!("{}", scf_types::schema::SCF_PATTERNS_V1);
        }
        Command::DumpSchema => {
            let schema: serde_json::Value =
                serde_json::from_str(include_str!("../../scf-cli/schemas/buildstate.v1.json"))
                    .context("parse embedded schema")?;
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Command::Validate => {
            let status = ProcessCommand::new("cargo")
                .args(["run", "-p", "scf-cli", "--", "validate"])
                .status()
                .context("run scf validate")?;
            if !status.success() {
                anyhow::bail!("validate failed");
            }
        }
    }
    Ok(())
}
