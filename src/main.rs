//! Command-line interface for inspecting `MeSH` descriptor and tree files.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
