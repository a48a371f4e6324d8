use clap::Parser;

fn main() -> miette::Result<()> {
    solq_run::Cli::parse().run()
}
