use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = permalink::cli::Cli::parse();
    permalink::init(cli.verbose);

    cli.run()
}
