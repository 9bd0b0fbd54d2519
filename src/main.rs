use anyhow::{Context, Result};
use clap::Parser;
use knativize::cli::Cli;
use knativize::parsing::ParsedFile;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let source = knativize::io::read_file(&cli.input)
        .with_context(|| format!("failed to read input file {}", cli.input.display()))?;

    let mut file = ParsedFile::parse(cli.input.clone(), source)?;
    let report = knativize::transform(&mut file)?;
    eprintln!("Found Lambda handler: {}", report.handler.qualified_name);

    match &cli.output {
        Some(path) => knativize::io::write_file(path, file.source())
            .with_context(|| format!("failed to write output file {}", path.display()))?,
        None => print!("{}", file.source()),
    }

    eprintln!("Successfully transformed Lambda handler to Knative function");
    Ok(())
}
