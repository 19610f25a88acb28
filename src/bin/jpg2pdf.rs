use std::process::ExitCode;

use anyhow::Result;
use catalogpdf::CatalogError;
use catalogpdf::cli::SplitCli;
use catalogpdf::output::{self, OutputFormatter};
use catalogpdf::pipeline::{plan_split, split_images};
use clap::Parser;

fn run(cli: &SplitCli) -> Result<()> {
    let config = cli.to_config()?;
    let formatter = OutputFormatter::from_split_config(&config);

    if config.dry_run {
        let plan = plan_split(&config)?;
        output::display_split_plan(&formatter, &plan);
        return Ok(());
    }

    formatter.info(&format!(
        "Converting JPEG files in {} to letter-size PDFs",
        config.input_dir.display()
    ));
    let report = split_images(&config)?;
    output::display_split_report(&formatter, &report);
    Ok(())
}

fn main() -> ExitCode {
    let cli = SplitCli::parse();
    output::init_logging(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            OutputFormatter::new(cli.quiet, cli.verbose).error(&format!("{err:#}"));
            let code = err
                .downcast_ref::<CatalogError>()
                .map_or(1, CatalogError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}
