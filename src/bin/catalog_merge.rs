use std::process::ExitCode;

use anyhow::Result;
use catalogpdf::CatalogError;
use catalogpdf::cli::MergeCli;
use catalogpdf::output::{self, OutputFormatter};
use catalogpdf::pipeline::{build_catalog, plan_catalog};
use clap::Parser;

fn run(cli: &MergeCli) -> Result<()> {
    let config = cli.to_config()?;
    let formatter = OutputFormatter::from_merge_config(&config);

    if config.dry_run {
        let plan = plan_catalog(&config)?;
        output::display_catalog_plan(
            &formatter,
            &plan,
            &config.output_path(),
            config.generate_covers,
        );
        return Ok(());
    }

    formatter.info(&format!(
        "Merging {} with the {} engine",
        config.input_dir.display(),
        config.engine.name()
    ));
    let report = build_catalog(&config)?;
    output::display_merge_report(&formatter, &report);
    Ok(())
}

fn main() -> ExitCode {
    let cli = MergeCli::parse();
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
