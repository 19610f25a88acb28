use std::process::ExitCode;

use anyhow::Result;
use catalogpdf::CatalogError;
use catalogpdf::cli::ImagesCli;
use catalogpdf::output::{self, OutputFormatter};
use catalogpdf::pipeline::{build_image_pdf, plan_image_pdf};
use clap::Parser;

fn run(cli: &ImagesCli) -> Result<()> {
    let config = cli.to_config()?;
    let formatter = OutputFormatter::from_images_config(&config);

    if config.dry_run {
        let plan = plan_image_pdf(&config)?;
        output::display_images_plan(&formatter, &plan);
        return Ok(());
    }

    formatter.info(&format!("Scanning {}", config.input_dir.display()));
    let report = build_image_pdf(&config)?;
    output::display_images_report(&formatter, &report);
    Ok(())
}

fn main() -> ExitCode {
    let cli = ImagesCli::parse();
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
