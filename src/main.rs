/*!
 * Command-line interface for Elixir
 */

use std::io;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use elixir::compiler::Compiler;
use elixir::config::{Args, Config};
use elixir::logging::init_logging;
use elixir::report::{ReportFormat, Reporter};
use elixir::utils::count_files;

fn main() -> io::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if let Some(shell) = args.generate {
        let mut command = Args::command();
        clap_complete::generate(shell, &mut command, "elixir", &mut io::stdout());
        return Ok(());
    }

    init_logging(args.quiet, args.verbose)?;
    let quiet = args.quiet;

    // Create configuration; the compiler validates it
    let config = Config::from_args(args)?;

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let progress = ProgressBar::new(0);
        progress.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} {pos}/{len} ({percent}%) ⏱️  Elapsed: {elapsed_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        progress.enable_steady_tick(std::time::Duration::from_millis(100));
        progress
    };
    progress.set_prefix("📊 Setup");
    progress.set_message(format!("📂 Scanning directory: {}", config.source.display()));

    // Count files for progress tracking
    let total_files = match count_files(&config.source, &config) {
        Ok(count) => count,
        Err(e) => {
            warn!("failed to count files: {}", e);
            0
        }
    };
    progress.set_length(total_files);
    progress.set_prefix("📊 Compiling");

    let compiler = Compiler::with_progress(config, Arc::new(progress.clone()));
    let result = compiler.compile();
    progress.finish_and_clear();
    let report = result?;

    if !quiet {
        let reporter = Reporter::new(ReportFormat::ConsoleTable);
        reporter.print_report(&report);
    }

    Ok(())
}
