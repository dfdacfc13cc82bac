/*!
 * Compile pipeline: source directory in, model file out
 */

use std::sync::Arc;
use std::time::Instant;

use indicatif::ProgressBar;
use tracing::{debug, info};

use crate::builder::TreeBuilder;
use crate::classifier::create_classifier;
use crate::config::Config;
use crate::error::Result;
use crate::report::CompileReport;
use crate::writer::XmlWriter;

/// Compiles a source directory into a model file
pub struct Compiler {
    config: Config,
    writer: XmlWriter,
    progress: Arc<ProgressBar>,
}

impl Compiler {
    /// Create a compiler with a hidden progress bar
    pub fn new(config: Config) -> Self {
        Self::with_progress(config, Arc::new(ProgressBar::hidden()))
    }

    /// Create a compiler reporting to `progress`
    pub fn with_progress(config: Config, progress: Arc<ProgressBar>) -> Self {
        Self {
            config,
            writer: XmlWriter::new(),
            progress,
        }
    }

    /// Use a different XML writer
    pub fn writer(mut self, writer: XmlWriter) -> Self {
        self.writer = writer;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the whole pipeline.
    ///
    /// Nothing is written unless the tree was built completely; a fatal error
    /// leaves any existing destination untouched.
    pub fn compile(&self) -> Result<CompileReport> {
        self.config.validate()?;

        let start_time = Instant::now();
        let classifier = create_classifier(&self.config);
        let builder = TreeBuilder::new(self.config.clone(), classifier, self.progress.clone());

        let root = builder.build()?;
        debug!("built tree of {} instances", root.count());

        let output = self.config.output_path();
        let written = self.writer.write(&root, &output)?;
        let duration = start_time.elapsed();

        let stats = builder.get_statistics();
        info!(
            "wrote {} instances to {} in {:.2?}",
            written.instances,
            output.display(),
            duration
        );

        Ok(CompileReport {
            output_file: output.display().to_string(),
            duration,
            output_bytes: written.bytes,
            instances: written.instances,
            folders: stats.folders,
            classes: stats.classes,
            skipped: stats.skipped,
            chunked: stats.chunked,
            warnings: stats.warnings,
            file_details: stats.file_details,
        })
    }
}
