/*!
 * Configuration handling for Elixir
 */

use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{ArgAction, Parser, ValueEnum};
use clap_complete::Shell;
use strum::{Display, EnumString};
use tracing::warn;

use crate::error::{ElixirError, Result};

/// Default class used for directories
pub const DEFAULT_FOLDER_CLASS: &str = "Folder";

/// Largest text value the host accepts in a single property
pub const DEFAULT_MAX_CHUNK_LEN: usize = 199_999;

/// Extension given to the output when the destination has none
pub const DEFAULT_EXTENSION: &str = "rbxmx";

/// Names skipped when no ignore list is given
pub const DEFAULT_IGNORE: &[&str] = &[".git", ".gitignore", ".DS_Store", "Thumbs.db"];

/// Classifier strategy used while compiling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Strategy {
    /// Filename conventions, embedded metadata and module sniffing
    #[default]
    #[strum(to_string = "default", serialize = "BaseProcessor")]
    Default,
    /// Overrides for the legacy NevermoreEngine layout
    #[strum(to_string = "nevermore", serialize = "NevermoreProcessor")]
    Nevermore,
}

impl Strategy {
    /// Resolve a strategy by name, failing on names that do not exist
    pub fn from_name(name: &str) -> Result<Self> {
        Strategy::from_str(name.trim()).map_err(|_| ElixirError::UnknownStrategy(name.to_string()))
    }
}

/// What to do with files the classifier does not recognise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum UnknownFilePolicy {
    /// Leave them out of the model
    #[default]
    Skip,
    /// Embed them as disabled scripts with their content commented out
    Disabled,
}

/// Command-line arguments for Elixir
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "elixir",
    version = env!("CARGO_PKG_VERSION"),
    about = "Compile a directory of Lua source into a ROBLOX model",
    long_about = "Turns folders and Lua files into a ROBLOX compatible XML model (.rbxmx) that can be imported into ROBLOX Studio."
)]
pub struct Args {
    /// Directory containing the source to compile
    #[clap(required_unless_present = "generate")]
    pub source: Option<String>,

    /// Model file to create
    #[clap(required_unless_present = "generate")]
    pub dest: Option<String>,

    /// Name of the top-level folder (default: name of the source directory)
    #[clap(short = 'm', long)]
    pub model_name: Option<String>,

    /// Processor to use when compiling (default, nevermore)
    #[clap(short = 'p', long, default_value = "default")]
    pub processor: String,

    /// Class used for directories
    #[clap(long, default_value = DEFAULT_FOLDER_CLASS)]
    pub folder_class: String,

    /// Comma-separated list of file and directory names to skip
    #[clap(long, value_delimiter = ',')]
    pub ignore: Option<Vec<String>>,

    /// Longest text value written as a single property
    #[clap(long, default_value_t = DEFAULT_MAX_CHUNK_LEN)]
    pub max_chunk_len: usize,

    /// Handling of files that are not Lua source
    #[clap(long, value_enum, default_value_t = UnknownFilePolicy::default())]
    pub unknown_files: UnknownFilePolicy,

    /// Sort children by name instead of directory listing order
    #[clap(long)]
    pub sort: bool,

    /// Do not detect module scripts from a trailing return
    #[clap(long)]
    pub no_sniff: bool,

    /// Skip the Lua syntax check
    #[clap(long)]
    pub no_syntax_check: bool,

    /// Extension appended to the destination when it has none
    #[clap(long, default_value = DEFAULT_EXTENSION)]
    pub extension: String,

    /// Only print errors
    #[clap(short, long)]
    pub quiet: bool,

    /// Print more diagnostics (repeat for more)
    #[clap(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Compiler configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Directory to compile
    pub source: PathBuf,

    /// Output model path
    pub destination: PathBuf,

    /// Name of the root folder
    pub root_name: String,

    /// Class used for directories
    pub folder_class: String,

    /// Entry names skipped during traversal (exact match)
    pub ignore: Vec<String>,

    /// Classifier strategy
    pub strategy: Strategy,

    /// Longest text value written as a single property
    pub max_chunk_len: usize,

    /// Extension appended to the destination when it has none
    pub output_extension: String,

    /// Handling of unrecognised files
    pub unknown_files: UnknownFilePolicy,

    /// Sort children by name
    pub sort_children: bool,

    /// Detect module scripts from their content
    pub sniff_modules: bool,

    /// Run the best-effort syntax check
    pub check_syntax: bool,
}

impl Config {
    /// Configuration with defaults for everything but the paths
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        let source = source.into();
        let root_name = default_root_name(&source);

        Self {
            source,
            destination: destination.into(),
            root_name,
            folder_class: DEFAULT_FOLDER_CLASS.to_string(),
            ignore: DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect(),
            strategy: Strategy::Default,
            max_chunk_len: DEFAULT_MAX_CHUNK_LEN,
            output_extension: DEFAULT_EXTENSION.to_string(),
            unknown_files: UnknownFilePolicy::Skip,
            sort_children: false,
            sniff_modules: true,
            check_syntax: true,
        }
    }

    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Result<Self> {
        let (Some(source), Some(dest)) = (args.source, args.dest) else {
            crate::bail!(Config, "both <SOURCE> and <DEST> are required");
        };

        let mut config = Self::new(source, dest);
        if let Some(name) = args.model_name.filter(|n| !n.is_empty()) {
            config.root_name = name;
        }
        if let Some(ignore) = args.ignore {
            config.ignore = ignore.into_iter().filter(|s| !s.is_empty()).collect();
        }
        config.strategy = Strategy::from_name(&args.processor)?;
        config.folder_class = args.folder_class;
        config.max_chunk_len = args.max_chunk_len;
        config.output_extension = args.extension;
        config.unknown_files = args.unknown_files;
        config.sort_children = args.sort;
        config.sniff_modules = !args.no_sniff;
        config.check_syntax = !args.no_syntax_check;

        Ok(config)
    }

    /// Destination with the output extension applied
    pub fn output_path(&self) -> PathBuf {
        if self.destination.extension().is_some() || self.output_extension.is_empty() {
            self.destination.clone()
        } else {
            self.destination.with_extension(&self.output_extension)
        }
    }

    /// Whether `name` is on the ignore list
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignore.iter().any(|ignored| ignored == name)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        crate::ensure!(
            self.source.is_dir(),
            PathNotFound,
            "source directory not found: {}",
            self.source.display()
        );
        crate::ensure!(
            self.max_chunk_len > 0,
            Config,
            "max chunk length must be at least 1"
        );
        crate::ensure!(
            !self.folder_class.is_empty(),
            Config,
            "folder class cannot be empty"
        );

        let output = self.output_path();
        let extension = output.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !matches!(extension, "rbxmx" | "rbxm") {
            warn!(
                "{} does not end in .rbxmx, ROBLOX Studio may refuse to import it",
                output.display()
            );
        }

        Ok(())
    }
}

/// Name of the last component of `source`
fn default_root_name(source: &Path) -> String {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .or_else(|| {
            source
                .canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
        })
        .unwrap_or_default();

    if name.is_empty() {
        DEFAULT_FOLDER_CLASS.to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["elixir", "src", "build/model"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn defaults_from_args() {
        let config = Config::from_args(args(&[])).unwrap();
        assert_eq!(config.root_name, "src");
        assert_eq!(config.folder_class, "Folder");
        assert_eq!(config.strategy, Strategy::Default);
        assert_eq!(config.max_chunk_len, 199_999);
        assert!(config.is_ignored(".gitignore"));
        assert_eq!(config.output_path(), PathBuf::from("build/model.rbxmx"));
    }

    #[test]
    fn model_name_and_ignore_override() {
        let config = Config::from_args(args(&[
            "-m",
            "SampleProject",
            "--ignore",
            "node_modules,.git",
            "-p",
            "NevermoreProcessor",
        ]))
        .unwrap();

        assert_eq!(config.root_name, "SampleProject");
        assert_eq!(config.ignore, vec!["node_modules", ".git"]);
        assert!(!config.is_ignored(".gitignore"));
        assert_eq!(config.strategy, Strategy::Nevermore);
    }

    #[test]
    fn ignore_matching_is_exact() {
        let config = Config::new("src", "out.rbxmx");
        assert!(config.is_ignored(".git"));
        assert!(!config.is_ignored(".github"));
        assert!(!config.is_ignored("*.git"));
    }

    #[test]
    fn unknown_processor_is_fatal() {
        let err = Config::from_args(args(&["-p", "Rojo"])).unwrap_err();
        assert!(matches!(err, ElixirError::UnknownStrategy(name) if name == "Rojo"));
    }

    #[test]
    fn explicit_extension_is_kept() {
        let config = Config::new("src", "out/model.rbxm");
        assert_eq!(config.output_path(), PathBuf::from("out/model.rbxm"));
    }

    #[test]
    fn missing_source_fails_validation() {
        let config = Config::new("/definitely/not/here", "out.rbxmx");
        assert!(matches!(
            config.validate(),
            Err(ElixirError::PathNotFound(_))
        ));
    }
}
