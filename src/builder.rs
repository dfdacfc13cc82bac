/*!
 * Directory traversal building the instance tree
 */

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::ProgressBar;
use tracing::{debug, trace, warn};
use walkdir::{DirEntry, WalkDir};

use crate::classifier::default::FileNameParts;
use crate::classifier::{Classifier, SourceEntry};
use crate::config::{Config, UnknownFilePolicy};
use crate::error::Result;
use crate::report::FileReportInfo;
use crate::types::{Node, PropertyValue, ValueKind};

/// Class of the container holding the chunks of an oversized value
pub const CHUNK_CONTAINER_CLASS: &str = "BoolValue";

/// Class of a single chunk
pub const CHUNK_CLASS: &str = "StringValue";

/// Property holding the container flag and each chunk's text
pub const VALUE_PROPERTY: &str = "Value";

/// Build statistics
#[derive(Debug, Clone, Default)]
pub struct BuildStatistics {
    /// Number of files read
    pub files_read: usize,
    /// Number of folder instances created, root excluded
    pub folders: usize,
    /// Instances created from files, by class
    pub classes: BTreeMap<String, usize>,
    /// Files the classifier left out
    pub skipped: usize,
    /// Properties split into chunks
    pub chunked: usize,
    /// Warnings raised while building
    pub warnings: Vec<String>,
    /// Details for each compiled file
    pub file_details: BTreeMap<String, FileReportInfo>,
}

/// Builds the instance tree for a source directory
pub struct TreeBuilder {
    /// Builder configuration
    config: Config,
    /// Classification strategy
    classifier: Box<dyn Classifier>,
    /// Progress bar
    pub progress: Arc<ProgressBar>,
    /// Builder statistics
    statistics: RefCell<BuildStatistics>,
    /// Canonical paths of the directories currently being walked
    ancestors: RefCell<Vec<PathBuf>>,
}

impl TreeBuilder {
    /// Create a new tree builder
    pub fn new(config: Config, classifier: Box<dyn Classifier>, progress: Arc<ProgressBar>) -> Self {
        Self {
            config,
            classifier,
            progress,
            statistics: RefCell::new(BuildStatistics::default()),
            ancestors: RefCell::new(Vec::new()),
        }
    }

    /// Get builder statistics
    pub fn get_statistics(&self) -> BuildStatistics {
        self.statistics.borrow().clone()
    }

    /// Walk the source directory and return the root instance
    pub fn build(&self) -> Result<Node> {
        let source = &self.config.source;
        crate::ensure!(
            source.is_dir(),
            PathNotFound,
            "source directory not found: {}",
            source.display()
        );

        debug!("building tree for {}", source.display());
        let mut root = Node::new(self.config.folder_class.as_str(), self.config.root_name.as_str());
        root.children = self.build_within(source)?;

        Ok(root)
    }

    /// Build the children of `dir`, remembering it as an ancestor meanwhile
    fn build_within(&self, dir: &Path) -> Result<Vec<Node>> {
        self.ancestors.borrow_mut().push(fs::canonicalize(dir)?);
        let children = self.build_children(dir);
        self.ancestors.borrow_mut().pop();
        children
    }

    /// Build the instances for the entries of one directory
    fn build_children(&self, dir: &Path) -> Result<Vec<Node>> {
        trace!("entering {}", dir.display());

        let mut walker = WalkDir::new(dir).min_depth(1).max_depth(1);
        if self.config.sort_children {
            walker = walker.sort_by_file_name();
        }

        let mut children = Vec::new();
        for entry in walker {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if self.should_ignore(&name) {
                trace!("ignoring {}", entry.path().display());
                continue;
            }

            if let Some(node) = self.build_entry(&entry, &name)? {
                children.push(node);
            }
        }

        Ok(children)
    }

    /// Build the instance for a single entry, if the classifier produces one
    fn build_entry(&self, entry: &DirEntry, name: &str) -> Result<Option<Node>> {
        let path = entry.path();
        // Follows symlinks, unlike the entry's own file type.
        let is_dir = path.is_dir();

        // A symlink back to a directory being walked would never end.
        if is_dir && self.ancestors.borrow().contains(&fs::canonicalize(path)?) {
            let message = format!(
                "{}: links back to a parent directory, skipped",
                self.relative(path)
            );
            warn!("{}", message);
            let mut stats = self.statistics.borrow_mut();
            stats.skipped += 1;
            stats.warnings.push(message);
            return Ok(None);
        }

        // Files that are going to be skipped are never read.
        let wanted = FileNameParts::parse(name).is_source()
            || self.config.unknown_files == UnknownFilePolicy::Disabled;
        let content = if is_dir {
            None
        } else if wanted {
            Some(self.read_source(path)?)
        } else {
            self.progress.inc(1);
            None
        };

        let source_entry = SourceEntry {
            path,
            name,
            content: content.as_deref(),
            is_dir,
        };

        let Some(classified) = self.classifier.classify(&source_entry) else {
            debug!("skipping {}", path.display());
            self.statistics.borrow_mut().skipped += 1;
            return Ok(None);
        };

        for warning in &classified.warnings {
            warn!("{}", warning);
        }

        let mut node = classified.node;
        {
            let mut stats = self.statistics.borrow_mut();
            stats.warnings.extend(classified.warnings);
            if is_dir {
                stats.folders += 1;
            } else {
                *stats.classes.entry(node.class_name.clone()).or_default() += 1;
                let text = content.as_deref().unwrap_or_default();
                stats.file_details.insert(
                    self.relative(path),
                    FileReportInfo {
                        class_name: node.class_name.clone(),
                        lines: text.lines().count(),
                        chars: text.chars().count(),
                    },
                );
            }
        }

        if classified.recurse {
            node.children = self.build_within(path)?;
        }
        self.chunk_long_text(&mut node, path);

        Ok(Some(node))
    }

    /// Read a file as text, replacing invalid UTF-8
    fn read_source(&self, path: &Path) -> Result<String> {
        self.progress.inc(1);
        self.progress
            .set_message(format!("Current file: {}", self.relative(path)));
        trace!("reading {}", path.display());

        let bytes = fs::read(path)?;
        {
            self.statistics.borrow_mut().files_read += 1;
        }

        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(e) => {
                let message = format!(
                    "{}: not valid UTF-8, invalid bytes were replaced",
                    self.relative(path)
                );
                warn!("{}", message);
                self.statistics.borrow_mut().warnings.push(message);
                Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
            }
        }
    }

    /// Move long-text properties over the chunk limit into chunk containers.
    ///
    /// The container is a `BoolValue` named after the property, flagged
    /// `true`, holding `StringValue` chunks named `1`, `2`, ... in order.
    fn chunk_long_text(&self, node: &mut Node, path: &Path) {
        let max = self.config.max_chunk_len;
        let oversized: Vec<String> = node
            .properties
            .iter()
            .filter(|(_, value)| value.kind() == ValueKind::ProtectedString)
            .filter(|(_, value)| value.as_text().map_or(false, |t| t.chars().count() > max))
            .map(|(name, _)| name.clone())
            .collect();

        for property in oversized {
            let Some(PropertyValue::ProtectedString(text)) = node.properties.remove(&property) else {
                continue;
            };

            let chunks = split_chunks(&text, max);
            debug!(
                "{}: splitting {} into {} chunks",
                self.relative(path),
                property,
                chunks.len()
            );

            let mut container = Node::new(CHUNK_CONTAINER_CLASS, property.as_str())
                .with_property(VALUE_PROPERTY, PropertyValue::Bool(true));
            container.children = chunks
                .into_iter()
                .enumerate()
                .map(|(i, chunk)| {
                    Node::new(CHUNK_CLASS, (i + 1).to_string())
                        .with_property(VALUE_PROPERTY, PropertyValue::String(chunk))
                })
                .collect();

            node.children.push(container);
            self.statistics.borrow_mut().chunked += 1;
        }
    }

    /// Check if an entry should be skipped
    pub fn should_ignore(&self, name: &str) -> bool {
        name == "." || name == ".." || self.config.is_ignored(name)
    }

    /// Path relative to the source root, for diagnostics
    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.config.source)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string()
    }
}

/// Split `text` into pieces of at most `max` characters
pub fn split_chunks(text: &str, max: usize) -> Vec<String> {
    let max = max.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
