//! Classification of source entries into model instances
//!
//! A classifier decides, for every file and folder met during traversal,
//! which class the resulting instance has and which properties it carries.
//! Strategies are selected through [`Strategy`] in the configuration.

pub mod default;
pub mod engine;
pub mod metadata;
pub mod syntax;

use std::path::Path;

pub use default::DefaultStrategy;
pub use engine::{Engine, EngineStrategy};
pub use metadata::EmbeddedProperties;
pub use syntax::{SyntaxChecker, SyntaxWarning};

use crate::config::{Config, Strategy};
use crate::types::Node;

/// A file or folder handed to a classifier
#[derive(Debug, Clone, Copy)]
pub struct SourceEntry<'a> {
    /// Path of the entry on disk
    pub path: &'a Path,
    /// File or directory name
    pub name: &'a str,
    /// File content, `None` for directories
    pub content: Option<&'a str>,
    pub is_dir: bool,
}

/// Result of classifying one entry
#[derive(Debug, Clone)]
pub struct Classified {
    /// The instance, without children
    pub node: Node,
    /// Whether the entry's contents become the node's children
    pub recurse: bool,
    /// Whether the class was declared through embedded properties
    pub explicit_class: bool,
    /// Non-fatal problems found while classifying
    pub warnings: Vec<String>,
}

/// Trait implemented by classification strategies
pub trait Classifier {
    /// Classify an entry; `None` leaves it out of the model.
    fn classify(&self, entry: &SourceEntry<'_>) -> Option<Classified>;
}

/// Create the classifier selected by the configuration
pub fn create_classifier(config: &Config) -> Box<dyn Classifier> {
    let base = DefaultStrategy::new(config);
    match config.strategy {
        Strategy::Default => Box::new(base),
        Strategy::Nevermore => Box::new(EngineStrategy::new(Engine::Nevermore, base)),
    }
}
