//! Engine strategies layered over the default classification.

use strum::Display;

use super::default::{
    is_script_class, DefaultStrategy, FileNameParts, MODULE_SCRIPT_CLASS, SCRIPT_CLASS,
};
use super::{Classified, Classifier, SourceEntry};
use crate::types::{PropertyValue, DISABLED_PROPERTY};

/// Name of the script that boots NevermoreEngine
pub const NEVERMORE_LOADER: &str = "NevermoreEngineLoader";

/// Third-party engines with their own project layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Engine {
    /// NevermoreEngine before its loader refactor (b9b5a83): every library
    /// file is a module, `*.main` scripts are kept disabled and only the
    /// loader runs.
    Nevermore,
}

impl Engine {
    /// Rewrite a script classified by the default strategy
    fn apply(self, parts: &FileNameParts<'_>, classified: &mut Classified) {
        match self {
            Engine::Nevermore => {
                let node = &mut classified.node;
                if parts.base == NEVERMORE_LOADER {
                    if !classified.explicit_class {
                        node.class_name = SCRIPT_CLASS.to_string();
                    }
                    node.set_property(DISABLED_PROPERTY, PropertyValue::Bool(false));
                } else if is_main_script(parts) {
                    node.set_property(DISABLED_PROPERTY, PropertyValue::Bool(true));
                } else if !classified.explicit_class {
                    node.class_name = MODULE_SCRIPT_CLASS.to_string();
                }
            }
        }
    }
}

/// `Server.main.lua` style names
fn is_main_script(parts: &FileNameParts<'_>) -> bool {
    parts
        .stem()
        .split('.')
        .skip(1)
        .any(|segment| segment.eq_ignore_ascii_case("main"))
}

/// Runs the default strategy, then lets an engine override the result.
///
/// Engines may change the class and inject properties of Lua scripts. They
/// never rename a node and leave a class declared through embedded
/// properties alone.
#[derive(Debug)]
pub struct EngineStrategy {
    engine: Engine,
    base: DefaultStrategy,
}

impl EngineStrategy {
    pub fn new(engine: Engine, base: DefaultStrategy) -> Self {
        Self { engine, base }
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }
}

impl Classifier for EngineStrategy {
    fn classify(&self, entry: &SourceEntry<'_>) -> Option<Classified> {
        let mut classified = self.base.classify(entry)?;
        if entry.is_dir {
            return Some(classified);
        }

        let parts = FileNameParts::parse(entry.name);
        if parts.is_source() && is_script_class(&classified.node.class_name) {
            self.engine.apply(&parts, &mut classified);
        }

        Some(classified)
    }
}
