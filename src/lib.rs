/*!
 * Elixir - Compile a directory of Lua source into a ROBLOX model
 *
 * This library walks a source tree, classifies every folder and Lua file
 * into a ROBLOX instance and writes the result as an XML model (.rbxmx)
 * ready to be imported into ROBLOX Studio.
 */

pub mod builder;
pub mod classifier;
pub mod compiler;
pub mod config;
pub mod encoder;
pub mod error;
pub mod logging;
pub mod referent;
pub mod report;
pub mod types;
pub mod utils;
pub mod writer;


// Re-export main components for easier access
pub use builder::TreeBuilder;
pub use classifier::{create_classifier, Classifier};
pub use compiler::Compiler;
pub use config::{Config, Strategy, UnknownFilePolicy};
pub use error::{ElixirError, Result};
pub use report::{CompileReport, FileReportInfo, ReportFormat, Reporter};
pub use types::{Node, PropertyValue, ValueKind};
pub use utils::{count_files, format_file_size};
pub use writer::XmlWriter;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
