//! The default classification strategy.

use once_cell::sync::Lazy;
use regex::Regex;

use super::metadata::EmbeddedProperties;
use super::syntax::SyntaxChecker;
use super::{Classified, Classifier, SourceEntry};
use crate::config::{Config, UnknownFilePolicy};
use crate::types::{Node, PropertyValue, DISABLED_PROPERTY, SOURCE_PROPERTY};

pub const SCRIPT_CLASS: &str = "Script";
pub const LOCAL_SCRIPT_CLASS: &str = "LocalScript";
pub const MODULE_SCRIPT_CLASS: &str = "ModuleScript";

/// Extensions treated as Lua source
pub const SOURCE_EXTENSIONS: &[&str] = &["lua", "luau"];

// A module hands back a value on its last line: `return module`,
// `return setmetatable(t, mt)`, optionally followed by blank space.
static TRAILING_RETURN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*return[ \t]+\S[^\n]*\s*\z").expect("module pattern is valid")
});

/// File name split into its naming-convention parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNameParts<'a> {
    /// Instance name
    pub base: &'a str,
    /// Type hint between the base and the extension (`Foo.local.lua`)
    pub hint: Option<&'a str>,
    /// Extension without the dot
    pub extension: Option<&'a str>,
}

impl<'a> FileNameParts<'a> {
    /// Split `base.hint.ext`, `base.ext` or `base`
    pub fn parse(file_name: &'a str) -> Self {
        let (stem, extension) = match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (file_name, None),
        };

        match stem.rsplit_once('.') {
            Some((base, hint)) if !base.is_empty() => Self {
                base,
                hint: Some(hint),
                extension,
            },
            _ => Self {
                base: stem,
                hint: None,
                extension,
            },
        }
    }

    /// Whether the extension is a recognised Lua source extension
    pub fn is_source(&self) -> bool {
        self.extension.map_or(false, |ext| {
            SOURCE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
    }

    /// File name without its extension
    pub fn stem(&self) -> String {
        match self.hint {
            Some(hint) => format!("{}.{}", self.base, hint),
            None => self.base.to_string(),
        }
    }
}

/// Script class for a filename type hint
pub fn script_class_for_hint(hint: &str) -> &'static str {
    match hint.to_ascii_lowercase().as_str() {
        "local" | "localscript" => LOCAL_SCRIPT_CLASS,
        "module" | "modulescript" => MODULE_SCRIPT_CLASS,
        _ => SCRIPT_CLASS,
    }
}

/// Whether `class_name` is one of the script classes
pub fn is_script_class(class_name: &str) -> bool {
    matches!(
        class_name,
        SCRIPT_CLASS | LOCAL_SCRIPT_CLASS | MODULE_SCRIPT_CLASS
    )
}

/// Whether the source ends in a returned value
pub fn is_module(content: &str) -> bool {
    TRAILING_RETURN.is_match(content)
}

/// Comment out every line of `content`
fn comment_out(content: &str) -> String {
    content
        .lines()
        .map(|line| format!("-- {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Classifies folders and Lua files using naming conventions, embedded
/// properties and content sniffing.
#[derive(Debug)]
pub struct DefaultStrategy {
    folder_class: String,
    unknown_files: UnknownFilePolicy,
    sniff_modules: bool,
    syntax: Option<SyntaxChecker>,
}

impl DefaultStrategy {
    pub fn new(config: &Config) -> Self {
        Self {
            folder_class: config.folder_class.clone(),
            unknown_files: config.unknown_files,
            sniff_modules: config.sniff_modules,
            syntax: config.check_syntax.then(SyntaxChecker::new),
        }
    }

    fn classify_folder(&self, entry: &SourceEntry<'_>) -> Classified {
        Classified {
            node: Node::new(self.folder_class.as_str(), entry.name),
            recurse: true,
            explicit_class: false,
            warnings: Vec::new(),
        }
    }

    fn classify_script(&self, entry: &SourceEntry<'_>, parts: &FileNameParts<'_>) -> Classified {
        let content = entry.content.unwrap_or_default();
        let embedded = EmbeddedProperties::parse(content);

        let class_name = match (embedded.class_name(), parts.hint) {
            (Some(declared), _) => declared,
            (None, Some(hint)) => script_class_for_hint(hint),
            (None, None) if self.sniff_modules && is_module(content) => MODULE_SCRIPT_CLASS,
            (None, None) => SCRIPT_CLASS,
        };

        let mut node = Node::new(class_name, parts.base)
            .with_property(SOURCE_PROPERTY, PropertyValue::ProtectedString(content.to_string()))
            .with_property(DISABLED_PROPERTY, PropertyValue::Bool(false));
        let mut warnings: Vec<String> = embedded
            .apply(&mut node)
            .into_iter()
            .map(|key| {
                format!(
                    "{}: header property {} ignored, it comes from the file",
                    entry.path.display(),
                    key
                )
            })
            .collect();

        if let Some(checker) = &self.syntax {
            let chunk = entry.path.to_string_lossy();
            if let Some(warning) = checker.check(&chunk, content) {
                warnings.push(warning.to_string());
            }
        }

        Classified {
            node,
            recurse: false,
            explicit_class: embedded.class_name().is_some(),
            warnings,
        }
    }

    fn classify_unknown(&self, entry: &SourceEntry<'_>, parts: &FileNameParts<'_>) -> Option<Classified> {
        match self.unknown_files {
            UnknownFilePolicy::Skip => None,
            UnknownFilePolicy::Disabled => {
                let source = comment_out(entry.content.unwrap_or_default());
                let node = Node::new(SCRIPT_CLASS, parts.stem())
                    .with_property(SOURCE_PROPERTY, PropertyValue::ProtectedString(source))
                    .with_property(DISABLED_PROPERTY, PropertyValue::Bool(true));

                Some(Classified {
                    node,
                    recurse: false,
                    explicit_class: false,
                    warnings: Vec::new(),
                })
            }
        }
    }
}

impl Classifier for DefaultStrategy {
    fn classify(&self, entry: &SourceEntry<'_>) -> Option<Classified> {
        if entry.is_dir {
            return Some(self.classify_folder(entry));
        }

        let parts = FileNameParts::parse(entry.name);
        if parts.is_source() {
            Some(self.classify_script(entry, &parts))
        } else {
            self.classify_unknown(entry, &parts)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn strategy() -> DefaultStrategy {
        let mut config = Config::new("src", "out.rbxmx");
        config.check_syntax = false;
        DefaultStrategy::new(&config)
    }

    fn classify_file(strategy: &DefaultStrategy, name: &str, content: &str) -> Option<Classified> {
        let path = Path::new("src").join(name);
        strategy.classify(&SourceEntry {
            path: &path,
            name,
            content: Some(content),
            is_dir: false,
        })
    }

    #[test]
    fn splits_file_names() {
        let parts = FileNameParts::parse("Foo.local.lua");
        assert_eq!(parts.base, "Foo");
        assert_eq!(parts.hint, Some("local"));
        assert_eq!(parts.extension, Some("lua"));
        assert_eq!(parts.stem(), "Foo.local");

        let parts = FileNameParts::parse("Foo.lua");
        assert_eq!((parts.base, parts.hint), ("Foo", None));

        let parts = FileNameParts::parse(".hidden.lua");
        assert_eq!((parts.base, parts.hint), (".hidden", None));

        let parts = FileNameParts::parse("README");
        assert_eq!((parts.base, parts.extension), ("README", None));
    }

    #[test]
    fn hints_are_case_insensitive() {
        assert_eq!(script_class_for_hint("LOCAL"), LOCAL_SCRIPT_CLASS);
        assert_eq!(script_class_for_hint("LocalScript"), LOCAL_SCRIPT_CLASS);
        assert_eq!(script_class_for_hint("Module"), MODULE_SCRIPT_CLASS);
        assert_eq!(script_class_for_hint("modulescript"), MODULE_SCRIPT_CLASS);
        assert_eq!(script_class_for_hint("server"), SCRIPT_CLASS);
    }

    #[test]
    fn filename_convention_picks_class() {
        let strategy = strategy();
        for (file, class) in [
            ("Foo.local.lua", LOCAL_SCRIPT_CLASS),
            ("Foo.module.lua", MODULE_SCRIPT_CLASS),
            ("Foo.lua", SCRIPT_CLASS),
        ] {
            let classified = classify_file(&strategy, file, "print('hi')\n").unwrap();
            assert_eq!(classified.node.class_name, class, "{}", file);
            assert_eq!(classified.node.name(), "Foo");
            assert!(!classified.recurse);
        }
    }

    #[test]
    fn embedded_properties_win_over_file_name() {
        let strategy = strategy();
        let content = "-- Name: Bar\n-- ClassName: LocalScript\nprint('hi')\n";
        let classified = classify_file(&strategy, "Foo.module.lua", content).unwrap();

        assert_eq!(classified.node.class_name, LOCAL_SCRIPT_CLASS);
        assert_eq!(classified.node.name(), "Bar");
        assert!(classified.explicit_class);
    }

    #[test]
    fn script_carries_source_and_disabled() {
        let strategy = strategy();
        let classified = classify_file(&strategy, "Main.lua", "print(1)").unwrap();
        assert_eq!(
            classified.node.property(SOURCE_PROPERTY),
            Some(&PropertyValue::ProtectedString("print(1)".into()))
        );
        assert_eq!(
            classified.node.property(DISABLED_PROPERTY),
            Some(&PropertyValue::Bool(false))
        );
    }

    #[test]
    fn recognises_modules_by_trailing_return() {
        assert!(is_module("local m = {}\nreturn m"));
        assert!(is_module("return value\n\n\n\n"));
        assert!(is_module("return setmetatable(module, mt)"));
        assert!(!is_module("local function f()\n  return 1\nend\n"));
        assert!(!is_module("print('returns nothing')"));

        let strategy = strategy();
        let classified = classify_file(&strategy, "Util.lua", "local m = {}\nreturn m\n").unwrap();
        assert_eq!(classified.node.class_name, MODULE_SCRIPT_CLASS);

        let classified = classify_file(&strategy, "Util.local.lua", "return {}\n").unwrap();
        assert_eq!(classified.node.class_name, LOCAL_SCRIPT_CLASS);
    }

    #[test]
    fn sniffing_can_be_turned_off() {
        let mut config = Config::new("src", "out.rbxmx");
        config.check_syntax = false;
        config.sniff_modules = false;
        let strategy = DefaultStrategy::new(&config);

        let classified = classify_file(&strategy, "Util.lua", "return {}\n").unwrap();
        assert_eq!(classified.node.class_name, SCRIPT_CLASS);
    }

    #[test]
    fn unknown_files_are_skipped_by_default() {
        assert!(classify_file(&strategy(), "notes.txt", "hello").is_none());
    }

    #[test]
    fn unknown_files_can_be_embedded_disabled() {
        let mut config = Config::new("src", "out.rbxmx");
        config.check_syntax = false;
        config.unknown_files = UnknownFilePolicy::Disabled;
        let strategy = DefaultStrategy::new(&config);

        let classified = classify_file(&strategy, "notes.txt", "line one\nline two").unwrap();
        assert_eq!(classified.node.class_name, SCRIPT_CLASS);
        assert_eq!(classified.node.name(), "notes");
        assert_eq!(
            classified.node.property(SOURCE_PROPERTY),
            Some(&PropertyValue::ProtectedString("-- line one\n-- line two".into()))
        );
        assert_eq!(
            classified.node.property(DISABLED_PROPERTY),
            Some(&PropertyValue::Bool(true))
        );
    }

    #[test]
    fn folders_recurse_with_configured_class() {
        let mut config = Config::new("src", "out.rbxmx");
        config.folder_class = "Model".to_string();
        let strategy = DefaultStrategy::new(&config);

        let path = Path::new("src/shared");
        let classified = strategy
            .classify(&SourceEntry {
                path,
                name: "shared",
                content: None,
                is_dir: true,
            })
            .unwrap();

        assert_eq!(classified.node.class_name, "Model");
        assert_eq!(classified.node.name(), "shared");
        assert!(classified.recurse);
    }
}
