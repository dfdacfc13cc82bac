//! Embedded properties declared in comments at the top of a source file.
//!
//! ```lua
//! -- Name: HelloWorld
//! -- ClassName: LocalScript
//!
//! print("Hello, World!")
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{Node, PropertyValue, DISABLED_PROPERTY, NAME_PROPERTY, SOURCE_PROPERTY};

/// Key overriding the class of the instance
pub const CLASS_NAME_KEY: &str = "ClassName";

/// Key holding an asset reference to linked source
pub const LINKED_SOURCE_KEY: &str = "LinkedSource";

static PROPERTY_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^--\s*(\w+):\s*(.+?)\s*$").expect("embedded property pattern is valid")
});

/// Properties found in the leading comment block, in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddedProperties {
    entries: Vec<(String, String)>,
}

impl EmbeddedProperties {
    /// Parse the leading `-- Key: Value` lines of `content`.
    ///
    /// Blank lines before the block are skipped; parsing stops at the first
    /// line that is not a property comment.
    pub fn parse(content: &str) -> Self {
        let entries = content
            .lines()
            .skip_while(|line| line.trim().is_empty())
            .map_while(|line| {
                PROPERTY_LINE
                    .captures(line)
                    .map(|caps| (caps[1].to_string(), caps[2].to_string()))
            })
            .collect();

        Self { entries }
    }

    /// Last value declared for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Declared `Name`
    pub fn name(&self) -> Option<&str> {
        self.get(NAME_PROPERTY)
    }

    /// Declared `ClassName`
    pub fn class_name(&self) -> Option<&str> {
        self.get(CLASS_NAME_KEY)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write every declared property except `ClassName` onto `node`.
    ///
    /// `Disabled` is coerced to a boolean and `LinkedSource` to an asset
    /// reference; everything else is kept as a string. `Source` always comes
    /// from the file itself, so a header declaring it is not applied; the
    /// keys left out this way are returned.
    pub fn apply(&self, node: &mut Node) -> Vec<&str> {
        let mut rejected = Vec::new();
        for (key, value) in &self.entries {
            let value = match key.as_str() {
                CLASS_NAME_KEY => continue,
                SOURCE_PROPERTY => {
                    rejected.push(key.as_str());
                    continue;
                }
                DISABLED_PROPERTY => PropertyValue::truthy(value),
                LINKED_SOURCE_KEY => PropertyValue::Content(value.clone()),
                _ => PropertyValue::String(value.clone()),
            };
            node.set_property(key.as_str(), value);
        }
        rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT_SOURCE: &str = "
-- Name: Hello
-- ClassName: LocalScript

local module = {}

function module.hello(name)
  name = name or \"World\"
  return \"Hello\" .. name .. \"!\"
end

return module
";

    #[test]
    fn reads_leading_properties() {
        let props = EmbeddedProperties::parse(SCRIPT_SOURCE);
        assert_eq!(props.name(), Some("Hello"));
        assert_eq!(props.class_name(), Some("LocalScript"));
    }

    #[test]
    fn stops_at_first_non_property_line() {
        let props = EmbeddedProperties::parse("-- Name: A\nlocal x = 1\n-- ClassName: ModuleScript\n");
        assert_eq!(props.name(), Some("A"));
        assert_eq!(props.class_name(), None);
    }

    #[test]
    fn ignores_block_comments_and_plain_comments() {
        assert!(EmbeddedProperties::parse("--[[ Name: A ]]\n").is_empty());
        assert!(EmbeddedProperties::parse("-- just a note\n-- Name: A\n").is_empty());
    }

    #[test]
    fn duplicate_keys_are_last_writer_wins() {
        let props = EmbeddedProperties::parse("-- Name: First\n-- Name: Second\n");
        assert_eq!(props.name(), Some("Second"));

        let mut node = Node::new("Script", "file");
        props.apply(&mut node);
        assert_eq!(node.name(), "Second");
    }

    #[test]
    fn apply_types_recognized_extras() {
        let props = EmbeddedProperties::parse(
            "-- Disabled: true\n-- LinkedSource: 12345\n-- Author: someone\n-- ClassName: ModuleScript\n",
        );
        let mut node = Node::new("Script", "file");
        props.apply(&mut node);

        assert_eq!(node.property("Disabled"), Some(&PropertyValue::Bool(true)));
        assert_eq!(
            node.property("LinkedSource"),
            Some(&PropertyValue::Content("12345".into()))
        );
        assert_eq!(
            node.property("Author"),
            Some(&PropertyValue::String("someone".into()))
        );
        assert!(node.property("ClassName").is_none());
    }

    #[test]
    fn header_cannot_replace_source() {
        let props = EmbeddedProperties::parse("-- Source: adapted from the wiki
-- Author: someone
");
        let mut node = Node::new("Script", "file")
            .with_property(SOURCE_PROPERTY, PropertyValue::ProtectedString("print(1)".into()));

        assert_eq!(props.apply(&mut node), vec!["Source"]);
        assert_eq!(
            node.property(SOURCE_PROPERTY),
            Some(&PropertyValue::ProtectedString("print(1)".into()))
        );
        assert!(node.property("Author").is_some());
    }
}
