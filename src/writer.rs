/*!
 * XML model writer for Elixir
 */

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::encoder;
use crate::error::Result;
use crate::referent::ReferentAllocator;
use crate::types::Node;

/// Tag of the document envelope
pub const ROOT_TAG: &str = "roblox";

/// Fixed attributes of the document envelope
pub const ROOT_ATTRIBUTES: [(&str, &str); 3] = [
    ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
    ("xsi:noNamespaceSchemaLocation", "http://www.roblox.com/roblox.xsd"),
    ("version", "4"),
];

/// Summary of a model written to disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrittenModel {
    /// Size of the document in bytes
    pub bytes: u64,
    /// Number of instances (referents) in the document
    pub instances: u64,
}

/// XML writer for instance trees
#[derive(Debug, Clone)]
pub struct XmlWriter {
    /// Indent nested elements with tabs
    indent: bool,
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlWriter {
    /// Create a new XML writer
    pub fn new() -> Self {
        Self { indent: true }
    }

    /// Writer emitting no indentation at all
    pub fn compact() -> Self {
        Self { indent: false }
    }

    /// Serialize the tree into a model document.
    ///
    /// Referents are taken from `referents` in document order.
    pub fn assemble(&self, root: &Node, referents: &mut ReferentAllocator) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_document(root, referents, &mut buffer)?;

        String::from_utf8(buffer)
            .map_err(|e| crate::error!(Writer, "model is not valid UTF-8: {}", e))
    }

    /// Write the tree to a model file, creating parent directories.
    ///
    /// The document is assembled in memory first so a failed compile never
    /// leaves a partial file behind.
    pub fn write(&self, root: &Node, path: &Path) -> Result<WrittenModel> {
        let mut referents = ReferentAllocator::new();
        let document = self.assemble(root, &mut referents)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(document.as_bytes())?;
        writer.flush()?;

        Ok(WrittenModel {
            bytes: document.len() as u64,
            instances: referents.issued(),
        })
    }

    /// Write the document envelope and the tree into `out`
    pub fn write_document<W: Write>(
        &self,
        root: &Node,
        referents: &mut ReferentAllocator,
        out: W,
    ) -> Result<()> {
        let mut xml_writer = if self.indent {
            Writer::new_with_indent(out, b'\t', 1)
        } else {
            Writer::new(out)
        };

        let mut start_tag = BytesStart::new(ROOT_TAG);
        for attribute in ROOT_ATTRIBUTES {
            start_tag.push_attribute(attribute);
        }
        xml_writer.write_event(Event::Start(start_tag))?;

        self.write_item(root, referents, &mut xml_writer)?;

        xml_writer.write_event(Event::End(BytesEnd::new(ROOT_TAG)))?;

        Ok(())
    }

    /// Write one instance and its subtree
    fn write_item<W: Write>(
        &self,
        node: &Node,
        referents: &mut ReferentAllocator,
        writer: &mut Writer<W>,
    ) -> Result<()> {
        let referent = referents.next_referent();

        let mut start_tag = BytesStart::new("Item");
        start_tag.push_attribute(("class", node.class_name.as_str()));
        start_tag.push_attribute(("referent", referent.as_str()));
        writer.write_event(Event::Start(start_tag))?;

        self.write_properties(node, writer)?;

        for child in &node.children {
            self.write_item(child, referents, writer)?;
        }

        writer.write_event(Event::End(BytesEnd::new("Item")))?;

        Ok(())
    }

    /// Write the properties block of an instance
    fn write_properties<W: Write>(&self, node: &Node, writer: &mut Writer<W>) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new("Properties")))?;

        // BTreeMap iteration is already ascending by name.
        for (name, value) in &node.properties {
            let tag = value.kind().to_string();

            let mut start_tag = BytesStart::new(tag.as_str());
            start_tag.push_attribute(("name", name.as_str()));
            writer.write_event(Event::Start(start_tag))?;

            // Always emit a text event, even an empty one: the host rejects
            // self-closing tags and the indenter would otherwise put
            // whitespace inside the value.
            let encoded = encoder::encode(value);
            writer.write_event(Event::Text(BytesText::from_escaped(encoded.as_str())))?;

            writer.write_event(Event::End(BytesEnd::new(tag.as_str())))?;
        }

        writer.write_event(Event::End(BytesEnd::new("Properties")))?;

        Ok(())
    }
}
