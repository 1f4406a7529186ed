//! Structured document templates.
//!
//! A `.docx` file is a zip archive of WordprocessingML parts. Placeholders are written in the
//! template as `{{ name }}`; Word often splits such a tag over several formatting runs, so the
//! name is read with the intervening markup stripped and the whole span is replaced.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::common::escape_xml_text;
use super::context::PlaceholderContext;
use super::GeneratorError;

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"(?s)\{\{(.*?)\}\}").unwrap();
    static ref MARKUP: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    static ref TEMPLATED_PART: Regex =
        Regex::new(r"^word/(document|header[0-9]*|footer[0-9]*)\.xml$").unwrap();
}

struct Entry {
    name: String,
    data: Vec<u8>,
}

/// A loaded `.docx` template.
pub struct DocxTemplate {
    entries: Vec<Entry>,
}

impl DocxTemplate {
    pub fn open(path: &Path) -> Result<Self, GeneratorError> {
        let bytes = fs::read(path).map_err(GeneratorError::TemplateIo)?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, GeneratorError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(archive.len());

        for index in 0..archive.len() {
            let mut file = archive.by_index(index)?;
            if file.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data).map_err(GeneratorError::TemplateIo)?;
            entries.push(Entry {
                name: file.name().to_string(),
                data,
            });
        }

        if !entries.iter().any(|e| e.name == "word/document.xml") {
            return Err(GeneratorError::MalformedTemplate(
                "word/document.xml not found".to_string(),
            ));
        }

        Ok(Self { entries })
    }

    /// Placeholder names referenced by the template, in order of appearance.
    pub fn placeholders(&self) -> Result<Vec<String>, GeneratorError> {
        let mut names = Vec::new();
        for entry in self.templated_parts() {
            let xml = part_text(entry)?;
            for caps in PLACEHOLDER.captures_iter(xml) {
                let name = placeholder_name(&caps)?;
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        Ok(names)
    }

    /// Substitute every placeholder and return the new archive bytes.
    pub fn render(&self, context: &PlaceholderContext) -> Result<Vec<u8>, GeneratorError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in &self.entries {
            writer.start_file(entry.name.as_str(), options)?;
            if TEMPLATED_PART.is_match(&entry.name) {
                let rendered = substitute(part_text(entry)?, context)?;
                writer.write_all(rendered.as_bytes()).map_err(GeneratorError::Write)?;
            } else {
                writer.write_all(&entry.data).map_err(GeneratorError::Write)?;
            }
        }

        Ok(writer.finish()?.into_inner())
    }

    pub fn render_to_file(
        &self,
        context: &PlaceholderContext,
        path: &Path,
    ) -> Result<(), GeneratorError> {
        let bytes = self.render(context)?;
        fs::write(path, bytes).map_err(GeneratorError::Write)
    }

    fn templated_parts(&self) -> impl Iterator<Item = &Entry> {
        self.entries
            .iter()
            .filter(|e| TEMPLATED_PART.is_match(&e.name))
    }
}

fn part_text(entry: &Entry) -> Result<&str, GeneratorError> {
    std::str::from_utf8(&entry.data).map_err(|_| {
        GeneratorError::MalformedTemplate(format!("{} is not valid UTF-8", entry.name))
    })
}

fn placeholder_name(caps: &Captures<'_>) -> Result<String, GeneratorError> {
    let inner = MARKUP.replace_all(&caps[1], "");
    let name = inner.trim();
    if IDENTIFIER.is_match(name) {
        Ok(name.to_string())
    } else {
        Err(GeneratorError::MalformedTemplate(format!(
            "unsupported placeholder expression '{{{{ {} }}}}'",
            name
        )))
    }
}

fn substitute(xml: &str, context: &PlaceholderContext) -> Result<String, GeneratorError> {
    let mut output = String::with_capacity(xml.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(xml) {
        let Some(span) = caps.get(0) else {
            continue;
        };
        let name = placeholder_name(&caps)?;
        let value = context
            .get(&name)
            .ok_or_else(|| GeneratorError::MissingPlaceholder(name.clone()))?;

        output.push_str(&xml[last..span.start()]);
        output.push_str(&escape_xml_text(value));
        last = span.end();
    }

    output.push_str(&xml[last..]);
    Ok(output)
}
