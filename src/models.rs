use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use utoipa::ToSchema;

/// Kind of document a generation request produces.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Certificate,
    Transcript,
    Associate,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Certificate => "certificate",
            Self::Transcript => "transcript",
            Self::Associate => "associate",
        }
    }

    /// Template file extensions accepted for this document type.
    pub fn template_extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Certificate => &["png", "jpg", "jpeg"],
            Self::Transcript | Self::Associate => &["docx"],
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "certificate" => Ok(Self::Certificate),
            "transcript" => Ok(Self::Transcript),
            "associate" => Ok(Self::Associate),
            other => Err(format!("Invalid document type '{}'", other)),
        }
    }
}

/// Requested output format selector.
///
/// `Doc` keeps only the structured document, `Pdf` only the fixed-layout export.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Doc,
    Pdf,
    #[default]
    Both,
}

impl OutputFormat {
    pub fn wants_document(&self) -> bool {
        matches!(self, Self::Doc | Self::Both)
    }

    pub fn wants_fixed_layout(&self) -> bool {
        matches!(self, Self::Pdf | Self::Both)
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "doc" | "docx" => Ok(Self::Doc),
            "pdf" => Ok(Self::Pdf),
            "both" | "" => Ok(Self::Both),
            other => Err(format!("Invalid file format '{}'", other)),
        }
    }
}

/// Where the records of a generation request come from.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    #[default]
    Excel,
    Manual,
}

impl FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "excel" | "" => Ok(Self::Excel),
            "manual" => Ok(Self::Manual),
            other => Err(format!("Invalid data source '{}'", other)),
        }
    }
}

/// On-disk format of a produced artifact.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    Png,
    Docx,
    Pdf,
}

impl ArtifactFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Docx => "docx",
            Self::Pdf => "pdf",
        }
    }

    /// Browsers can render these inline; docx has to be downloaded.
    pub fn is_inline_viewable(&self) -> bool {
        matches!(self, Self::Png | Self::Pdf)
    }
}

/// One generated output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Human name of the subject, e.g. "Ada Lovelace".
    pub name: String,
    /// Unique generated file name.
    pub filename: String,
    pub document_type: DocumentType,
    pub format: ArtifactFormat,
    pub path: PathBuf,
}

/// Ordered artifacts of a single generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    artifacts: Vec<Artifact>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, artifact: Artifact) {
        self.artifacts.push(artifact);
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn first(&self) -> Option<&Artifact> {
        self.artifacts.first()
    }

    pub fn find(&self, filename: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.filename == filename)
    }
}

impl From<Vec<Artifact>> for Manifest {
    fn from(artifacts: Vec<Artifact>) -> Self {
        Self { artifacts }
    }
}
