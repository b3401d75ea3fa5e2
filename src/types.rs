use serde::{Deserialize, Deserializer, Serialize};

/// Which reference resource `/ref` serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    #[serde(alias = "fa")]
    Fasta,
    #[default]
    #[serde(alias = "gtf", alias = "reference")]
    Annotation,
}

impl ReferenceKind {
    /// `fasta` (or `fa`) in any case selects the FASTA reference; every other
    /// value selects the annotation.
    pub fn from_param(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("fasta") || value.eq_ignore_ascii_case("fa") {
            ReferenceKind::Fasta
        } else {
            ReferenceKind::Annotation
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ReferenceKind::Fasta => "text/x-fasta",
            ReferenceKind::Annotation => "application/gzip",
        }
    }
}

/// Query parameters for `GET /files`.
#[derive(Debug, Deserialize, Default)]
pub struct FilesQuery {
    /// Group name.
    pub key: Option<String>,
    pub file: Option<String>,
    pub index: Option<String>,
}

/// Query parameters for `GET /ref`.
#[derive(Debug, Deserialize, Default)]
pub struct ReferenceQuery {
    #[serde(default, deserialize_with = "lenient_reference_kind")]
    pub filetype: ReferenceKind,
    pub index: Option<String>,
}

fn lenient_reference_kind<'de, D>(deserializer: D) -> Result<ReferenceKind, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.as_deref().map(ReferenceKind::from_param).unwrap_or_default())
}

/// Flag parameters count as set unless empty, `0` or `false`.
pub fn is_truthy(value: Option<&str>) -> bool {
    match value {
        None => false,
        Some(value) => {
            let value = value.trim();
            !(value.is_empty() || value == "0" || value.eq_ignore_ascii_case("false"))
        }
    }
}

/// Service info response
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub version: String,
    pub catalog: CatalogSummary,
}

#[derive(Debug, Serialize)]
pub struct CatalogSummary {
    pub groups: usize,
    pub files: usize,
}
