use crate::defaults::default_faqs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use woodchat_common::FaqEntry;

#[derive(thiserror::Error, Debug)]
pub enum FaqLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("unsupported FAQ file type: {0}")]
    Unsupported(PathBuf),
}

/// One row of an FAQ data file. Column names follow the spreadsheet export
/// (`Question`, `Answer`); lowercase names are accepted too.
#[derive(Debug, Deserialize)]
struct FaqRecord {
    #[serde(rename = "Question", alias = "question", deserialize_with = "empty_if_null")]
    question: String,
    #[serde(rename = "Answer", alias = "answer")]
    answer: Option<String>,
    #[serde(rename = "Category", alias = "category", default)]
    category: Option<String>,
}

/// Blank cells come through as `null`; they read as empty text. The column
/// itself must still be present.
fn empty_if_null<'de, D>(de: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(de)?.unwrap_or_default())
}

const FILE_SUFFIXES: [&str; 2] = ["_FAQs", "_Details"];

/// Material name derived from a data file name: `MDF_FAQs.json` -> `MDF`.
pub(crate) fn material_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    FILE_SUFFIXES
        .iter()
        .fold(stem, |name, suffix| name.replace(suffix, ""))
}

fn is_faq_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("json" | "yaml" | "yml")
    )
}

/// Parse one FAQ data file (JSON or YAML list of records).
pub fn read_faq_file(path: &Path) -> Result<Vec<FaqEntry>, FaqLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| FaqLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let records: Vec<FaqRecord> = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&raw).map_err(|e| FaqLoadError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?,
        Some("yaml" | "yml") => serde_yaml::from_str(&raw).map_err(|e| FaqLoadError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?,
        _ => return Err(FaqLoadError::Unsupported(path.to_path_buf())),
    };

    let material = material_name(path);
    Ok(records
        .into_iter()
        .map(|r| FaqEntry {
            question: r.question,
            answer: r.answer.unwrap_or_default(),
            material: Some(material.clone()),
            category: r.category,
        })
        .collect())
}

/// Load every FAQ file in `dir`.
///
/// Unreadable or malformed files are logged and skipped. When nothing could
/// be loaded (missing directory, no files, only bad files) the built-in
/// [`default_faqs`] are returned instead.
pub fn load_faqs(dir: &Path) -> Vec<FaqEntry> {
    let mut files: Vec<PathBuf> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_faq_file(p))
            .collect(),
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "faq.load.dir_unreadable");
            Vec::new()
        }
    };
    files.sort();
    info!(dir = %dir.display(), files = files.len(), "faq.load.scan");

    let mut faqs = Vec::new();
    for path in &files {
        match read_faq_file(path) {
            Ok(entries) => {
                info!(
                    file = %path.display(),
                    material = %material_name(path),
                    count = entries.len(),
                    "faq.load.file"
                );
                faqs.extend(entries);
            }
            Err(e) => warn!(error = %e, "faq.load.file_skipped"),
        }
    }

    if faqs.is_empty() {
        warn!(dir = %dir.display(), "faq.load.defaults");
        return default_faqs();
    }
    info!(total = faqs.len(), "faq.load.done");
    faqs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_known_suffixes() {
        assert_eq!(material_name(Path::new("data/MDF_FAQs.json")), "MDF");
        assert_eq!(material_name(Path::new("BOILO_Details.yaml")), "BOILO");
        assert_eq!(material_name(Path::new("Plywood.yml")), "Plywood");
    }

    #[test]
    fn recognises_data_extensions() {
        assert!(is_faq_file(Path::new("a.json")));
        assert!(is_faq_file(Path::new("a.yml")));
        assert!(!is_faq_file(Path::new("a.xlsx")));
        assert!(!is_faq_file(Path::new("README")));
    }
}
