//! JSON collections output writer.
//!
//! Writes the finalized collection tree to JSON files with proper formatting.

use crate::parser::schema::CollectionsFile;
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Write a collections document to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Arguments
/// * `document` - Finalized collections to write
/// * `output_path` - Path to output JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
///
/// # Example
/// ```ignore
/// write_collections(&document, "hists.json")?;
/// ```
pub fn write_collections(
    document: &CollectionsFile,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing collections to: {}", output_path.display());

    validate_output_path(output_path)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, document)?;

    info!(
        "Collections written successfully ({} bytes)",
        calculate_file_size(output_path)
    );

    Ok(())
}

/// Serialize a collections document to a pretty JSON string
pub fn collections_to_string(document: &CollectionsFile) -> Result<String, OutputError> {
    Ok(serde_json::to_string_pretty(document)?)
}

/// Validate that output path is writable
///
/// **Private** - internal validation
fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    // Refuse to overwrite a directory
    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// Read a collections document from a JSON file
///
/// **Public** - used by `validate` and by tests
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reusing WriteFailed for I/O)
/// * `OutputError::SerializationFailed` - JSON parse error
pub fn read_collections(input_path: impl AsRef<Path>) -> Result<CollectionsFile, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading collections from: {}", input_path.display());

    let file = File::open(input_path)?;
    let document: CollectionsFile = serde_json::from_reader(BufReader::new(file))?;

    debug!(
        "Collections loaded: version {}, {} events processed",
        document.version, document.events_processed
    );

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{Aggregatable, Aggregator, AggregatorGroup, Snapshot};
    use tempfile::NamedTempFile;

    fn create_test_document() -> CollectionsFile {
        let mut root = AggregatorGroup::new("collections");
        root.register("all_events", Aggregator::new("all_events")).unwrap();
        let Snapshot::Group(collections) = root.write() else {
            panic!("group writes a group snapshot");
        };

        CollectionsFile {
            version: "1.0.0".to_string(),
            luminosity: 1000.0,
            cross_section: None,
            weight_scale: 500.0,
            events_processed: 10,
            events_selected: 4,
            collections,
            generated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_write_and_read_collections() {
        let document = create_test_document();
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        write_collections(&document, path).unwrap();
        let loaded = read_collections(path).unwrap();

        assert_eq!(loaded.version, document.version);
        assert_eq!(loaded.weight_scale, 500.0);
        assert_eq!(loaded.cross_section, None);
        let collection = loaded.collections.find("all_events").unwrap();
        assert_eq!(collection.tag, "all_events");
        assert_eq!(collection.histograms.len(), crate::utils::config::HIST_DEFS.len());
        assert_eq!(collection.record.mjj, -999.0);
    }

    #[test]
    fn test_cross_section_omitted_when_unset() {
        let json = collections_to_string(&create_test_document()).unwrap();
        assert!(!json.contains("cross_section"));
        assert!(json.contains("\"h_all_events_MET\""));
    }

    #[test]
    fn test_validate_output_path_empty() {
        assert!(validate_output_path(Path::new("")).is_err());
    }

    #[test]
    fn test_validate_output_path_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(validate_output_path(temp_dir.path()).is_err());
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested_path = temp_dir.path().join("nested/dirs/hists.json");

        write_collections(&create_test_document(), &nested_path).unwrap();

        assert!(nested_path.exists());
    }
}
