//! JSON-lines event input.
//!
//! An input is either a single event file (`.json`, `.jsonl`, `.ndjson`)
//! or a plain-text list with one event file path per line.

use super::delphes::RawEvent;
use crate::utils::error::ParseError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

const EVENT_FILE_EXTENSIONS: &[&str] = &["json", "jsonl", "ndjson"];

/// Resolve a command-line input into the list of event files it names
///
/// **Public** - the number of files also sets the luminosity weight scale
///
/// # Errors
/// * `ParseError::Io` - The list file cannot be read
/// * `ParseError::EmptyInputList` - The list file names no files
pub fn resolve_inputs(input: &Path) -> Result<Vec<PathBuf>, ParseError> {
    let is_event_file = input
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| EVENT_FILE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false);

    if is_event_file {
        info!("Running over single event file:");
        info!("   > {}", input.display());
        return Ok(vec![input.to_path_buf()]);
    }

    info!("Running over list of event files:");
    let reader = BufReader::new(File::open(input)?);
    let mut files = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let entry = line.trim();
        if entry.is_empty() || entry.starts_with('#') {
            continue;
        }
        info!("   > {}", entry);
        files.push(PathBuf::from(entry));
    }

    if files.is_empty() {
        return Err(ParseError::EmptyInputList(input.display().to_string()));
    }

    Ok(files)
}

/// Streaming reader over the events of several files, in order
///
/// Files are opened lazily; blank lines are skipped. Every malformed line
/// is reported with its file and line number.
pub struct EventReader {
    files: std::vec::IntoIter<PathBuf>,
    current: Option<(String, Lines<BufReader<File>>)>,
    line_number: usize,
}

impl EventReader {
    /// Create a reader over the given event files
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self {
            files: files.into_iter(),
            current: None,
            line_number: 0,
        }
    }

    fn open_next(&mut self) -> Option<Result<(), ParseError>> {
        let path = self.files.next()?;
        debug!("Opening event file: {}", path.display());
        match File::open(&path) {
            Ok(file) => {
                self.current = Some((path.display().to_string(), BufReader::new(file).lines()));
                self.line_number = 0;
                Some(Ok(()))
            }
            Err(e) => Some(Err(ParseError::Io(e))),
        }
    }
}

impl Iterator for EventReader {
    type Item = Result<RawEvent, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current.is_none() {
                if let Err(e) = self.open_next()? {
                    return Some(Err(e));
                }
            }

            let (name, lines) = self.current.as_mut()?;
            match lines.next() {
                None => {
                    self.current = None;
                }
                Some(Err(e)) => return Some(Err(ParseError::Io(e))),
                Some(Ok(line)) => {
                    self.line_number += 1;
                    if line.trim().is_empty() {
                        continue;
                    }
                    return Some(serde_json::from_str(&line).map_err(|source| {
                        ParseError::InvalidEvent {
                            file: name.clone(),
                            line: self.line_number,
                            source,
                        }
                    }));
                }
            }
        }
    }
}

/// Read every event of the given files into memory
///
/// **Public** - used by the sharded driver, which needs random access
pub fn read_events(files: &[PathBuf]) -> Result<Vec<RawEvent>, ParseError> {
    EventReader::new(files.to_vec()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_reads_across_files_and_skips_blank_lines() {
        let dir = tempdir().unwrap();
        let a = write_file(dir.path(), "a.jsonl", "{\"weight\": 1.0}\n\n{\"weight\": 2.0}\n");
        let b = write_file(dir.path(), "b.jsonl", "{}\n");

        let events = read_events(&[a, b]).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1].weight, Some(2.0));
        assert_eq!(events[2].weight, None);
    }

    #[test]
    fn test_reports_line_number() {
        let dir = tempdir().unwrap();
        let a = write_file(dir.path(), "a.jsonl", "{}\n{not json}\n");

        let err = read_events(&[a]).unwrap_err();
        match err {
            ParseError::InvalidEvent { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let result = read_events(&[PathBuf::from("/nonexistent/events.jsonl")]);
        assert!(matches!(result, Err(ParseError::Io(_))));
    }

    #[test]
    fn test_resolve_single_file() {
        let files = resolve_inputs(Path::new("events.jsonl")).unwrap();
        assert_eq!(files, vec![PathBuf::from("events.jsonl")]);
    }

    #[test]
    fn test_resolve_list_file() {
        let dir = tempdir().unwrap();
        let list = write_file(dir.path(), "input.txt", "# samples\nrun1.jsonl\n\n  run2.jsonl  \n");

        let files = resolve_inputs(&list).unwrap();
        assert_eq!(files, vec![PathBuf::from("run1.jsonl"), PathBuf::from("run2.jsonl")]);
    }

    #[test]
    fn test_resolve_empty_list() {
        let dir = tempdir().unwrap();
        let list = write_file(dir.path(), "input.txt", "\n# nothing\n");

        assert!(matches!(
            resolve_inputs(&list),
            Err(ParseError::EmptyInputList(_))
        ));
    }
}
