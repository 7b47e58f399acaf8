//! JSON solution report

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("cannot write JSON file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

/// What gets written next to a solved level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionRecord {
    /// Input file name without its directory
    pub filename: String,
    /// The level text exactly as read, minus carriage returns
    pub map: String,
    pub lurd: String,
    /// Whole seconds, as a string
    pub elapsed: String,
}

impl SolutionRecord {
    pub fn new(input: &Path, map_text: &str, lurd: &str, elapsed_secs: u64) -> Self {
        Self {
            filename: file_name(input),
            map: map_text.replace('\r', ""),
            lurd: lurd.to_string(),
            elapsed: elapsed_secs.to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String, ReportError> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

fn file_name(input: &Path) -> String {
    input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.to_string_lossy().into_owned())
}

/// `<input stem>.json`, relative to the working directory.
pub fn json_path_for(input: &Path) -> PathBuf {
    let name = file_name(input);
    let stem = match name.rfind('.') {
        Some(dot) => &name[..dot],
        None => name.as_str(),
    };
    PathBuf::from(format!("{}.json", stem))
}

/// Write `record` to `dir`/`<input stem>.json` and return the path.
pub fn write_record(dir: &Path, input: &Path, record: &SolutionRecord) -> Result<PathBuf, ReportError> {
    let path = dir.join(json_path_for(input));
    let json = record.to_json()?;
    fs::write(&path, json).map_err(|source| ReportError::Io {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), "wrote solution report");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_path_drops_directory_and_extension() {
        assert_eq!(json_path_for(Path::new("levels/easy/one.txt")), PathBuf::from("one.json"));
        assert_eq!(json_path_for(Path::new("plain")), PathBuf::from("plain.json"));
        assert_eq!(json_path_for(Path::new("a.b.sok")), PathBuf::from("a.b.json"));
    }

    #[test]
    fn test_record_strips_carriage_returns() {
        let record = SolutionRecord::new(Path::new("dir/lvl.txt"), "#####\r\n#@$.#\r\n#####\r\n", "R", 3);
        assert_eq!(record.filename, "lvl.txt");
        assert_eq!(record.map, "#####\n#@$.#\n#####\n");
        assert_eq!(record.elapsed, "3");
    }

    #[test]
    fn test_json_escapes_map() {
        let record = SolutionRecord::new(Path::new("q.txt"), "#\"\\\n", "rR", 0);
        let json = record.to_json().unwrap();
        assert!(json.contains(r##""map": "#\"\\\n""##));
        assert!(json.contains(r#""lurd": "rR""#));
        assert!(json.contains(r#""elapsed": "0""#));

        let back: SolutionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_write_record_into_directory() {
        let dir = std::env::temp_dir().join(format!("fess-report-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let record = SolutionRecord::new(Path::new("x/level7.sok"), "#@$.#\n", "R", 1);
        let path = write_record(&dir, Path::new("x/level7.sok"), &record).unwrap();
        assert_eq!(path, dir.join("level7.json"));

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n  \"filename\": \"level7.sok\""));
        fs::remove_dir_all(&dir).unwrap();
    }
}
