//! Corpus-directory rebuild source.
//!
//! Walks a directory for `.json` (array of records) and `.jsonl` (one
//! record per line) files and yields their documents in stable sorted
//! file order. Blank answers are filtered by the index, not here.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use triage_core::traits::DocumentSource;
use triage_core::types::SourceDocument;
use triage_core::{Error, Result};

pub struct JsonCorpusSource {
    dir: PathBuf,
}

impl JsonCorpusSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn list_corpus_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(&self.dir)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_file())
        {
            match entry.path().extension().and_then(|s| s.to_str()) {
                Some("json" | "jsonl") => files.push(entry.path().to_path_buf()),
                _ => {}
            }
        }
        files.sort();
        files
    }

    fn read_file(path: &Path) -> Result<Vec<SourceDocument>> {
        if path.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            let reader = BufReader::new(fs::File::open(path)?);
            let mut docs = Vec::new();
            for line in reader.lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let doc: SourceDocument = serde_json::from_str(&line).map_err(|e| {
                    Error::Operation(format!("{}: bad corpus line: {e}", path.display()))
                })?;
                docs.push(doc);
            }
            Ok(docs)
        } else {
            let text = fs::read_to_string(path)?;
            serde_json::from_str(&text)
                .map_err(|e| Error::Operation(format!("{}: bad corpus file: {e}", path.display())))
        }
    }
}

impl DocumentSource for JsonCorpusSource {
    fn fetch_documents(&self) -> Result<Vec<SourceDocument>> {
        let files = self.list_corpus_files();
        if files.is_empty() {
            return Err(Error::Operation(format!(
                "no corpus files under {}",
                self.dir.display()
            )));
        }
        let mut documents = Vec::new();
        for path in &files {
            match Self::read_file(path) {
                Ok(mut docs) => documents.append(&mut docs),
                // One bad file should not sink the whole rebuild.
                Err(e) => warn!(file = %path.display(), error = %e, "skipping corpus file"),
            }
        }
        info!(
            files = files.len(),
            documents = documents.len(),
            dir = %self.dir.display(),
            "fetched corpus documents"
        );
        Ok(documents)
    }
}
