//! Document walking and word-window chunking.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::ChunkingSettings;
use crate::error::{Error, Result};
use crate::types::Chunk;

const DOCUMENT_EXTENSIONS: [&str; 2] = ["txt", "pdf"];

/// Split `text` on whitespace into windows of `window_size` words, each window
/// starting `window_size - overlap` words after the previous one.
///
/// A window starts at every step offset before the end of the text, so the
/// trailing partial windows are kept. Empty text yields no chunks.
/// `overlap >= window_size` is rejected so the walk always advances.
pub fn chunk_words(text: &str, window_size: usize, overlap: usize) -> Result<Vec<String>> {
    if window_size == 0 {
        return Err(Error::InvalidConfig("chunk window size must be greater than 0".into()));
    }
    if overlap >= window_size {
        return Err(Error::InvalidConfig(format!(
            "chunk overlap ({}) must be smaller than window size ({})",
            overlap, window_size
        )));
    }
    let words: Vec<&str> = text.split_whitespace().collect();
    let step = window_size - overlap;
    Ok((0..words.len())
        .step_by(step)
        .map(|start| words[start..(start + window_size).min(words.len())].join(" "))
        .collect())
}

pub struct DataProcessor {
    chunking: ChunkingSettings,
}

impl Default for DataProcessor {
    fn default() -> Self {
        Self::new(ChunkingSettings::default())
    }
}

impl DataProcessor {
    pub fn new(chunking: ChunkingSettings) -> Self {
        Self { chunking }
    }

    /// Chunk every document under `data_dir`. A missing directory yields no chunks;
    /// files that cannot be read are logged and skipped.
    pub fn process_directory(&self, data_dir: &Path) -> Result<Vec<Chunk>> {
        let files = self.list_documents(data_dir);
        if files.is_empty() {
            info!(dir = %data_dir.display(), "no documents found");
            return Ok(vec![]);
        }
        let mut all_chunks = Vec::new();
        for (file_index, file_path) in files.iter().enumerate() {
            let content = match self.read_file_content(file_path) {
                Ok(content) => content,
                Err(e) => {
                    warn!(file = %file_path.display(), error = %e, "skipping unreadable document");
                    continue;
                }
            };
            let source = self.document_name(file_path, data_dir);
            let chunks = self.chunk_document(&content, &source)?;
            info!(file = %source, position = file_index + 1, of = files.len(), chunks = chunks.len(), "processed document");
            all_chunks.extend(chunks);
        }
        info!(files = files.len(), chunks = all_chunks.len(), "document processing complete");
        Ok(all_chunks)
    }

    pub fn chunk_document(&self, content: &str, source: &str) -> Result<Vec<Chunk>> {
        let windows = chunk_words(content, self.chunking.window_size, self.chunking.overlap)?;
        let total = windows.len();
        Ok(windows
            .into_iter()
            .enumerate()
            .map(|(i, text)| Chunk {
                text,
                source_document: source.to_string(),
                sequence_index: i,
                total_chunks_in_document: total,
            })
            .collect())
    }

    /// Documents under `root`, sorted for a stable chunk order.
    pub fn list_documents(&self, root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
            let path = entry.path();
            let is_document = path
                .extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| DOCUMENT_EXTENSIONS.iter().any(|d| ext.eq_ignore_ascii_case(d)));
            if is_document {
                files.push(path.to_path_buf());
            }
        }
        files.sort();
        files
    }

    fn read_file_content(&self, file_path: &Path) -> std::io::Result<String> {
        match fs::read_to_string(file_path) {
            Ok(content) => Ok(content),
            Err(_) => Ok(String::from_utf8_lossy(&fs::read(file_path)?).to_string()),
        }
    }

    fn document_name(&self, file_path: &Path, data_dir: &Path) -> String {
        let relative_path = file_path.strip_prefix(data_dir).unwrap_or(file_path);
        relative_path.to_string_lossy().replace('\\', "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(chunk_words("", 10, 2).unwrap().is_empty());
        assert!(chunk_words("  \n\t ", 10, 2).unwrap().is_empty());
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        assert_eq!(chunk_words("alpha  bravo\ncharlie", 10, 2).unwrap(), vec!["alpha bravo charlie"]);
    }

    #[test]
    fn windows_advance_by_window_minus_overlap() {
        let chunks = chunk_words(&words(10), 6, 2).unwrap();
        assert_eq!(chunks, vec!["w0 w1 w2 w3 w4 w5", "w4 w5 w6 w7 w8 w9", "w8 w9"]);
    }

    #[test]
    fn overlap_not_smaller_than_window_is_rejected() {
        assert!(matches!(chunk_words("a b c", 3, 3), Err(Error::InvalidConfig(_))));
        assert!(matches!(chunk_words("a b c", 3, 5), Err(Error::InvalidConfig(_))));
        assert!(matches!(chunk_words("a b c", 0, 0), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn advances_reconstruct_the_token_sequence() {
        for n in [0usize, 1, 5, 17, 64] {
            let text = words(n);
            let expected: Vec<&str> = text.split_whitespace().collect();
            for window in 1..9usize {
                for overlap in 0..window {
                    let step = window - overlap;
                    let chunks = chunk_words(&text, window, overlap).unwrap();
                    assert_eq!(chunks.len(), n.div_ceil(step), "n={} window={} overlap={}", n, window, overlap);
                    let rebuilt: Vec<&str> = chunks.iter().flat_map(|c| c.split_whitespace().take(step)).collect();
                    assert_eq!(rebuilt, expected, "n={} window={} overlap={}", n, window, overlap);
                }
            }
        }
    }
}
