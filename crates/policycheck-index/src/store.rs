//! On-disk artifact set for a fitted index.
//!
//! Three files always travel together: `documents.json` (chunks + metadata),
//! `vocabulary.json` (terms, idf, settings) and `matrix.json` (sparse rows).
//! Each carries the corpus fingerprint; a set whose fingerprints disagree is
//! treated as missing. Saves are staged in a sibling directory and swapped in
//! with renames once all three files are written.
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use policycheck_core::config::IndexSettings;
use policycheck_core::types::Chunk;
use policycheck_core::{Error, Result};

use crate::tfidf::{SparseRow, TfidfIndex};

pub const DOCUMENTS_FILE: &str = "documents.json";
pub const VOCABULARY_FILE: &str = "vocabulary.json";
pub const MATRIX_FILE: &str = "matrix.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub filename: String,
    pub chunk_id: usize,
    pub total_chunks: usize,
    pub char_count: usize,
}

#[derive(Serialize, Deserialize)]
struct DocumentsArtifact {
    fingerprint: String,
    chunks: Vec<String>,
    metadata: Vec<ChunkMetadata>,
}

#[derive(Serialize, Deserialize)]
struct VocabularyArtifact {
    fingerprint: String,
    settings: IndexSettings,
    terms: Vec<String>,
    idf: Vec<f32>,
}

#[derive(Serialize, Deserialize)]
struct MatrixArtifact {
    fingerprint: String,
    n_rows: usize,
    n_cols: usize,
    rows: Vec<SparseRow>,
}

/// blake3 over every chunk's text and position.
pub fn fingerprint(chunks: &[Chunk]) -> String {
    let mut hasher = blake3::Hasher::new();
    for c in chunks {
        hasher.update(c.source_document.as_bytes());
        hasher.update(&[0]);
        hasher.update(&(c.sequence_index as u64).to_le_bytes());
        hasher.update(&(c.total_chunks_in_document as u64).to_le_bytes());
        hasher.update(c.text.as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize().to_hex().to_string()
}

pub struct IndexStore {
    dir: PathBuf,
}

impl IndexStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn exists(&self) -> bool {
        [DOCUMENTS_FILE, VOCABULARY_FILE, MATRIX_FILE].iter().all(|f| self.dir.join(f).is_file())
    }

    pub fn save(&self, chunks: &[Chunk], index: &TfidfIndex) -> Result<()> {
        let fp = fingerprint(chunks);
        let documents = DocumentsArtifact {
            fingerprint: fp.clone(),
            chunks: chunks.iter().map(|c| c.text.clone()).collect(),
            metadata: chunks
                .iter()
                .map(|c| ChunkMetadata {
                    filename: c.source_document.clone(),
                    chunk_id: c.sequence_index,
                    total_chunks: c.total_chunks_in_document,
                    char_count: c.char_count(),
                })
                .collect(),
        };
        let vocabulary = VocabularyArtifact {
            fingerprint: fp.clone(),
            settings: *index.settings(),
            terms: index.terms().to_vec(),
            idf: index.idf().to_vec(),
        };
        let matrix = MatrixArtifact {
            fingerprint: fp,
            n_rows: index.row_count(),
            n_cols: index.vocabulary_size(),
            rows: index.rows().to_vec(),
        };

        let parent = self.parent();
        fs::create_dir_all(&parent).map_err(|e| Error::persistence(&parent, e))?;
        let staging = tempfile::Builder::new()
            .prefix(".index-staging")
            .tempdir_in(&parent)
            .map_err(|e| Error::persistence(&parent, e))?;
        write_json(&staging.path().join(DOCUMENTS_FILE), &documents, true)?;
        write_json(&staging.path().join(VOCABULARY_FILE), &vocabulary, false)?;
        write_json(&staging.path().join(MATRIX_FILE), &matrix, false)?;
        self.swap_in(staging.path())?;
        info!(dir = %self.dir.display(), chunks = chunks.len(), terms = index.vocabulary_size(), "saved index artifacts");
        Ok(())
    }

    pub fn load(&self) -> Result<(Vec<Chunk>, TfidfIndex)> {
        let documents: DocumentsArtifact = read_json(&self.dir.join(DOCUMENTS_FILE))?;
        let vocabulary: VocabularyArtifact = read_json(&self.dir.join(VOCABULARY_FILE))?;
        let matrix: MatrixArtifact = read_json(&self.dir.join(MATRIX_FILE))?;

        if documents.chunks.len() != documents.metadata.len() {
            return Err(Error::CorpusMissing(format!("{} has mismatched chunk and metadata lists", DOCUMENTS_FILE)));
        }
        let chunks: Vec<Chunk> = documents
            .chunks
            .into_iter()
            .zip(documents.metadata)
            .map(|(text, meta)| Chunk {
                text,
                source_document: meta.filename,
                sequence_index: meta.chunk_id,
                total_chunks_in_document: meta.total_chunks,
            })
            .collect();

        let fp = fingerprint(&chunks);
        if documents.fingerprint != fp || vocabulary.fingerprint != fp || matrix.fingerprint != fp {
            return Err(Error::CorpusMissing(format!("index artifacts in {} are out of sync", self.dir.display())));
        }
        if matrix.n_rows != chunks.len() || matrix.rows.len() != chunks.len() || matrix.n_cols != vocabulary.terms.len() {
            return Err(Error::CorpusMissing(format!("matrix shape does not match chunks in {}", self.dir.display())));
        }
        let index = TfidfIndex::from_parts(vocabulary.settings, vocabulary.terms, vocabulary.idf, matrix.rows)?;
        info!(dir = %self.dir.display(), chunks = chunks.len(), terms = index.vocabulary_size(), "loaded index artifacts");
        Ok((chunks, index))
    }

    fn parent(&self) -> PathBuf {
        match self.dir.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Replace the live directory with `staging`, keeping the previous set until the swap succeeds.
    fn swap_in(&self, staging: &Path) -> Result<()> {
        let name = self.dir.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_else(|| "index".to_string());
        let backup = self.parent().join(format!(".{}.previous", name));
        if backup.exists() {
            fs::remove_dir_all(&backup).map_err(|e| Error::persistence(&backup, e))?;
        }
        let had_previous = self.dir.exists();
        if had_previous {
            fs::rename(&self.dir, &backup).map_err(|e| Error::persistence(&self.dir, e))?;
        }
        if let Err(e) = fs::rename(staging, &self.dir) {
            if had_previous {
                if let Err(restore) = fs::rename(&backup, &self.dir) {
                    warn!(error = %restore, "failed to restore previous index artifacts");
                }
            }
            return Err(Error::persistence(&self.dir, e));
        }
        if had_previous {
            if let Err(e) = fs::remove_dir_all(&backup) {
                warn!(dir = %backup.display(), error = %e, "failed to remove previous index artifacts");
            }
        }
        Ok(())
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::persistence(path, e))?;
    let mut writer = BufWriter::new(file);
    let encoded = if pretty { serde_json::to_writer_pretty(&mut writer, value) } else { serde_json::to_writer(&mut writer, value) };
    encoded.map_err(|e| Error::persistence(path, e))?;
    writer.flush().map_err(|e| Error::persistence(path, e))?;
    writer.get_ref().sync_all().map_err(|e| Error::persistence(path, e))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| Error::CorpusMissing(format!("{}: {}", path.display(), e)))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| Error::CorpusMissing(format!("{} is unreadable: {}", path.display(), e)))
}
