use std::path::PathBuf;

use tracing::info;

use policycheck_core::config::{ChunkingSettings, IndexSettings, Settings};
use policycheck_core::data_processor::DataProcessor;
use policycheck_core::traits::{ChunkSearcher, DocumentProvisioner};
use policycheck_core::types::{Chunk, RetrievedChunk};
use policycheck_core::{Error, Result};

use crate::store::IndexStore;
use crate::tfidf::TfidfIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrieverStats {
    pub documents: usize,
    pub chunks: usize,
    pub vocabulary_size: usize,
}

/// Owns the chunk set and the fitted index built from it.
pub struct Retriever {
    document_dir: PathBuf,
    chunking: ChunkingSettings,
    index_settings: IndexSettings,
    store: IndexStore,
    chunks: Vec<Chunk>,
    index: TfidfIndex,
}

impl Retriever {
    /// An empty retriever; `search` fails with `NotFitted` until `build` or `load`.
    pub fn new(settings: &Settings) -> Self {
        Self {
            document_dir: settings.document_directory(),
            chunking: settings.chunking,
            index_settings: settings.index,
            store: IndexStore::new(settings.index_directory()),
            chunks: Vec::new(),
            index: TfidfIndex::new(settings.index),
        }
    }

    /// Load the persisted index, or provision documents and build one when it is missing.
    pub fn open(settings: &Settings, provisioner: &dyn DocumentProvisioner) -> Result<Self> {
        let mut retriever = Self::new(settings);
        match retriever.load() {
            Ok(()) => Ok(retriever),
            Err(e) if e.is_recoverable() => {
                info!(reason = %e, "rebuilding index");
                if !retriever.has_documents() {
                    let written = provisioner.provision(&retriever.document_dir)?;
                    info!(dir = %retriever.document_dir.display(), written, "provisioned documents");
                }
                retriever.build()?;
                Ok(retriever)
            }
            Err(e) => Err(e),
        }
    }

    /// Read the three persisted artifacts. Fails with `CorpusMissing` when any is absent,
    /// out of sync, or when the document directory holds no documents.
    pub fn load(&mut self) -> Result<()> {
        if !self.has_documents() {
            return Err(Error::CorpusMissing(format!("no documents in {}", self.document_dir.display())));
        }
        if !self.store.exists() {
            return Err(Error::CorpusMissing(format!("no index artifacts in {}", self.store.dir().display())));
        }
        let (chunks, index) = self.store.load()?;
        self.chunks = chunks;
        self.index = index;
        Ok(())
    }

    /// Chunk the document directory, fit and persist.
    pub fn build(&mut self) -> Result<RetrieverStats> {
        let chunks = DataProcessor::new(self.chunking).process_directory(&self.document_dir)?;
        if chunks.is_empty() {
            return Err(Error::CorpusMissing(format!("no readable documents in {}", self.document_dir.display())));
        }
        self.build_from_chunks(chunks)?;
        Ok(self.stats())
    }

    /// Fit a fresh index over `chunks` and persist it; the current state is kept if either step fails.
    pub fn build_from_chunks(&mut self, chunks: Vec<Chunk>) -> Result<()> {
        let mut index = TfidfIndex::new(self.index_settings);
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        index.fit(&texts)?;
        self.store.save(&chunks, &index)?;
        self.chunks = chunks;
        self.index = index;
        info!(chunks = self.chunks.len(), terms = self.index.vocabulary_size(), "index built");
        Ok(())
    }

    pub fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>> {
        let hits = self.index.search(query, k)?;
        Ok(hits
            .into_iter()
            .filter_map(|h| self.chunks.get(h.row).map(|c| RetrievedChunk { chunk: c.clone(), similarity: h.similarity }))
            .collect())
    }

    pub fn stats(&self) -> RetrieverStats {
        let mut documents: Vec<&str> = self.chunks.iter().map(|c| c.source_document.as_str()).collect();
        documents.sort_unstable();
        documents.dedup();
        RetrieverStats { documents: documents.len(), chunks: self.chunks.len(), vocabulary_size: self.index.vocabulary_size() }
    }

    fn has_documents(&self) -> bool {
        !DataProcessor::new(self.chunking).list_documents(&self.document_dir).is_empty()
    }
}

impl ChunkSearcher for Retriever {
    fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>> {
        Retriever::search(self, query, k)
    }
}
