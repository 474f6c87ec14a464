//! Sparse TF-IDF vector space with a frozen vocabulary.
//!
//! Weights follow the smoothed scheme `tf * (ln((1 + n) / (1 + df)) + 1)` and
//! every row is L2-normalised, so a dot product is a cosine similarity.
use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tantivy::tokenizer::TextAnalyzer;
use tracing::debug;

use policycheck_core::config::IndexSettings;
use policycheck_core::{Error, Result};

use crate::analyzer::{build_analyzer, terms, tokenize};

/// One chunk's weights, `indices` strictly ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseRow {
    pub indices: Vec<u32>,
    pub weights: Vec<f32>,
}

impl SparseRow {
    fn from_counts(counts: HashMap<u32, u32>, idf: &[f32]) -> Self {
        let mut entries: Vec<(u32, f32)> =
            counts.into_iter().map(|(id, tf)| (id, tf as f32 * idf[id as usize])).collect();
        entries.sort_by_key(|(id, _)| *id);
        let norm = entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut entries {
                *w /= norm;
            }
        }
        let (indices, weights) = entries.into_iter().unzip();
        Self { indices, weights }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// A ranked row. `row` is the chunk's position in the fitted corpus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    pub row: usize,
    pub similarity: f32,
}

pub struct TfidfIndex {
    settings: IndexSettings,
    vocabulary: HashMap<String, u32>,
    terms: Vec<String>,
    idf: Vec<f32>,
    rows: Vec<SparseRow>,
    analyzer: TextAnalyzer,
}

impl TfidfIndex {
    pub fn new(settings: IndexSettings) -> Self {
        Self {
            settings,
            vocabulary: HashMap::new(),
            terms: Vec::new(),
            idf: Vec::new(),
            rows: Vec::new(),
            analyzer: build_analyzer(),
        }
    }

    /// Rebuild from persisted parts; rejects a matrix that does not fit the vocabulary.
    pub fn from_parts(settings: IndexSettings, terms: Vec<String>, idf: Vec<f32>, rows: Vec<SparseRow>) -> Result<Self> {
        if terms.len() != idf.len() {
            return Err(Error::CorpusMissing(format!("vocabulary has {} terms but {} idf weights", terms.len(), idf.len())));
        }
        for (i, row) in rows.iter().enumerate() {
            let in_range = row.indices.iter().all(|&id| (id as usize) < terms.len());
            if row.indices.len() != row.weights.len() || !in_range {
                return Err(Error::CorpusMissing(format!("matrix row {} does not match the vocabulary", i)));
            }
        }
        let vocabulary = terms.iter().enumerate().map(|(i, t)| (t.clone(), i as u32)).collect();
        Ok(Self { settings, vocabulary, terms, idf, rows, analyzer: build_analyzer() })
    }

    pub fn fit<S: AsRef<str>>(&mut self, texts: &[S]) -> Result<()> {
        if texts.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        let mut analyzer = self.analyzer.clone();
        let doc_terms: Vec<Vec<String>> = texts.iter().map(|t| terms(&tokenize(&mut analyzer, t.as_ref()))).collect();

        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        let mut corpus_frequency: HashMap<&str, u64> = HashMap::new();
        for doc in &doc_terms {
            let mut seen: HashMap<&str, ()> = HashMap::new();
            for term in doc {
                *corpus_frequency.entry(term.as_str()).or_default() += 1;
                if seen.insert(term.as_str(), ()).is_none() {
                    *document_frequency.entry(term.as_str()).or_default() += 1;
                }
            }
        }

        let n = texts.len();
        // A single chunk would lose every term to the ceiling, so it only applies from two chunks up.
        let max_df = if n >= 2 { self.settings.max_document_fraction * n as f64 } else { f64::INFINITY };
        let min_df = self.settings.min_document_frequency;
        let mut kept: Vec<(&str, u64)> = corpus_frequency
            .iter()
            .filter(|(term, _)| {
                let df = document_frequency[*term];
                df >= min_df && (df as f64) <= max_df
            })
            .map(|(term, tf)| (*term, *tf))
            .collect();
        kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        kept.truncate(self.settings.max_vocabulary_size);
        if kept.is_empty() {
            return Err(Error::EmptyVocabulary);
        }

        let mut vocab_terms: Vec<String> = kept.into_iter().map(|(t, _)| t.to_string()).collect();
        vocab_terms.sort();
        let vocabulary: HashMap<String, u32> = vocab_terms.iter().enumerate().map(|(i, t)| (t.clone(), i as u32)).collect();
        let idf: Vec<f32> = vocab_terms
            .iter()
            .map(|t| {
                let df = document_frequency[t.as_str()] as f64;
                (((1.0 + n as f64) / (1.0 + df)).ln() + 1.0) as f32
            })
            .collect();

        let rows = doc_terms
            .iter()
            .map(|doc| {
                let mut counts: HashMap<u32, u32> = HashMap::new();
                for term in doc {
                    if let Some(&id) = vocabulary.get(term) {
                        *counts.entry(id).or_default() += 1;
                    }
                }
                SparseRow::from_counts(counts, &idf)
            })
            .collect();

        debug!(chunks = n, terms = vocab_terms.len(), "fitted tf-idf index");
        self.vocabulary = vocabulary;
        self.terms = vocab_terms;
        self.idf = idf;
        self.rows = rows;
        Ok(())
    }

    pub fn is_fitted(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Project `query` into the frozen vocabulary; out-of-vocabulary terms are ignored.
    pub fn transform(&self, query: &str) -> SparseRow {
        let mut analyzer = self.analyzer.clone();
        let mut counts: HashMap<u32, u32> = HashMap::new();
        for term in terms(&tokenize(&mut analyzer, query)) {
            if let Some(&id) = self.vocabulary.get(&term) {
                *counts.entry(id).or_default() += 1;
            }
        }
        SparseRow::from_counts(counts, &self.idf)
    }

    /// Top `k` rows by cosine similarity, descending, ties by ascending row.
    /// Rows with similarity `<= 0` are never returned.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        if !self.is_fitted() {
            return Err(Error::NotFitted);
        }
        let q = self.transform(query);
        if q.is_empty() || k == 0 {
            return Ok(vec![]);
        }
        let q_weights: HashMap<u32, f32> = q.indices.iter().copied().zip(q.weights.iter().copied()).collect();
        let mut hits: Vec<SearchHit> = self
            .rows
            .iter()
            .enumerate()
            .filter_map(|(row, r)| {
                let dot: f32 = r
                    .indices
                    .iter()
                    .zip(&r.weights)
                    .filter_map(|(id, w)| q_weights.get(id).map(|qw| qw * w))
                    .sum();
                (dot > 0.0).then(|| SearchHit { row, similarity: dot.min(1.0) })
            })
            .collect();
        hits.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap_or(Ordering::Equal).then(a.row.cmp(&b.row)));
        hits.truncate(k);
        Ok(hits)
    }

    pub fn settings(&self) -> &IndexSettings {
        &self.settings
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn idf(&self) -> &[f32] {
        &self.idf
    }

    pub fn rows(&self) -> &[SparseRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.terms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: [&str; 4] = [
        "Company total liability is limited to fees paid in the preceding twelve months.",
        "Either party may terminate for material breach with a thirty day cure period.",
        "Customer shall pay all invoices within thirty days; late payment accrues interest.",
        "Confidential information and trade secrets shall not be disclosed to third parties.",
    ];

    fn fitted() -> TfidfIndex {
        let mut index = TfidfIndex::new(IndexSettings::default());
        index.fit(&CORPUS).expect("fit");
        index
    }

    #[test]
    fn fit_on_empty_corpus_fails() {
        let mut index = TfidfIndex::new(IndexSettings::default());
        let empty: [&str; 0] = [];
        assert!(matches!(index.fit(&empty), Err(Error::EmptyCorpus)));
    }

    #[test]
    fn search_before_fit_fails() {
        let index = TfidfIndex::new(IndexSettings::default());
        assert!(matches!(index.search("liability", 3), Err(Error::NotFitted)));
    }

    #[test]
    fn identical_text_ranks_first_with_similarity_near_one() {
        let index = fitted();
        let hits = index.search(CORPUS[1], 3).unwrap();
        assert_eq!(hits[0].row, 1);
        assert!((hits[0].similarity - 1.0).abs() < 1e-4, "similarity {}", hits[0].similarity);
    }

    #[test]
    fn results_are_bounded_positive_and_descending() {
        let index = fitted();
        let hits = index.search("thirty days payment breach liability", 2).unwrap();
        assert!(hits.len() <= 2);
        for pair in hits.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }
        assert!(hits.iter().all(|h| h.similarity > 0.0 && h.similarity <= 1.0));
    }

    #[test]
    fn out_of_vocabulary_query_matches_nothing() {
        let index = fitted();
        assert!(index.search("zyzzyva quux", 3).unwrap().is_empty());
        assert!(index.search("the and of", 3).unwrap().is_empty());
    }

    #[test]
    fn ties_are_ordered_by_row() {
        let mut index = TfidfIndex::new(IndexSettings::default());
        index.fit(&["audit records", "warranty terms", "audit records"]).unwrap();
        let hits = index.search("audit", 5).unwrap();
        assert_eq!(hits.iter().map(|h| h.row).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(hits[0].similarity, hits[1].similarity);
    }

    #[test]
    fn vocabulary_is_capped_and_frozen() {
        let settings = IndexSettings { max_vocabulary_size: 3, ..IndexSettings::default() };
        let mut index = TfidfIndex::new(settings);
        index.fit(&["alpha alpha alpha beta beta gamma", "delta epsilon"]).unwrap();
        assert_eq!(index.vocabulary_size(), 3);
        assert!(index.terms().contains(&"alpha".to_string()));
        let before = index.vocabulary_size();
        index.search("omega alpha", 1).unwrap();
        assert_eq!(index.vocabulary_size(), before);
    }

    #[test]
    fn terms_in_too_many_chunks_are_dropped() {
        let mut index = TfidfIndex::new(IndexSettings::default());
        index.fit(&["contract alpha", "contract beta", "contract gamma"]).unwrap();
        assert!(!index.terms().contains(&"contract".to_string()));
        assert!(index.terms().contains(&"contract alpha".to_string()));
    }

    #[test]
    fn rebuilt_from_parts_searches_identically() {
        let index = fitted();
        let copy = TfidfIndex::from_parts(*index.settings(), index.terms().to_vec(), index.idf().to_vec(), index.rows().to_vec())
            .unwrap();
        assert_eq!(index.search("cure period breach", 3).unwrap(), copy.search("cure period breach", 3).unwrap());
    }
}
