// The topic-extraction pipeline.
//
// raw texts → normalized → tokens → (tokens, bigrams) → merged final tokens
//           → term vectors → topic-term weights → formatted topics
//
// Two corpus-wide reductions sit in the middle: frequent-bigram counting and
// vocabulary building. Both run only after every document's per-document
// stage is complete, so the per-document stages are plain maps.
//
// The pipeline holds configuration only. Nothing is retained between calls,
// so a failed run can be followed immediately by another.

use anyhow::Result;
use tracing::{debug, info, warn};

use super::format::{format_topic, Topic};
use super::lda::{LdaModel, LdaParams};
use super::merge::merge_terms;
use super::normalize::TextNormalizer;
use super::phrases::{bigrams, FrequentBigrams, DEFAULT_MIN_SUPPORT};
use super::tokenize::Tokenizer;
use super::traits::TopicExtractor;
use super::vectorize::{CountVectorizer, DEFAULT_VOCAB_SIZE};

/// Default number of topics requested by callers.
pub const DEFAULT_NUM_TOPICS: usize = 5;
/// Default number of terms reported per topic.
pub const DEFAULT_MAX_WORDS: usize = 10;

/// Tunables for the pipeline. Everything here is fixed for the lifetime of
/// a `TopicPipeline`.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Below this many documents there is no result
    pub min_documents: usize,
    /// Corpus-wide count a bigram needs to become a phrase
    pub min_bigram_support: usize,
    /// Vocabulary cap
    pub vocab_size: usize,
    /// Minimum document frequency for a vocabulary term
    pub min_df: usize,
    /// EM iteration budget
    pub max_iterations: usize,
    /// Fewest topics ever produced
    pub min_topics: usize,
    /// Most topics ever produced
    pub max_topics: usize,
    /// Seed for the topic model's initialization
    pub seed: u64,
    /// Extra stopwords on top of the English and domain lists
    pub extra_stopwords: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_documents: 10,
            min_bigram_support: DEFAULT_MIN_SUPPORT,
            vocab_size: DEFAULT_VOCAB_SIZE,
            min_df: 1,
            max_iterations: 20,
            min_topics: 2,
            max_topics: 5,
            seed: 0x5EED,
            extra_stopwords: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// K = max(min_topics, min(requested, documents / 2, max_topics)).
    pub fn topic_count(&self, requested: usize, documents: usize) -> usize {
        requested
            .min(documents / 2)
            .min(self.max_topics)
            .max(self.min_topics)
    }
}

/// Per-document intermediate state after the first map stage.
struct Prepared {
    tokens: Vec<String>,
    bigrams: Vec<String>,
}

/// Stateless topic extractor: normalizer, tokenizer and configuration.
pub struct TopicPipeline {
    config: PipelineConfig,
    normalizer: TextNormalizer,
    tokenizer: Tokenizer,
}

impl TopicPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let normalizer = TextNormalizer::new()?;
        let tokenizer = Tokenizer::new(&config.extra_stopwords);
        Ok(Self {
            config,
            normalizer,
            tokenizer,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the whole pipeline.
    ///
    /// Returns `Ok(None)` when there is nothing meaningful to report: fewer
    /// documents than the quality floor, or no document left with any term
    /// after cleaning. `Err` is reserved for genuine faults.
    pub fn extract_topics(
        &self,
        documents: &[String],
        num_topics: usize,
        max_words: usize,
    ) -> Result<Option<Vec<Topic>>> {
        if documents.len() < self.config.min_documents {
            warn!(
                documents = documents.len(),
                required = self.config.min_documents,
                "Too few documents for topic extraction"
            );
            return Ok(None);
        }

        // Map: normalize, tokenize, bigrams
        let prepared: Vec<Prepared> = documents.iter().map(|d| self.prepare(d)).collect();

        // Reduce: corpus-wide frequent bigrams
        let all_bigrams: Vec<Vec<String>> = prepared.iter().map(|p| p.bigrams.clone()).collect();
        let frequent = FrequentBigrams::mine(&all_bigrams, self.config.min_bigram_support);
        debug!(phrases = ?frequent.sorted(), "Frequent bigrams");

        // Map: merge phrases into each document
        let final_tokens: Vec<Vec<String>> = prepared
            .iter()
            .map(|p| merge_terms(&p.tokens, &p.bigrams, &frequent))
            .collect();

        if final_tokens.iter().all(Vec::is_empty) {
            warn!(
                documents = documents.len(),
                "Every document reduced to nothing after cleaning, no vocabulary"
            );
            return Ok(None);
        }

        // Reduce: vocabulary, then vectorize
        let vectorizer = CountVectorizer {
            vocab_size: self.config.vocab_size,
            min_df: self.config.min_df,
        };
        let vocabulary = vectorizer.fit(&final_tokens)?;
        let vectors: Vec<_> = final_tokens.iter().map(|t| vocabulary.vectorize(t)).collect();

        let k = self.config.topic_count(num_topics, documents.len());
        let params = LdaParams::new(k, self.config.max_iterations, self.config.seed);
        let model = LdaModel::fit(&vectors, vocabulary.len(), &params)?;

        let topics: Vec<Topic> = model
            .describe_topics(max_words)
            .into_iter()
            .enumerate()
            .map(|(topic_id, terms)| {
                let raw: Vec<(String, f64)> = terms
                    .into_iter()
                    .filter_map(|(idx, w)| vocabulary.term(idx).map(|t| (t.to_string(), w)))
                    .collect();
                format_topic(topic_id, &raw)
            })
            .collect();

        info!(
            documents = documents.len(),
            phrases = frequent.len(),
            vocabulary = vocabulary.len(),
            k,
            "Extracted topics"
        );

        Ok(Some(topics))
    }

    fn prepare(&self, document: &str) -> Prepared {
        let normalized = self.normalizer.normalize(document);
        let tokens = self.tokenizer.tokenize(&normalized);
        let bigrams = bigrams(&tokens);
        Prepared { tokens, bigrams }
    }
}

impl TopicExtractor for TopicPipeline {
    fn extract(
        &self,
        documents: &[String],
        num_topics: usize,
        max_words: usize,
    ) -> Result<Option<Vec<Topic>>> {
        self.extract_topics(documents, num_topics, max_words)
    }
}
