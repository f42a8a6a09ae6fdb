// Latent Dirichlet Allocation fitted with expectation-maximization.
//
// This is the MAP-EM formulation used by the EM optimizer in common large
// scale LDA implementations (Asuncion et al., "On Smoothing and Inference for
// Topic Models"). Every non-zero (document, term) cell carries a topic
// responsibility vector γ. One iteration:
//
//   E-step:  γ_djk ∝ (N_wk + η − 1) · (N_kd + α − 1) / (N_k + W·(η − 1))
//   M-step:  N_wk = Σ_d n_dw γ_dwk,  N_kd = Σ_w n_dw γ_dwk,  N_k = Σ_w N_wk
//
// With α = 50/K + 1 and η = 1.1 every factor is strictly positive, so the
// responsibilities never degenerate to zero vectors.
//
// Initialization is random but seeded: the same corpus and seed always
// produce the same topics.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::vectorize::DocumentVector;

/// Topic concentration (η) used by the EM optimizer.
pub const DEFAULT_TOPIC_CONCENTRATION: f64 = 1.1;

/// Model hyperparameters for one fit.
#[derive(Debug, Clone)]
pub struct LdaParams {
    /// Number of topics (K)
    pub k: usize,
    /// EM iteration budget
    pub max_iterations: usize,
    /// Document concentration α; `None` means 50/K + 1
    pub doc_concentration: Option<f64>,
    /// Topic concentration η
    pub topic_concentration: f64,
    /// RNG seed for the initial responsibilities
    pub seed: u64,
}

impl LdaParams {
    pub fn new(k: usize, max_iterations: usize, seed: u64) -> Self {
        Self {
            k,
            max_iterations,
            doc_concentration: None,
            topic_concentration: DEFAULT_TOPIC_CONCENTRATION,
            seed,
        }
    }

    fn alpha(&self) -> f64 {
        self.doc_concentration
            .unwrap_or(50.0 / self.k as f64 + 1.0)
    }
}

/// A fitted model: expected topic-term counts.
#[derive(Debug, Clone)]
pub struct LdaModel {
    k: usize,
    vocab_size: usize,
    eta: f64,
    /// K × W expected counts, row-major by topic
    topic_term: Vec<f64>,
    /// Per-topic totals N_k
    topic_totals: Vec<f64>,
}

/// One cell of the document-term matrix with its responsibilities.
struct Cell {
    doc: usize,
    term: usize,
    count: f64,
    gamma: Vec<f64>,
}

impl LdaModel {
    /// Fit the model over `documents`, whose term indices must be below
    /// `vocab_size`.
    pub fn fit(documents: &[DocumentVector], vocab_size: usize, params: &LdaParams) -> Result<Self> {
        let k = params.k;
        if k == 0 {
            anyhow::bail!("LDA needs at least one topic");
        }
        if vocab_size == 0 {
            anyhow::bail!("LDA needs a non-empty vocabulary");
        }

        let alpha = params.alpha();
        let eta = params.topic_concentration;
        let mut rng = StdRng::seed_from_u64(params.seed);

        let mut cells: Vec<Cell> = Vec::new();
        for (doc, vector) in documents.iter().enumerate() {
            for &(term, count) in &vector.entries {
                if term >= vocab_size {
                    anyhow::bail!("Term index {term} out of range for vocabulary of {vocab_size}");
                }
                let mut gamma: Vec<f64> = (0..k).map(|_| rng.random::<f64>() + 1e-3).collect();
                normalize_in_place(&mut gamma);
                cells.push(Cell {
                    doc,
                    term,
                    count: count as f64,
                    gamma,
                });
            }
        }

        if cells.is_empty() {
            anyhow::bail!("LDA needs at least one non-empty document");
        }

        let mut topic_term = vec![0.0; k * vocab_size];
        let mut doc_topic = vec![0.0; documents.len() * k];
        let mut topic_totals = vec![0.0; k];
        accumulate(&cells, k, vocab_size, &mut topic_term, &mut doc_topic, &mut topic_totals);

        let smoothing = vocab_size as f64 * (eta - 1.0);

        for iteration in 0..params.max_iterations {
            // E-step
            for cell in &mut cells {
                for t in 0..k {
                    let n_wk = topic_term[t * vocab_size + cell.term];
                    let n_kd = doc_topic[cell.doc * k + t];
                    cell.gamma[t] =
                        (n_wk + eta - 1.0) * (n_kd + alpha - 1.0) / (topic_totals[t] + smoothing);
                }
                normalize_in_place(&mut cell.gamma);
            }

            // M-step
            accumulate(&cells, k, vocab_size, &mut topic_term, &mut doc_topic, &mut topic_totals);

            debug!(
                iteration,
                log_likelihood = log_likelihood(&cells, &topic_term, &doc_topic, &topic_totals, k, vocab_size, alpha, eta),
                "LDA EM iteration"
            );
        }

        Ok(Self {
            k,
            vocab_size,
            eta,
            topic_term,
            topic_totals,
        })
    }

    pub fn num_topics(&self) -> usize {
        self.k
    }

    /// Smoothed probability of `term` under `topic`.
    pub fn term_weight(&self, topic: usize, term: usize) -> f64 {
        let smoothing = self.vocab_size as f64 * (self.eta - 1.0);
        (self.topic_term[topic * self.vocab_size + term] + self.eta - 1.0)
            / (self.topic_totals[topic] + smoothing)
    }

    /// Top `max_terms` (term index, weight) pairs for every topic, highest
    /// weight first. Ties keep vocabulary order.
    pub fn describe_topics(&self, max_terms: usize) -> Vec<Vec<(usize, f64)>> {
        (0..self.k)
            .map(|topic| {
                let mut weights: Vec<(usize, f64)> = (0..self.vocab_size)
                    .map(|term| (term, self.term_weight(topic, term)))
                    .collect();
                weights.sort_by(|a, b| {
                    b.1.partial_cmp(&a.1)
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then_with(|| a.0.cmp(&b.0))
                });
                weights.truncate(max_terms);
                weights
            })
            .collect()
    }
}

/// Rebuild the count matrices from the current responsibilities.
fn accumulate(
    cells: &[Cell],
    k: usize,
    vocab_size: usize,
    topic_term: &mut [f64],
    doc_topic: &mut [f64],
    topic_totals: &mut [f64],
) {
    topic_term.fill(0.0);
    doc_topic.fill(0.0);
    topic_totals.fill(0.0);

    for cell in cells {
        for t in 0..k {
            let mass = cell.count * cell.gamma[t];
            topic_term[t * vocab_size + cell.term] += mass;
            doc_topic[cell.doc * k + t] += mass;
            topic_totals[t] += mass;
        }
    }
}

/// Scale a non-negative vector to sum to 1. A zero vector becomes uniform.
fn normalize_in_place(v: &mut [f64]) {
    let sum: f64 = v.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        v.iter_mut().for_each(|x| *x /= sum);
    } else {
        let uniform = 1.0 / v.len() as f64;
        v.iter_mut().for_each(|x| *x = uniform);
    }
}

/// Observed-data log-likelihood under the current point estimates.
#[allow(clippy::too_many_arguments)]
fn log_likelihood(
    cells: &[Cell],
    topic_term: &[f64],
    doc_topic: &[f64],
    topic_totals: &[f64],
    k: usize,
    vocab_size: usize,
    alpha: f64,
    eta: f64,
) -> f64 {
    let smoothing = vocab_size as f64 * (eta - 1.0);
    let mut doc_totals: Vec<f64> = vec![0.0; doc_topic.len() / k];
    for (d, total) in doc_totals.iter_mut().enumerate() {
        *total = doc_topic[d * k..(d + 1) * k].iter().sum();
    }

    cells
        .iter()
        .map(|cell| {
            let doc_norm = doc_totals[cell.doc] + k as f64 * (alpha - 1.0);
            let p: f64 = (0..k)
                .map(|t| {
                    let phi = (topic_term[t * vocab_size + cell.term] + eta - 1.0)
                        / (topic_totals[t] + smoothing);
                    let theta = (doc_topic[cell.doc * k + t] + alpha - 1.0) / doc_norm;
                    phi * theta
                })
                .sum();
            cell.count * p.max(f64::MIN_POSITIVE).ln()
        })
        .sum()
}
