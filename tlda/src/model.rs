//! Dirichlet-multinomial score functions.
//!
//! # Full conditional of one role occurrence
//!
//! ```text
//! score(k) = (sum_i n_dk[i] + alpha) / (sum_i n_d[i] + K * alpha)
//!          * prod_i (n_wk[i] + beta[i]) / (n_k[i] + RC[i] * beta[i])
//! ```
//!
//! where `i` runs over the R roles of the tuple occurrence, `RC[i]` is
//! the number of distinct fillers seen in role `i`, and all counts
//! exclude the occurrence being resampled.

use crate::sufficient_stats::FrameStats;

/// Symmetric Dirichlet hyperparameters with the per-role normalizers
/// `RC[r] * beta[r]` cached.
#[derive(Debug, Clone)]
pub struct FramePrior {
    /// Document--frame concentration
    pub alpha: f64,
    /// Frame--word concentration, one per role
    pub betas: Vec<f64>,
    /// `RoleVocabularySize[r] * betas[r]`
    pub beta_totals: Vec<f64>,
}

impl FramePrior {
    /// * `alpha` - document--frame prior
    /// * `betas` - frame--word priors, one per role
    /// * `role_sizes` - `RoleVocabularySize[r]` for each role
    pub fn new(alpha: f64, betas: &[f64], role_sizes: &[usize]) -> Self {
        debug_assert_eq!(betas.len(), role_sizes.len());
        let beta_totals = betas
            .iter()
            .zip(role_sizes)
            .map(|(&b, &n)| b * n as f64)
            .collect();
        FramePrior {
            alpha,
            betas: betas.to_vec(),
            beta_totals,
        }
    }
}

/// Posterior predictive of word `w` in role `r` under frame `k`.
///
/// This is also the point estimate of `phi[r][k][w]`.
#[inline]
pub fn word_given_frame(stats: &FrameStats, prior: &FramePrior, r: usize, w: usize, k: usize) -> f64 {
    (stats.word_frame(r, w, k) as f64 + prior.betas[r])
        / (stats.frame_total(r, k) as f64 + prior.beta_totals[r])
}

/// Frame usage of document `d` pooled over all roles.
///
/// This is also the point estimate of `theta[d][k]`.
#[inline]
pub fn frame_given_document(stats: &FrameStats, prior: &FramePrior, d: usize, k: usize) -> f64 {
    let mut count = 0usize;
    let mut total = 0usize;
    for r in 0..stats.r {
        count += stats.doc_frame(r, d, k);
        total += stats.doc_total(r, d);
    }
    (count as f64 + prior.alpha) / (total as f64 + stats.k as f64 * prior.alpha)
}

/// Joint likelihood of the words of one tuple occurrence under frame `k`.
///
/// * `words` - global ids of the R fillers of the tuple (`words[i]` in role `i`)
#[inline]
pub fn tuple_given_frame(stats: &FrameStats, prior: &FramePrior, words: &[usize], k: usize) -> f64 {
    words
        .iter()
        .enumerate()
        .map(|(i, &w)| word_given_frame(stats, prior, i, w, k))
        .product()
}
