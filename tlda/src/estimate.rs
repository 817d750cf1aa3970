//! Point estimates and running posterior means of θ and φ.
//!
//! - θ (M×K): document--frame mixture, pooled over roles
//! - φ (R×K×V): frame--word distribution of each role
//!
//! φ is indexed by global word id, but only words that occur in role `r`
//! carry mass in `phi[r]`; the normalizer counts exactly those words.

use crate::indexer::TupleCorpus;
use crate::model::{frame_given_document, word_given_frame, FramePrior};
use crate::sufficient_stats::FrameStats;
use ndarray::{Array2, Array3, ArrayView1, Axis};
use rayon::prelude::*;

/// Final (or intermediate) estimates of the two output distributions.
#[derive(Debug, Clone)]
pub struct FrameEstimates {
    /// Document × frame probabilities (rows sum to 1)
    pub theta: Array2<f64>,
    /// Role × frame × word probabilities (each `[r, k, ..]` slice sums to 1)
    pub phi: Array3<f64>,
    /// Number of averaged snapshots (0 for a single point estimate)
    pub num_samples: usize,
}

impl FrameEstimates {
    /// Point estimate from the current count tables.
    pub fn point(corpus: &TupleCorpus, stats: &FrameStats, prior: &FramePrior) -> Self {
        FrameEstimates {
            theta: point_theta(stats, prior),
            phi: point_phi(corpus, stats, prior),
            num_samples: 0,
        }
    }

    /// Number of frames
    pub fn num_frames(&self) -> usize {
        self.theta.ncols()
    }

    /// `phi[role, frame, ..]` over global word ids
    pub fn frame_words(&self, role: usize, frame: usize) -> ArrayView1<'_, f64> {
        self.phi.index_axis(Axis(0), role).index_axis_move(Axis(0), frame)
    }

    /// Most probable words of `role` under `frame`.
    ///
    /// Returns up to `top_k` `(word_id, probability)` pairs with
    /// probability at least `threshold`, sorted by decreasing probability.
    pub fn top_words(
        &self,
        role: usize,
        frame: usize,
        top_k: usize,
        threshold: f64,
    ) -> Vec<(usize, f64)> {
        let mut words: Vec<(usize, f64)> = self
            .frame_words(role, frame)
            .iter()
            .enumerate()
            .filter(|&(_, &p)| p > 0.0 && p >= threshold)
            .map(|(w, &p)| (w, p))
            .collect();

        words.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        words.truncate(top_k);
        words
    }
}

/// `theta[d, k] = (sum_r n_dk[r] + alpha) / (sum_r n_d[r] + K * alpha)`
pub fn point_theta(stats: &FrameStats, prior: &FramePrior) -> Array2<f64> {
    let mut theta = Array2::<f64>::zeros((stats.m, stats.k));
    theta
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(d, mut row)| {
            for (k, x) in row.iter_mut().enumerate() {
                *x = frame_given_document(stats, prior, d, k);
            }
        });
    theta
}

/// `phi[r, k, w] = (n_wk[r] + beta[r]) / (n_k[r] + RC[r] * beta[r])` for
/// words `w` seen in role `r`, zero elsewhere.
pub fn point_phi(corpus: &TupleCorpus, stats: &FrameStats, prior: &FramePrior) -> Array3<f64> {
    let mut phi = Array3::<f64>::zeros((stats.r, stats.k, stats.v));
    phi.axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(r, mut phi_r)| {
            let support = corpus.role_vocabulary(r).global_ids();
            for (k, mut row) in phi_r.axis_iter_mut(Axis(0)).enumerate() {
                for &w in support {
                    row[w] = word_given_frame(stats, prior, r, w, k);
                }
            }
        });
    phi
}

/// Running sums of θ and φ point estimates over sampled states.
#[derive(Debug, Clone)]
pub struct FrameAccumulator {
    theta_sum: Array2<f64>,
    phi_sum: Array3<f64>,
    num_samples: usize,
}

impl FrameAccumulator {
    /// Zero sums shaped after `stats`.
    pub fn new(stats: &FrameStats) -> Self {
        FrameAccumulator {
            theta_sum: Array2::zeros((stats.m, stats.k)),
            phi_sum: Array3::zeros((stats.r, stats.k, stats.v)),
            num_samples: 0,
        }
    }

    /// Add the point estimates of the current state.
    pub fn add_snapshot(&mut self, corpus: &TupleCorpus, stats: &FrameStats, prior: &FramePrior) {
        self.theta_sum += &point_theta(stats, prior);
        self.phi_sum += &point_phi(corpus, stats, prior);
        self.num_samples += 1;
    }

    /// Number of snapshots taken so far
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Mean of the collected snapshots, `None` if nothing was collected.
    pub fn posterior_mean(&self) -> Option<FrameEstimates> {
        if self.num_samples == 0 {
            return None;
        }
        let n = self.num_samples as f64;
        Some(FrameEstimates {
            theta: &self.theta_sum / n,
            phi: &self.phi_sum / n,
            num_samples: self.num_samples,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::RawDocument;
    use approx::assert_abs_diff_eq;

    fn setup() -> (TupleCorpus, FrameStats, FramePrior) {
        let docs = vec![
            RawDocument::new("d0", "a\tv1\tx\nb\tv1\ty\n"),
            RawDocument::new("d1", "a\tv2\tnull\n"),
            RawDocument::new("empty", ""),
        ];
        let corpus = TupleCorpus::from_documents(&docs, 3).unwrap();
        let z = vec![vec![0, 0, 1, 1, 1, 1], vec![0, 1, 0], vec![]];
        let stats = FrameStats::from_assignments(&corpus, 2, z);
        let prior = FramePrior::new(0.5, &[0.1, 0.2, 0.3], &corpus.role_vocabulary_sizes());
        (corpus, stats, prior)
    }

    #[test]
    fn test_point_estimates_normalized() {
        let (corpus, stats, prior) = setup();
        let est = FrameEstimates::point(&corpus, &stats, &prior);

        for row in est.theta.rows() {
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-9);
        }
        for r in 0..3 {
            for k in 0..2 {
                assert_abs_diff_eq!(est.frame_words(r, k).sum(), 1.0, epsilon = 1e-9);
            }
        }

        // empty document falls back to the uniform prior
        assert_abs_diff_eq!(est.theta[[2, 0]], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_point_estimate_values() {
        let (corpus, stats, prior) = setup();
        let est = FrameEstimates::point(&corpus, &stats, &prior);

        // d0 has 6 role occurrences: frame 0 gets 2, frame 1 gets 4
        assert_abs_diff_eq!(est.theta[[0, 0]], (2.0 + 0.5) / (6.0 + 1.0), epsilon = 1e-12);

        // role 0, frame 0: a twice; RC[0] = 2 (a, b)
        let a = corpus.vocabulary().id("a").unwrap();
        assert_abs_diff_eq!(est.phi[[0, 0, a]], (2.0 + 0.1) / (2.0 + 0.2), epsilon = 1e-12);

        // words never seen in a role carry no mass there
        let x = corpus.vocabulary().id("x").unwrap();
        assert_eq!(est.phi[[0, 0, x]], 0.0);
    }

    #[test]
    fn test_accumulator_mean() {
        let (corpus, stats, prior) = setup();
        let mut acc = FrameAccumulator::new(&stats);
        assert!(acc.posterior_mean().is_none());

        acc.add_snapshot(&corpus, &stats, &prior);
        acc.add_snapshot(&corpus, &stats, &prior);
        assert_eq!(acc.num_samples(), 2);

        let mean = acc.posterior_mean().unwrap();
        let point = FrameEstimates::point(&corpus, &stats, &prior);
        assert_eq!(mean.num_samples, 2);
        for (x, y) in mean.theta.iter().zip(point.theta.iter()) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1e-12);
        }
        for (x, y) in mean.phi.iter().zip(point.phi.iter()) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_top_words() {
        let (corpus, stats, prior) = setup();
        let est = FrameEstimates::point(&corpus, &stats, &prior);
        let v1 = corpus.vocabulary().id("v1").unwrap();

        // role 1 (predicate), frame 1: v1 and v2 once each, ties go to the smaller id
        let top = est.top_words(1, 1, 1, 0.0);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].0, v1);

        let all = est.top_words(1, 1, 10, 0.0);
        assert_eq!(all.len(), 2);
        assert!(all[0].1 >= all[1].1);

        assert!(est.top_words(1, 1, 10, 0.99).is_empty());
    }
}
