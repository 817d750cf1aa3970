//! Collapsed Gibbs sampler for tuple frame assignments.
//!
//! Each visit retracts one role occurrence from the count tables,
//! scores every frame with the full conditional (see [`crate::model`]),
//! draws a new frame by inverse CDF over the unnormalized scores, and
//! commits it back.
//!
//! A sweep is role-major: every occurrence of role 0 across the corpus
//! (documents in order, tuples in order), then role 1, and so on. Later
//! roles see the frames already updated for earlier roles in the same
//! sweep. The order is fixed so that seeded runs reproduce exactly.

use crate::indexer::TupleCorpus;
use crate::model::{frame_given_document, tuple_given_frame, FramePrior};
use crate::sufficient_stats::FrameStats;
use rand::rngs::SmallRng;
use rand::Rng;

/// Collapsed Gibbs sampler for per-role frame assignments.
pub struct GibbsSampler {
    rng: SmallRng,
    /// Scratch space for per-frame scores
    scores: Vec<f64>,
}

impl GibbsSampler {
    /// Create a new Gibbs sampler with the given RNG.
    pub fn new(rng: SmallRng) -> Self {
        GibbsSampler {
            rng,
            scores: Vec::new(),
        }
    }

    /// Resample the frame of role `j` in tuple `n` of document `d`.
    ///
    /// Returns the newly committed frame.
    pub fn resample_one(
        &mut self,
        corpus: &TupleCorpus,
        stats: &mut FrameStats,
        prior: &FramePrior,
        j: usize,
        d: usize,
        n: usize,
    ) -> anyhow::Result<usize> {
        self.scores.resize(stats.k, 0.0);

        stats.retract(corpus, d, n, j);
        compute_scores_for_occurrence(corpus, stats, prior, d, n, &mut self.scores);
        let new_f = sample_categorical_cumulative(&mut self.scores, &mut self.rng)?;
        stats.commit(corpus, d, n, j, new_f);

        Ok(new_f)
    }

    /// One full role-major sweep over every role occurrence.
    ///
    /// Returns the number of occurrences whose frame changed.
    pub fn sweep(
        &mut self,
        corpus: &TupleCorpus,
        stats: &mut FrameStats,
        prior: &FramePrior,
    ) -> anyhow::Result<usize> {
        let mut moves = 0;

        for j in 0..corpus.num_roles() {
            for d in 0..corpus.num_documents() {
                for n in 0..corpus.document_len(d) {
                    let old_f = stats.assignment(d, n, j);
                    let new_f = self.resample_one(corpus, stats, prior, j, d, n)?;
                    if new_f != old_f {
                        moves += 1;
                    }
                }
            }
        }

        Ok(moves)
    }

    /// Run `num_sweeps` sweeps back to back.
    ///
    /// Returns the total number of moves.
    pub fn run(
        &mut self,
        corpus: &TupleCorpus,
        stats: &mut FrameStats,
        prior: &FramePrior,
        num_sweeps: usize,
    ) -> anyhow::Result<usize> {
        let mut total_moves = 0;
        for _ in 0..num_sweeps {
            total_moves += self.sweep(corpus, stats, prior)?;
        }
        Ok(total_moves)
    }
}

/// Unnormalized full conditional over frames for tuple `n` of document `d`.
///
/// Expects the occurrence being resampled to be retracted already. All R
/// roles of the tuple enter the likelihood, each through the counts of
/// its own role.
///
/// * `scores` - Output buffer of length K (caller-provided)
pub fn compute_scores_for_occurrence(
    corpus: &TupleCorpus,
    stats: &FrameStats,
    prior: &FramePrior,
    d: usize,
    n: usize,
    scores: &mut [f64],
) {
    let num_roles = corpus.num_roles();
    let words = &corpus.document(d)[n * num_roles..(n + 1) * num_roles];

    for (k, score) in scores.iter_mut().enumerate() {
        *score = frame_given_document(stats, prior, d, k) * tuple_given_frame(stats, prior, words, k);
    }
}

/// Draw an index from unnormalized, non-negative weights.
///
/// Overwrites `weights` with its cumulative sum, draws
/// `u ~ Uniform(0, total)` and returns the smallest index whose
/// cumulative weight exceeds `u`.
pub fn sample_categorical_cumulative<R: Rng>(
    weights: &mut [f64],
    rng: &mut R,
) -> anyhow::Result<usize> {
    if weights.is_empty() {
        anyhow::bail!("cannot sample from an empty categorical distribution");
    }

    for i in 1..weights.len() {
        weights[i] += weights[i - 1];
    }

    let total = weights[weights.len() - 1];
    if !total.is_finite() || total <= 0.0 {
        anyhow::bail!(
            "degenerate full conditional (total mass = {}); check alpha, beta and the number of frames",
            total
        );
    }

    let u = rng.random::<f64>() * total;
    let idx = weights.partition_point(|&c| c <= u);
    Ok(idx.min(weights.len() - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::RawDocument;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;

    fn small_corpus() -> TupleCorpus {
        let docs = vec![
            RawDocument::new("d0", "a\tv1\tx\nb\tv1\ty\na\tv2\tx\n"),
            RawDocument::new("d1", "c\tv3\tz\nc\tv3\tnull\n"),
        ];
        TupleCorpus::from_documents(&docs, 3).unwrap()
    }

    fn prior_for(corpus: &TupleCorpus, alpha: f64, beta: f64) -> FramePrior {
        let sizes = corpus.role_vocabulary_sizes();
        FramePrior::new(alpha, &vec![beta; corpus.num_roles()], &sizes)
    }

    #[test]
    fn test_sample_categorical_peaked() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut counts = [0usize; 3];
        for _ in 0..1000 {
            let mut w = vec![1e-12, 1.0, 1e-12];
            counts[sample_categorical_cumulative(&mut w, &mut rng).unwrap()] += 1;
        }
        assert!(counts[1] > 990, "Expected mostly index 1, got {:?}", counts);
    }

    #[test]
    fn test_sample_categorical_frequencies() {
        let mut rng = SmallRng::seed_from_u64(1);
        let n = 20000;
        let mut hits = 0;
        for _ in 0..n {
            let mut w = vec![1.0, 3.0];
            if sample_categorical_cumulative(&mut w, &mut rng).unwrap() == 1 {
                hits += 1;
            }
        }
        let freq = hits as f64 / n as f64;
        assert!((freq - 0.75).abs() < 0.02, "freq = {}", freq);
    }

    #[test]
    fn test_sample_categorical_rejects_zero_mass() {
        let mut rng = SmallRng::seed_from_u64(0);
        assert!(sample_categorical_cumulative(&mut [0.0, 0.0], &mut rng).is_err());
        assert!(sample_categorical_cumulative(&mut [f64::NAN, 1.0], &mut rng).is_err());
        assert!(sample_categorical_cumulative(&mut [], &mut rng).is_err());
    }

    /// Scores must equal the textbook formula evaluated on leave-one-out counts.
    #[test]
    fn test_scores_match_brute_force() {
        let corpus = small_corpus();
        let k = 3;
        let z = vec![vec![0, 1, 2, 1, 1, 0, 2, 2, 2], vec![0, 0, 1, 1, 2, 0]];
        let mut stats = FrameStats::from_assignments(&corpus, k, z);
        let prior = prior_for(&corpus, 0.7, 0.3);
        let sizes = corpus.role_vocabulary_sizes();

        let (d, n, j) = (0, 1, 1);
        stats.retract(&corpus, d, n, j);

        let mut scores = vec![0.0; k];
        compute_scores_for_occurrence(&corpus, &stats, &prior, d, n, &mut scores);

        for f in 0..k {
            let mut doc_count = 0.0;
            let mut doc_len = 0.0;
            let mut lik = 1.0;
            for i in 0..3 {
                doc_count += stats.doc_frame(i, d, f) as f64;
                doc_len += stats.doc_total(i, d) as f64;
                let w = corpus.word_at(d, n, i);
                lik *= (stats.word_frame(i, w, f) as f64 + 0.3)
                    / (stats.frame_total(i, f) as f64 + sizes[i] as f64 * 0.3);
            }
            let expected = (doc_count + 0.7) / (doc_len + k as f64 * 0.7) * lik;
            assert_abs_diff_eq!(scores[f], expected, epsilon = 1e-12);
        }

        // 3 tuples * 3 roles in d0, one retracted
        let pooled: usize = (0..3).map(|i| stats.doc_total(i, d)).sum();
        assert_eq!(pooled, 8);
    }

    #[test]
    fn test_sweep_preserves_counts() {
        let corpus = small_corpus();
        let prior = prior_for(&corpus, 0.5, 0.1);
        let mut init_rng = SmallRng::seed_from_u64(3);
        let mut stats = FrameStats::random_init(&corpus, 4, &mut init_rng);
        let mut gibbs = GibbsSampler::new(SmallRng::seed_from_u64(4));

        let role_totals: Vec<usize> = (0..3).map(|r| stats.role_total(r)).collect();
        let doc_totals = stats.doc_totals.clone();

        for _ in 0..5 {
            // step-level check on one occurrence
            gibbs.resample_one(&corpus, &mut stats, &prior, 2, 1, 0).unwrap();
            assert!(stats.is_consistent());

            gibbs.sweep(&corpus, &mut stats, &prior).unwrap();
            assert!(stats.is_consistent());
            assert_eq!(stats.doc_totals, doc_totals);
            for r in 0..3 {
                assert_eq!(stats.role_total(r), role_totals[r]);
            }
        }

        let fresh = FrameStats::from_assignments(&corpus, 4, stats.assignments.clone());
        assert_eq!(stats.word_frame_counts, fresh.word_frame_counts);
        assert_eq!(stats.doc_frame_counts, fresh.doc_frame_counts);
    }

    #[test]
    fn test_single_frame_never_moves() {
        let corpus = small_corpus();
        let prior = prior_for(&corpus, 1.0, 1.0);
        let mut init_rng = SmallRng::seed_from_u64(3);
        let mut stats = FrameStats::random_init(&corpus, 1, &mut init_rng);
        let mut gibbs = GibbsSampler::new(SmallRng::seed_from_u64(5));

        let moves = gibbs.run(&corpus, &mut stats, &prior, 10).unwrap();
        assert_eq!(moves, 0);
        assert!(stats.assignments.iter().flatten().all(|&f| f == 0));
    }

    #[test]
    fn test_seeded_sweeps_are_reproducible() {
        let corpus = small_corpus();
        let prior = prior_for(&corpus, 0.5, 0.1);

        let run = || {
            let mut init_rng = SmallRng::seed_from_u64(11);
            let mut stats = FrameStats::random_init(&corpus, 3, &mut init_rng);
            let mut gibbs = GibbsSampler::new(SmallRng::seed_from_u64(12));
            let mut trajectory = vec![stats.assignments.clone()];
            for _ in 0..4 {
                gibbs.sweep(&corpus, &mut stats, &prior).unwrap();
                trajectory.push(stats.assignments.clone());
            }
            trajectory
        };

        assert_eq!(run(), run());
    }
}
