//! Sufficient statistics for tuple LDA.
//!
//! Tracks, for the current frame assignment of every role occurrence:
//! - `word_frame[r][w][k]`: occurrences of word `w` in role `r` assigned to frame `k`
//! - `doc_frame[r][d][k]`: occurrences of role `r` in document `d` assigned to frame `k`
//! - `frame_total[r][k]`: marginal of `word_frame` over words
//! - `doc_total[r][d]`: marginal of `doc_frame` over frames
//!
//! All tables are flat row-major vectors. Retract/commit keep them an
//! exact tally of the assignment at every step.

use crate::indexer::TupleCorpus;
use rand::Rng;

/// Count tables and latent frame assignments.
#[derive(Debug, Clone)]
pub struct FrameStats {
    /// Number of roles
    pub r: usize,
    /// Global vocabulary size
    pub v: usize,
    /// Number of documents
    pub m: usize,
    /// Number of frames
    pub k: usize,
    /// R×V×K, `word_frame_counts[(r * v + w) * k + f]`
    pub(crate) word_frame_counts: Vec<usize>,
    /// R×M×K, `doc_frame_counts[(r * m + d) * k + f]`
    pub(crate) doc_frame_counts: Vec<usize>,
    /// R×K, `frame_totals[r * k + f]`
    pub(crate) frame_totals: Vec<usize>,
    /// R×M, `doc_totals[r * m + d]`
    pub(crate) doc_totals: Vec<usize>,
    /// `assignments[d][n * R + j]`: frame of role `j` in tuple `n` of document `d`
    pub(crate) assignments: Vec<Vec<usize>>,
}

impl FrameStats {
    /// Zero-filled tables with no assignments.
    ///
    /// * `r` - number of roles
    /// * `v` - vocabulary size
    /// * `m` - number of documents
    /// * `k` - number of frames
    pub fn zeros(r: usize, v: usize, m: usize, k: usize) -> Self {
        FrameStats {
            r,
            v,
            m,
            k,
            word_frame_counts: vec![0; r * v * k],
            doc_frame_counts: vec![0; r * m * k],
            frame_totals: vec![0; r * k],
            doc_totals: vec![0; r * m],
            assignments: vec![vec![]; m],
        }
    }

    /// Random initial state of the Markov chain.
    ///
    /// Each tuple occurrence draws one frame uniformly from `0..k` and
    /// all of its roles start on that frame.
    pub fn random_init<R: Rng>(corpus: &TupleCorpus, k: usize, rng: &mut R) -> Self {
        let num_roles = corpus.num_roles();
        let assignments = (0..corpus.num_documents())
            .map(|d| {
                let n_tuples = corpus.document_len(d);
                let mut z = Vec::with_capacity(n_tuples * num_roles);
                for _ in 0..n_tuples {
                    let f = rng.random_range(0..k);
                    z.extend(std::iter::repeat_n(f, num_roles));
                }
                z
            })
            .collect();
        Self::from_assignments(corpus, k, assignments)
    }

    /// Tally count tables from an explicit assignment.
    ///
    /// `assignments[d]` must have the same length as `corpus.document(d)`
    /// and hold frames in `0..k`.
    pub fn from_assignments(corpus: &TupleCorpus, k: usize, assignments: Vec<Vec<usize>>) -> Self {
        let num_roles = corpus.num_roles();
        let mut stats = Self::zeros(
            num_roles,
            corpus.vocabulary_size(),
            corpus.num_documents(),
            k,
        );
        assert_eq!(assignments.len(), stats.m);

        for (d, z) in assignments.iter().enumerate() {
            let words = corpus.document(d);
            assert_eq!(z.len(), words.len());
            for (pos, (&w, &f)) in words.iter().zip(z.iter()).enumerate() {
                stats.increment(pos % num_roles, d, w, f);
            }
        }
        stats.assignments = assignments;
        stats
    }

    #[inline]
    fn increment(&mut self, r: usize, d: usize, w: usize, f: usize) {
        self.word_frame_counts[(r * self.v + w) * self.k + f] += 1;
        self.doc_frame_counts[(r * self.m + d) * self.k + f] += 1;
        self.frame_totals[r * self.k + f] += 1;
        self.doc_totals[r * self.m + d] += 1;
    }

    #[inline]
    fn decrement(&mut self, r: usize, d: usize, w: usize, f: usize) {
        self.word_frame_counts[(r * self.v + w) * self.k + f] -= 1;
        self.doc_frame_counts[(r * self.m + d) * self.k + f] -= 1;
        self.frame_totals[r * self.k + f] -= 1;
        self.doc_totals[r * self.m + d] -= 1;
    }

    /// Remove role `j` of tuple `n` in document `d` from the counts
    /// (leave-one-out). Returns its current frame.
    ///
    /// The assignment itself is left untouched until [`Self::commit`].
    pub fn retract(&mut self, corpus: &TupleCorpus, d: usize, n: usize, j: usize) -> usize {
        let f = self.assignment(d, n, j);
        self.decrement(j, d, corpus.word_at(d, n, j), f);
        f
    }

    /// Assign frame `f` to role `j` of tuple `n` in document `d` and add
    /// it back into the counts.
    pub fn commit(&mut self, corpus: &TupleCorpus, d: usize, n: usize, j: usize, f: usize) {
        self.assignments[d][n * self.r + j] = f;
        self.increment(j, d, corpus.word_at(d, n, j), f);
    }

    /// Current frame of role `j` in tuple `n` of document `d`
    #[inline]
    pub(crate) fn assignment(&self, d: usize, n: usize, j: usize) -> usize {
        self.assignments[d][n * self.r + j]
    }

    /// `RoleFrameWordCount[r][w][k]`
    #[inline]
    pub fn word_frame(&self, r: usize, w: usize, k: usize) -> usize {
        self.word_frame_counts[(r * self.v + w) * self.k + k]
    }

    /// `DocFrameRoleCount[r][d][k]`
    #[inline]
    pub fn doc_frame(&self, r: usize, d: usize, k: usize) -> usize {
        self.doc_frame_counts[(r * self.m + d) * self.k + k]
    }

    /// `RoleFrameMarginal[r][k]`
    #[inline]
    pub fn frame_total(&self, r: usize, k: usize) -> usize {
        self.frame_totals[r * self.k + k]
    }

    /// `DocRoleMarginal[r][d]`
    #[inline]
    pub fn doc_total(&self, r: usize, d: usize) -> usize {
        self.doc_totals[r * self.m + d]
    }

    /// Total occurrences of role `r` over the corpus
    pub fn role_total(&self, r: usize) -> usize {
        self.frame_totals[r * self.k..(r + 1) * self.k].iter().sum()
    }

    /// Check that both marginals agree with the full tables.
    ///
    /// Cost is O(R·(V + M)·K); meant for tests and debugging.
    pub fn is_consistent(&self) -> bool {
        for r in 0..self.r {
            for f in 0..self.k {
                let sum: usize = (0..self.v).map(|w| self.word_frame(r, w, f)).sum();
                if sum != self.frame_total(r, f) {
                    return false;
                }
            }
            for d in 0..self.m {
                let sum: usize = (0..self.k).map(|f| self.doc_frame(r, d, f)).sum();
                if sum != self.doc_total(r, d) {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::RawDocument;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn small_corpus() -> TupleCorpus {
        let docs = vec![
            RawDocument::new("d0", "a\tv1\tx\nb\tv1\ty\n"),
            RawDocument::new("d1", "a\tv2\tnull\n"),
        ];
        TupleCorpus::from_documents(&docs, 3).unwrap()
    }

    #[test]
    fn test_random_init_tallies() {
        let corpus = small_corpus();
        let mut rng = SmallRng::seed_from_u64(42);
        let stats = FrameStats::random_init(&corpus, 4, &mut rng);

        assert!(stats.is_consistent());
        for r in 0..3 {
            assert_eq!(stats.doc_total(r, 0), 2);
            assert_eq!(stats.doc_total(r, 1), 1);
            assert_eq!(stats.role_total(r), 3);
        }

        // every role of a freshly initialized tuple shares one frame
        for d in 0..corpus.num_documents() {
            for n in 0..corpus.document_len(d) {
                let f = stats.assignment(d, n, 0);
                assert!(f < 4);
                assert_eq!(stats.assignment(d, n, 1), f);
                assert_eq!(stats.assignment(d, n, 2), f);
            }
        }
    }

    #[test]
    fn test_from_assignments() {
        let corpus = small_corpus();
        let z = vec![vec![0, 1, 1, 1, 1, 0], vec![0, 0, 1]];
        let stats = FrameStats::from_assignments(&corpus, 2, z);

        let a = corpus.vocabulary().id("a").unwrap();
        let v1 = corpus.vocabulary().id("v1").unwrap();

        assert_eq!(stats.word_frame(0, a, 0), 2);
        assert_eq!(stats.word_frame(1, v1, 1), 2);
        assert_eq!(stats.doc_frame(2, 0, 0), 1);
        assert_eq!(stats.doc_frame(2, 0, 1), 1);
        assert_eq!(stats.frame_total(0, 0), 2);
        assert_eq!(stats.frame_total(0, 1), 1);
        assert!(stats.is_consistent());
    }

    #[test]
    fn test_retract_commit_same_frame_is_identity() {
        let corpus = small_corpus();
        let mut rng = SmallRng::seed_from_u64(7);
        let mut stats = FrameStats::random_init(&corpus, 3, &mut rng);
        let before = stats.clone();

        for d in 0..corpus.num_documents() {
            for n in 0..corpus.document_len(d) {
                for j in 0..3 {
                    let f = stats.retract(&corpus, d, n, j);
                    stats.commit(&corpus, d, n, j, f);
                }
            }
        }

        assert_eq!(stats.word_frame_counts, before.word_frame_counts);
        assert_eq!(stats.doc_frame_counts, before.doc_frame_counts);
        assert_eq!(stats.frame_totals, before.frame_totals);
        assert_eq!(stats.doc_totals, before.doc_totals);
        assert_eq!(stats.assignments, before.assignments);
    }

    #[test]
    fn test_move_matches_recount() {
        let corpus = small_corpus();
        let z = vec![vec![0, 0, 0, 1, 1, 1], vec![0, 0, 0]];
        let mut stats = FrameStats::from_assignments(&corpus, 2, z);

        let old = stats.retract(&corpus, 0, 1, 2);
        assert_eq!(old, 1);
        assert_eq!(stats.doc_total(2, 0), 1);
        stats.commit(&corpus, 0, 1, 2, 0);

        let fresh = FrameStats::from_assignments(&corpus, 2, stats.assignments.clone());
        assert_eq!(stats.word_frame_counts, fresh.word_frame_counts);
        assert_eq!(stats.doc_frame_counts, fresh.doc_frame_counts);
        assert_eq!(stats.frame_totals, fresh.frame_totals);
        assert_eq!(stats.doc_totals, fresh.doc_totals);
    }
}
