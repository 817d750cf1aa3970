//! Tuple LDA inference: options, validation and the sampling schedule.
//!
//! 1. **Initialize**: validate options, allocate count tables and draw a
//!    random frame for every tuple occurrence.
//! 2. **Sample**: run a fixed number of role-major Gibbs sweeps.
//! 3. **Estimate**: after burn-in, every `sample_lag` sweeps, add the
//!    current θ/φ point estimates to running sums. The final estimate
//!    is their mean, or the point estimate of the last state when no
//!    snapshot was taken.

use crate::estimate::{FrameAccumulator, FrameEstimates};
use crate::gibbs::GibbsSampler;
use crate::indexer::TupleCorpus;
use crate::model::FramePrior;
use crate::sufficient_stats::FrameStats;
use indicatif::{ProgressBar, ProgressDrawTarget};
use log::{debug, info};
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Options for tuple LDA inference.
#[derive(Debug, Clone)]
pub struct TldaOptions {
    /// Number of latent frames K. Default: 10
    pub num_frames: usize,
    /// Document--frame Dirichlet prior. Default: 50 / K
    pub alpha: f64,
    /// Frame--word Dirichlet prior, one per role. Default: 0.01 for 3 roles
    pub betas: Vec<f64>,
    /// Total number of Gibbs sweeps. Default: 1000
    pub num_iterations: usize,
    /// Sweeps before statistics are collected. Default: 500
    pub burn_in: usize,
    /// Sweeps between snapshots; 0 keeps only the final state. Default: 5
    pub sample_lag: usize,
    /// Random seed. Default: 42
    pub seed: u64,
    /// Draw a progress bar over sweeps. Default: false
    pub show_progress: bool,
}

impl Default for TldaOptions {
    fn default() -> Self {
        TldaOptions {
            num_frames: 10,
            alpha: 5.0,
            betas: vec![0.01; 3],
            num_iterations: 1000,
            burn_in: 500,
            sample_lag: 5,
            seed: 42,
            show_progress: false,
        }
    }
}

impl TldaOptions {
    /// Resize `betas` to `num_roles` copies of its first value.
    pub fn with_roles(mut self, num_roles: usize) -> Self {
        let beta = self.betas.first().copied().unwrap_or(0.01);
        self.betas = vec![beta; num_roles];
        self
    }

    /// Reject settings for which the Dirichlet normalizers are undefined.
    pub fn validate(&self, num_roles: usize) -> anyhow::Result<()> {
        if self.num_frames == 0 {
            anyhow::bail!("number of frames must be positive");
        }
        if num_roles == 0 {
            anyhow::bail!("number of roles must be positive");
        }
        if !self.alpha.is_finite() || self.alpha <= 0.0 {
            anyhow::bail!("alpha must be positive, got {}", self.alpha);
        }
        if self.betas.len() != num_roles {
            anyhow::bail!(
                "expected {} beta values (one per role), got {}",
                num_roles,
                self.betas.len()
            );
        }
        if let Some((r, b)) = self
            .betas
            .iter()
            .enumerate()
            .find(|(_, b)| !b.is_finite() || **b <= 0.0)
        {
            anyhow::bail!("beta[{}] must be positive, got {}", r, b);
        }
        if self.num_iterations < self.burn_in {
            anyhow::bail!(
                "number of iterations ({}) is smaller than burn-in ({})",
                self.num_iterations,
                self.burn_in
            );
        }
        Ok(())
    }

    /// Whether a snapshot is due after the 0-based sweep `iter`.
    pub fn is_sampling_iteration(&self, iter: usize) -> bool {
        self.sample_lag > 0 && iter > self.burn_in && iter % self.sample_lag == 0
    }
}

/// One Markov chain over a fixed corpus.
///
/// Constructing the chain validates the options and draws the initial
/// state; [`TldaChain::step`] runs one sweep; [`TldaChain::finish`]
/// consumes the chain and keeps only the estimates.
pub struct TldaChain<'a> {
    corpus: &'a TupleCorpus,
    options: TldaOptions,
    prior: FramePrior,
    stats: FrameStats,
    gibbs: GibbsSampler,
    accumulator: Option<FrameAccumulator>,
    iteration: usize,
}

impl<'a> TldaChain<'a> {
    /// Initialize a chain with RNGs seeded from `options.seed`.
    pub fn new(corpus: &'a TupleCorpus, options: &TldaOptions) -> anyhow::Result<Self> {
        let init_rng = SmallRng::seed_from_u64(options.seed);
        let gibbs_rng = SmallRng::seed_from_u64(options.seed.wrapping_add(1));
        Self::with_rngs(corpus, options, init_rng, gibbs_rng)
    }

    /// Initialize a chain with explicit generators for the initial state
    /// and for the sweeps.
    pub fn with_rngs(
        corpus: &'a TupleCorpus,
        options: &TldaOptions,
        mut init_rng: SmallRng,
        gibbs_rng: SmallRng,
    ) -> anyhow::Result<Self> {
        options.validate(corpus.num_roles())?;
        if corpus.num_tuples() == 0 {
            anyhow::bail!("the corpus has no tuples; nothing to sample");
        }

        let prior = FramePrior::new(
            options.alpha,
            &options.betas,
            &corpus.role_vocabulary_sizes(),
        );
        let stats = FrameStats::random_init(corpus, options.num_frames, &mut init_rng);
        let accumulator = (options.sample_lag > 0).then(|| FrameAccumulator::new(&stats));

        Ok(TldaChain {
            corpus,
            options: options.clone(),
            prior,
            stats,
            gibbs: GibbsSampler::new(gibbs_rng),
            accumulator,
            iteration: 0,
        })
    }

    /// Run one sweep and take a snapshot if one is due.
    ///
    /// Returns the number of frame moves in the sweep.
    pub fn step(&mut self) -> anyhow::Result<usize> {
        let moves = self.gibbs.sweep(self.corpus, &mut self.stats, &self.prior)?;

        if self.options.is_sampling_iteration(self.iteration) {
            if let Some(acc) = self.accumulator.as_mut() {
                acc.add_snapshot(self.corpus, &self.stats, &self.prior);
            }
        }

        debug!("[{}] frame moves: {}", self.iteration, moves);
        self.iteration += 1;
        Ok(moves)
    }

    /// Run the remaining sweeps of the configured schedule.
    pub fn run(&mut self) -> anyhow::Result<()> {
        let remaining = self.options.num_iterations.saturating_sub(self.iteration);

        let pb = ProgressBar::new(remaining as u64);
        if !self.options.show_progress {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }

        for _ in 0..remaining {
            self.step()?;
            pb.inc(1);
        }
        pb.finish_and_clear();
        Ok(())
    }

    /// Number of sweeps completed so far
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Current sufficient statistics
    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Number of snapshots collected so far
    pub fn num_samples(&self) -> usize {
        self.accumulator.as_ref().map_or(0, |acc| acc.num_samples())
    }

    /// Current estimates: the running mean if any snapshot was taken,
    /// otherwise the point estimate of the current state.
    pub fn estimates(&self) -> FrameEstimates {
        self.accumulator
            .as_ref()
            .and_then(FrameAccumulator::posterior_mean)
            .unwrap_or_else(|| FrameEstimates::point(self.corpus, &self.stats, &self.prior))
    }

    /// Document--frame mixture θ (M×K)
    pub fn theta(&self) -> ndarray::Array2<f64> {
        self.estimates().theta
    }

    /// Role--frame--word distributions φ (R×K×V)
    pub fn phi(&self) -> ndarray::Array3<f64> {
        self.estimates().phi
    }

    /// Drop the count tables and keep the estimates.
    pub fn finish(self) -> FrameEstimates {
        self.estimates()
    }
}

/// Tuple latent Dirichlet allocation.
///
/// # Usage
///
/// ```ignore
/// use tlda::{RawDocument, Tlda, TldaOptions, TupleCorpus};
///
/// let corpus = TupleCorpus::from_documents(&docs, 3)?;
/// let options = TldaOptions { num_frames: 20, ..Default::default() };
/// let estimates = Tlda::new(options).fit(&corpus)?;
/// ```
pub struct Tlda {
    options: TldaOptions,
}

impl Tlda {
    /// Create a new tuple LDA instance.
    pub fn new(options: TldaOptions) -> Self {
        Tlda { options }
    }

    /// Sample frame assignments on `corpus` and return θ and φ.
    pub fn fit(&self, corpus: &TupleCorpus) -> anyhow::Result<FrameEstimates> {
        let opts = &self.options;
        let mut chain = TldaChain::new(corpus, opts)?;

        info!(
            "Tuple LDA: M={}, V={}, R={}, K={}, tuples={}",
            corpus.num_documents(),
            corpus.vocabulary_size(),
            corpus.num_roles(),
            opts.num_frames,
            corpus.num_tuples(),
        );
        info!(
            "Sampling {} iterations with burn-in of {} (sample lag = {})",
            opts.num_iterations, opts.burn_in, opts.sample_lag,
        );

        chain.run()?;

        info!(
            "Tuple LDA done: {} sweeps, {} snapshots",
            chain.iteration(),
            chain.num_samples(),
        );

        Ok(chain.finish())
    }
}
