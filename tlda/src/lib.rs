//! Tuple Latent Dirichlet Allocation (TLDA) for semantic frame discovery.
//!
//! Documents are bags of role-labeled tuples (e.g. subject / predicate /
//! object). Every role occurrence carries a latent frame; each role has
//! its own frame-conditioned word distribution, and all roles of a
//! document share one frame-usage prior. Frames are inferred by
//! collapsed Gibbs sampling, with the multinomial parameters integrated
//! out by Dirichlet-multinomial conjugacy.
//!
//! # Outputs
//!
//! - θ: document × frame mixture
//! - φ: role × frame × word distributions
//!
//! With R = 1 this is plain LDA over a bag of words.

#![deny(missing_docs)]
#![deny(warnings)]

/// Vocabulary and tuple indexer
pub mod indexer;

/// Dirichlet-multinomial score functions
pub mod model;

/// Count tables: role-word-frame and document-role-frame tallies
pub mod sufficient_stats;

/// Collapsed Gibbs sampler
pub mod gibbs;

/// Point estimates and running posterior means of θ and φ
pub mod estimate;

/// Options and the sampling schedule
pub mod inference;


pub use estimate::FrameEstimates;
pub use indexer::{RawDocument, TupleCorpus, Vocabulary, NULL_ID, NULL_WORD};
pub use inference::{Tlda, TldaChain, TldaOptions};
