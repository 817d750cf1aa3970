pub const DEFAULT_ROLES: &str = "subject,predicate,object";
pub const DEFAULT_EXT: &str = "dat";

pub use clap::{Args, Parser, Subcommand};
pub use log::info;

pub use tlda::estimate::FrameEstimates;
pub use tlda::{RawDocument, Tlda, TldaOptions, TupleCorpus};

/// Size the global rayon pool, capped by the number of logical CPUs.
pub fn setup_threads(max_threads: usize) -> anyhow::Result<()> {
    let num_threads = num_cpus::get().min(max_threads.max(1));
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;
    info!("will use {} threads", rayon::current_num_threads());
    Ok(())
}
