mod common;
mod common_io;
mod input;
mod output;
mod run_fit;
mod run_index;

use common::*;
use run_fit::*;
use run_index::*;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "LUPIN",
    long_about = "Latent tUPle frame INference\n\
		  Semantic frames over subject/predicate/object tuples \n\
		  by tuple latent Dirichlet allocation (collapsed Gibbs sampling).\n\
		  Each input document is a file with one tuple per line\n\
		  and tab-separated role fillers (`null` for an absent role)."
)]
struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// verbose mode
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Estimate semantic frames by tuple LDA",
        long_about = "Estimate semantic frames in three stages: \n\
		      (1) Index role fillers of all documents\n\
		      (2) Run collapsed Gibbs sampling over frame assignments\n\
		      (3) Average document-frame and frame-word distributions.\n"
    )]
    Fit(FitArgs),

    #[command(
        about = "Index a tuple corpus and write its vocabulary",
        long_about = "Index role fillers of all documents.\n\
		      Writes the global vocabulary (`id<TAB>word`) and reports\n\
		      the number of distinct fillers in each role.\n"
    )]
    Index(IndexArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    match &cli.commands {
        Commands::Fit(args) => {
            fit_frames(args)?;
        }
        Commands::Index(args) => {
            index_corpus(args)?;
        }
    }

    info!("Done");
    Ok(())
}
