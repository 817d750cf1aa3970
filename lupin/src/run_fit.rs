use crate::common::*;
use crate::common_io::mkdir;
use crate::input::read_tuple_corpus;
use crate::output::*;

#[derive(Args, Debug)]
pub struct FitArgs {
    #[arg(
        required = true,
        help = "Tuple documents or directories",
        long_help = "Tuple documents to be processed.\n\
		     Each file is one document with one tuple per line\n\
		     and tab-separated role fillers.\n\
		     Directories are expanded to files with the `--ext` extension."
    )]
    inputs: Vec<Box<str>>,

    #[arg(
        long,
        short,
        required = true,
        help = "Output header",
        long_help = "Output header for results:\n\
		     - {out}.theta.tsv.gz\n\
		     - {out}.phi.tsv.gz\n\
		     - {out}.frames.tsv.gz\n\
		     - {out}.vocab.tsv.gz\n"
    )]
    out: Box<str>,

    #[arg(long, default_value = DEFAULT_EXT, help = "Document file extension in directories")]
    ext: Box<str>,

    #[arg(
        long,
        value_delimiter(','),
        default_value = DEFAULT_ROLES,
        help = "Role names (comma-separated)",
        long_help = "Role names (comma-separated).\n\
		     The number of names sets the number of tab-separated\n\
		     fields expected on every tuple line."
    )]
    roles: Vec<Box<str>>,

    #[arg(long, short = 'k', default_value_t = 10, help = "Number of frames")]
    frames: usize,

    #[arg(
        long,
        short = 'a',
        help = "Document-frame Dirichlet prior",
        long_help = "Document-frame Dirichlet prior (alpha).\n\
		     Defaults to 50 / number of frames."
    )]
    alpha: Option<f64>,

    #[arg(
        long,
        short = 'b',
        value_delimiter(','),
        default_value = "0.01",
        help = "Frame-word Dirichlet prior(s)",
        long_help = "Frame-word Dirichlet prior (beta).\n\
		     Either one value shared by all roles\n\
		     or one comma-separated value per role."
    )]
    beta: Vec<f64>,

    #[arg(long, short = 'i', default_value_t = 1000, help = "Number of Gibbs sweeps")]
    iter: usize,

    #[arg(long, default_value_t = 500, help = "Number of burn-in sweeps")]
    burn_in: usize,

    #[arg(
        long,
        default_value_t = 5,
        allow_negative_numbers = true,
        help = "Sweeps between statistics snapshots",
        long_help = "Sweeps between statistics snapshots after burn-in.\n\
		     A non-positive value keeps only the final state."
    )]
    sample_lag: i64,

    #[arg(long, default_value_t = 42, help = "Random seed")]
    seed: u64,

    #[arg(long, default_value_t = 20, help = "Number of top words per frame and role")]
    top_k: usize,

    #[arg(
        long,
        default_value_t = 1e-3,
        help = "Minimum probability reported in phi and frame summaries"
    )]
    threshold: f64,

    #[arg(long, default_value_t = 16, help = "Maximum number of threads")]
    threads: usize,

    #[arg(long, default_value_t = false, help = "Show a progress bar over sweeps")]
    progress: bool,
}

impl FitArgs {
    fn options(&self) -> TldaOptions {
        let num_roles = self.roles.len();
        let alpha = self.alpha.unwrap_or(50.0 / self.frames.max(1) as f64);

        let opts = TldaOptions {
            num_frames: self.frames,
            alpha,
            betas: self.beta.clone(),
            num_iterations: self.iter,
            burn_in: self.burn_in,
            sample_lag: self.sample_lag.max(0) as usize,
            seed: self.seed,
            show_progress: self.progress,
        };

        if self.beta.len() == 1 {
            opts.with_roles(num_roles)
        } else {
            opts
        }
    }
}

pub fn fit_frames(args: &FitArgs) -> anyhow::Result<()> {
    setup_threads(args.threads)?;

    let num_roles = args.roles.len();
    let options = args.options();
    options.validate(num_roles)?;

    let corpus = read_tuple_corpus(&args.inputs, &args.ext, num_roles)?;
    for (r, name) in args.roles.iter().enumerate() {
        info!(
            "role {} ({}): {} distinct fillers",
            r,
            name,
            corpus.role_vocabulary(r).len()
        );
    }

    let estimates = Tlda::new(options).fit(&corpus)?;

    let out = args.out.as_ref();
    mkdir(out)?;

    let vocab = corpus.vocabulary();
    write_vocabulary(vocab, &format!("{}.vocab.tsv.gz", out))?;
    write_theta(&estimates, corpus.labels(), &format!("{}.theta.tsv.gz", out))?;
    write_phi(
        &estimates,
        vocab,
        &args.roles,
        args.threshold,
        &format!("{}.phi.tsv.gz", out),
    )?;
    write_top_words(
        &estimates,
        vocab,
        &args.roles,
        args.top_k,
        args.threshold,
        &format!("{}.frames.tsv.gz", out),
    )?;

    info!("wrote {}.{{theta,phi,frames,vocab}}.tsv.gz", out);
    Ok(())
}
