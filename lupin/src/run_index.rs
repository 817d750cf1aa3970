use crate::common::*;
use crate::common_io::mkdir;
use crate::input::read_tuple_corpus;
use crate::output::write_vocabulary;

#[derive(Args, Debug)]
pub struct IndexArgs {
    #[arg(required = true, help = "Tuple documents or directories")]
    inputs: Vec<Box<str>>,

    #[arg(long, short, required = true, help = "Output file: {out}.vocab.tsv.gz")]
    out: Box<str>,

    #[arg(long, default_value = DEFAULT_EXT, help = "Document file extension in directories")]
    ext: Box<str>,

    #[arg(long, value_delimiter(','), default_value = DEFAULT_ROLES, help = "Role names (comma-separated)")]
    roles: Vec<Box<str>>,
}

pub fn index_corpus(args: &IndexArgs) -> anyhow::Result<()> {
    let corpus = read_tuple_corpus(&args.inputs, &args.ext, args.roles.len())?;

    info!("Index size is: {}", corpus.vocabulary_size());
    info!("Number of tuples is: {}", corpus.num_tuples());
    for (r, name) in args.roles.iter().enumerate() {
        info!("{}: {} distinct fillers", name, corpus.role_vocabulary(r).len());
    }

    let out = args.out.as_ref();
    mkdir(out)?;
    write_vocabulary(corpus.vocabulary(), &format!("{}.vocab.tsv.gz", out))?;
    Ok(())
}
