use crate::common::*;
use crate::common_io::{file_name, read_to_string};
use std::path::Path;

/// Expand directories and files into a list of document files.
///
/// Directories contribute their regular files ending in `.{ext}` (or
/// `.{ext}.gz`), sorted by name. Plain files are kept as given.
pub fn collect_document_files(inputs: &[Box<str>], ext: &str) -> anyhow::Result<Vec<Box<str>>> {
    let suffix = format!(".{}", ext);
    let suffix_gz = format!(".{}.gz", ext);
    let mut files = vec![];

    for input in inputs {
        let path = Path::new(input.as_ref());
        if path.is_dir() {
            let mut found = vec![];
            for entry in std::fs::read_dir(path)? {
                let entry_path = entry?.path();
                if !entry_path.is_file() {
                    continue;
                }
                let name = entry_path
                    .to_str()
                    .ok_or(anyhow::anyhow!("non-UTF-8 path in {}", input))?;
                if name.ends_with(&suffix) || name.ends_with(&suffix_gz) {
                    found.push(Box::<str>::from(name));
                }
            }
            found.sort();
            info!("{}: {} document files (*{})", input, found.len(), suffix);
            files.extend(found);
        } else if path.is_file() {
            files.push(input.clone());
        } else {
            anyhow::bail!("no such file or directory: {}", input);
        }
    }

    if files.is_empty() {
        anyhow::bail!("no document files found");
    }
    Ok(files)
}

/// Read one document per file, labelled by its file name.
pub fn read_documents(files: &[Box<str>]) -> anyhow::Result<Vec<RawDocument>> {
    files
        .iter()
        .map(|f| {
            Ok(RawDocument {
                label: file_name(f)?,
                content: read_to_string(f)?,
            })
        })
        .collect()
}

/// Index tuple documents found under `inputs`.
pub fn read_tuple_corpus(
    inputs: &[Box<str>],
    ext: &str,
    num_roles: usize,
) -> anyhow::Result<TupleCorpus> {
    let files = collect_document_files(inputs, ext)?;
    let docs = read_documents(&files)?;
    let corpus = TupleCorpus::from_documents(&docs, num_roles)?;

    info!(
        "indexed {} documents, {} tuples, {} distinct words",
        corpus.num_documents(),
        corpus.num_tuples(),
        corpus.vocabulary_size()
    );
    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_directory_expansion_is_sorted() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("b.dat"), "b\tv\tx\n")?;
        fs::write(dir.path().join("a.dat"), "a\tv\tnull\n")?;
        fs::write(dir.path().join("notes.txt"), "ignored")?;

        let inputs = vec![Box::<str>::from(dir.path().to_str().unwrap())];
        let corpus = read_tuple_corpus(&inputs, "dat", 3)?;

        assert_eq!(corpus.num_documents(), 2);
        let labels: Vec<&str> = corpus.labels().iter().map(|x| x.as_ref()).collect();
        assert_eq!(labels, vec!["a.dat", "b.dat"]);
        assert_eq!(corpus.vocabulary().id("a"), Some(1));
        Ok(())
    }

    #[test]
    fn test_malformed_document_aborts() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("bad.dat"), "a\tv\n")?;
        let inputs = vec![Box::<str>::from(dir.path().to_str().unwrap())];
        assert!(read_tuple_corpus(&inputs, "dat", 3).is_err());
        Ok(())
    }

    #[test]
    fn test_missing_input() {
        let inputs = vec![Box::<str>::from("/definitely/not/here")];
        assert!(collect_document_files(&inputs, "dat").is_err());
    }
}
