use crate::common::*;
use crate::common_io::write_lines;
use tlda::Vocabulary;

/// `id<TAB>word` for every global word id
pub fn write_vocabulary(vocab: &Vocabulary, file: &str) -> anyhow::Result<()> {
    let lines: Vec<Box<str>> = vocab
        .words()
        .iter()
        .enumerate()
        .map(|(id, w)| format!("{}\t{}", id, w).into_boxed_str())
        .collect();
    write_lines(&lines, file)
}

/// Document × frame matrix with a header line
pub fn write_theta(est: &FrameEstimates, labels: &[Box<str>], file: &str) -> anyhow::Result<()> {
    let mut lines = Vec::with_capacity(labels.len() + 1);

    let header: Vec<String> = std::iter::once("document".to_string())
        .chain((0..est.num_frames()).map(|k| format!("frame_{}", k)))
        .collect();
    lines.push(header.join("\t").into_boxed_str());

    for (label, row) in labels.iter().zip(est.theta.rows()) {
        let values: Vec<String> = row.iter().map(|x| format!("{}", x)).collect();
        lines.push(format!("{}\t{}", label, values.join("\t")).into_boxed_str());
    }
    write_lines(&lines, file)
}

/// Long-format φ entries at or above `threshold`
pub fn write_phi(
    est: &FrameEstimates,
    vocab: &Vocabulary,
    role_names: &[Box<str>],
    threshold: f64,
    file: &str,
) -> anyhow::Result<()> {
    let mut lines = vec![Box::<str>::from("role\tframe\tword\tprobability")];
    for (r, role) in role_names.iter().enumerate() {
        for k in 0..est.num_frames() {
            for (w, &p) in est.frame_words(r, k).iter().enumerate() {
                if p > 0.0 && p >= threshold {
                    lines.push(format!("{}\t{}\t{}\t{}", role, k, vocab.word(w), p).into_boxed_str());
                }
            }
        }
    }
    write_lines(&lines, file)
}

/// Top words of each role under each frame
pub fn write_top_words(
    est: &FrameEstimates,
    vocab: &Vocabulary,
    role_names: &[Box<str>],
    top_k: usize,
    threshold: f64,
    file: &str,
) -> anyhow::Result<()> {
    let mut lines = vec![Box::<str>::from("frame\trole\trank\tword\tprobability")];
    for k in 0..est.num_frames() {
        for (r, role) in role_names.iter().enumerate() {
            for (rank, (w, p)) in est.top_words(r, k, top_k, threshold).into_iter().enumerate() {
                lines.push(
                    format!("{}\t{}\t{}\t{}\t{}", k, role, rank + 1, vocab.word(w), p)
                        .into_boxed_str(),
                );
            }
        }
    }
    write_lines(&lines, file)
}
