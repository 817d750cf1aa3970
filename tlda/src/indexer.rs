//! Vocabulary and tuple indexer.
//!
//! Turns raw documents (one tuple per line, tab-separated role fillers)
//! into an integer-coded corpus. Global word ids are assigned in strict
//! first-encounter order (documents, then lines, then roles left to
//! right) after reserving id 0 for the `"null"` filler.
//!
//! Each role also keeps its own local vocabulary so that the Dirichlet
//! normalizer of role `r` can use the number of distinct fillers ever
//! seen in that role.

use std::collections::HashMap;

/// Filler marking an absent role.
pub const NULL_WORD: &str = "null";

/// Global word id of [`NULL_WORD`].
pub const NULL_ID: usize = 0;

/// A raw document: a label and its tuple-per-line content.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Document label (typically the file name)
    pub label: Box<str>,
    /// Tuple-per-line content with tab-separated role fields
    pub content: String,
}

impl RawDocument {
    /// Create a raw document.
    pub fn new(label: &str, content: &str) -> Self {
        RawDocument {
            label: label.into(),
            content: content.to_string(),
        }
    }
}

/// Bijection between role-filler strings and global word ids.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    word_to_id: HashMap<Box<str>, usize>,
    id_to_word: Vec<Box<str>>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

impl Vocabulary {
    /// A fresh vocabulary holding only the null filler at id 0.
    pub fn new() -> Self {
        let mut vocab = Vocabulary {
            word_to_id: HashMap::new(),
            id_to_word: Vec::new(),
        };
        vocab.insert(NULL_WORD);
        vocab
    }

    /// Look up `word`, registering it with the next id if unseen.
    pub fn insert(&mut self, word: &str) -> usize {
        if let Some(&id) = self.word_to_id.get(word) {
            return id;
        }
        let id = self.id_to_word.len();
        self.word_to_id.insert(word.into(), id);
        self.id_to_word.push(word.into());
        id
    }

    /// Global id of `word`, if the indexer has seen it.
    pub fn id(&self, word: &str) -> Option<usize> {
        self.word_to_id.get(word).copied()
    }

    /// Word registered under `id`.
    ///
    /// Panics if `id` was never produced by this vocabulary.
    pub fn word(&self, id: usize) -> &str {
        &self.id_to_word[id]
    }

    /// All words in id order.
    pub fn words(&self) -> &[Box<str>] {
        &self.id_to_word
    }

    /// Number of distinct words, null included.
    pub fn len(&self) -> usize {
        self.id_to_word.len()
    }

    /// Never true in practice since null is always registered.
    pub fn is_empty(&self) -> bool {
        self.id_to_word.is_empty()
    }
}

/// Distinct fillers of a single role slot.
///
/// Local ids start at 1 in first-encounter order. `global_ids[l - 1]` is
/// the global id of the filler with local id `l`.
#[derive(Debug, Clone, Default)]
pub struct RoleVocabulary {
    local_ids: HashMap<Box<str>, usize>,
    global_ids: Vec<usize>,
}

impl RoleVocabulary {
    fn insert(&mut self, word: &str, global_id: usize) -> usize {
        if let Some(&local) = self.local_ids.get(word) {
            return local;
        }
        self.global_ids.push(global_id);
        let local = self.global_ids.len();
        self.local_ids.insert(word.into(), local);
        local
    }

    /// Number of distinct fillers seen in this role.
    pub fn len(&self) -> usize {
        self.global_ids.len()
    }

    /// True if the role never received a filler (empty corpus).
    pub fn is_empty(&self) -> bool {
        self.global_ids.is_empty()
    }

    /// Role-local id of `word`, starting at 1.
    pub fn local_id(&self, word: &str) -> Option<usize> {
        self.local_ids.get(word).copied()
    }

    /// Global ids of the fillers in this role, in local id order.
    pub fn global_ids(&self) -> &[usize] {
        &self.global_ids
    }
}

/// Integer-coded tuple corpus.
///
/// `tokens[d][n * R + j]` is the global id of the filler in role `j` of
/// the `n`-th tuple of document `d`. Immutable once built.
#[derive(Debug, Clone)]
pub struct TupleCorpus {
    num_roles: usize,
    labels: Vec<Box<str>>,
    tokens: Vec<Vec<usize>>,
    vocabulary: Vocabulary,
    roles: Vec<RoleVocabulary>,
    num_tuples: usize,
}

impl TupleCorpus {
    /// Index raw documents whose lines carry exactly `num_roles`
    /// tab-separated fields.
    ///
    /// A line with a different field count, or with a field that is
    /// empty after trimming, aborts indexing with an error. Blank lines
    /// are skipped.
    pub fn from_documents(docs: &[RawDocument], num_roles: usize) -> anyhow::Result<Self> {
        if num_roles == 0 {
            anyhow::bail!("number of roles must be positive");
        }

        let mut vocabulary = Vocabulary::new();
        let mut roles = vec![RoleVocabulary::default(); num_roles];
        let mut labels = Vec::with_capacity(docs.len());
        let mut tokens = Vec::with_capacity(docs.len());
        let mut num_tuples = 0;

        for doc in docs {
            let mut doc_tokens = vec![];

            for (line_no, line) in doc.content.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }

                let fields: Vec<&str> = line.split('\t').map(str::trim).collect();

                if fields.len() != num_roles {
                    anyhow::bail!(
                        "input data format error in {} line {}: found {} fields, expected {}",
                        doc.label,
                        line_no + 1,
                        fields.len(),
                        num_roles
                    );
                }

                for (j, &word) in fields.iter().enumerate() {
                    if word.is_empty() {
                        anyhow::bail!(
                            "input data format error in {} line {}: empty field for role {} (use \"{}\")",
                            doc.label,
                            line_no + 1,
                            j,
                            NULL_WORD
                        );
                    }
                    let id = vocabulary.insert(word);
                    roles[j].insert(word, id);
                    doc_tokens.push(id);
                }
                num_tuples += 1;
            }

            labels.push(doc.label.clone());
            tokens.push(doc_tokens);
        }

        Ok(TupleCorpus {
            num_roles,
            labels,
            tokens,
            vocabulary,
            roles,
            num_tuples,
        })
    }

    /// Number of role slots per tuple (R)
    pub fn num_roles(&self) -> usize {
        self.num_roles
    }

    /// Number of documents (M)
    pub fn num_documents(&self) -> usize {
        self.tokens.len()
    }

    /// Global vocabulary size (V)
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Total number of tuples across all documents
    pub fn num_tuples(&self) -> usize {
        self.num_tuples
    }

    /// Number of tuples in document `d`
    pub fn document_len(&self, d: usize) -> usize {
        self.tokens[d].len() / self.num_roles
    }

    /// Flat token array of document `d`
    pub fn document(&self, d: usize) -> &[usize] {
        &self.tokens[d]
    }

    /// Global id of the filler in role `j` of tuple `n` in document `d`
    #[inline]
    pub fn word_at(&self, d: usize, n: usize, j: usize) -> usize {
        self.tokens[d][n * self.num_roles + j]
    }

    /// Document labels in corpus order
    pub fn labels(&self) -> &[Box<str>] {
        &self.labels
    }

    /// The global vocabulary
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Local vocabulary of role `r`
    pub fn role_vocabulary(&self, r: usize) -> &RoleVocabulary {
        &self.roles[r]
    }

    /// `RoleVocabularySize[r]` for every role
    pub fn role_vocabulary_sizes(&self) -> Vec<usize> {
        self.roles.iter().map(RoleVocabulary::len).collect()
    }
}
