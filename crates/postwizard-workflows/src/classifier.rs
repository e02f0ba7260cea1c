use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());

/// English function words never used as features.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "ain", "all", "am", "amp", "an", "and", "any", "are",
    "aren", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but", "by",
    "can", "couldn", "d", "did", "didn", "do", "does", "doesn", "doing", "don", "down", "during", "each",
    "few", "for", "from", "further", "had", "hadn", "has", "hasn", "have", "haven", "having", "he", "her",
    "here", "hers", "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is", "isn", "it",
    "its", "itself", "just", "ll", "m", "ma", "me", "mightn", "more", "most", "mustn", "my", "myself",
    "needn", "no", "nor", "not", "now", "o", "of", "off", "on", "once", "only", "or", "other", "our",
    "ours", "ourselves", "out", "over", "own", "re", "s", "same", "shan", "she", "should", "shouldn", "so",
    "some", "such", "t", "than", "that", "the", "their", "theirs", "them", "themselves", "then", "there",
    "these", "they", "this", "those", "through", "to", "too", "under", "until", "up", "ve", "very", "was",
    "wasn", "we", "were", "weren", "what", "when", "where", "which", "while", "who", "whom", "why", "will",
    "with", "won", "wouldn", "y", "you", "your", "yours", "yourself", "yourselves",
];

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Lowercased words present in `text`, stop words removed.
///
/// Every model works on word presence, so repeats do not count twice.
pub fn features(text: &str) -> HashSet<String> {
    let lowered = text.to_lowercase();
    WORD_RE
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|w| !is_stop_word(w))
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing model {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("malformed model: {0}")]
    Shape(String),
}

fn check_len(what: &str, len: usize, classes: usize) -> Result<(), ClassifierError> {
    if len == classes {
        Ok(())
    } else {
        Err(ClassifierError::Shape(format!("{} has {} values for {} classes", what, len, classes)))
    }
}

fn check_table(table: &HashMap<String, Vec<f64>>, classes: usize) -> Result<(), ClassifierError> {
    for (word, values) in table {
        check_len(&format!("feature {:?}", word), values.len(), classes)?;
    }
    Ok(())
}

/// Turn per-class log scores into probabilities, highest first.
fn rank(classes: &[String], scores: &[f64]) -> Vec<(String, f64)> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let norm = max + scores.iter().map(|s| (s - max).exp()).sum::<f64>().ln();
    let mut ranked: Vec<(String, f64)> = classes
        .iter()
        .cloned()
        .zip(scores.iter().map(|s| (s - norm).exp()))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

/// Naive Bayes over word presence: every vocabulary word contributes,
/// whether it appears in the text or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NaiveBayes {
    pub classes: Vec<String>,
    pub class_log_prior: Vec<f64>,
    /// log P(word present | class), per vocabulary word.
    pub feature_log_prob: HashMap<String, Vec<f64>>,
}

impl NaiveBayes {
    fn scores(&self, present: &HashSet<String>) -> Vec<f64> {
        let mut scores = self.class_log_prior.clone();
        for (word, log_probs) in &self.feature_log_prob {
            if is_stop_word(word) {
                continue;
            }
            let seen = present.contains(word);
            for (score, lp) in scores.iter_mut().zip(log_probs) {
                *score += if seen {
                    *lp
                } else {
                    (1.0 - lp.exp()).max(f64::MIN_POSITIVE).ln()
                };
            }
        }
        scores
    }
}

/// Maximum entropy (log-linear) model: a bias plus one weight per present
/// word and class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Maxent {
    pub classes: Vec<String>,
    #[serde(default)]
    pub bias: Vec<f64>,
    pub weights: HashMap<String, Vec<f64>>,
}

impl Maxent {
    fn scores(&self, present: &HashSet<String>) -> Vec<f64> {
        let mut scores = if self.bias.is_empty() {
            vec![0.0; self.classes.len()]
        } else {
            self.bias.clone()
        };
        for word in present {
            if let Some(weights) = self.weights.get(word) {
                for (score, w) in scores.iter_mut().zip(weights) {
                    *score += w;
                }
            }
        }
        scores
    }
}

/// Multinomial Naive Bayes over word presence; absent words are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultinomialNb {
    pub classes: Vec<String>,
    pub class_log_prior: Vec<f64>,
    pub feature_log_prob: HashMap<String, Vec<f64>>,
}

impl MultinomialNb {
    fn scores(&self, present: &HashSet<String>) -> Vec<f64> {
        let mut scores = self.class_log_prior.clone();
        for word in present {
            if let Some(log_probs) = self.feature_log_prob.get(word) {
                for (score, lp) in scores.iter_mut().zip(log_probs) {
                    *score += lp;
                }
            }
        }
        scores
    }
}

/// One pretrained model, exported as JSON with a `kind` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextModel {
    NaiveBayes(NaiveBayes),
    Maxent(Maxent),
    MultinomialNb(MultinomialNb),
}

impl TextModel {
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        let raw = fs::read_to_string(path).map_err(|source| ClassifierError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model: Self = serde_json::from_str(&raw).map_err(|source| ClassifierError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        model.validate()?;
        debug!("Loaded {} model from {} ({} classes)", model.kind(), path.display(), model.classes().len());
        Ok(model)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TextModel::NaiveBayes(_) => "naive_bayes",
            TextModel::Maxent(_) => "maxent",
            TextModel::MultinomialNb(_) => "multinomial_nb",
        }
    }

    pub fn classes(&self) -> &[String] {
        match self {
            TextModel::NaiveBayes(m) => &m.classes,
            TextModel::Maxent(m) => &m.classes,
            TextModel::MultinomialNb(m) => &m.classes,
        }
    }

    pub fn validate(&self) -> Result<(), ClassifierError> {
        let n = self.classes().len();
        if n == 0 {
            return Err(ClassifierError::Shape("no classes".into()));
        }
        match self {
            TextModel::NaiveBayes(m) => {
                check_len("class_log_prior", m.class_log_prior.len(), n)?;
                check_table(&m.feature_log_prob, n)
            }
            TextModel::Maxent(m) => {
                if !m.bias.is_empty() {
                    check_len("bias", m.bias.len(), n)?;
                }
                check_table(&m.weights, n)
            }
            TextModel::MultinomialNb(m) => {
                check_len("class_log_prior", m.class_log_prior.len(), n)?;
                check_table(&m.feature_log_prob, n)
            }
        }
    }

    /// Class probabilities for `text`, highest first.
    pub fn classify(&self, text: &str) -> Vec<(String, f64)> {
        let present = features(text);
        let scores = match self {
            TextModel::NaiveBayes(m) => m.scores(&present),
            TextModel::Maxent(m) => m.scores(&present),
            TextModel::MultinomialNb(m) => m.scores(&present),
        };
        rank(self.classes(), &scores)
    }

    /// Most likely class.
    pub fn label(&self, text: &str) -> Option<String> {
        self.classify(text).into_iter().next().map(|(class, _)| class)
    }
}

/// Every model trained on one field.
#[derive(Debug, Clone, Default)]
pub struct FieldEnsemble {
    pub models: Vec<TextModel>,
}

impl FieldEnsemble {
    /// Load every `*.json` model in `dir`, in file name order. A missing
    /// directory is an empty ensemble.
    pub fn load_dir(dir: &Path) -> Result<Self, ClassifierError> {
        if !dir.is_dir() {
            return Ok(Self::default());
        }
        let io_err = |source| ClassifierError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(io_err)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, std::io::Error>>()
            .map_err(io_err)?;
        paths.retain(|p| p.extension().is_some_and(|ext| ext == "json"));
        paths.sort();

        let models = paths.iter().map(|p| TextModel::load(p)).collect::<Result<Vec<_>, _>>()?;
        Ok(Self { models })
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Union of each model's top label.
    pub fn labels(&self, text: &str) -> BTreeSet<String> {
        self.models.iter().filter_map(|m| m.label(text)).collect()
    }

    fn accumulate(&self, text: &str, scores: &mut Vec<(String, f64)>) {
        for model in &self.models {
            for (class, p) in model.classify(text) {
                match scores.iter_mut().find(|(c, _)| *c == class) {
                    Some((_, total)) => *total += p,
                    None => scores.push((class, p)),
                }
            }
        }
    }
}

/// Per-field model ensembles for titles, descriptions and tags.
#[derive(Debug, Default)]
pub struct FieldClassifiers {
    pub title: FieldEnsemble,
    pub description: FieldEnsemble,
    pub tags: FieldEnsemble,
}

impl FieldClassifiers {
    /// Load `title/`, `description/` and `tags/` under `dir`.
    pub fn load_dir(dir: &Path) -> Result<Self, ClassifierError> {
        let classifiers = Self {
            title: FieldEnsemble::load_dir(&dir.join("title"))?,
            description: FieldEnsemble::load_dir(&dir.join("description"))?,
            tags: FieldEnsemble::load_dir(&dir.join("tags"))?,
        };
        if classifiers.is_empty() {
            warn!("No classifier models under {}", dir.display());
        }
        info!("Classifier models loaded from {} ({} models)", dir.display(), classifiers.len());
        Ok(classifiers)
    }

    pub fn len(&self) -> usize {
        self.title.models.len() + self.description.models.len() + self.tags.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn classify_title(&self, title: &str) -> BTreeSet<String> {
        self.title.labels(title)
    }

    pub fn classify_description(&self, description: &str) -> BTreeSet<String> {
        self.description.labels(description)
    }

    /// `tags` is one comma-separated string.
    pub fn classify_tags(&self, tags: &str) -> BTreeSet<String> {
        self.tags.labels(tags)
    }

    /// Top `top_n` categories, scored by the summed probability from every
    /// loaded model.
    pub fn suggest(&self, title: &str, description: &str, tags: &str, top_n: usize) -> Vec<String> {
        let mut scores: Vec<(String, f64)> = Vec::new();
        self.title.accumulate(title, &mut scores);
        self.description.accumulate(description, &mut scores);
        self.tags.accumulate(tags, &mut scores);

        scores.sort_by(|a, b| b.1.total_cmp(&a.1));
        scores.into_iter().take(top_n).map(|(class, _)| class).collect()
    }
}
