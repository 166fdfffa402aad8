use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classify::{CompiledTerms, Detection};
use crate::config::{AnnotationConfig, AppConfig};
use crate::dataset::{AnnotatedDataset, Dataset, DetectionColumn};
use crate::dictionary::Dictionary;
use crate::error::{LexitagError, ValidationError};

/// Text column used when the caller does not name one.
pub const DEFAULT_TEXT_COLUMN: &str = "Statement";

/// How a bulk annotation run is carried out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotateOptions {
    pub text_column: String,
    /// Also record matched terms and their count per dictionary.
    pub detail: bool,
    /// Shard records into chunks of this size across worker threads.
    pub parallel_chunk: Option<usize>,
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        Self {
            text_column: DEFAULT_TEXT_COLUMN.to_string(),
            detail: false,
            parallel_chunk: None,
        }
    }
}

impl AnnotateOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            text_column: config.dataset.text_column.clone(),
            ..Self::from_annotation(&config.annotation)
        }
    }

    fn from_annotation(annotation: &AnnotationConfig) -> Self {
        Self {
            detail: annotation.detail,
            parallel_chunk: annotation.parallel.then_some(annotation.chunk_size.max(1)),
            ..Self::default()
        }
    }
}

/// Annotate every record against every dictionary.
///
/// Preconditions are checked before any matching work: the dataset must
/// have records, carry the text column, and not already contain a column
/// the run would add. Row count and order are preserved.
#[tracing::instrument(
    name = "annotate",
    skip_all,
    fields(records = records.len(), dictionaries = dictionaries.len())
)]
pub fn annotate_dataset(
    records: &Dataset,
    dictionaries: &[Dictionary],
    options: &AnnotateOptions,
) -> Result<AnnotatedDataset, LexitagError> {
    let text_idx = check_preconditions(records, dictionaries, options)?;
    let texts: Vec<Option<&str>> = records
        .rows()
        .iter()
        .map(|row| row[text_idx].as_deref())
        .collect();

    let mut detections = Vec::with_capacity(dictionaries.len());
    for dictionary in dictionaries {
        let compiled = CompiledTerms::new(dictionary.terms());
        let column = if options.detail {
            let details = run_rows(&texts, options.parallel_chunk, |t| compiled.detect(t));
            DetectionColumn {
                dictionary: dictionary.name().to_string(),
                flags: details.iter().map(Detection::flag).collect(),
                details: Some(details),
            }
        } else {
            DetectionColumn {
                dictionary: dictionary.name().to_string(),
                flags: run_rows(&texts, options.parallel_chunk, |t| compiled.classify(t)),
                details: None,
            }
        };

        debug!(
            dictionary = dictionary.name(),
            terms = compiled.len(),
            detected = column.detected(),
            "Dictionary pass finished"
        );
        detections.push(column);
    }

    info!(records = records.len(), "Annotation complete");
    Ok(AnnotatedDataset::new(records.clone(), detections))
}

fn check_preconditions(
    records: &Dataset,
    dictionaries: &[Dictionary],
    options: &AnnotateOptions,
) -> Result<usize, LexitagError> {
    if records.is_empty() {
        return Err(LexitagError::MalformedInput("dataset has no records".into()));
    }

    let text_idx = records
        .column_index(&options.text_column)
        .ok_or_else(|| ValidationError::MissingColumn(options.text_column.clone()))?;

    for dictionary in dictionaries {
        let mut generated = vec![dictionary.flag_column()];
        if options.detail {
            generated.push(format!("{}_count", dictionary.name()));
            generated.push(format!("{}_matches", dictionary.name()));
        }
        if let Some(conflict) = generated.into_iter().find(|c| records.has_column(c)) {
            return Err(ValidationError::ColumnConflict(conflict).into());
        }
    }

    Ok(text_idx)
}

/// Apply `f` to each text, optionally sharded by chunk. Results keep row order.
fn run_rows<T, F>(texts: &[Option<&str>], chunk: Option<usize>, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(Option<&str>) -> T + Sync,
{
    match chunk {
        Some(size) => texts
            .par_chunks(size)
            .flat_map_iter(|chunk| chunk.iter().map(|t| f(*t)).collect::<Vec<_>>())
            .collect(),
        None => texts.iter().map(|t| f(*t)).collect(),
    }
}

/// Per-dictionary totals for one annotated dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_records: usize,
    pub dictionaries: Vec<DictionarySummary>,
    /// Records flagged by at least one dictionary.
    pub any_detected: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionarySummary {
    pub name: String,
    pub detected: usize,
    pub percentage: f64,
}

impl RunSummary {
    pub fn from_annotated(annotated: &AnnotatedDataset) -> Self {
        let total = annotated.len();
        let dictionaries = annotated
            .detections()
            .iter()
            .map(|d| {
                let detected = d.detected();
                DictionarySummary {
                    name: d.dictionary.clone(),
                    detected,
                    percentage: percentage(detected, total),
                }
            })
            .collect();
        let any_detected = (0..total)
            .filter(|&row| annotated.detections().iter().any(|d| d.flags[row] == 1))
            .count();

        Self {
            total_records: total,
            dictionaries,
            any_detected,
        }
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}
