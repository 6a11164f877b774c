//! Text encoding of genes and genomes.
//!
//! A gene is a brace-delimited list of `key=value` fields separated by `;`:
//!
//! ```text
//! {R=TAP;L=1-3;H=0-8;U=0.159808;W=0.15980834,0.12995258,...,0.5681055}
//! ```
//!
//! | Key | Value |
//! |-----|-------|
//! | `R` | rule kind tag (`PS`, `PPS`, `TAP`, `TAU`, `TAD`, `OD`, `RD`) |
//! | `L` | lives-remaining guard `lo-hi` |
//! | `H` | hints-remaining guard `lo-hi` |
//! | `U` | threshold weight rounded to 6 places (informational, optional, must parse as a number) |
//! | `W` | all eight weights, comma separated |
//!
//! A genome is its genes joined by `>`. Weights are written with the
//! shortest representation that parses back to the same `f32`, so decoding an
//! encoded genome reproduces every field exactly.
//!
//! Decoding is strict: unknown, duplicate, or missing keys, a weight count
//! other than eight, and out-of-range weights are all errors. Reversed guard
//! bounds (`3-1`) are accepted and reordered.

use std::num::ParseFloatError;

use oxihana_policy::guard::{GuardRange, ParseGuardRangeError};

use crate::gene::{Gene, ParseRuleKindError, RuleKind, Weights, WeightsError};

/// Separator between the genes of an encoded genome.
pub const GENE_SEPARATOR: char = '>';

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum DecodeGeneError {
    #[display("gene must be enclosed in braces: '{gene}'")]
    MissingBraces {
        #[error(not(source))]
        gene: String,
    },
    #[display("field '{field}' is not of the form key=value")]
    MalformedField {
        #[error(not(source))]
        field: String,
    },
    #[display("unknown key '{key}'")]
    UnknownKey {
        #[error(not(source))]
        key: String,
    },
    #[display("duplicate key '{key}'")]
    DuplicateKey {
        #[error(not(source))]
        key: &'static str,
    },
    #[display("missing key '{key}'")]
    MissingKey {
        #[error(not(source))]
        key: &'static str,
    },
    #[display("{_0}")]
    RuleKind(ParseRuleKindError),
    #[display("key '{key}': {source}")]
    Guard {
        key: &'static str,
        source: ParseGuardRangeError,
    },
    #[display("invalid threshold '{value}': {source}")]
    Threshold {
        value: String,
        source: ParseFloatError,
    },
    #[display("invalid weight '{value}': {source}")]
    Weight {
        value: String,
        source: ParseFloatError,
    },
    #[display("{_0}")]
    Weights(WeightsError),
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum DecodeGenomeError {
    #[display("encoded genome is empty")]
    Empty,
    #[display("gene #{index}: {source}")]
    Gene {
        index: usize,
        source: DecodeGeneError,
    },
}

/// Encodes one gene.
#[must_use]
pub fn encode_gene(gene: &Gene) -> String {
    let weights = gene
        .weights()
        .as_array()
        .iter()
        .map(f32::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "{{R={};L={};H={};U={:.6};W={weights}}}",
        gene.kind(),
        gene.lives(),
        gene.hints(),
        gene.weights().threshold(),
    )
}

/// Encodes a gene sequence.
#[must_use]
pub fn encode_genome(genes: &[Gene]) -> String {
    genes
        .iter()
        .map(encode_gene)
        .collect::<Vec<_>>()
        .join(&GENE_SEPARATOR.to_string())
}

/// Decodes one gene.
pub fn decode_gene(s: &str) -> Result<Gene, DecodeGeneError> {
    let body = s
        .trim()
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .ok_or_else(|| DecodeGeneError::MissingBraces { gene: s.to_owned() })?;

    let mut kind = None;
    let mut lives = None;
    let mut hints = None;
    let mut threshold = None;
    let mut weights = None;

    for field in body.split(';') {
        let (key, value) =
            field
                .split_once('=')
                .ok_or_else(|| DecodeGeneError::MalformedField {
                    field: field.to_owned(),
                })?;
        match key.trim() {
            "R" => {
                let parsed = value.parse::<RuleKind>().map_err(DecodeGeneError::RuleKind)?;
                set_once(&mut kind, "R", parsed)?;
            }
            "L" => set_once(&mut lives, "L", parse_guard("L", value)?)?,
            "H" => set_once(&mut hints, "H", parse_guard("H", value)?)?,
            // derived from W, which is authoritative; only checked for form
            "U" => set_once(&mut threshold, "U", parse_threshold(value)?)?,
            "W" => set_once(&mut weights, "W", parse_weights(value)?)?,
            other => {
                return Err(DecodeGeneError::UnknownKey {
                    key: other.to_owned(),
                });
            }
        }
    }

    Ok(Gene::new(
        kind.ok_or(DecodeGeneError::MissingKey { key: "R" })?,
        lives.ok_or(DecodeGeneError::MissingKey { key: "L" })?,
        hints.ok_or(DecodeGeneError::MissingKey { key: "H" })?,
        weights.ok_or(DecodeGeneError::MissingKey { key: "W" })?,
    ))
}

/// Decodes a gene sequence. The result is never empty.
pub fn decode_genome(s: &str) -> Result<Vec<Gene>, DecodeGenomeError> {
    if s.trim().is_empty() {
        return Err(DecodeGenomeError::Empty);
    }
    s.split(GENE_SEPARATOR)
        .enumerate()
        .map(|(index, gene)| {
            decode_gene(gene).map_err(|source| DecodeGenomeError::Gene { index, source })
        })
        .collect()
}

fn set_once<T>(slot: &mut Option<T>, key: &'static str, value: T) -> Result<(), DecodeGeneError> {
    if slot.replace(value).is_some() {
        return Err(DecodeGeneError::DuplicateKey { key });
    }
    Ok(())
}

fn parse_guard(key: &'static str, value: &str) -> Result<GuardRange, DecodeGeneError> {
    value
        .parse::<GuardRange>()
        .map_err(|source| DecodeGeneError::Guard { key, source })
}

fn parse_threshold(value: &str) -> Result<f32, DecodeGeneError> {
    let value = value.trim();
    value.parse::<f32>().map_err(|source| DecodeGeneError::Threshold {
        value: value.to_owned(),
        source,
    })
}

fn parse_weights(value: &str) -> Result<Weights, DecodeGeneError> {
    let values = value
        .split(',')
        .map(str::trim)
        .map(|w| {
            w.parse::<f32>().map_err(|source| DecodeGeneError::Weight {
                value: w.to_owned(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Weights::from_slice(&values).map_err(DecodeGeneError::Weights)
}
