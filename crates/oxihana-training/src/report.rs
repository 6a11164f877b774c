//! Per-generation reports.
//!
//! After reproduction, the generation loop condenses the generation into a
//! [`GenerationSummary`] and hands it to a [`ReportSink`]. The summary is
//! plain serializable data; sinks decide what to keep and how to show it.

use std::collections::HashMap;

use log::{debug, info};
use oxihana_stats::summary::{StatsDelta, SummaryStats};
use serde::Serialize;

use crate::{
    fitness::{Evaluation, FitnessRecord},
    genome::{Genome, GenomeId},
};

/// A genome with its lineage and encoding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenomeReport {
    pub id: GenomeId,
    pub parents: Option<[GenomeId; 2]>,
    pub mutation_of: Option<GenomeId>,
    pub dna: String,
}

impl From<&Genome> for GenomeReport {
    fn from(genome: &Genome) -> Self {
        Self {
            id: genome.id(),
            parents: genome.lineage().parents(),
            mutation_of: genome.lineage().mutation_of(),
            dna: genome.encode(),
        }
    }
}

/// Evaluation outcome of one genome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitnessReport {
    pub genome: GenomeId,
    /// Position among survivors, best first; `None` if selection removed it.
    pub rank: Option<usize>,
    pub scores: Vec<i32>,
    pub stats: Option<SummaryStats>,
}

/// What happened in one generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationSummary {
    /// 1-based generation number.
    pub generation: usize,
    /// Genomes submitted for evaluation.
    pub population_size: usize,
    pub failed_evaluations: usize,
    /// Statistics over every game played this generation.
    pub scores: Option<SummaryStats>,
    /// Statistics over the mean score of each genome.
    pub mean_scores: Option<SummaryStats>,
    /// Change of [`scores`](Self::scores) since the first generation.
    pub delta_from_initial: Option<StatsDelta>,
    pub best: Option<GenomeReport>,
    pub worst: Option<GenomeReport>,
    /// One entry per evaluated genome, in evaluation order.
    pub rankings: Vec<FitnessReport>,
    /// Evaluated genomes.
    pub population: Vec<GenomeReport>,
    /// Genomes produced by reproduction.
    pub children: Vec<GenomeReport>,
}

impl GenerationSummary {
    /// Summarizes a generation. `baseline` is the score statistics of the
    /// first generation, if known.
    #[must_use]
    pub fn new(
        generation: usize,
        evaluation: &Evaluation,
        survivors: &[FitnessRecord],
        children: &[Genome],
        baseline: Option<&SummaryStats>,
    ) -> Self {
        let records = &evaluation.records;
        let scores = SummaryStats::from_scores(records.iter().flat_map(FitnessRecord::scores));
        let mean_scores = SummaryStats::new(records.iter().map(FitnessRecord::mean));
        let delta_from_initial = scores
            .as_ref()
            .zip(baseline)
            .map(|(scores, baseline)| scores.delta(baseline));

        let best = records
            .iter()
            .max_by(|a, b| a.mean().total_cmp(&b.mean()))
            .map(|record| GenomeReport::from(record.genome()));
        let worst = records
            .iter()
            .min_by(|a, b| a.mean().total_cmp(&b.mean()))
            .map(|record| GenomeReport::from(record.genome()));

        let ranks = survivors
            .iter()
            .enumerate()
            .map(|(rank, record)| (record.genome().id(), rank))
            .collect::<HashMap<_, _>>();
        let rankings = records
            .iter()
            .map(|record| FitnessReport {
                genome: record.genome().id(),
                rank: ranks.get(&record.genome().id()).copied(),
                scores: record.scores().to_vec(),
                stats: record.stats(),
            })
            .collect();

        Self {
            generation,
            population_size: records.len() + evaluation.failures.len(),
            failed_evaluations: evaluation.failures.len(),
            scores,
            mean_scores,
            delta_from_initial,
            best,
            worst,
            rankings,
            population: records
                .iter()
                .map(|record| GenomeReport::from(record.genome()))
                .collect(),
            children: children.iter().map(GenomeReport::from).collect(),
        }
    }
}

/// Receives generation summaries.
pub trait ReportSink {
    fn report(&mut self, summary: &GenerationSummary);
}

impl ReportSink for Vec<GenerationSummary> {
    fn report(&mut self, summary: &GenerationSummary) {
        self.push(summary.clone());
    }
}

/// Logs a one-line digest at `info` level and the full summary as JSON at
/// `debug` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReportSink;

impl ReportSink for LogReportSink {
    fn report(&mut self, summary: &GenerationSummary) {
        match &summary.scores {
            Some(scores) => info!(
                "generation {}: {} genomes ({} failed), score {:.2} ± {:.2} [{} .. {}], {} children",
                summary.generation,
                summary.population_size,
                summary.failed_evaluations,
                scores.mean,
                scores.std_dev,
                scores.min,
                scores.max,
                summary.children.len(),
            ),
            None => info!(
                "generation {}: no genome was evaluated ({} failed)",
                summary.generation, summary.failed_evaluations,
            ),
        }
        if let Some(delta) = &summary.delta_from_initial {
            info!(
                "generation {}: mean {:+.2}, std dev {:+.2} since generation 1",
                summary.generation, delta.mean, delta.std_dev
            );
        }
        if let Some(best) = &summary.best {
            info!("generation {}: best {} {}", summary.generation, best.id, best.dna);
        }
        match serde_json::to_string(summary) {
            Ok(json) => debug!("{json}"),
            Err(err) => debug!("generation {}: summary not serializable: {err}", summary.generation),
        }
    }
}
