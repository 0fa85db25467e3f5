use log::{debug, info, warn};

use vote_alignment::validator::{self, Finding, FindingKind, Severity};
use vote_alignment::*;

use snafu::{prelude::*, Snafu};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::batch::metadata_reader::{read_metadata, MetaEntry};
use crate::batch::season_reader::{read_season_file, season_data_path};

pub mod io_csv;
pub mod metadata_reader;
pub mod season_reader;

#[derive(Debug, Snafu)]
pub enum BatchError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading a CSV record"))]
    CsvRecordParse { source: csv::Error },
    #[snafu(display("Season key {key} is not a number"))]
    BadSeasonKey { key: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type BatchResult<T> = Result<T, BatchError>;

#[derive(Debug, Clone)]
enum SeasonStatus {
    Success { alliances: usize },
    NoData,
    Failed { reason: String },
}

struct ProcessedSeason {
    stats: SeasonStats,
    summary: JSValue,
    out_path: PathBuf,
}

pub fn run_app(args: &Args) -> BatchResult<i32> {
    let data_dir = args
        .data_dir
        .clone()
        .unwrap_or_else(|| "data/input".to_string());

    if let Some(csv_path) = &args.import_csv {
        let seasons = io_csv::import_votes_csv(csv_path, &data_dir)?;
        println!("Imported {} season(s) into {}", seasons.len(), data_dir);
        return Ok(0);
    }

    let metadata_path = args
        .metadata
        .clone()
        .unwrap_or_else(|| "season_metadata.json".to_string());
    let metadata = read_metadata(&metadata_path)?;
    let seasons = requested_seasons(args, &metadata);

    if args.validate {
        return run_validation(args, &metadata, &seasons, &data_dir);
    }
    run_batch(args, &metadata, &seasons, &data_dir)
}

fn requested_seasons(args: &Args, metadata: &BTreeMap<u32, MetaEntry>) -> Vec<u32> {
    if let Some(season) = args.season {
        vec![season]
    } else if let Some(range) = &args.range {
        (range[0]..=range[1]).collect()
    } else {
        metadata.keys().cloned().collect()
    }
}

fn run_batch(
    args: &Args,
    metadata: &BTreeMap<u32, MetaEntry>,
    seasons: &[u32],
    data_dir: &str,
) -> BatchResult<i32> {
    if args.reference.is_some() && seasons.len() != 1 {
        whatever!("--reference requires a single season");
    }
    let out_dir = args.out.clone().unwrap_or_else(|| "data/seasons".to_string());
    let rules = AlignmentRules {
        min_together: args
            .min_votes
            .unwrap_or(AlignmentRules::DEFAULT_RULES.min_together),
        ..AlignmentRules::DEFAULT_RULES
    };

    let mut summary: Vec<(u32, String, SeasonStatus)> = Vec::new();
    for &season in seasons.iter() {
        let (name, status) = match metadata.get(&season) {
            None => (
                "?".to_string(),
                SeasonStatus::Failed {
                    reason: format!("season {} not found in the metadata table", season),
                },
            ),
            Some(entry) => {
                let status = match process_season(
                    season, entry, &rules, data_dir, &out_dir, args.strict,
                ) {
                    Ok(None) => SeasonStatus::NoData,
                    Ok(Some(processed)) => {
                        info!(
                            "season {}: results written to {:?}",
                            season, processed.out_path
                        );
                        if seasons.len() == 1 {
                            print_season_report(entry, &processed.stats);
                            if let Some(reference) = &args.reference {
                                check_reference(&processed.summary, reference)?;
                            }
                        }
                        SeasonStatus::Success {
                            alliances: processed.stats.strong_alliances.len(),
                        }
                    }
                    Err(e) => SeasonStatus::Failed {
                        reason: e.to_string(),
                    },
                };
                (entry.name.clone(), status)
            }
        };
        summary.push((season, name, status));
    }

    print_batch_summary(&summary);
    Ok(0)
}

/// Runs one season end to end. `Ok(None)` means there is no data file yet;
/// any error stays confined to this season.
fn process_season(
    season: u32,
    entry: &MetaEntry,
    rules: &AlignmentRules,
    data_dir: &str,
    out_dir: &str,
    strict: bool,
) -> BatchResult<Option<ProcessedSeason>> {
    let data_path = season_data_path(data_dir, season);
    if !data_path.exists() {
        debug!("season {}: no data file at {:?}", season, data_path);
        return Ok(None);
    }
    let record = read_season_file(&data_path, entry.merge_episode)?;
    let meta = entry.to_season_meta();

    if strict {
        let findings = validator::validate_season(&record, &meta);
        let errors = findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count();
        if errors > 0 {
            for finding in findings.iter() {
                warn!("season {}: {}", season, finding);
            }
            whatever!("validation reported {} error(s)", errors);
        }
    }

    let stats = match run_alignment_stats(&record, rules) {
        Ok(x) => x,
        Err(e) => {
            whatever!("alignment error: {:?}", e)
        }
    };
    let summary = season_results_to_json(season, entry, &record, &stats);
    let out_path = save_season_results(out_dir, season, &summary)?;
    Ok(Some(ProcessedSeason {
        stats,
        summary,
        out_path,
    }))
}

fn alignments_to_json(pairs: &[AlignedPair]) -> Vec<JSValue> {
    pairs
        .iter()
        .map(|p| {
            json!({
                "player1": p.first,
                "player2": p.second,
                "votes_together": p.count,
            })
        })
        .collect()
}

/// Assembles the per-season result object. This is the whole contract with
/// the rendering side: nodes, edges and highlight flags are all derivable
/// from this one value.
fn season_results_to_json(
    season: u32,
    entry: &MetaEntry,
    record: &SeasonRecord,
    stats: &SeasonStats,
) -> JSValue {
    json!({
        "season": season,
        "season_name": entry.name,
        "year": entry.year,
        "analysis_type": "pre_merge_only",
        "merge_episode": entry.merge_episode,
        "total_tribal_councils": stats.qualifying_events,
        "total_tribal_councils_all_season": stats.total_events,
        "contestants": record.participants,
        "finalists": entry.finalists,
        "winner": entry.winner,
        "all_alignments": alignments_to_json(&stats.alignments),
        "strong_alliances": alignments_to_json(&stats.strong_alliances),
    })
}

fn save_season_results(out_dir: &str, season: u32, summary: &JSValue) -> BatchResult<PathBuf> {
    let season_dir: PathBuf = Path::new(out_dir).join(format!("season{:02}", season));
    fs::create_dir_all(&season_dir).context(WritingJsonSnafu {
        path: season_dir.display().to_string(),
    })?;
    let out_path = season_dir.join("analysis_results.json");
    let pretty = serde_json::to_string_pretty(summary).context(ParsingJsonSnafu {
        path: out_path.display().to_string(),
    })?;
    fs::write(&out_path, pretty).context(WritingJsonSnafu {
        path: out_path.display().to_string(),
    })?;
    Ok(out_path)
}

fn print_season_report(entry: &MetaEntry, stats: &SeasonStats) {
    println!("{} - voting analysis (pre-merge only)", entry.name);
    println!("{}", "-".repeat(60));
    println!("Pre-merge tribal councils: {}", stats.qualifying_events);
    println!("Player pairs analyzed: {}", stats.alignments.len());
    println!("Strong alliances: {}", stats.strong_alliances.len());
    println!();
    println!("Strongest voting pairs:");
    for (i, p) in stats.strong_alliances.iter().take(10).enumerate() {
        println!(
            "  {:2}. {:12} <-> {:12}: {:2} votes together",
            i + 1,
            p.first,
            p.second,
            p.count
        );
    }
    for (finalist, partners) in finalist_alliances(&stats.strong_alliances, &entry.finalists) {
        println!();
        println!("  {}'s strongest alliances:", finalist);
        for (other, count) in partners.iter().take(5) {
            println!("    - {:12}: {:2} votes together", other, count);
        }
    }
}

fn print_batch_summary(summary: &[(u32, String, SeasonStatus)]) {
    println!();
    println!("{}", "=".repeat(70));
    println!("BATCH ANALYSIS SUMMARY");
    println!("{}", "=".repeat(70));
    for (season, name, status) in summary.iter() {
        match status {
            SeasonStatus::Success { alliances } => println!(
                "+ Season {:2} - {:30} | {} strong alliances",
                season, name, alliances
            ),
            SeasonStatus::NoData => {
                println!("o Season {:2} - {:30} | No data file", season, name)
            }
            SeasonStatus::Failed { reason } => {
                println!("x Season {:2} - {:30} | {}", season, name, reason)
            }
        }
    }
    let success_count = summary
        .iter()
        .filter(|(_, _, s)| matches!(s, SeasonStatus::Success { .. }))
        .count();
    println!("{}", "=".repeat(70));
    println!(
        "Successfully analyzed: {}/{} seasons",
        success_count,
        summary.len()
    );
}

fn run_validation(
    args: &Args,
    metadata: &BTreeMap<u32, MetaEntry>,
    seasons: &[u32],
    data_dir: &str,
) -> BatchResult<i32> {
    let mut error_count = 0usize;
    let mut warning_count = 0usize;
    let mut passed_count = 0usize;

    for &season in seasons.iter() {
        let findings = season_findings(season, metadata, data_dir, args.metadata_only);
        if findings.is_empty() {
            passed_count += 1;
            println!("Season {}: all checks passed", season);
        } else {
            println!("Season {}:", season);
            for finding in findings.iter() {
                println!("  {}", finding);
            }
        }
        error_count += findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count();
        warning_count += findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
            .count();
    }

    println!();
    println!(
        "Summary: {}/{} seasons passed validation",
        passed_count,
        seasons.len()
    );
    if error_count > 0 {
        println!("  {} error(s) found", error_count);
    }
    if warning_count > 0 {
        println!("  {} warning(s) found", warning_count);
    }

    Ok(if error_count > 0 { 1 } else { 0 })
}

/// All findings for one season, including the fatal lookup and parse failures
/// that the library validator never sees.
fn season_findings(
    season: u32,
    metadata: &BTreeMap<u32, MetaEntry>,
    data_dir: &str,
    metadata_only: bool,
) -> Vec<Finding> {
    let entry = match metadata.get(&season) {
        Some(e) => e,
        None => {
            return vec![fatal_finding(format!(
                "Season {} not found in the metadata table",
                season
            ))];
        }
    };
    let meta = entry.to_season_meta();
    let mut findings = validator::validate_metadata(&meta);
    if entry.merge_episode < 1 {
        findings.push(Finding {
            severity: Severity::Error,
            kind: FindingKind::MalformedMetadata,
            message: format!("Invalid merge episode: {}", entry.merge_episode),
        });
    }
    if metadata_only || validator::has_errors(&findings) {
        // The data file cannot be interpreted without sound metadata.
        return findings;
    }
    let data_path = season_data_path(data_dir, season);
    if !data_path.exists() {
        findings.push(fatal_finding(format!(
            "Data file {} not found",
            data_path.display()
        )));
        return findings;
    }
    match read_season_file(&data_path, entry.merge_episode) {
        Ok(record) => validator::validate_season(&record, &meta),
        Err(e) => {
            findings.push(fatal_finding(format!(
                "Error reading {}: {}",
                data_path.display(),
                e
            )));
            findings
        }
    }
}

fn fatal_finding(message: String) -> Finding {
    Finding {
        severity: Severity::Error,
        kind: FindingKind::MissingData,
        message,
    }
}

fn check_reference(summary: &JSValue, reference_path: &str) -> BatchResult<()> {
    let contents = fs::read_to_string(reference_path).context(OpeningJsonSnafu {
        path: reference_path.to_string(),
    })?;
    let reference: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {
        path: reference_path.to_string(),
    })?;
    let pretty_reference = serde_json::to_string_pretty(&reference).context(ParsingJsonSnafu {
        path: reference_path.to_string(),
    })?;
    let pretty_computed = serde_json::to_string_pretty(summary).context(ParsingJsonSnafu {
        path: reference_path.to_string(),
    })?;
    if pretty_reference != pretty_computed {
        warn!("Found differences with the reference file");
        print_diff(pretty_reference.as_str(), pretty_computed.as_ref(), "\n");
        whatever!(
            "Difference detected between computed results and reference {}",
            reference_path
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn sample_entry() -> MetaEntry {
        MetaEntry {
            name: "Borneo".to_string(),
            year: Some(2000),
            merge_episode: 3,
            finalists: vec!["Rich".to_string(), "Kelly".to_string()],
            winner: "Rich".to_string(),
        }
    }

    fn sample_record() -> SeasonRecord {
        let votes: BTreeMap<String, String> = [
            ("Rich".to_string(), "Sonja".to_string()),
            ("Kelly".to_string(), "Sonja".to_string()),
            ("Sonja".to_string(), "Rich".to_string()),
        ]
        .into_iter()
        .collect();
        SeasonRecord {
            participants: vec![
                "Sonja".to_string(),
                "Kelly".to_string(),
                "Rich".to_string(),
            ],
            events: vec![VoteEvent {
                round: 1,
                eliminated: Some("Sonja".to_string()),
                non_competitive: false,
                votes,
            }],
            phase_boundary: 3,
        }
    }

    #[test]
    fn result_json_has_the_stable_layout() {
        let entry = sample_entry();
        let record = sample_record();
        let stats = run_alignment_stats(&record, &AlignmentRules::DEFAULT_RULES).unwrap();
        let js = season_results_to_json(1, &entry, &record, &stats);

        assert_eq!(js["season"], json!(1));
        assert_eq!(js["season_name"], json!("Borneo"));
        assert_eq!(js["analysis_type"], json!("pre_merge_only"));
        assert_eq!(js["merge_episode"], json!(3));
        assert_eq!(js["total_tribal_councils"], json!(1));
        assert_eq!(js["winner"], json!("Rich"));
        assert_eq!(
            js["all_alignments"],
            json!([{"player1": "Kelly", "player2": "Rich", "votes_together": 1}])
        );
        // A single shared vote does not reach the default threshold.
        assert_eq!(js["strong_alliances"], json!([]));
    }

    #[test]
    fn missing_metadata_is_a_single_fatal_finding() {
        let metadata: BTreeMap<u32, MetaEntry> = BTreeMap::new();
        let findings = season_findings(3, &metadata, "does/not/matter", false);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Error);
    }
}
