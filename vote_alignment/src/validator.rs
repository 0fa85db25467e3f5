//! Consistency checks for manually entered season records.
//!
//! Checks never mutate the record and never abort the run by themselves: they
//! produce an ordered list of [`Finding`]s and the caller decides whether
//! ERROR-severity findings should gate the aggregation.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt::Display;

use crate::config::{SeasonMeta, SeasonRecord, VoteEvent, PLACEHOLDER};

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Severity {
    Error,
    Warning,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARNING"),
        }
    }
}

/// The rule a finding was produced by.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum FindingKind {
    MalformedMetadata,
    /// The record or its metadata could not be located at all. Produced by
    /// callers that own the lookup, never by the checks in this module.
    MissingData,
    WinnerNotFinalist,
    UnknownParticipantReference,
    PhaseBoundaryViolation,
    MissingEliminated,
    EmptyVotes,
    InconsistentNonCompetitiveFlag,
    PluralityMismatch,
    CoverageGap,
    DuplicateRound,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Finding {
    pub severity: Severity,
    pub kind: FindingKind,
    pub message: String,
}

impl Finding {
    fn error(kind: FindingKind, message: String) -> Finding {
        Finding {
            severity: Severity::Error,
            kind,
            message,
        }
    }

    fn warning(kind: FindingKind, message: String) -> Finding {
        Finding {
            severity: Severity::Warning,
            kind,
            message,
        }
    }
}

impl Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

pub fn has_errors(findings: &[Finding]) -> bool {
    findings.iter().any(|f| f.severity == Severity::Error)
}

/// Checks the season metadata on its own: required fields filled in and the
/// winner listed among the finalists (a warning otherwise, since historical
/// tables sometimes spell the two differently).
pub fn validate_metadata(meta: &SeasonMeta) -> Vec<Finding> {
    let mut findings: Vec<Finding> = Vec::new();

    if meta.name.is_empty() {
        findings.push(Finding::error(
            FindingKind::MalformedMetadata,
            "Missing required metadata field: name".to_string(),
        ));
    }
    if meta.finalists.is_empty() {
        findings.push(Finding::error(
            FindingKind::MalformedMetadata,
            "Missing required metadata field: finalists".to_string(),
        ));
    }
    if meta.winner.is_empty() {
        findings.push(Finding::error(
            FindingKind::MalformedMetadata,
            "Missing required metadata field: winner".to_string(),
        ));
    } else if !meta.finalists.is_empty() && !meta.finalists.contains(&meta.winner) {
        findings.push(Finding::warning(
            FindingKind::WinnerNotFinalist,
            format!("Winner {:?} not in finalists list", meta.winner),
        ));
    }

    findings
}

/// Runs every check on a season record and its metadata.
///
/// Rules are checked independently; the per-event checks are skipped only
/// when the phase boundary itself is unusable, since they are meaningless
/// without it.
pub fn validate_season(record: &SeasonRecord, meta: &SeasonMeta) -> Vec<Finding> {
    let mut findings = validate_metadata(meta);

    if record.phase_boundary < 1 {
        findings.push(Finding::error(
            FindingKind::MalformedMetadata,
            format!("Invalid phase boundary: {}", record.phase_boundary),
        ));
        return findings;
    }

    let known: HashSet<&str> = record.participants.iter().map(|s| s.as_str()).collect();

    for finalist in meta.finalists.iter() {
        if !known.contains(finalist.as_str()) {
            findings.push(Finding::error(
                FindingKind::UnknownParticipantReference,
                format!(
                    "Finalist {:?} from metadata not found in participants",
                    finalist
                ),
            ));
        }
    }
    if !meta.winner.is_empty() && !known.contains(meta.winner.as_str()) {
        findings.push(Finding::error(
            FindingKind::UnknownParticipantReference,
            format!("Winner {:?} from metadata not found in participants", meta.winner),
        ));
    }

    let mut qualifying_rounds: Vec<u32> = Vec::new();
    for (idx, event) in record.events.iter().enumerate() {
        let label = format!("event #{} (round {})", idx + 1, event.round);

        if event.round >= record.phase_boundary {
            findings.push(Finding::error(
                FindingKind::PhaseBoundaryViolation,
                format!(
                    "{}: round {} is past the boundary {}, only rounds 1-{} belong here",
                    label,
                    event.round,
                    record.phase_boundary,
                    record.phase_boundary - 1
                ),
            ));
        } else {
            qualifying_rounds.push(event.round);
        }

        if event.eliminated.is_none() {
            findings.push(Finding::error(
                FindingKind::MissingEliminated,
                format!("{}: missing eliminated participant", label),
            ));
        }

        if event.non_competitive {
            if !event.votes.is_empty() {
                findings.push(Finding::warning(
                    FindingKind::InconsistentNonCompetitiveFlag,
                    format!("{}: non-competitive round should have no votes", label),
                ));
            }
            // Vote-level checks do not apply to quits and withdrawals.
            continue;
        }

        let is_placeholder_round = event.eliminated.as_deref() == Some(PLACEHOLDER);
        if event.votes.is_empty() && !is_placeholder_round {
            findings.push(Finding::error(
                FindingKind::EmptyVotes,
                format!("{}: empty votes without a non-competitive flag", label),
            ));
        }

        if let Some(eliminated) = event.eliminated.as_deref() {
            if eliminated != PLACEHOLDER && !known.contains(eliminated) {
                findings.push(Finding::error(
                    FindingKind::UnknownParticipantReference,
                    format!("{}: eliminated participant {:?} is unknown", label, eliminated),
                ));
            }
        }

        for (voter, target) in event.votes.iter() {
            if voter != PLACEHOLDER && !known.contains(voter.as_str()) {
                findings.push(Finding::error(
                    FindingKind::UnknownParticipantReference,
                    format!("{}: voter {:?} is unknown", label, voter),
                ));
            }
            if target != PLACEHOLDER && !known.contains(target.as_str()) {
                findings.push(Finding::error(
                    FindingKind::UnknownParticipantReference,
                    format!("{}: vote target {:?} is unknown", label, target),
                ));
            }
        }

        if let Some(finding) = check_plurality(event, &label) {
            findings.push(finding);
        }
    }

    findings.extend(check_round_coverage(&qualifying_rounds, record.phase_boundary));

    findings
}

/// Advisory check that the eliminated participant received a plurality of the
/// votes. Ties count as a plurality; idols and revotes legitimately break the
/// naive tally, hence a warning rather than an error.
fn check_plurality(event: &VoteEvent, label: &str) -> Option<Finding> {
    let eliminated = match event.eliminated.as_deref() {
        Some(e) if e != PLACEHOLDER => e,
        _ => return None,
    };
    if event.votes.is_empty() {
        return None;
    }

    let mut tally: BTreeMap<&str, u32> = BTreeMap::new();
    for target in event.votes.values() {
        *tally.entry(target.as_str()).or_insert(0) += 1;
    }
    let max_count = *tally.values().max().unwrap_or(&0);
    let received = *tally.get(eliminated).unwrap_or(&0);
    if received >= max_count {
        return None;
    }
    let (mode, _) = tally
        .iter()
        .find(|(_, &count)| count == max_count)
        .expect("non-empty tally has a mode");
    Some(Finding::warning(
        FindingKind::PluralityMismatch,
        format!(
            "{}: eliminated participant {:?} did not receive a plurality of votes ({:?} had {})",
            label, eliminated, mode, max_count
        ),
    ))
}

/// The qualifying rounds should cover `[1, boundary - 1]` exactly once each.
/// Both gaps and duplicates are advisory: revotes and off-by-one metadata
/// entry are common legitimate sources.
fn check_round_coverage(qualifying_rounds: &[u32], phase_boundary: u32) -> Vec<Finding> {
    let mut findings: Vec<Finding> = Vec::new();

    let seen: BTreeSet<u32> = qualifying_rounds.iter().cloned().collect();
    let missing: Vec<u32> = (1..phase_boundary).filter(|r| !seen.contains(r)).collect();
    if !missing.is_empty() {
        findings.push(Finding::warning(
            FindingKind::CoverageGap,
            format!(
                "Missing round(s) in voting data: {:?}. Expected rounds 1-{}",
                missing,
                phase_boundary - 1
            ),
        ));
    }

    let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
    for round in qualifying_rounds.iter() {
        *counts.entry(*round).or_insert(0) += 1;
    }
    let duplicates: Vec<u32> = counts
        .iter()
        .filter_map(|(&r, &c)| if c > 1 { Some(r) } else { None })
        .collect();
    if !duplicates.is_empty() {
        findings.push(Finding::warning(
            FindingKind::DuplicateRound,
            format!("Duplicate round(s) in voting data: {:?}", duplicates),
        ));
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VoteEvent;
    use std::collections::BTreeMap;

    fn votes(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(v, t)| (v.to_string(), t.to_string()))
            .collect()
    }

    fn event(round: u32, eliminated: &str, entries: &[(&str, &str)]) -> VoteEvent {
        VoteEvent {
            round,
            eliminated: Some(eliminated.to_string()),
            non_competitive: false,
            votes: votes(entries),
        }
    }

    fn meta(finalists: &[&str], winner: &str) -> SeasonMeta {
        SeasonMeta {
            name: "Test Season".to_string(),
            year: Some(2000),
            finalists: finalists.iter().map(|s| s.to_string()).collect(),
            winner: winner.to_string(),
        }
    }

    fn record(participants: &[&str], phase_boundary: u32, events: Vec<VoteEvent>) -> SeasonRecord {
        SeasonRecord {
            participants: participants.iter().map(|s| s.to_string()).collect(),
            events,
            phase_boundary,
        }
    }

    fn kinds(findings: &[Finding]) -> Vec<FindingKind> {
        findings.iter().map(|f| f.kind).collect()
    }

    #[test]
    fn clean_season_has_no_findings() {
        let rec = record(
            &["A", "B", "C", "D"],
            3,
            vec![
                event(1, "D", &[("A", "D"), ("B", "D"), ("C", "D"), ("D", "A")]),
                event(2, "C", &[("A", "C"), ("B", "C"), ("C", "A")]),
            ],
        );
        let findings = validate_season(&rec, &meta(&["A", "B"], "A"));
        assert_eq!(findings, vec![]);
    }

    #[test]
    fn winner_outside_finalists_is_one_warning() {
        let m = meta(&["R", "S"], "Q");
        let rec = record(
            &["Q", "R", "S"],
            2,
            vec![event(1, "S", &[("Q", "S"), ("R", "S"), ("S", "Q")])],
        );
        let findings = validate_season(&rec, &m);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert_eq!(findings[0].kind, FindingKind::WinnerNotFinalist);
    }

    #[test]
    fn empty_finalists_is_an_error() {
        let m = meta(&[], "A");
        let findings = validate_metadata(&m);
        assert_eq!(kinds(&findings), vec![FindingKind::MalformedMetadata]);
        assert!(has_errors(&findings));
    }

    #[test]
    fn finalist_and_winner_must_be_participants() {
        let rec = record(
            &["A", "B"],
            2,
            vec![event(1, "B", &[("A", "B"), ("B", "A")])],
        );
        let findings = validate_season(&rec, &meta(&["A", "Ghost"], "Ghost"));
        // Ghost as finalist and Ghost as winner are two separate errors.
        assert_eq!(
            kinds(&findings),
            vec![
                FindingKind::UnknownParticipantReference,
                FindingKind::UnknownParticipantReference
            ]
        );
    }

    #[test]
    fn event_past_boundary_is_an_error() {
        let rec = record(
            &["A", "B", "C"],
            2,
            vec![
                event(1, "C", &[("A", "C"), ("B", "C"), ("C", "A")]),
                event(2, "B", &[("A", "B"), ("C", "B")]),
            ],
        );
        let findings = validate_season(&rec, &meta(&["A"], "A"));
        assert_eq!(kinds(&findings), vec![FindingKind::PhaseBoundaryViolation]);
    }

    #[test]
    fn invalid_boundary_skips_event_checks() {
        let rec = record(&["A"], 0, vec![event(1, "Ghost", &[])]);
        let findings = validate_season(&rec, &meta(&["A"], "A"));
        assert_eq!(kinds(&findings), vec![FindingKind::MalformedMetadata]);
    }

    #[test]
    fn quit_with_votes_is_a_warning() {
        let mut quit = event(1, "B", &[("A", "C")]);
        quit.non_competitive = true;
        let rec = record(
            &["A", "B", "C"],
            3,
            vec![quit, event(2, "C", &[("A", "C"), ("B", "C"), ("C", "A")])],
        );
        let findings = validate_season(&rec, &meta(&["A"], "A"));
        assert_eq!(
            kinds(&findings),
            vec![FindingKind::InconsistentNonCompetitiveFlag]
        );
        assert!(!has_errors(&findings));
    }

    #[test]
    fn empty_votes_without_flag_is_an_error() {
        let rec = record(
            &["A", "B"],
            3,
            vec![
                event(1, "B", &[]),
                event(2, "A", &[("A", "B"), ("B", "A")]),
            ],
        );
        let findings = validate_season(&rec, &meta(&["A"], "A"));
        assert!(kinds(&findings).contains(&FindingKind::EmptyVotes));
    }

    #[test]
    fn placeholder_round_may_have_empty_votes() {
        let rec = record(
            &["A", "B"],
            3,
            vec![
                event(1, "TBD", &[]),
                event(2, "B", &[("A", "B"), ("B", "A")]),
            ],
        );
        let findings = validate_season(&rec, &meta(&["A"], "A"));
        assert_eq!(findings, vec![]);
    }

    #[test]
    fn missing_eliminated_is_an_error() {
        let mut ev = event(1, "B", &[("A", "B"), ("B", "A")]);
        ev.eliminated = None;
        let rec = record(&["A", "B"], 2, vec![ev]);
        let findings = validate_season(&rec, &meta(&["A"], "A"));
        assert_eq!(kinds(&findings), vec![FindingKind::MissingEliminated]);
    }

    #[test]
    fn unknown_voter_and_target_are_errors() {
        let rec = record(
            &["A", "B"],
            2,
            vec![event(1, "B", &[("A", "B"), ("Nate", "Omar")])],
        );
        let findings = validate_season(&rec, &meta(&["A"], "A"));
        assert_eq!(
            kinds(&findings),
            vec![
                FindingKind::UnknownParticipantReference,
                FindingKind::UnknownParticipantReference
            ]
        );
    }

    #[test]
    fn plurality_mismatch_is_one_warning() {
        // M eliminated with one vote while B drew two.
        let rec = record(
            &["A", "B", "C", "D", "M"],
            2,
            vec![event(1, "M", &[("A", "B"), ("C", "B"), ("D", "M")])],
        );
        let findings = validate_season(&rec, &meta(&["A"], "A"));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::PluralityMismatch);
        assert_eq!(findings[0].severity, Severity::Warning);
    }

    #[test]
    fn tied_plurality_is_not_flagged() {
        let rec = record(
            &["A", "B", "C", "D"],
            2,
            vec![event(1, "B", &[("A", "B"), ("B", "A"), ("C", "A"), ("D", "B")])],
        );
        let findings = validate_season(&rec, &meta(&["A"], "A"));
        assert_eq!(findings, vec![]);
    }

    #[test]
    fn coverage_gap_and_duplicates_are_warnings() {
        let rec = record(
            &["A", "B", "C"],
            4,
            vec![
                event(1, "C", &[("A", "C"), ("B", "C"), ("C", "A")]),
                event(1, "B", &[("A", "B"), ("C", "B")]),
            ],
        );
        let findings = validate_season(&rec, &meta(&["A"], "A"));
        assert_eq!(
            kinds(&findings),
            vec![FindingKind::CoverageGap, FindingKind::DuplicateRound]
        );
        assert!(!has_errors(&findings));
    }
}
