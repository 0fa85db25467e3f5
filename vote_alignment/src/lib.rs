mod config;
pub mod builder;
pub mod manual;
pub mod validator;

use log::{debug, info};

use std::collections::{BTreeMap, HashMap};

pub use crate::config::*;

// **** Private structures ****

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
struct ParticipantId(u32);

fn intern(
    ids: &mut HashMap<String, ParticipantId>,
    names: &mut Vec<String>,
    name: &str,
) -> ParticipantId {
    if let Some(pid) = ids.get(name) {
        return *pid;
    }
    let pid = ParticipantId(names.len() as u32);
    names.push(name.to_string());
    ids.insert(name.to_string(), pid);
    pid
}

fn sort_pairs(pairs: &mut [AlignedPair]) {
    pairs.sort_by(|a, b| {
        b.count.cmp(&a.count).then_with(|| {
            (a.first.as_str(), a.second.as_str()).cmp(&(b.first.as_str(), b.second.as_str()))
        })
    });
}

/// Counts, for every unordered pair of participants, the rounds in which both
/// voted for the same target.
///
/// Only events with `round < phase_boundary` are folded in; the selection is
/// a filter, so the input does not have to be sorted chronologically.
/// Non-competitive rounds contribute no pairs. The result contains only pairs
/// with a count of at least 1, sorted by count descending and then by the
/// canonical pair key, so the output is identical across runs for a fixed
/// input.
pub fn compute_alignments(
    record: &SeasonRecord,
    rules: &AlignmentRules,
) -> Result<Vec<AlignedPair>, AlignmentErrors> {
    info!(
        "compute_alignments: {:?} events, {:?} participants, boundary: {:?}",
        record.events.len(),
        record.participants.len(),
        record.phase_boundary
    );

    let mut ids: HashMap<String, ParticipantId> = HashMap::new();
    let mut names: Vec<String> = Vec::new();
    for name in record.participants.iter() {
        intern(&mut ids, &mut names, name);
    }

    let mut counts: BTreeMap<(ParticipantId, ParticipantId), u32> = BTreeMap::new();
    for event in record
        .events
        .iter()
        .filter(|e| e.round < record.phase_boundary)
    {
        if event.non_competitive {
            // Quits and medical withdrawals yield no pairs, whatever their
            // vote mapping claims.
            continue;
        }
        if rules.unknown_participant == UnknownParticipantMode::Strict {
            for (voter, target) in event.votes.iter() {
                for name in [voter, target] {
                    if !ids.contains_key(name.as_str()) && name != PLACEHOLDER {
                        return Err(AlignmentErrors::UnknownParticipantReference {
                            round: event.round,
                            name: name.clone(),
                        });
                    }
                }
            }
        }
        let ballots: Vec<(&String, &String)> = event.votes.iter().collect();
        for (i, (v1, t1)) in ballots.iter().enumerate() {
            for (v2, t2) in ballots[i + 1..].iter() {
                if t1 == t2 {
                    // The vote map iterates voters in lexicographic order, so
                    // (v1, v2) is already the canonical spelling of the pair.
                    let p1 = intern(&mut ids, &mut names, v1.as_str());
                    let p2 = intern(&mut ids, &mut names, v2.as_str());
                    *counts.entry((p1, p2)).or_insert(0) += 1;
                }
            }
        }
    }
    debug!("compute_alignments: {:?} distinct pairs", counts.len());

    let mut res: Vec<AlignedPair> = counts
        .iter()
        .map(|(&(p1, p2), &count)| AlignedPair {
            first: names[p1.0 as usize].clone(),
            second: names[p2.0 as usize].clone(),
            count,
        })
        .collect();
    sort_pairs(&mut res);
    Ok(res)
}

/// Keeps the pairs with `count >= min_together`, sorted by count descending
/// and ties by canonical pair key ascending.
pub fn filter_strong(counts: &[AlignedPair], min_together: u32) -> Vec<AlignedPair> {
    let mut res: Vec<AlignedPair> = counts
        .iter()
        .filter(|p| p.count >= min_together)
        .cloned()
        .collect();
    sort_pairs(&mut res);
    res
}

/// Runs the full aggregation for one season: alignment counts plus the strong
/// subset under `rules.min_together`.
pub fn run_alignment_stats(
    record: &SeasonRecord,
    rules: &AlignmentRules,
) -> Result<SeasonStats, AlignmentErrors> {
    let alignments = compute_alignments(record, rules)?;
    let strong_alliances = filter_strong(&alignments, rules.min_together);
    let qualifying_events = record
        .events
        .iter()
        .filter(|e| e.round < record.phase_boundary)
        .count();
    info!(
        "run_alignment_stats: {:?} qualifying events, {:?} pairs, {:?} strong",
        qualifying_events,
        alignments.len(),
        strong_alliances.len()
    );
    Ok(SeasonStats {
        qualifying_events,
        total_events: record.events.len(),
        alignments,
        strong_alliances,
    })
}

/// For each finalist, the partners they shared votes with, strongest first.
pub fn finalist_alliances(
    pairs: &[AlignedPair],
    finalists: &[String],
) -> Vec<(String, Vec<(String, u32)>)> {
    let mut res: Vec<(String, Vec<(String, u32)>)> = Vec::new();
    for finalist in finalists.iter() {
        let mut partners: Vec<(String, u32)> = pairs
            .iter()
            .filter_map(|p| {
                if p.first == *finalist {
                    Some((p.second.clone(), p.count))
                } else if p.second == *finalist {
                    Some((p.first.clone(), p.count))
                } else {
                    None
                }
            })
            .collect();
        partners.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        res.push((finalist.clone(), partners));
    }
    res
}
