// Primitives for importing CSV vote exports.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;

use log::{debug, info};
use serde::Deserialize;
use serde_json::json;
use serde_json::Value as JSValue;
use snafu::prelude::*;

use vote_alignment::PLACEHOLDER;

use crate::batch::season_reader::season_data_path;
use crate::batch::{
    BatchResult, CsvOpenSnafu, CsvRecordParseSnafu, ParsingJsonSnafu, WritingJsonSnafu,
};

/// One row of a survivoR-style vote export.
#[derive(Eq, PartialEq, Debug, Clone, Deserialize)]
pub struct VoteRow {
    pub season: u32,
    pub episode: u32,
    pub castaway: String,
    pub vote: Option<String>,
    pub voted_out: Option<String>,
}

/// A tribal council being reassembled from its scattered rows.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TribalCouncilDraft {
    pub eliminated: String,
    pub votes: BTreeMap<String, String>,
}

/// Reads the export and writes one `season<N>.json` data file per season
/// found in it. Returns the season numbers written, in order.
pub fn import_votes_csv(path: &str, data_dir: &str) -> BatchResult<Vec<u32>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .context(CsvOpenSnafu {
            path: path.to_string(),
        })?;
    let mut rows: Vec<VoteRow> = Vec::new();
    for row in rdr.deserialize() {
        let row: VoteRow = row.context(CsvRecordParseSnafu {})?;
        rows.push(row);
    }
    info!("import_votes_csv: {:?}: {} rows", path, rows.len());

    let seasons = group_rows(&rows);
    fs::create_dir_all(data_dir).context(WritingJsonSnafu {
        path: data_dir.to_string(),
    })?;
    let mut written: Vec<u32> = Vec::new();
    for (season, councils) in seasons.iter() {
        let js = season_to_json(councils);
        let out_path = season_data_path(data_dir, *season);
        let pretty = serde_json::to_string_pretty(&js).context(ParsingJsonSnafu {
            path: out_path.display().to_string(),
        })?;
        fs::write(&out_path, pretty).context(WritingJsonSnafu {
            path: out_path.display().to_string(),
        })?;
        debug!("import_votes_csv: wrote {:?}", out_path);
        written.push(*season);
    }
    Ok(written)
}

/// Groups rows by season and round. Missing cells default to the placeholder;
/// a later `voted_out` cell for the same round overrides an earlier one.
fn group_rows(rows: &[VoteRow]) -> BTreeMap<u32, BTreeMap<u32, TribalCouncilDraft>> {
    let mut seasons: BTreeMap<u32, BTreeMap<u32, TribalCouncilDraft>> = BTreeMap::new();
    for row in rows.iter() {
        let council = seasons
            .entry(row.season)
            .or_default()
            .entry(row.episode)
            .or_insert_with(|| TribalCouncilDraft {
                eliminated: PLACEHOLDER.to_string(),
                votes: BTreeMap::new(),
            });
        if let Some(out) = &row.voted_out {
            if !out.is_empty() {
                council.eliminated = out.clone();
            }
        }
        if let Some(target) = &row.vote {
            if !row.castaway.is_empty() && !target.is_empty() {
                council.votes.insert(row.castaway.clone(), target.clone());
            }
        }
    }
    seasons
}

fn season_to_json(councils: &BTreeMap<u32, TribalCouncilDraft>) -> JSValue {
    // Participants in order of first appearance as voters, then any name only
    // seen as a target or eliminated.
    let mut contestants: Vec<String> = Vec::new();
    let mut seen: BTreeSet<String> = BTreeSet::new();
    for council in councils.values() {
        for voter in council.votes.keys() {
            if seen.insert(voter.clone()) {
                contestants.push(voter.clone());
            }
        }
    }
    for council in councils.values() {
        for name in council.votes.values().chain([&council.eliminated]) {
            if name != PLACEHOLDER && seen.insert(name.clone()) {
                contestants.push(name.clone());
            }
        }
    }

    let history: Vec<JSValue> = councils
        .iter()
        .map(|(episode, council)| {
            json!({
                "episode": episode,
                "eliminated": council.eliminated,
                "votes": council.votes,
            })
        })
        .collect();
    json!({
        "contestants": contestants,
        "voting_history": history,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(season: u32, episode: u32, castaway: &str, vote: &str, voted_out: &str) -> VoteRow {
        VoteRow {
            season,
            episode,
            castaway: castaway.to_string(),
            vote: Some(vote.to_string()),
            voted_out: Some(voted_out.to_string()),
        }
    }

    #[test]
    fn rows_are_grouped_by_season_and_round() {
        let rows = vec![
            row(21, 1, "Ana", "Wendy", "Wendy"),
            row(21, 1, "Bob", "Wendy", "Wendy"),
            row(21, 2, "Ana", "Shannon", "Shannon"),
            row(22, 1, "Kim", "Francesca", "Francesca"),
        ];
        let seasons = group_rows(&rows);
        assert_eq!(seasons.keys().cloned().collect::<Vec<u32>>(), vec![21, 22]);
        let s21 = seasons.get(&21).unwrap();
        assert_eq!(s21.len(), 2);
        let first = s21.get(&1).unwrap();
        assert_eq!(first.eliminated, "Wendy");
        assert_eq!(first.votes.len(), 2);
    }

    #[test]
    fn missing_cells_become_the_placeholder() {
        let rows = vec![VoteRow {
            season: 21,
            episode: 1,
            castaway: "Ana".to_string(),
            vote: Some("Wendy".to_string()),
            voted_out: None,
        }];
        let seasons = group_rows(&rows);
        let council = seasons.get(&21).unwrap().get(&1).unwrap();
        assert_eq!(council.eliminated, PLACEHOLDER);
    }

    #[test]
    fn exported_json_matches_the_data_file_layout() {
        let rows = vec![
            row(21, 1, "Ana", "Wendy", "Wendy"),
            row(21, 1, "Bob", "Wendy", "Wendy"),
            row(21, 1, "Wendy", "Bob", "Wendy"),
        ];
        let seasons = group_rows(&rows);
        let js = season_to_json(seasons.get(&21).unwrap());

        assert_eq!(js["contestants"], json!(["Ana", "Bob", "Wendy"]));
        assert_eq!(js["voting_history"][0]["episode"], json!(1));
        assert_eq!(js["voting_history"][0]["eliminated"], json!("Wendy"));
        assert_eq!(
            js["voting_history"][0]["votes"]["Ana"],
            json!("Wendy")
        );
    }
}
