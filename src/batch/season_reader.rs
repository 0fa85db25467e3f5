//! Reader for the per-season voting data files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use vote_alignment::{SeasonRecord, VoteEvent};

use crate::batch::{BatchResult, OpeningJsonSnafu, ParsingJsonSnafu};

/// One tribal council as spelled in the data files. Presentation-only fields
/// (day, tribe, ...) are not modeled and silently dropped.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RawTribalCouncil {
    pub episode: u32,
    pub eliminated: Option<String>,
    #[serde(default)]
    pub quit: bool,
    #[serde(default)]
    pub medevac: bool,
    pub votes: BTreeMap<String, String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RawSeasonData {
    pub contestants: Vec<String>,
    pub voting_history: Vec<RawTribalCouncil>,
}

pub fn season_data_path(data_dir: &str, season: u32) -> PathBuf {
    Path::new(data_dir).join(format!("season{}.json", season))
}

pub fn read_season_file(path: &Path, phase_boundary: u32) -> BatchResult<SeasonRecord> {
    let p = path.display().to_string();
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path: p.clone() })?;
    let raw: RawSeasonData =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path: p })?;
    debug!(
        "read_season_file: {:?}: {:?} tribal councils",
        path,
        raw.voting_history.len()
    );
    Ok(to_season_record(raw, phase_boundary))
}

/// Folds the legacy quit/medevac flags into the single non-competitive flag.
/// This is the only place the legacy spelling is understood.
pub fn to_season_record(raw: RawSeasonData, phase_boundary: u32) -> SeasonRecord {
    let events: Vec<VoteEvent> = raw
        .voting_history
        .into_iter()
        .map(|tc| VoteEvent {
            round: tc.episode,
            eliminated: tc.eliminated,
            non_competitive: tc.quit || tc.medevac,
            votes: tc.votes,
        })
        .collect();
    SeasonRecord {
        participants: raw.contestants,
        events,
        phase_boundary,
    }
}
