//! Reader for the season metadata table.

use std::collections::BTreeMap;
use std::fs;

use log::debug;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use vote_alignment::SeasonMeta;

use crate::batch::{BadSeasonKeySnafu, BatchResult, OpeningJsonSnafu, ParsingJsonSnafu};

/// One season's entry in the metadata table. Unknown fields (location, url,
/// tribe names, ...) are tolerated and dropped here, at the boundary.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct MetaEntry {
    pub name: String,
    pub year: Option<u32>,
    pub merge_episode: u32,
    pub finalists: Vec<String>,
    pub winner: String,
}

impl MetaEntry {
    pub fn to_season_meta(&self) -> SeasonMeta {
        SeasonMeta {
            name: self.name.clone(),
            year: self.year,
            finalists: self.finalists.clone(),
            winner: self.winner.clone(),
        }
    }
}

pub fn read_metadata(path: &str) -> BatchResult<BTreeMap<u32, MetaEntry>> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {
        path: path.to_string(),
    })?;
    let metadata = parse_metadata(contents.as_str(), path)?;
    debug!("read_metadata: {:?}: {} seasons", path, metadata.len());
    Ok(metadata)
}

/// The table is a JSON object keyed by the season number spelled as a string.
fn parse_metadata(contents: &str, path: &str) -> BatchResult<BTreeMap<u32, MetaEntry>> {
    let raw: BTreeMap<String, MetaEntry> = serde_json::from_str(contents).context(ParsingJsonSnafu {
        path: path.to_string(),
    })?;
    let mut res: BTreeMap<u32, MetaEntry> = BTreeMap::new();
    for (key, entry) in raw {
        let season = key
            .parse::<u32>()
            .ok()
            .context(BadSeasonKeySnafu { key: key.clone() })?;
        res.insert(season, entry);
    }
    Ok(res)
}
