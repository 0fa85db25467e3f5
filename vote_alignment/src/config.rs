// ********* Input data structures ***********

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;

/// Sentinel label used by manually entered records when a name is not known
/// yet. It is accepted wherever a participant reference is expected.
pub const PLACEHOLDER: &str = "TBD";

/// One elimination round of a season.
///
/// The vote mapping goes voter -> target. Keys are unique by construction,
/// targets may repeat. A `BTreeMap` keeps the iteration order independent of
/// how the record was assembled.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoteEvent {
    /// Round index as assigned by the source material. Unique within a season
    /// (duplicates are a validation warning), not necessarily contiguous.
    pub round: u32,
    /// The participant removed this round. `None` when the source record did
    /// not carry the field at all; `Some(PLACEHOLDER)` for incomplete entries.
    pub eliminated: Option<String>,
    /// A quit or medical withdrawal. Such rounds carry no votes.
    pub non_competitive: bool,
    pub votes: BTreeMap<String, String>,
}

/// A season's complete pre-loaded data, immutable for a given analysis run.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SeasonRecord {
    /// All participant labels, unique within the season. Insertion order may
    /// carry elimination order but nothing here depends on it.
    pub participants: Vec<String>,
    /// Events in chronological order.
    pub events: Vec<VoteEvent>,
    /// Rounds with `round >= phase_boundary` are excluded from aggregation.
    pub phase_boundary: u32,
}

/// Season metadata supplied by the external lookup table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SeasonMeta {
    pub name: String,
    pub year: Option<u32>,
    /// Participants that reached the terminal stage.
    pub finalists: Vec<String>,
    /// Must be one of `finalists`.
    pub winner: String,
}

// ******** Output data structures *********

/// An unordered pair of participants and the number of rounds in which both
/// voted for the same target.
///
/// The pair is canonical: `first < second` lexicographically, so (A, B) and
/// (B, A) always collapse to one entry.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AlignedPair {
    pub first: String,
    pub second: String,
    pub count: u32,
}

/// The complete outcome of one season's aggregation.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SeasonStats {
    /// Events with `round < phase_boundary`, the only ones counted.
    pub qualifying_events: usize,
    pub total_events: usize,
    /// Every pair with count >= 1, sorted by count descending, ties by pair
    /// key ascending.
    pub alignments: Vec<AlignedPair>,
    /// The subset of `alignments` passing the `min_together` threshold.
    pub strong_alliances: Vec<AlignedPair>,
}

/// Errors that prevent the aggregation from completing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AlignmentErrors {
    /// A vote referenced a label that is neither a known participant nor the
    /// placeholder. Only raised under `UnknownParticipantMode::Strict`.
    UnknownParticipantReference { round: u32, name: String },
}

impl Error for AlignmentErrors {}

impl Display for AlignmentErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlignmentErrors::UnknownParticipantReference { round, name } => {
                write!(
                    f,
                    "unknown participant reference {:?} in round {}",
                    name, round
                )
            }
        }
    }
}

// ********* Configuration **********

/// What the counter does with a vote label that is not a known participant.
///
/// The validator always reports such labels as errors; this mode only decides
/// whether the counter itself fails fast or keeps treating labels as opaque.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum UnknownParticipantMode {
    /// Count the pair anyway and leave referential integrity to the validator.
    Lenient,
    /// Raise `AlignmentErrors::UnknownParticipantReference`.
    Strict,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AlignmentRules {
    /// Minimum shared votes for a pair to qualify as a strong alliance.
    pub min_together: u32,
    pub unknown_participant: UnknownParticipantMode,
}

impl AlignmentRules {
    pub const DEFAULT_RULES: AlignmentRules = AlignmentRules {
        min_together: 2,
        unknown_participant: UnknownParticipantMode::Lenient,
    };
}
