pub use crate::config::*;

use std::collections::BTreeMap;

/// A builder for assembling a season record event by event.
///
/// ```
/// pub use vote_alignment::builder::Builder;
/// # use vote_alignment::AlignmentErrors;
///
/// let mut builder = Builder::new(7)?
///     .participants(&["Anna".to_string(), "Bob".to_string(), "Clara".to_string()])?;
///
/// builder.add_event(1, "Clara", &[("Anna", "Clara"), ("Bob", "Clara"), ("Clara", "Bob")])?;
/// builder.add_non_competitive(2, "Bob")?;
///
/// let record = builder.build();
/// assert_eq!(record.events.len(), 2);
/// # Ok::<(), AlignmentErrors>(())
/// ```
pub struct Builder {
    pub(crate) _phase_boundary: u32,
    pub(crate) _participants: Vec<String>,
    pub(crate) _events: Vec<VoteEvent>,
}

impl Builder {
    pub fn new(phase_boundary: u32) -> Result<Builder, AlignmentErrors> {
        Ok(Builder {
            _phase_boundary: phase_boundary,
            _participants: Vec::new(),
            _events: Vec::new(),
        })
    }

    pub fn participants(self, names: &[String]) -> Result<Builder, AlignmentErrors> {
        Ok(Builder {
            _phase_boundary: self._phase_boundary,
            _participants: names.to_vec(),
            _events: Vec::new(),
        })
    }

    /// Adds one elimination round. Votes are (voter, target) entries; a later
    /// entry for the same voter replaces the earlier one.
    pub fn add_event(
        &mut self,
        round: u32,
        eliminated: &str,
        votes: &[(&str, &str)],
    ) -> Result<(), AlignmentErrors> {
        let mapping: BTreeMap<String, String> = votes
            .iter()
            .map(|(v, t)| (v.to_string(), t.to_string()))
            .collect();
        self.add_event_2(&VoteEvent {
            round,
            eliminated: Some(eliminated.to_string()),
            non_competitive: false,
            votes: mapping,
        })
    }

    /// Adds a quit or medical withdrawal round, which carries no votes.
    pub fn add_non_competitive(
        &mut self,
        round: u32,
        eliminated: &str,
    ) -> Result<(), AlignmentErrors> {
        self.add_event_2(&VoteEvent {
            round,
            eliminated: Some(eliminated.to_string()),
            non_competitive: true,
            votes: BTreeMap::new(),
        })
    }

    pub fn add_event_2(&mut self, event: &VoteEvent) -> Result<(), AlignmentErrors> {
        self._events.push(event.clone());
        Ok(())
    }

    pub fn build(self) -> SeasonRecord {
        SeasonRecord {
            participants: self._participants,
            events: self._events,
            phase_boundary: self._phase_boundary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compute_alignments, AlignmentRules};

    #[test]
    fn builder_round_trip() {
        let mut builder = Builder::new(3)
            .unwrap()
            .participants(&[
                "Ana".to_string(),
                "Bob".to_string(),
                "Cleo".to_string(),
            ])
            .unwrap();
        builder
            .add_event(1, "Cleo", &[("Ana", "Cleo"), ("Bob", "Cleo"), ("Cleo", "Ana")])
            .unwrap();
        builder
            .add_event(2, "Bob", &[("Ana", "Bob"), ("Cleo", "Bob")])
            .unwrap();
        let record = builder.build();

        assert_eq!(record.phase_boundary, 3);
        assert_eq!(record.participants.len(), 3);

        let alignments = compute_alignments(&record, &AlignmentRules::DEFAULT_RULES).unwrap();
        assert_eq!(alignments.len(), 2);
        assert_eq!(alignments[0].count, 1);
    }
}
