//! Play statistics aggregated from the outcome log.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::store::PlayOutcome;

/// Plays that ended on one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndingStats {
    pub ending_node_id: String,
    pub plays: usize,
    /// Share of the story's plays, rounded to one decimal.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoryStats {
    pub story_id: String,
    pub plays: usize,
    /// Most frequent endings first.
    pub endings: Vec<EndingStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayStats {
    pub total_plays: usize,
    /// Most played stories first.
    pub stories: Vec<StoryStats>,
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 * 1000.0 / whole as f64).round() / 10.0
}

/// Count plays per story and per ending.
pub fn aggregate(outcomes: &[PlayOutcome]) -> PlayStats {
    let mut by_story: BTreeMap<&str, BTreeMap<&str, usize>> = BTreeMap::new();
    for outcome in outcomes {
        *by_story
            .entry(outcome.story_id.as_str())
            .or_default()
            .entry(outcome.ending_node_id.as_str())
            .or_default() += 1;
    }

    let mut stories: Vec<StoryStats> = by_story
        .into_iter()
        .map(|(story_id, endings)| {
            let plays = endings.values().sum();
            let mut endings: Vec<EndingStats> = endings
                .into_iter()
                .map(|(ending, count)| EndingStats {
                    ending_node_id: ending.to_string(),
                    plays: count,
                    percentage: percentage(count, plays),
                })
                .collect();
            endings.sort_by(|a, b| b.plays.cmp(&a.plays));
            StoryStats {
                story_id: story_id.to_string(),
                plays,
                endings,
            }
        })
        .collect();
    stories.sort_by(|a, b| b.plays.cmp(&a.plays));

    PlayStats {
        total_plays: outcomes.len(),
        stories,
    }
}
