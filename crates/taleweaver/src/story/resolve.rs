//! Choice resolution.
//!
//! Maps a submitted choice id on the current node to the next node id,
//! rolling a die for conditional choices. Nothing here touches storage or the
//! network; the only impurity is the injected [`DiceRoller`].

use serde::Serialize;
use taleweaver_content::Choice;
use thiserror::Error;

use super::notice::Notice;
use super::roll::DiceRoller;

pub const DEFAULT_ROLL_SIDES: i64 = 6;
pub const MIN_ROLL_SIDES: i64 = 2;
pub const MAX_ROLL_SIDES: i64 = 100;

/// Why a submitted choice could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("choice {0:?} is not available on this node")]
    ChoiceNotFound(String),

    #[error("choice {0:?} does not lead anywhere")]
    NoDestination(String),
}

/// Dice parameters after defaults and clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RollRule {
    pub sides: u32,
    pub required: u32,
}

impl RollRule {
    pub fn for_choice(choice: &Choice) -> Self {
        let sides = choice
            .roll_sides
            .unwrap_or(DEFAULT_ROLL_SIDES)
            .clamp(MIN_ROLL_SIDES, MAX_ROLL_SIDES);
        let required = choice
            .roll_required
            .unwrap_or((sides + 1) / 2)
            .clamp(1, sides);

        // Both values are within 1..=100 after clamping.
        Self {
            sides: sides as u32,
            required: required as u32,
        }
    }
}

/// A die that was actually rolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RollOutcome {
    pub roll: u32,
    pub sides: u32,
    pub required: u32,
    pub success: bool,
}

/// Where the player goes next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub next_node_id: String,
    pub roll: Option<RollOutcome>,
    pub notice: Option<Notice>,
}

/// Resolve `choice_id` against the choices of `current_node_id`.
///
/// Ids are compared as trimmed strings, so a form value of `"1"` selects a
/// choice whose remote id was the number `1`.
pub fn resolve_choice(
    current_node_id: &str,
    choices: &[Choice],
    choice_id: &str,
    roller: &dyn DiceRoller,
) -> Result<Resolution, ResolveError> {
    let wanted = choice_id.trim();
    let choice = choices
        .iter()
        .find(|c| !wanted.is_empty() && c.id.as_deref().map(str::trim) == Some(wanted))
        .ok_or_else(|| ResolveError::ChoiceNotFound(wanted.to_string()))?;

    let target = choice
        .destination()
        .ok_or_else(|| ResolveError::NoDestination(wanted.to_string()))?;

    if !choice.requires_roll {
        return Ok(Resolution {
            next_node_id: target.to_string(),
            roll: None,
            notice: None,
        });
    }

    let rule = RollRule::for_choice(choice);
    let roll = roller.roll(rule.sides);
    let success = roll >= rule.required;
    let outcome = RollOutcome {
        roll,
        sides: rule.sides,
        required: rule.required,
        success,
    };
    let summary = format!(
        "You rolled {roll} on a d{} (needed {} or higher).",
        rule.sides, rule.required
    );

    let resolution = if success {
        Resolution {
            next_node_id: target.to_string(),
            roll: Some(outcome),
            notice: Some(Notice::success(format!("{summary} Success!"))),
        }
    } else if let Some(fallback) = choice.fail_destination() {
        Resolution {
            next_node_id: fallback.to_string(),
            roll: Some(outcome),
            notice: Some(Notice::warning(format!("{summary} The attempt fails."))),
        }
    } else {
        Resolution {
            next_node_id: current_node_id.to_string(),
            roll: Some(outcome),
            notice: Some(Notice::warning(format!(
                "{summary} Nothing happens. You may try again."
            ))),
        }
    };
    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::notice::NoticeLevel;
    use crate::story::roll::FixedRoll;

    fn choice(id: &str, target: &str) -> Choice {
        Choice {
            id: Some(id.to_string()),
            text: Some(format!("go to {target}")),
            next_page_id: Some(target.to_string()),
            ..Default::default()
        }
    }

    fn rolling(id: &str, target: &str, on_fail: Option<&str>) -> Choice {
        Choice {
            requires_roll: true,
            roll_sides: Some(6),
            roll_required: Some(4),
            on_fail_target: on_fail.map(str::to_string),
            ..choice(id, target)
        }
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    #[test]
    fn unknown_choice_is_not_found() {
        let choices = vec![choice("1", "n2")];
        let err = resolve_choice("n1", &choices, "7", &FixedRoll(1)).unwrap_err();
        assert_eq!(err, ResolveError::ChoiceNotFound("7".to_string()));
    }

    #[test]
    fn node_without_choices_is_not_found() {
        let err = resolve_choice("n1", &[], "1", &FixedRoll(1)).unwrap_err();
        assert!(matches!(err, ResolveError::ChoiceNotFound(_)));
    }

    #[test]
    fn empty_submission_never_matches_choice_without_id() {
        let choices = vec![Choice {
            next_page_id: Some("n2".to_string()),
            ..Default::default()
        }];
        let err = resolve_choice("n1", &choices, "  ", &FixedRoll(1)).unwrap_err();
        assert!(matches!(err, ResolveError::ChoiceNotFound(_)));
    }

    #[test]
    fn choice_id_compared_as_trimmed_string() {
        let choices = vec![choice("1", "n2")];
        let resolution = resolve_choice("n1", &choices, " 1 ", &FixedRoll(1)).unwrap();
        assert_eq!(resolution.next_node_id, "n2");
    }

    #[test]
    fn numeric_remote_id_matches_form_value() {
        let choices: Vec<Choice> =
            serde_json::from_str(r#"[{"id": 1, "text": "Go", "next_page_id": 42}]"#).unwrap();
        let resolution = resolve_choice("n1", &choices, "1", &FixedRoll(1)).unwrap();
        assert_eq!(resolution.next_node_id, "42");
    }

    // ========================================================================
    // Targets
    // ========================================================================

    #[test]
    fn target_priority_is_next_page_then_target_node_then_target() {
        let mut c = Choice {
            id: Some("a".to_string()),
            next_page_id: Some("first".to_string()),
            target_node: Some("second".to_string()),
            target: Some("third".to_string()),
            ..Default::default()
        };
        let r = resolve_choice("n", std::slice::from_ref(&c), "a", &FixedRoll(1)).unwrap();
        assert_eq!(r.next_node_id, "first");

        c.next_page_id = Some(String::new());
        let r = resolve_choice("n", std::slice::from_ref(&c), "a", &FixedRoll(1)).unwrap();
        assert_eq!(r.next_node_id, "second");

        c.target_node = None;
        let r = resolve_choice("n", std::slice::from_ref(&c), "a", &FixedRoll(1)).unwrap();
        assert_eq!(r.next_node_id, "third");
    }

    #[test]
    fn choice_without_target_has_no_destination() {
        let choices = vec![Choice {
            id: Some("a".to_string()),
            ..Default::default()
        }];
        let err = resolve_choice("n1", &choices, "a", &FixedRoll(1)).unwrap_err();
        assert_eq!(err, ResolveError::NoDestination("a".to_string()));
    }

    #[test]
    fn plain_choice_is_deterministic() {
        let choices = vec![choice("1", "n2"), choice("2", "n3")];
        for face in 1..=6 {
            let r = resolve_choice("n1", &choices, "2", &FixedRoll(face)).unwrap();
            assert_eq!(r.next_node_id, "n3");
            assert!(r.roll.is_none());
            assert!(r.notice.is_none());
        }
    }

    // ========================================================================
    // Rolls
    // ========================================================================

    #[test]
    fn high_roll_reaches_primary_target() {
        let choices = vec![rolling("1", "win", Some("lose"))];
        let r = resolve_choice("here", &choices, "1", &FixedRoll(6)).unwrap();

        assert_eq!(r.next_node_id, "win");
        let roll = r.roll.unwrap();
        assert!(roll.success);
        assert_eq!((roll.roll, roll.sides, roll.required), (6, 6, 4));
        let notice = r.notice.unwrap();
        assert_eq!(notice.level, NoticeLevel::Success);
        assert!(notice.message.contains("6"));
        assert!(notice.message.contains("d6"));
        assert!(notice.message.contains("4"));
    }

    #[test]
    fn exact_threshold_succeeds() {
        let choices = vec![rolling("1", "win", Some("lose"))];
        let r = resolve_choice("here", &choices, "1", &FixedRoll(4)).unwrap();
        assert_eq!(r.next_node_id, "win");
    }

    #[test]
    fn low_roll_goes_to_fail_target() {
        let choices = vec![rolling("1", "win", Some("lose"))];
        let r = resolve_choice("here", &choices, "1", &FixedRoll(1)).unwrap();

        assert_eq!(r.next_node_id, "lose");
        assert!(!r.roll.unwrap().success);
        assert_eq!(r.notice.unwrap().level, NoticeLevel::Warning);
    }

    #[test]
    fn low_roll_without_fail_target_stays_put() {
        let choices = vec![rolling("1", "win", None)];
        let r = resolve_choice("here", &choices, "1", &FixedRoll(1)).unwrap();

        assert_eq!(r.next_node_id, "here");
        assert_eq!(r.notice.unwrap().level, NoticeLevel::Warning);
    }

    #[test]
    fn blank_fail_target_counts_as_unset() {
        let choices = vec![rolling("1", "win", Some("  "))];
        let r = resolve_choice("here", &choices, "1", &FixedRoll(1)).unwrap();
        assert_eq!(r.next_node_id, "here");
    }

    #[test]
    fn roll_rule_defaults() {
        let c = Choice {
            requires_roll: true,
            ..Default::default()
        };
        assert_eq!(
            RollRule::for_choice(&c),
            RollRule {
                sides: 6,
                required: 3
            }
        );

        let c = Choice {
            roll_sides: Some(7),
            ..c
        };
        assert_eq!(RollRule::for_choice(&c).required, 4);
    }

    #[test]
    fn roll_rule_clamps() {
        let c = Choice {
            roll_sides: Some(1),
            roll_required: Some(50),
            ..Default::default()
        };
        assert_eq!(
            RollRule::for_choice(&c),
            RollRule {
                sides: 2,
                required: 2
            }
        );

        let c = Choice {
            roll_sides: Some(1000),
            roll_required: Some(-3),
            ..Default::default()
        };
        assert_eq!(
            RollRule::for_choice(&c),
            RollRule {
                sides: 100,
                required: 1
            }
        );
    }

    #[test]
    fn lenient_roll_fields_from_json() {
        let choices: Vec<Choice> = serde_json::from_str(
            r#"[{"id": "r", "next_page_id": "win", "requires_roll": "true",
                 "roll_sides": "20", "roll_required": "abc"}]"#,
        )
        .unwrap();
        let rule = RollRule::for_choice(&choices[0]);
        assert_eq!(rule, RollRule { sides: 20, required: 10 });

        let r = resolve_choice("here", &choices, "r", &FixedRoll(9)).unwrap();
        assert_eq!(r.next_node_id, "here");
    }
}
