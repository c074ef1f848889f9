//! Player-name substitution in node content.

use taleweaver_content::{DialogueLine, Node};

/// Longest accepted player name, in characters.
pub const MAX_PLAYER_NAME_CHARS: usize = 30;

/// Placeholder forms authors may use. Longest first, so `{{player_name}}` is
/// not half-consumed by `{player_name}`.
const PLACEHOLDERS: &[&str] = &[
    "{{player_name}}",
    "[[player_name]]",
    "{player_name}",
    "<player_name>",
];

/// Clean up a player-supplied display name.
///
/// Keeps alphanumerics, whitespace, `_`, `-`, `'` and `.`, collapses runs of
/// whitespace, and caps the length. An empty result becomes `default_name`.
pub fn normalize_player_name(raw: Option<&str>, default_name: &str) -> String {
    let Some(raw) = raw else {
        return default_name.to_string();
    };

    let filtered: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '_' | '-' | '\'' | '.'))
        .collect();
    let collapsed = filtered.split_whitespace().collect::<Vec<_>>().join(" ");
    let truncated: String = collapsed.chars().take(MAX_PLAYER_NAME_CHARS).collect();
    let name = truncated.trim_end();

    if name.is_empty() {
        default_name.to_string()
    } else {
        name.to_string()
    }
}

/// Replace every placeholder form in `text` with `player_name`.
pub fn substitute(text: &str, player_name: &str) -> String {
    PLACEHOLDERS
        .iter()
        .fold(text.to_string(), |acc, token| acc.replace(token, player_name))
}

fn substitute_opt(field: &mut Option<String>, player_name: &str) {
    if let Some(text) = field.as_mut() {
        *text = substitute(text, player_name);
    }
}

fn is_player_alias(speaker: &str, aliases: &[String]) -> bool {
    let speaker = speaker.trim();
    aliases
        .iter()
        .any(|alias| alias.trim().eq_ignore_ascii_case(speaker))
}

fn personalize_line(line: &mut DialogueLine, player_name: &str, aliases: &[String]) {
    substitute_opt(&mut line.text, player_name);
    if let Some(speaker) = line.speaker.as_mut() {
        *speaker = if is_player_alias(speaker, aliases) {
            player_name.to_string()
        } else {
            substitute(speaker, player_name)
        };
    }
}

/// Return `node` with the player's name substituted into every text field.
///
/// Ids and targets are left untouched. Dialogue speakers that match one of
/// `speaker_aliases` (case-insensitive, trimmed) become the player's name.
pub fn personalize_node(mut node: Node, player_name: &str, speaker_aliases: &[String]) -> Node {
    substitute_opt(&mut node.title, player_name);
    substitute_opt(&mut node.text, player_name);
    substitute_opt(&mut node.ending_label, player_name);
    substitute_opt(&mut node.outcome_text, player_name);

    for line in &mut node.dialogue {
        personalize_line(line, player_name, speaker_aliases);
    }

    for choice in &mut node.choices {
        substitute_opt(&mut choice.text, player_name);
        substitute_opt(&mut choice.label, player_name);
        substitute_opt(&mut choice.effect, player_name);
    }

    node
}
