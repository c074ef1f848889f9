//! Story graph diagnostics for authors.
//!
//! Builds a snapshot of a story's node graph, finds nodes that cannot be
//! reached from the start and choices that point at nodes which do not
//! exist, and lays the result out as a renderable element list.
//!
//! Runs in O(N + E) for N nodes and E choices. Nothing is persisted.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use serde::Serialize;
use taleweaver_content::{Node, StoryDetail};

pub const TITLE_MAX_CHARS: usize = 42;
pub const CHOICE_LABEL_MAX_CHARS: usize = 56;
pub const PREVIEW_MAX_CHARS: usize = 280;

const ELLIPSIS: char = '…';
const MISSING_PREFIX: &str = "missing::";

// ============================================================================
// Payload
// ============================================================================

/// Diagnostics for one story.
#[derive(Debug, Clone, Serialize)]
pub struct GraphDiagnostics {
    pub story_id: String,
    pub title: String,
    /// Declared node ids, in declaration order.
    pub node_ids: Vec<String>,
    pub start_node_id: Option<String>,
    /// Declared targets reachable from each declared node.
    pub adjacency: BTreeMap<String, Vec<String>>,
    /// Targets referenced by a choice but not declared, in first-seen order.
    pub missing_targets: Vec<String>,
    /// Choices whose target is not a declared node.
    pub broken_edges: usize,
    pub reachable: Vec<String>,
    pub unreachable: Vec<String>,
    pub elements: Vec<GraphElement>,
    pub summary: GraphSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphSummary {
    pub node_count: usize,
    pub edge_count: usize,
    pub reachable_count: usize,
    pub unreachable_count: usize,
    pub broken_edge_count: usize,
    pub missing_target_count: usize,
}

/// One drawable element, tagged `{"group": "nodes" | "edges", ...}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "group", rename_all = "lowercase")]
pub enum GraphElement {
    Nodes { data: NodeData, classes: String },
    Edges { data: EdgeData, classes: String },
}

impl GraphElement {
    pub fn classes(&self) -> &str {
        match self {
            Self::Nodes { classes, .. } | Self::Edges { classes, .. } => classes,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeData {
    pub id: String,
    pub label: String,
    pub preview: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EdgeData {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choice_id: Option<String>,
    pub requires_roll: bool,
}

// ============================================================================
// Text helpers
// ============================================================================

/// Cut `text` to at most `max` characters, the last being `…` when cut.
pub fn truncate_label(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push(ELLIPSIS);
    out
}

fn preview(node: &Node) -> String {
    node.text
        .as_deref()
        .unwrap_or_default()
        .chars()
        .take(PREVIEW_MAX_CHARS)
        .collect()
}

fn node_label(node: &Node) -> String {
    let title = node
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Page {}", node.id));
    truncate_label(&title, TITLE_MAX_CHARS)
}

fn missing_id(target: &str) -> String {
    format!("{MISSING_PREFIX}{target}")
}

// ============================================================================
// Analysis
// ============================================================================

/// Analyze a story snapshot.
pub fn diagnose(story: &StoryDetail) -> GraphDiagnostics {
    // Declared nodes; the first declaration of a duplicated id wins.
    let mut declared: HashMap<&str, &Node> = HashMap::new();
    let mut node_ids: Vec<String> = Vec::new();
    for node in &story.pages {
        if !declared.contains_key(node.id.as_str()) {
            declared.insert(node.id.as_str(), node);
            node_ids.push(node.id.clone());
        }
    }

    let start_node_id = story
        .start_node_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| node_ids.first().cloned());

    let mut adjacency: BTreeMap<String, Vec<String>> =
        node_ids.iter().map(|id| (id.clone(), Vec::new())).collect();
    let mut missing_targets: Vec<String> = Vec::new();
    let mut missing_seen: HashSet<&str> = HashSet::new();
    let mut broken_edges = 0;
    let mut edges: Vec<GraphElement> = Vec::new();
    let mut edge_ids: HashSet<String> = HashSet::new();
    let mut needs_untargeted_placeholder = false;

    for node in &story.pages {
        for (position, choice) in node.choices.iter().enumerate() {
            let destination = choice.destination();
            let is_declared = destination.is_some_and(|t| declared.contains_key(t));

            let target_element = match destination {
                Some(target) if is_declared => {
                    if let Some(targets) = adjacency.get_mut(node.id.as_str())
                        && !targets.iter().any(|t| t == target)
                    {
                        targets.push(target.to_string());
                    }
                    target.to_string()
                }
                Some(target) => {
                    if missing_seen.insert(target) {
                        missing_targets.push(target.to_string());
                    }
                    missing_id(target)
                }
                None => {
                    needs_untargeted_placeholder = true;
                    missing_id("")
                }
            };
            if !is_declared {
                broken_edges += 1;
            }

            let id = unique_edge_id(
                &mut edge_ids,
                &node.id,
                &target_element,
                choice.id.as_deref(),
                position,
            );
            let label = truncate_label(
                choice.display_text().unwrap_or("(no text)"),
                CHOICE_LABEL_MAX_CHARS,
            );
            edges.push(GraphElement::Edges {
                data: EdgeData {
                    id,
                    source: node.id.clone(),
                    target: target_element,
                    label,
                    choice_id: choice.id.clone(),
                    requires_roll: choice.requires_roll,
                },
                classes: if is_declared { String::new() } else { "broken".to_string() },
            });
        }
    }

    let reachable_set = match start_node_id.as_deref() {
        Some(start) if declared.contains_key(start) => reachable_from(start, &adjacency),
        _ => HashSet::new(),
    };
    let (reachable, unreachable): (Vec<String>, Vec<String>) = node_ids
        .iter()
        .cloned()
        .partition(|id| reachable_set.contains(id.as_str()));

    let mut elements: Vec<GraphElement> = Vec::with_capacity(node_ids.len() + edges.len());
    for id in &node_ids {
        let node = declared[id.as_str()];
        let mut classes = Vec::new();
        if start_node_id.as_deref() == Some(id.as_str()) {
            classes.push("start");
        }
        if node.is_terminal() {
            classes.push("ending");
        }
        if !reachable_set.contains(id.as_str()) {
            classes.push("unreachable");
        }
        elements.push(GraphElement::Nodes {
            data: NodeData {
                id: id.clone(),
                label: node_label(node),
                preview: preview(node),
            },
            classes: classes.join(" "),
        });
    }
    for target in &missing_targets {
        elements.push(missing_placeholder(&missing_id(target), target));
    }
    if needs_untargeted_placeholder {
        elements.push(missing_placeholder(&missing_id(""), "(no target)"));
    }
    let edge_count = edges.len();
    elements.extend(edges);

    let summary = GraphSummary {
        node_count: node_ids.len(),
        edge_count,
        reachable_count: reachable.len(),
        unreachable_count: unreachable.len(),
        broken_edge_count: broken_edges,
        missing_target_count: missing_targets.len(),
    };

    GraphDiagnostics {
        story_id: story.id.clone(),
        title: story.title.clone(),
        node_ids,
        start_node_id,
        adjacency,
        missing_targets,
        broken_edges,
        reachable,
        unreachable,
        elements,
        summary,
    }
}

fn missing_placeholder(id: &str, target: &str) -> GraphElement {
    GraphElement::Nodes {
        data: NodeData {
            id: id.to_string(),
            label: truncate_label(&format!("Missing: {target}"), TITLE_MAX_CHARS),
            preview: String::new(),
        },
        classes: "missing".to_string(),
    }
}

/// Breadth-first walk over declared edges.
fn reachable_from<'a>(
    start: &'a str,
    adjacency: &'a BTreeMap<String, Vec<String>>,
) -> HashSet<&'a str> {
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        for next in adjacency.get(current).into_iter().flatten() {
            if seen.insert(next.as_str()) {
                queue.push_back(next.as_str());
            }
        }
    }
    seen
}

/// Compose a stable edge id, falling back to the choice position when the
/// choice id is absent or already used.
fn unique_edge_id(
    taken: &mut HashSet<String>,
    source: &str,
    target: &str,
    choice_id: Option<&str>,
    position: usize,
) -> String {
    let base = format!("{source}->{target}");
    let mut candidates = choice_id
        .map(|cid| format!("{base}#{cid}"))
        .into_iter()
        .chain(std::iter::once(format!("{base}#{position}")));

    let mut id = candidates.find(|c| !taken.contains(c)).unwrap_or_default();
    let mut suffix = 1;
    while id.is_empty() || taken.contains(&id) {
        id = format!("{base}#{position}.{suffix}");
        suffix += 1;
    }
    taken.insert(id.clone());
    id
}
