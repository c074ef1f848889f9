//! In-memory content source.
//!
//! Holds whole stories in process memory and supports the authoring
//! operations. The binary never constructs it; it is the content double for
//! the unit tests and the router tests under `tests/`, with
//! [`MemoryContent::set_unavailable`] standing in for a sleeping host.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use taleweaver_content::{
    Choice, ChoiceDraft, Node, NodeDraft, StoryDetail, StoryDraft, StorySummary,
};

use super::{ContentError, ContentResult, ContentSource};

/// Stories kept in memory, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryContent {
    stories: RwLock<Vec<StoryDetail>>,
    unavailable: AtomicBool,
    next_id: AtomicU64,
}

fn not_found(what: &str, id: &str) -> ContentError {
    ContentError::Api {
        status: 404,
        message: format!("{what} {id} not found"),
    }
}

fn summary(story: &StoryDetail) -> StorySummary {
    StorySummary {
        id: story.id.clone(),
        title: story.title.clone(),
        description: story.description.clone(),
        status: story.status.clone(),
    }
}

fn apply_node_draft(node: &mut Node, draft: &NodeDraft) {
    node.title = draft.title.clone();
    node.text = draft.text.clone();
    node.is_ending = draft.is_ending;
    node.ending_label = draft.ending_label.clone();
    node.image = draft.image.clone();
}

fn apply_choice_draft(choice: &mut Choice, draft: &ChoiceDraft) {
    choice.text = draft.text.clone();
    choice.next_page_id = draft.next_page_id.clone();
    choice.requires_roll = draft.requires_roll;
    choice.roll_sides = draft.roll_sides;
    choice.roll_required = draft.roll_required;
    choice.on_fail_target = draft.on_fail_target.clone();
}

impl MemoryContent {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1000),
            ..Default::default()
        }
    }

    /// Builder-style [`MemoryContent::insert_story`].
    pub fn with_story(self, story: StoryDetail) -> Self {
        self.insert_story(story);
        self
    }

    /// Add a story, replacing any story with the same id.
    pub fn insert_story(&self, story: StoryDetail) {
        let mut stories = self.write();
        stories.retain(|s| s.id != story.id);
        stories.push(story);
    }

    /// Make every call fail as if the remote host were asleep.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> ContentResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(ContentError::Unavailable { status: 503 })
        } else {
            Ok(())
        }
    }

    fn next_id(&self) -> String {
        self.next_id.fetch_add(1, Ordering::SeqCst).to_string()
    }

    // A poisoned lock only means another test thread panicked mid-write; the
    // data is still usable.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<StoryDetail>> {
        self.stories.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<StoryDetail>> {
        self.stories.write().unwrap_or_else(|e| e.into_inner())
    }

    fn find_story<T>(&self, story_id: &str, f: impl FnOnce(&StoryDetail) -> T) -> Option<T> {
        self.read().iter().find(|s| s.id == story_id).map(f)
    }

    fn with_node_mut<T>(&self, node_id: &str, f: impl FnOnce(&mut Node) -> T) -> ContentResult<T> {
        let mut stories = self.write();
        stories
            .iter_mut()
            .flat_map(|s| s.pages.iter_mut())
            .find(|n| n.id == node_id)
            .map(f)
            .ok_or_else(|| not_found("node", node_id))
    }

    fn with_choice_mut<T>(
        &self,
        choice_id: &str,
        f: impl FnOnce(&mut Choice) -> T,
    ) -> ContentResult<T> {
        let mut stories = self.write();
        stories
            .iter_mut()
            .flat_map(|s| s.pages.iter_mut())
            .flat_map(|n| n.choices.iter_mut())
            .find(|c| c.id.as_deref() == Some(choice_id))
            .map(f)
            .ok_or_else(|| not_found("choice", choice_id))
    }
}

#[async_trait]
impl ContentSource for MemoryContent {
    async fn list_stories(&self, status: Option<&str>) -> ContentResult<Vec<StorySummary>> {
        self.check_available()?;
        let wanted = status.map(str::trim).filter(|s| !s.is_empty());
        Ok(self
            .read()
            .iter()
            .filter(|s| match wanted {
                Some(wanted) => s
                    .status
                    .as_deref()
                    .is_some_and(|status| status.eq_ignore_ascii_case(wanted)),
                None => true,
            })
            .map(summary)
            .collect())
    }

    async fn story_start(&self, story_id: &str) -> ContentResult<Option<Node>> {
        self.check_available()?;
        Ok(self
            .find_story(story_id, |story| {
                let declared = story
                    .start_node_id
                    .as_deref()
                    .and_then(|start| story.pages.iter().find(|n| n.id == start));
                declared.or(story.pages.first()).cloned()
            })
            .flatten())
    }

    async fn node(&self, story_id: &str, node_id: &str) -> ContentResult<Option<Node>> {
        self.check_available()?;
        Ok(self
            .find_story(story_id, |story| {
                story.pages.iter().find(|n| n.id == node_id).cloned()
            })
            .flatten())
    }

    async fn story_detail(&self, story_id: &str) -> ContentResult<Option<StoryDetail>> {
        self.check_available()?;
        Ok(self.find_story(story_id, StoryDetail::clone))
    }

    async fn story_nodes(&self, story_id: &str) -> ContentResult<Vec<Node>> {
        self.check_available()?;
        Ok(self
            .find_story(story_id, |story| story.pages.clone())
            .unwrap_or_default())
    }

    async fn create_story(&self, draft: &StoryDraft) -> ContentResult<StoryDetail> {
        self.check_available()?;
        let story = StoryDetail {
            id: self.next_id(),
            title: draft.title.clone().unwrap_or_default(),
            description: draft.description.clone(),
            status: draft.status.clone(),
            start_node_id: draft.start_page_id.clone(),
            pages: Vec::new(),
        };
        self.write().push(story.clone());
        Ok(story)
    }

    async fn update_story(&self, story_id: &str, draft: &StoryDraft) -> ContentResult<StoryDetail> {
        self.check_available()?;
        let mut stories = self.write();
        let story = stories
            .iter_mut()
            .find(|s| s.id == story_id)
            .ok_or_else(|| not_found("story", story_id))?;
        if let Some(title) = &draft.title {
            story.title = title.clone();
        }
        if draft.description.is_some() {
            story.description = draft.description.clone();
        }
        if draft.status.is_some() {
            story.status = draft.status.clone();
        }
        if draft.start_page_id.is_some() {
            story.start_node_id = draft.start_page_id.clone();
        }
        Ok(story.clone())
    }

    async fn delete_story(&self, story_id: &str) -> ContentResult<()> {
        self.check_available()?;
        let mut stories = self.write();
        let before = stories.len();
        stories.retain(|s| s.id != story_id);
        if stories.len() == before {
            return Err(not_found("story", story_id));
        }
        Ok(())
    }

    async fn create_node(&self, story_id: &str, draft: &NodeDraft) -> ContentResult<Node> {
        self.check_available()?;
        let mut node = Node {
            id: self.next_id(),
            ..Default::default()
        };
        apply_node_draft(&mut node, draft);

        let mut stories = self.write();
        let story = stories
            .iter_mut()
            .find(|s| s.id == story_id)
            .ok_or_else(|| not_found("story", story_id))?;
        story.pages.push(node.clone());
        Ok(node)
    }

    async fn update_node(&self, node_id: &str, draft: &NodeDraft) -> ContentResult<Node> {
        self.check_available()?;
        self.with_node_mut(node_id, |node| {
            apply_node_draft(node, draft);
            node.clone()
        })
    }

    async fn delete_node(&self, node_id: &str) -> ContentResult<()> {
        self.check_available()?;
        let mut stories = self.write();
        for story in stories.iter_mut() {
            if let Some(pos) = story.pages.iter().position(|n| n.id == node_id) {
                story.pages.remove(pos);
                return Ok(());
            }
        }
        Err(not_found("node", node_id))
    }

    async fn create_choice(&self, node_id: &str, draft: &ChoiceDraft) -> ContentResult<Choice> {
        self.check_available()?;
        let mut choice = Choice {
            id: Some(self.next_id()),
            ..Default::default()
        };
        apply_choice_draft(&mut choice, draft);
        self.with_node_mut(node_id, |node| node.choices.push(choice.clone()))?;
        Ok(choice)
    }

    async fn update_choice(&self, choice_id: &str, draft: &ChoiceDraft) -> ContentResult<Choice> {
        self.check_available()?;
        self.with_choice_mut(choice_id, |choice| {
            apply_choice_draft(choice, draft);
            choice.clone()
        })
    }

    async fn delete_choice(&self, choice_id: &str) -> ContentResult<()> {
        self.check_available()?;
        let mut stories = self.write();
        for node in stories.iter_mut().flat_map(|s| s.pages.iter_mut()) {
            if let Some(pos) = node
                .choices
                .iter()
                .position(|c| c.id.as_deref() == Some(choice_id))
            {
                node.choices.remove(pos);
                return Ok(());
            }
        }
        Err(not_found("choice", choice_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story() -> StoryDetail {
        StoryDetail {
            id: "s1".to_string(),
            title: "Cave".to_string(),
            status: Some("published".to_string()),
            start_node_id: Some("b".to_string()),
            pages: vec![
                Node {
                    id: "a".to_string(),
                    ..Default::default()
                },
                Node {
                    id: "b".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn start_prefers_declared_node() {
        let content = MemoryContent::new().with_story(story());
        let start = content.story_start("s1").await.unwrap().unwrap();
        assert_eq!(start.id, "b");
    }

    #[tokio::test]
    async fn start_falls_back_to_first_page() {
        let mut s = story();
        s.start_node_id = Some("gone".to_string());
        let content = MemoryContent::new().with_story(s);
        let start = content.story_start("s1").await.unwrap().unwrap();
        assert_eq!(start.id, "a");
    }

    #[tokio::test]
    async fn unavailable_fails_every_read() {
        let content = MemoryContent::new().with_story(story());
        content.set_unavailable(true);

        let err = content.node("s1", "a").await.unwrap_err();
        assert!(err.is_unavailable());
        assert!(content.list_stories(None).await.unwrap_err().is_unavailable());
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let content = MemoryContent::new().with_story(story());
        assert_eq!(content.list_stories(Some("Published")).await.unwrap().len(), 1);
        assert!(content.list_stories(Some("draft")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn authoring_round_trip() {
        let content = MemoryContent::new();
        let created = content
            .create_story(&StoryDraft {
                title: Some("New".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let node = content
            .create_node(
                &created.id,
                &NodeDraft {
                    title: Some("Start".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let choice = content
            .create_choice(
                &node.id,
                &ChoiceDraft {
                    text: Some("Loop".to_string()),
                    next_page_id: Some(node.id.clone()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let detail = content.story_detail(&created.id).await.unwrap().unwrap();
        assert_eq!(detail.pages.len(), 1);
        assert_eq!(detail.pages[0].choices[0].id, choice.id);

        let choice_id = choice.id.unwrap();
        content.delete_choice(&choice_id).await.unwrap();
        assert!(content.delete_choice(&choice_id).await.is_err());
        content.delete_story(&created.id).await.unwrap();
        assert!(content.story_detail(&created.id).await.unwrap().is_none());
    }
}
