//! Editorial changes to story sets.
//!
//! An edit submitted from the dashboard carries the full desired list of
//! stories. Reconciling it against the rows already in the set yields a
//! [`ReconcilePlan`] that a repository applies inside one transaction.

use std::collections::HashSet;

use dailydrift_core::error::DomainError;
use serde::Deserialize;
use uuid::Uuid;

use super::story::StoryKind;

/// Media fields shared by created and updated stories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryContent {
    /// Location of the image or video.
    pub media_url: String,
    /// Media kind.
    pub kind: StoryKind,
    /// Optional caption.
    pub caption: Option<String>,
    /// Nominal duration in seconds.
    pub duration: i32,
}

/// One story as submitted by the editor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryDraft {
    /// Present when the draft edits an existing story.
    #[serde(default)]
    pub id: Option<Uuid>,
    /// Location of the image or video.
    pub media_url: String,
    /// Media kind.
    #[serde(rename = "type")]
    pub kind: StoryKind,
    /// Optional caption.
    #[serde(default)]
    pub caption: Option<String>,
    /// Nominal duration in seconds.
    pub duration: i32,
}

impl StoryDraft {
    /// The media fields of this draft.
    #[must_use]
    pub fn content(&self) -> StoryContent {
        StoryContent {
            media_url: self.media_url.clone(),
            kind: self.kind,
            caption: self
                .caption
                .as_ref()
                .map(|c| c.trim().to_owned())
                .filter(|c| !c.is_empty()),
            duration: self.duration,
        }
    }
}

fn default_public() -> bool {
    true
}

/// The full desired state of a story set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorySetEdit {
    /// Display title; the slug is derived from it.
    pub title: String,
    /// Thumbnail reference.
    pub thumbnail: String,
    /// Whether the set appears in public listings.
    #[serde(default = "default_public")]
    pub is_public: bool,
    /// Author to attribute the set to; unchanged when absent on update.
    #[serde(default)]
    pub author_id: Option<Uuid>,
    /// Categories the set belongs to.
    #[serde(default)]
    pub categories: Vec<Uuid>,
    /// Tag names; unknown tags are created.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Desired stories, in play order.
    #[serde(default)]
    pub stories_to_create: Vec<StoryDraft>,
    /// Stories from other sets to move into this one.
    #[serde(default)]
    pub story_ids_to_connect: Vec<Uuid>,
}

impl StorySetEdit {
    /// Validates the fields that do not depend on stored state.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::Validation("title is required".to_owned()));
        }
        if self.thumbnail.trim().is_empty() {
            return Err(DomainError::Validation("thumbnail is required".to_owned()));
        }
        if self.categories.is_empty() {
            return Err(DomainError::Validation(
                "select at least one category".to_owned(),
            ));
        }
        if self.stories_to_create.is_empty() {
            return Err(DomainError::Validation("add at least one story".to_owned()));
        }

        let mut seen = HashSet::new();
        for (position, draft) in self.stories_to_create.iter().enumerate() {
            if draft.media_url.trim().is_empty() {
                return Err(DomainError::Validation(format!(
                    "story {position}: media url is required"
                )));
            }
            if draft.duration <= 0 {
                return Err(DomainError::Validation(format!(
                    "story {position}: duration must be a positive number of seconds"
                )));
            }
            if let Some(id) = draft.id {
                if !seen.insert(id) {
                    return Err(DomainError::Validation(format!(
                        "story {id} appears more than once"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Tag names trimmed, with blanks and duplicates removed.
    #[must_use]
    pub fn normalized_tags(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.tags
            .iter()
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .collect()
    }
}

/// An existing story overwritten by an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryUpdate {
    /// The story to overwrite.
    pub id: Uuid,
    /// Play order within the set.
    pub position: i32,
    /// New media fields.
    pub content: StoryContent,
}

/// A story created by an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryInsert {
    /// Play order within the set.
    pub position: i32,
    /// Media fields.
    pub content: StoryContent,
}

/// A story moved into the set from another set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoryConnect {
    /// The story to move.
    pub id: Uuid,
    /// Play order within the set.
    pub position: i32,
}

/// Row-level changes needed to turn a stored set into an edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Stories to remove from the set.
    pub delete: Vec<Uuid>,
    /// Existing stories to overwrite.
    pub update: Vec<StoryUpdate>,
    /// Stories to create in the set.
    pub create: Vec<StoryInsert>,
    /// Stories to move into the set from elsewhere.
    pub connect: Vec<StoryConnect>,
}

fn position_of(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

/// Computes the plan that brings a set holding `existing` stories in line
/// with `edit`.
///
/// Stories that are neither drafted nor connected are deleted. Drafted ids
/// must already belong to the set. Drafts keep their submitted order;
/// connected stories play after them.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the edit is invalid or a draft
/// references a story outside the set.
pub fn plan_reconciliation(
    existing: &[Uuid],
    edit: &StorySetEdit,
) -> Result<ReconcilePlan, DomainError> {
    edit.validate()?;

    let existing_set: HashSet<Uuid> = existing.iter().copied().collect();
    let mut kept: HashSet<Uuid> = HashSet::new();
    let mut plan = ReconcilePlan::default();

    for (index, draft) in edit.stories_to_create.iter().enumerate() {
        let position = position_of(index);
        match draft.id {
            Some(id) if existing_set.contains(&id) => {
                kept.insert(id);
                plan.update.push(StoryUpdate {
                    id,
                    position,
                    content: draft.content(),
                });
            }
            Some(id) => {
                return Err(DomainError::Validation(format!(
                    "story {id} does not belong to this story set"
                )));
            }
            None => plan.create.push(StoryInsert {
                position,
                content: draft.content(),
            }),
        }
    }

    let mut next_position = edit.stories_to_create.len();
    for id in &edit.story_ids_to_connect {
        if kept.insert(*id) && !existing_set.contains(id) {
            plan.connect.push(StoryConnect {
                id: *id,
                position: position_of(next_position),
            });
            next_position += 1;
        }
    }

    plan.delete = existing
        .iter()
        .filter(|id| !kept.contains(id))
        .copied()
        .collect();

    Ok(plan)
}

/// Computes the rows to write for a brand-new set.
///
/// Drafts that carry an id are ignored; there is nothing to update yet.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the edit is invalid or if nothing
/// is left to create or connect once id-carrying drafts are dropped.
pub fn plan_creation(edit: &StorySetEdit) -> Result<ReconcilePlan, DomainError> {
    edit.validate()?;

    let mut plan = ReconcilePlan::default();
    let mut next_position = 0;
    for draft in edit.stories_to_create.iter().filter(|d| d.id.is_none()) {
        plan.create.push(StoryInsert {
            position: position_of(next_position),
            content: draft.content(),
        });
        next_position += 1;
    }
    let mut seen = HashSet::new();
    for id in &edit.story_ids_to_connect {
        if seen.insert(*id) {
            plan.connect.push(StoryConnect {
                id: *id,
                position: position_of(next_position),
            });
            next_position += 1;
        }
    }
    if plan.create.is_empty() && plan.connect.is_empty() {
        return Err(DomainError::Validation(
            "a new story set needs at least one new or connected story".to_owned(),
        ));
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(id: Option<Uuid>, url: &str) -> StoryDraft {
        StoryDraft {
            id,
            media_url: url.to_owned(),
            kind: StoryKind::Image,
            caption: None,
            duration: 5,
        }
    }

    fn edit(stories: Vec<StoryDraft>, connect: Vec<Uuid>) -> StorySetEdit {
        StorySetEdit {
            title: "Morning Brief".to_owned(),
            thumbnail: "https://cdn.example.com/thumb.jpg".to_owned(),
            is_public: true,
            author_id: None,
            categories: vec![Uuid::new_v4()],
            tags: vec!["news".to_owned()],
            stories_to_create: stories,
            story_ids_to_connect: connect,
        }
    }

    #[test]
    fn test_plan_splits_edit_into_create_update_delete_connect() {
        // Arrange
        let kept = Uuid::new_v4();
        let dropped = Uuid::new_v4();
        let moved_in = Uuid::new_v4();
        let existing = vec![kept, dropped];
        let edit = edit(
            vec![draft(Some(kept), "https://a"), draft(None, "https://b")],
            vec![moved_in],
        );

        // Act
        let plan = plan_reconciliation(&existing, &edit).unwrap();

        // Assert
        assert_eq!(plan.delete, vec![dropped]);
        assert_eq!(plan.update.len(), 1);
        assert_eq!(plan.update[0].id, kept);
        assert_eq!(plan.update[0].position, 0);
        assert_eq!(plan.update[0].content.media_url, "https://a");
        assert_eq!(plan.create.len(), 1);
        assert_eq!(plan.create[0].position, 1);
        assert_eq!(plan.create[0].content.media_url, "https://b");
        assert_eq!(
            plan.connect,
            vec![StoryConnect {
                id: moved_in,
                position: 2
            }]
        );
    }

    #[test]
    fn test_connecting_an_existing_story_keeps_it_without_reparenting() {
        let existing_id = Uuid::new_v4();
        let edit = edit(vec![draft(None, "https://b")], vec![existing_id]);

        let plan = plan_reconciliation(&[existing_id], &edit).unwrap();

        assert!(plan.delete.is_empty());
        assert!(plan.connect.is_empty());
    }

    #[test]
    fn test_plan_rejects_draft_from_another_set() {
        let foreign = Uuid::new_v4();
        let edit = edit(vec![draft(Some(foreign), "https://a")], vec![]);

        let result = plan_reconciliation(&[Uuid::new_v4()], &edit);

        match result {
            Err(DomainError::Validation(msg)) => assert!(msg.contains(&foreign.to_string())),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_creation_ignores_drafts_with_ids() {
        let connected = Uuid::new_v4();
        let edit = edit(
            vec![draft(Some(Uuid::new_v4()), "https://a"), draft(None, "https://b")],
            vec![connected, connected],
        );

        let plan = plan_creation(&edit).unwrap();

        assert_eq!(plan.create.len(), 1);
        assert_eq!(plan.create[0].position, 0);
        assert_eq!(plan.connect, vec![StoryConnect { id: connected, position: 1 }]);
        assert!(plan.delete.is_empty());
    }

    #[test]
    fn test_plan_creation_rejects_edit_with_only_id_carrying_drafts() {
        // Arrange
        let edit = edit(vec![draft(Some(Uuid::new_v4()), "https://a")], vec![]);

        // Act
        let result = plan_creation(&edit);

        // Assert
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_validate_requires_title_category_and_stories() {
        let mut no_title = edit(vec![draft(None, "https://a")], vec![]);
        no_title.title = "   ".to_owned();
        assert!(no_title.validate().is_err());

        let mut no_category = edit(vec![draft(None, "https://a")], vec![]);
        no_category.categories.clear();
        assert!(no_category.validate().is_err());

        assert!(edit(vec![], vec![]).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_duration_and_duplicate_ids() {
        let mut zero = draft(None, "https://a");
        zero.duration = 0;
        assert!(edit(vec![zero], vec![]).validate().is_err());

        let id = Uuid::new_v4();
        let duplicated = edit(vec![draft(Some(id), "https://a"), draft(Some(id), "https://b")], vec![]);
        assert!(duplicated.validate().is_err());
    }

    #[test]
    fn test_normalized_tags_trims_and_dedupes() {
        let mut e = edit(vec![draft(None, "https://a")], vec![]);
        e.tags = vec![" news ".to_owned(), "news".to_owned(), String::new(), "sport".to_owned()];

        assert_eq!(e.normalized_tags(), vec!["news".to_owned(), "sport".to_owned()]);
    }

    #[test]
    fn test_edit_deserializes_dashboard_payload_with_defaults() {
        let json = serde_json::json!({
            "title": "Evening",
            "thumbnail": "https://cdn.example.com/t.jpg",
            "categories": [Uuid::new_v4()],
            "storiesToCreate": [
                { "mediaUrl": "https://cdn.example.com/1.jpg", "type": "IMAGE", "duration": 4 }
            ]
        });

        let edit: StorySetEdit = serde_json::from_value(json).unwrap();

        assert!(edit.is_public);
        assert!(edit.story_ids_to_connect.is_empty());
        assert_eq!(edit.stories_to_create[0].id, None);
    }
}
