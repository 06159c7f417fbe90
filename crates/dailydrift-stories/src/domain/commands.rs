//! Commands for the Stories context.

use dailydrift_core::command::Command;
use uuid::Uuid;

use super::editorial::StorySetEdit;

/// Command to create a story set.
#[derive(Debug, Clone)]
pub struct CreateStorySet {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The submitted set.
    pub edit: StorySetEdit,
}

impl Command for CreateStorySet {
    fn command_type(&self) -> &'static str {
        "stories.create_story_set"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to reconcile an existing story set with an edit.
#[derive(Debug, Clone)]
pub struct UpdateStorySet {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The story set to edit.
    pub story_set_id: Uuid,
    /// The desired state.
    pub edit: StorySetEdit,
}

impl Command for UpdateStorySet {
    fn command_type(&self) -> &'static str {
        "stories.update_story_set"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to soft-delete a story set.
#[derive(Debug, Clone)]
pub struct DeleteStorySet {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The story set to delete.
    pub story_set_id: Uuid,
}

impl Command for DeleteStorySet {
    fn command_type(&self) -> &'static str {
        "stories.delete_story_set"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to create a category.
#[derive(Debug, Clone)]
pub struct CreateCategory {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Display name; the slug is derived from it.
    pub name: String,
}

impl Command for CreateCategory {
    fn command_type(&self) -> &'static str {
        "stories.create_category"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
