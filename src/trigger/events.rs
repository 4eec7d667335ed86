use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LinearError, Result};

/// What happened to the entity, as Linear names it in a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Update,
    Remove,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Remove => "remove",
        }
    }
}

/// Events a trigger can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TriggerEvent {
    IssueCreated,
    IssueUpdated,
    IssueRemoved,
    CommentCreated,
    CommentUpdated,
    CommentRemoved,
    ProjectCreated,
    ProjectUpdated,
    ProjectRemoved,
    ProjectUpdateCreated,
    ProjectUpdateUpdated,
    ProjectUpdateRemoved,
    CycleCreated,
    CycleUpdated,
    CycleRemoved,
    IssueLabelCreated,
    IssueLabelRemoved,
    ReactionCreated,
    ReactionRemoved,
    AttachmentCreated,
    AttachmentUpdated,
    AttachmentRemoved,
    DocumentCreated,
    DocumentUpdated,
    DocumentRemoved,
}

use TriggerEvent::*;

impl TriggerEvent {
    pub const ALL: [TriggerEvent; 25] = [
        IssueCreated,
        IssueUpdated,
        IssueRemoved,
        CommentCreated,
        CommentUpdated,
        CommentRemoved,
        ProjectCreated,
        ProjectUpdated,
        ProjectRemoved,
        ProjectUpdateCreated,
        ProjectUpdateUpdated,
        ProjectUpdateRemoved,
        CycleCreated,
        CycleUpdated,
        CycleRemoved,
        IssueLabelCreated,
        IssueLabelRemoved,
        ReactionCreated,
        ReactionRemoved,
        AttachmentCreated,
        AttachmentUpdated,
        AttachmentRemoved,
        DocumentCreated,
        DocumentUpdated,
        DocumentRemoved,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IssueCreated => "issueCreated",
            IssueUpdated => "issueUpdated",
            IssueRemoved => "issueRemoved",
            CommentCreated => "commentCreated",
            CommentUpdated => "commentUpdated",
            CommentRemoved => "commentRemoved",
            ProjectCreated => "projectCreated",
            ProjectUpdated => "projectUpdated",
            ProjectRemoved => "projectRemoved",
            ProjectUpdateCreated => "projectUpdateCreated",
            ProjectUpdateUpdated => "projectUpdateUpdated",
            ProjectUpdateRemoved => "projectUpdateRemoved",
            CycleCreated => "cycleCreated",
            CycleUpdated => "cycleUpdated",
            CycleRemoved => "cycleRemoved",
            IssueLabelCreated => "issueLabelCreated",
            IssueLabelRemoved => "issueLabelRemoved",
            ReactionCreated => "reactionCreated",
            ReactionRemoved => "reactionRemoved",
            AttachmentCreated => "attachmentCreated",
            AttachmentUpdated => "attachmentUpdated",
            AttachmentRemoved => "attachmentRemoved",
            DocumentCreated => "documentCreated",
            DocumentUpdated => "documentUpdated",
            DocumentRemoved => "documentRemoved",
        }
    }

    /// Linear webhook resource type the event is delivered under.
    pub fn resource_type(self) -> &'static str {
        match self {
            IssueCreated | IssueUpdated | IssueRemoved => "Issue",
            CommentCreated | CommentUpdated | CommentRemoved => "Comment",
            ProjectCreated | ProjectUpdated | ProjectRemoved => "Project",
            ProjectUpdateCreated | ProjectUpdateUpdated | ProjectUpdateRemoved => "ProjectUpdate",
            CycleCreated | CycleUpdated | CycleRemoved => "Cycle",
            IssueLabelCreated | IssueLabelRemoved => "IssueLabel",
            ReactionCreated | ReactionRemoved => "Reaction",
            AttachmentCreated | AttachmentUpdated | AttachmentRemoved => "Attachment",
            DocumentCreated | DocumentUpdated | DocumentRemoved => "Document",
        }
    }

    pub fn action(self) -> Action {
        match self {
            IssueCreated | CommentCreated | ProjectCreated | ProjectUpdateCreated | CycleCreated
            | IssueLabelCreated | ReactionCreated | AttachmentCreated | DocumentCreated => {
                Action::Create
            }
            IssueUpdated | CommentUpdated | ProjectUpdated | ProjectUpdateUpdated | CycleUpdated
            | AttachmentUpdated | DocumentUpdated => Action::Update,
            IssueRemoved | CommentRemoved | ProjectRemoved | ProjectUpdateRemoved | CycleRemoved
            | IssueLabelRemoved | ReactionRemoved | AttachmentRemoved | DocumentRemoved => {
                Action::Remove
            }
        }
    }

    /// The event a delivery's `type` and `action` correspond to, if any.
    pub fn from_delivery(resource_type: &str, action: &str) -> Option<TriggerEvent> {
        Self::ALL
            .into_iter()
            .find(|event| event.resource_type() == resource_type && event.action().as_str() == action)
    }
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerEvent {
    type Err = LinearError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| LinearError::UnknownEvent(s.to_string()))
    }
}
