//! Field selections shared by the query documents of every resource.

pub const PAGE_INFO: &str = r#"
        pageInfo {
            hasNextPage
            endCursor
        }
"#;

pub const ISSUE_FIELDS: &str = r#"
    id
    identifier
    title
    description
    priority
    priorityLabel
    estimate
    sortOrder
    number
    url
    branchName
    dueDate
    createdAt
    updatedAt
    archivedAt
    startedAt
    completedAt
    canceledAt
    trashed
    state {
        id
        name
        color
        type
    }
    team {
        id
        name
        key
    }
    creator {
        id
        name
        email
    }
    assignee {
        id
        name
        email
    }
    project {
        id
        name
    }
    cycle {
        id
        number
        name
    }
    parent {
        id
        identifier
        title
    }
    labels {
        nodes {
            id
            name
            color
        }
    }
"#;

pub const COMMENT_FIELDS: &str = r#"
    id
    body
    createdAt
    updatedAt
    editedAt
    url
    user {
        id
        name
        email
    }
    issue {
        id
        identifier
        title
    }
    parent {
        id
    }
"#;

pub const REACTION_FIELDS: &str = r#"
    id
    emoji
    createdAt
    user {
        id
        name
    }
"#;

pub const PROJECT_FIELDS: &str = r#"
    id
    name
    description
    icon
    color
    state
    progress
    scope
    startDate
    targetDate
    startedAt
    completedAt
    canceledAt
    sortOrder
    createdAt
    updatedAt
    archivedAt
    url
    lead {
        id
        name
        email
    }
    teams {
        nodes {
            id
            name
            key
        }
    }
"#;

pub const PROJECT_UPDATE_FIELDS: &str = r#"
    id
    body
    health
    createdAt
    updatedAt
    editedAt
    user {
        id
        name
        email
    }
    project {
        id
        name
    }
"#;

pub const PROJECT_MILESTONE_FIELDS: &str = r#"
    id
    name
    description
    targetDate
    sortOrder
    createdAt
    updatedAt
    archivedAt
    project {
        id
        name
    }
"#;

pub const CYCLE_FIELDS: &str = r#"
    id
    number
    name
    description
    startsAt
    endsAt
    completedAt
    progress
    scope
    createdAt
    updatedAt
    archivedAt
    team {
        id
        name
        key
    }
"#;

pub const TEAM_FIELDS: &str = r#"
    id
    name
    key
    description
    icon
    color
    private
    timezone
    createdAt
    updatedAt
    archivedAt
"#;

pub const USER_FIELDS: &str = r#"
    id
    name
    displayName
    email
    avatarUrl
    active
    admin
    createdAt
    updatedAt
    archivedAt
"#;

pub const LABEL_FIELDS: &str = r#"
    id
    name
    description
    color
    createdAt
    updatedAt
    archivedAt
    team {
        id
        name
        key
    }
    parent {
        id
        name
    }
"#;

pub const WORKFLOW_STATE_FIELDS: &str = r#"
    id
    name
    color
    description
    position
    type
    createdAt
    updatedAt
    archivedAt
    team {
        id
        name
        key
    }
"#;

pub const DOCUMENT_FIELDS: &str = r#"
    id
    title
    content
    icon
    color
    slugId
    sortOrder
    createdAt
    updatedAt
    archivedAt
    creator {
        id
        name
        email
    }
    project {
        id
        name
    }
"#;

pub const ATTACHMENT_FIELDS: &str = r#"
    id
    title
    subtitle
    url
    sourceType
    metadata
    createdAt
    updatedAt
    archivedAt
    issue {
        id
        identifier
        title
    }
    creator {
        id
        name
    }
"#;

pub const FAVORITE_FIELDS: &str = r#"
    id
    type
    sortOrder
    createdAt
    updatedAt
    folderName
    owner {
        id
        name
    }
    issue {
        id
        identifier
        title
    }
    project {
        id
        name
    }
    cycle {
        id
        number
        name
    }
    label {
        id
        name
    }
    document {
        id
        title
    }
"#;

pub const NOTIFICATION_FIELDS: &str = r#"
    id
    type
    readAt
    emailedAt
    snoozedUntilAt
    createdAt
    updatedAt
    archivedAt
    actor {
        id
        name
    }
    issue {
        id
        identifier
        title
    }
    comment {
        id
        body
    }
    team {
        id
        name
    }
    project {
        id
        name
    }
"#;

pub const WEBHOOK_FIELDS: &str = r#"
    id
    label
    url
    enabled
    createdAt
    updatedAt
    archivedAt
    resourceTypes
    allPublicTeams
    team {
        id
        name
        key
    }
    creator {
        id
        name
    }
"#;

pub const INTEGRATION_FIELDS: &str = r#"
    id
    service
    createdAt
    updatedAt
    archivedAt
    team {
        id
        name
        key
    }
    creator {
        id
        name
    }
"#;

pub const ISSUE_RELATION_FIELDS: &str = r#"
    id
    type
    createdAt
    updatedAt
    issue {
        id
        identifier
        title
    }
    relatedIssue {
        id
        identifier
        title
    }
"#;
