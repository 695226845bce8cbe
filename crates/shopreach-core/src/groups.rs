use serde::{Deserialize, Serialize};

/// Value stored in `members` when the member count could not be read.
pub const UNKNOWN_MEMBERS: &str = "Unknown";

/// Outcome of the last post in a group, as read back from the group's
/// pending-content page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostStatus {
    /// Never posted, or no indicator was visible after posting.
    #[default]
    None,
    /// Awaiting admin approval.
    Pending,
    Published,
    /// The post went out but its status could not be read.
    Error,
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostStatus::None => write!(f, "None"),
            PostStatus::Pending => write!(f, "Pending"),
            PostStatus::Published => write!(f, "Published"),
            PostStatus::Error => write!(f, "Error"),
        }
    }
}

/// A social-media group that promotional posts are delivered to.
///
/// Records only move forward: a failed delivery clears `sendable`, a
/// successful one sets `timestamp`. Neither is ever reset by the tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub name: String,
    /// Group URL without query string. Uniqueness key of the group store.
    pub url: String,
    #[serde(default = "unknown_members")]
    pub members: String,
    /// Epoch seconds of the last successful post, `0` when never posted.
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default = "default_sendable")]
    pub sendable: bool,
    #[serde(default)]
    pub post_status: PostStatus,
}

fn unknown_members() -> String {
    UNKNOWN_MEMBERS.to_string()
}

fn default_sendable() -> bool {
    true
}

impl GroupRecord {
    /// Creates a freshly discovered group: never posted and eligible.
    #[must_use]
    pub fn discovered(
        name: impl Into<String>,
        url: impl Into<String>,
        members: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            members: members.into(),
            timestamp: 0,
            sendable: true,
            post_status: PostStatus::None,
        }
    }

    /// `true` when the group may receive a delivery attempt.
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        self.sendable && self.timestamp == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovered_group_is_eligible() {
        let group = GroupRecord::discovered("Bazar", "https://web.facebook.com/groups/1/", "12K");
        assert!(group.is_eligible());
        assert_eq!(group.post_status, PostStatus::None);
    }

    #[test]
    fn blocked_or_posted_groups_are_not_eligible() {
        let mut blocked = GroupRecord::discovered("a", "u1", "1");
        blocked.sendable = false;
        assert!(!blocked.is_eligible());

        let mut posted = GroupRecord::discovered("b", "u2", "1");
        posted.timestamp = 1_700_000_000;
        assert!(!posted.is_eligible());
    }

    #[test]
    fn post_status_serializes_as_bare_literals() {
        for (status, literal) in [
            (PostStatus::None, "\"None\""),
            (PostStatus::Pending, "\"Pending\""),
            (PostStatus::Published, "\"Published\""),
            (PostStatus::Error, "\"Error\""),
        ] {
            assert_eq!(serde_json::to_string(&status).unwrap(), literal);
            assert_eq!(status.to_string(), literal.trim_matches('"'));
        }
    }

    #[test]
    fn reads_store_entries_written_by_the_previous_tool() {
        let raw = r#"{
            "name": "سوق الجزائر",
            "members": "45K",
            "url": "https://web.facebook.com/groups/634980317981383/",
            "timestamp": 0,
            "sendable": true,
            "post_status": "None"
        }"#;
        let group: GroupRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(group.name, "سوق الجزائر");
        assert!(group.is_eligible());
    }

    #[test]
    fn missing_bookkeeping_fields_default_to_fresh_group() {
        let raw = r#"{"name": "x", "url": "https://web.facebook.com/groups/9/"}"#;
        let group: GroupRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(group.members, UNKNOWN_MEMBERS);
        assert!(group.is_eligible());
    }
}
