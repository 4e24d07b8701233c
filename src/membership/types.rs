//! Events and member descriptors delivered by the membership service.

use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

/// Status of a cluster member as seen by the local node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    Alive,
    Leaving,
    Left,
    Failed,
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MemberStatus::Alive => "alive",
            MemberStatus::Leaving => "leaving",
            MemberStatus::Left => "left",
            MemberStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A single cluster member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub addr: IpAddr,
    pub port: u16,
    pub tags: BTreeMap<String, String>,
    pub status: MemberStatus,
}

/// Kind of change carried by a [`MemberEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MemberEventType {
    Join,
    Leave,
    Failed,
    Update,
    Reap,
}

impl MemberEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberEventType::Join => "member-join",
            MemberEventType::Leave => "member-leave",
            MemberEventType::Failed => "member-failed",
            MemberEventType::Update => "member-update",
            MemberEventType::Reap => "member-reap",
        }
    }
}

impl fmt::Display for MemberEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One or more members changed status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberEvent {
    pub event_type: MemberEventType,
    pub members: Vec<Member>,
}

/// A custom event broadcast by a cluster member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEvent {
    /// Lamport time of the event.
    pub ltime: u64,
    pub name: String,
    pub payload: Vec<u8>,
    /// Whether the sender allows this event to be coalesced.
    pub coalesce: bool,
}

/// Anything the membership service delivers on the event channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Member(MemberEvent),
    User(UserEvent),
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Member(event) => write!(f, "{}", event.event_type),
            Event::User(event) => write!(f, "user-event: {}", event.name),
        }
    }
}

impl From<MemberEvent> for Event {
    fn from(event: MemberEvent) -> Self {
        Event::Member(event)
    }
}

impl From<UserEvent> for Event {
    fn from(event: UserEvent) -> Self {
        Event::User(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_display() {
        let event = Event::from(MemberEvent {
            event_type: MemberEventType::Failed,
            members: Vec::new(),
        });
        assert_eq!(event.to_string(), "member-failed");

        let event = Event::from(UserEvent {
            ltime: 1,
            name: "deploy".into(),
            payload: Vec::new(),
            coalesce: true,
        });
        assert_eq!(event.to_string(), "user-event: deploy");
    }
}
