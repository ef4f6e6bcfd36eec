//! Caller identity and administrative authorization.
//!
//! The transport resolves who is calling and at what level; this module only
//! decides what that level may do.

use strum::Display;

use crate::state::normalize_username;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Role {
    #[default]
    Viewer,
    Moderator,
    Admin,
}

impl Role {
    /// Maps a chat-bot permission level to a role.
    pub fn from_level(level: &str) -> Self {
        match level.trim().to_ascii_lowercase().as_str() {
            "broadcaster" | "streamer" | "owner" | "admin" => Self::Admin,
            "mod" | "moderator" => Self::Moderator,
            _ => Self::Viewer,
        }
    }

    /// Like [`Role::from_level`], but the configured owner account is always admin.
    pub fn resolve(level: &str, username: &str, owner: Option<&str>) -> Self {
        let is_owner = owner
            .map(normalize_username)
            .is_some_and(|owner| owner == normalize_username(username));
        if is_owner {
            Self::Admin
        } else {
            Self::from_level(level)
        }
    }

    pub fn can_run(self, command: AdminCommand) -> bool {
        self >= command.required_role()
    }
}

/// Administrative override guarded by role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AdminCommand {
    Reset,
    SetHp,
    Phase,
    BossHit,
    Pause,
    Resume,
    ClearHits,
    Skill,
    AddXp,
    ResetXp,
    ResetSkills,
}

impl AdminCommand {
    /// Every override is admin-only, pause and resume included. Moderators
    /// rank above viewers but run nothing here.
    pub const fn required_role(self) -> Role {
        match self {
            Self::Reset
            | Self::SetHp
            | Self::Phase
            | Self::BossHit
            | Self::Pause
            | Self::Resume
            | Self::ClearHits
            | Self::Skill
            | Self::AddXp
            | Self::ResetXp
            | Self::ResetSkills => Role::Admin,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::SetHp => "sethp",
            Self::Phase => "phase",
            Self::BossHit => "bosshit",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::ClearHits => "clearhits",
            Self::Skill => "skill",
            Self::AddXp => "addxp",
            Self::ResetXp => "resetxp",
            Self::ResetSkills => "resetskills",
        }
    }
}

/// Authenticated caller of a session operation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Actor {
    pub username: String,
    pub role: Role,
    /// Subscribers get a flat attack bonus.
    pub subscriber: bool,
}

impl Actor {
    pub fn new(username: &str, role: Role) -> Self {
        Self {
            username: normalize_username(username),
            role,
            subscriber: false,
        }
    }

    pub fn viewer(username: &str) -> Self {
        Self::new(username, Role::Viewer)
    }

    pub fn admin(username: &str) -> Self {
        Self::new(username, Role::Admin)
    }

    #[must_use]
    pub fn with_subscriber(mut self, subscriber: bool) -> Self {
        self.subscriber = subscriber;
        self
    }
}
