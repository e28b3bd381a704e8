//! Text-backed domain enums.
//!
//! Each enum maps to a `TEXT` column guarded by a `CHECK` constraint in the
//! migrations. The string values here must match those constraints.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

macro_rules! define_text_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// All variants, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The database / wire value.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $val ),+
                }
            }

            /// Parse from the database / wire value.
            pub fn from_name(name: &str) -> Result<Self, CoreError> {
                match name {
                    $( $val => Ok($name::$variant), )+
                    other => Err(CoreError::Validation(format!(
                        "Unknown {} '{}'",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_text_enum! {
    /// What kind of page an article is.
    ArticleType {
        WikiArticle = "wiki_article",
        Character = "character",
        Session = "session",
        SessionNote = "session_note",
        Tutorial = "tutorial",
        CampaignRoot = "campaign_root",
        Campaign = "campaign",
        Act = "act",
        SharedInfoRoot = "shared_info_root",
    }
}

define_text_enum! {
    /// Who may read an article.
    ArticleVisibility {
        Public = "public",
        MembersOnly = "members_only",
        Private = "private",
    }
}

define_text_enum! {
    /// A member's role inside a world.
    WorldRole {
        Gm = "gm",
        Player = "player",
        Observer = "observer",
    }
}

define_text_enum! {
    /// Lifecycle of a quest.
    QuestStatus {
        Active = "active",
        Completed = "completed",
        Failed = "failed",
        Abandoned = "abandoned",
    }
}

impl WorldRole {
    /// GMs manage the world; everyone else only reads or contributes.
    pub fn is_gm(self) -> bool {
        self == WorldRole::Gm
    }

    /// Observers are read-only.
    pub fn can_write(self) -> bool {
        self != WorldRole::Observer
    }
}

impl ArticleType {
    /// Tutorials live outside every world and are maintained by sysadmins.
    pub fn is_tutorial(self) -> bool {
        self == ArticleType::Tutorial
    }
}
