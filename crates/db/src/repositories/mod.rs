//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Multi-step writes open their own
//! transaction.

pub mod alias_repo;
pub mod arc_repo;
pub mod article_repo;
pub mod campaign_repo;
pub mod dashboard_repo;
pub mod document_repo;
pub mod hashtag_repo;
pub mod invitation_repo;
pub mod link_repo;
pub mod member_repo;
pub mod quest_repo;
pub mod search_repo;
pub mod session_repo;
pub mod user_repo;
pub mod world_link_repo;
pub mod world_repo;

pub use alias_repo::AliasRepo;
pub use arc_repo::ArcRepo;
pub use article_repo::ArticleRepo;
pub use campaign_repo::CampaignRepo;
pub use dashboard_repo::DashboardRepo;
pub use document_repo::DocumentRepo;
pub use hashtag_repo::HashtagRepo;
pub use invitation_repo::{InvitationRepo, JoinOutcome};
pub use link_repo::LinkRepo;
pub use member_repo::MemberRepo;
pub use quest_repo::{QuestRepo, QuestUpdateOutcome};
pub use search_repo::SearchRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
pub use world_link_repo::WorldLinkRepo;
pub use world_repo::WorldRepo;
