//! Per-world authorization.
//!
//! Worlds are invisible to non-members: every lookup here answers 404 rather
//! than 403 when the caller does not belong to the owning world. Once
//! membership is established, role shortfalls answer 403.

use chronicis_core::error::CoreError;
use chronicis_core::kinds::{ArticleType, WorldRole};
use chronicis_core::types::DbId;
use chronicis_db::models::article::Article;
use chronicis_db::models::campaign::{Campaign, Session, StoryArc};
use chronicis_db::models::quest::Quest;
use chronicis_db::models::world::World;
use chronicis_db::repositories::{
    ArcRepo, ArticleRepo, CampaignRepo, MemberRepo, QuestRepo, SessionRepo, WorldRepo,
};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

/// A world together with the caller's role in it.
#[derive(Debug, Clone)]
pub struct WorldAccess {
    pub world: World,
    pub role: WorldRole,
    pub user_id: DbId,
}

impl WorldAccess {
    pub fn is_owner(&self) -> bool {
        self.world.owner_id == self.user_id
    }

    pub fn is_gm(&self) -> bool {
        self.role.is_gm()
    }

    /// Reject unless the caller is a GM of the world.
    pub fn require_gm(&self) -> AppResult<()> {
        if !self.is_gm() {
            return Err(CoreError::Forbidden("Only a GM can do this".into()).into());
        }
        Ok(())
    }

    /// Reject unless the caller owns the world.
    pub fn require_owner(&self) -> AppResult<()> {
        if !self.is_owner() {
            return Err(CoreError::Forbidden("Only the world owner can do this".into()).into());
        }
        Ok(())
    }

    /// Reject observers.
    pub fn require_writer(&self) -> AppResult<()> {
        if !self.role.can_write() {
            return Err(CoreError::Forbidden("Observers cannot make changes".into()).into());
        }
        Ok(())
    }
}

/// Load a world the caller belongs to.
pub async fn world_access(pool: &PgPool, world_id: DbId, user_id: DbId) -> AppResult<WorldAccess> {
    let not_found = || CoreError::not_found("World", world_id);
    let member = MemberRepo::find(pool, world_id, user_id)
        .await?
        .ok_or_else(not_found)?;
    let world = WorldRepo::find_by_id(pool, world_id)
        .await?
        .ok_or_else(not_found)?;
    Ok(WorldAccess {
        world,
        role: WorldRole::from_name(&member.role)?,
        user_id,
    })
}

/// Report a missing parent world as a missing `entity`, so callers cannot
/// probe for worlds they do not belong to.
fn hidden_as<T>(result: AppResult<T>, entity: &'static str, id: DbId) -> AppResult<T> {
    match result {
        Err(AppError::Core(CoreError::NotFound { .. })) => {
            Err(CoreError::not_found(entity, id).into())
        }
        other => other,
    }
}

/// Load a campaign of a world the caller belongs to.
pub async fn campaign_access(
    pool: &PgPool,
    campaign_id: DbId,
    user_id: DbId,
) -> AppResult<(Campaign, WorldAccess)> {
    let campaign = CampaignRepo::find_by_id(pool, campaign_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Campaign", campaign_id))?;
    let access = hidden_as(
        world_access(pool, campaign.world_id, user_id).await,
        "Campaign",
        campaign_id,
    )?;
    Ok((campaign, access))
}

/// Load an arc of a world the caller belongs to.
pub async fn arc_access(
    pool: &PgPool,
    arc_id: DbId,
    user_id: DbId,
) -> AppResult<(StoryArc, WorldAccess)> {
    let not_found = || CoreError::not_found("Arc", arc_id);
    let arc = ArcRepo::find_by_id(pool, arc_id).await?.ok_or_else(not_found)?;
    let (world_id, _) = ArcRepo::world_of(pool, arc_id).await?.ok_or_else(not_found)?;
    let access = hidden_as(world_access(pool, world_id, user_id).await, "Arc", arc_id)?;
    Ok((arc, access))
}

/// Load a session of a world the caller belongs to, with its arc's campaign.
pub async fn session_access(
    pool: &PgPool,
    session_id: DbId,
    user_id: DbId,
) -> AppResult<(Session, SessionContext, WorldAccess)> {
    let not_found = || CoreError::not_found("Session", session_id);
    let session = SessionRepo::find_by_id(pool, session_id)
        .await?
        .ok_or_else(not_found)?;
    let (arc_id, campaign_id, world_id) = SessionRepo::context(pool, session_id)
        .await?
        .ok_or_else(not_found)?;
    let access = hidden_as(
        world_access(pool, world_id, user_id).await,
        "Session",
        session_id,
    )?;
    Ok((
        session,
        SessionContext {
            arc_id,
            campaign_id,
            world_id,
        },
        access,
    ))
}

/// Where a session sits.
#[derive(Debug, Clone, Copy)]
pub struct SessionContext {
    pub arc_id: DbId,
    pub campaign_id: DbId,
    pub world_id: DbId,
}

/// Load a quest the caller may see. GM-only quests are hidden from non-GMs.
pub async fn quest_access(
    pool: &PgPool,
    quest_id: DbId,
    user_id: DbId,
) -> AppResult<(Quest, WorldAccess)> {
    let not_found = || CoreError::not_found("Quest", quest_id);
    let quest = QuestRepo::find_by_id(pool, quest_id)
        .await?
        .ok_or_else(not_found)?;
    let (_, access) = hidden_as(
        arc_access(pool, quest.arc_id, user_id).await,
        "Quest",
        quest_id,
    )?;
    if quest.is_gm_only && !access.is_gm() {
        return Err(not_found().into());
    }
    Ok((quest, access))
}

/// An article the caller can read.
///
/// `access` is `None` for tutorials, which belong to no world.
#[derive(Debug, Clone)]
pub struct ArticleAccess {
    pub article: Article,
    pub kind: ArticleType,
    pub access: Option<WorldAccess>,
}

impl ArticleAccess {
    pub fn world_id(&self) -> Option<DbId> {
        self.article.world_id
    }

    /// Reject callers who may not edit this article.
    ///
    /// Tutorials need a system administrator; world articles need a
    /// non-observer member.
    pub fn require_editor(&self, auth: &AuthUser) -> AppResult<()> {
        match &self.access {
            None => {
                if !auth.is_sysadmin {
                    return Err(CoreError::Forbidden(
                        "Only system administrators can edit tutorials".into(),
                    )
                    .into());
                }
                Ok(())
            }
            Some(access) => access.require_writer(),
        }
    }
}

/// Load an article the caller can read, answering 404 otherwise.
pub async fn article_access(pool: &PgPool, article_id: DbId, user_id: DbId) -> AppResult<ArticleAccess> {
    let not_found = || CoreError::not_found("Article", article_id);
    let article = ArticleRepo::find_by_id(pool, article_id)
        .await?
        .ok_or_else(not_found)?;
    if article.visibility == "private" && article.created_by != user_id {
        return Err(not_found().into());
    }
    let kind = article.kind()?;

    let access = match article.world_id {
        Some(world_id) => Some(hidden_as(
            world_access(pool, world_id, user_id).await,
            "Article",
            article_id,
        )?),
        None if kind.is_tutorial() => None,
        None => return Err(not_found().into()),
    };

    Ok(ArticleAccess {
        article,
        kind,
        access,
    })
}
