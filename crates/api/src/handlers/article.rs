//! Handlers for `/articles`: the wiki tree, article CRUD, moves, aliases
//! and stored summaries.
//!
//! Tutorials are world-less articles editable only by system
//! administrators. Everything else lives in a world and follows that
//! world's membership rules (see [`crate::access`]).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chronicis_core::error::CoreError;
use chronicis_core::hashtags::{parse_hashtags, ParsedHashtag};
use chronicis_core::hierarchy::{Breadcrumb, WalkOptions};
use chronicis_core::kinds::{ArticleType, ArticleVisibility};
use chronicis_core::links::{parse_links, ParsedLink};
use chronicis_core::slug::{generate_slug, unique_slug, validate_slug};
use chronicis_core::types::DbId;
use chronicis_core::validation::{
    check_max, optional_text, parse_aliases, MAX_ARTICLE_TITLE_LENGTH, MAX_ICON_LENGTH,
    MAX_IN_GAME_DATE_LENGTH,
};
use chronicis_db::models::article::{
    Article, ArticleAlias, ArticleChanges, CreateArticle, MoveArticle, NewArticle, UpdateAliases,
    UpdateArticle,
};
use chronicis_db::repositories::{
    AliasRepo, ArcRepo, ArticleRepo, CampaignRepo, MemberRepo, SessionRepo,
};
use serde::Serialize;
use sqlx::PgPool;

use crate::access::{article_access, world_access, ArticleAccess};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::WorldFilter;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::tree::{scope_for, ArticleTree, Viewer};

/// An article with its breadcrumbs, slug path and aliases.
#[derive(Debug, Serialize)]
pub struct ArticleDetail {
    #[serde(flatten)]
    pub article: Article,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub path: String,
    pub aliases: Vec<ArticleAlias>,
}

/// Assemble the detail view of an article the caller can already read.
async fn load_detail(pool: &PgPool, found: ArticleAccess, user_id: DbId) -> AppResult<ArticleDetail> {
    let id = found.article.id;
    let tree = ArticleTree::load(pool, found.world_id(), Viewer::User(user_id)).await?;
    let world = found.access.as_ref().map(|a| &a.world);
    let scope = scope_for(pool, &tree, world, id).await?;
    let breadcrumbs = tree.crumbs(
        id,
        &scope,
        WalkOptions {
            include_world: true,
            ..WalkOptions::default()
        },
    );
    let path = tree.path(id);
    let aliases = AliasRepo::list_for_article(pool, id).await?;

    Ok(ArticleDetail {
        article: found.article,
        breadcrumbs,
        path,
        aliases,
    })
}

fn parse_body(body: Option<&str>) -> (Vec<ParsedLink>, Vec<ParsedHashtag>) {
    match body {
        Some(b) if !b.trim().is_empty() => (parse_links(b), parse_hashtags(b)),
        _ => (Vec::new(), Vec::new()),
    }
}

fn slug_conflict(slug: &str) -> CoreError {
    CoreError::Conflict(format!(
        "An article with slug '{slug}' already exists in this location"
    ))
}

fn check_title(title: &str) -> AppResult<String> {
    let title = title.trim().to_string();
    check_max("Title", &title, MAX_ARTICLE_TITLE_LENGTH)?;
    Ok(title)
}

fn require_sysadmin_for_tutorials(auth: &AuthUser) -> AppResult<()> {
    if !auth.is_sysadmin {
        return Err(
            CoreError::Forbidden("Only system administrators can manage tutorials".into()).into(),
        );
    }
    Ok(())
}

/// Reject campaign, arc or session references that point outside `world_id`.
async fn check_placement(
    pool: &PgPool,
    world_id: DbId,
    campaign_id: Option<DbId>,
    arc_id: Option<DbId>,
    session_id: Option<DbId>,
) -> AppResult<()> {
    let outside = |what: &str| CoreError::Validation(format!("{what} does not belong to this world"));

    if let Some(campaign_id) = campaign_id {
        let campaign = CampaignRepo::find_by_id(pool, campaign_id).await?;
        if campaign.map(|c| c.world_id) != Some(world_id) {
            return Err(outside("Campaign").into());
        }
    }
    if let Some(arc_id) = arc_id {
        let owner = ArcRepo::world_of(pool, arc_id).await?;
        if owner.map(|(w, _)| w) != Some(world_id) {
            return Err(outside("Arc").into());
        }
    }
    if let Some(session_id) = session_id {
        let owner = SessionRepo::context(pool, session_id).await?;
        if owner.map(|(_, _, w)| w) != Some(world_id) {
            return Err(outside("Session").into());
        }
    }
    Ok(())
}

/* --------------------------------------------------------------------------
Tree listings
-------------------------------------------------------------------------- */

/// GET /api/v1/articles?world_id=
///
/// Root articles of a world, or the root tutorials without a world filter.
pub async fn list_roots(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<WorldFilter>,
) -> AppResult<impl IntoResponse> {
    let items = match filter.world_id {
        Some(world_id) => {
            world_access(&state.pool, world_id, auth.user_id).await?;
            ArticleRepo::list_roots(&state.pool, world_id, auth.user_id).await?
        }
        None => ArticleRepo::list_tutorial_roots(&state.pool, auth.user_id).await?,
    };
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/articles/{id}/children
pub async fn list_children(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    article_access(&state.pool, id, auth.user_id).await?;
    let items = ArticleRepo::list_children(&state.pool, id, auth.user_id).await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/articles/all
pub async fn list_all(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let world_ids = MemberRepo::world_ids_for_user(&state.pool, auth.user_id).await?;
    let items = ArticleRepo::list_all(&state.pool, &world_ids, auth.user_id).await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/articles/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let found = article_access(&state.pool, id, auth.user_id).await?;
    let detail = load_detail(&state.pool, found, auth.user_id).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// GET /api/v1/articles/by-path/{*path}?world_id=
///
/// Walks slugs from the root level down. Without `world_id` the walk runs
/// over tutorials.
pub async fn get_by_path(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(filter): Query<WorldFilter>,
) -> AppResult<impl IntoResponse> {
    if let Some(world_id) = filter.world_id {
        world_access(&state.pool, world_id, auth.user_id).await?;
    }

    let not_found = || CoreError::NotFoundByKey {
        entity: "Article",
        key: path.clone(),
    };

    let mut current: Option<Article> = None;
    for slug in path.split('/').filter(|s| !s.is_empty()) {
        let parent_id = current.as_ref().map(|a| a.id);
        let next = ArticleRepo::find_by_slug(&state.pool, filter.world_id, parent_id, slug)
            .await?
            .filter(|a| a.visibility != ArticleVisibility::Private.as_str() || a.created_by == auth.user_id)
            .ok_or_else(not_found)?;
        current = Some(next);
    }
    let article = current.ok_or_else(not_found)?;

    let found = article_access(&state.pool, article.id, auth.user_id).await?;
    let detail = load_detail(&state.pool, found, auth.user_id).await?;
    Ok(Json(DataResponse { data: detail }))
}

/* --------------------------------------------------------------------------
Writes
-------------------------------------------------------------------------- */

/// POST /api/v1/articles
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateArticle>,
) -> AppResult<impl IntoResponse> {
    let kind = input.article_type.unwrap_or(ArticleType::WikiArticle);
    let title = check_title(&input.title)?;
    let icon_emoji = optional_text("Icon", input.icon_emoji.as_deref(), MAX_ICON_LENGTH)?;
    let in_game_date = optional_text(
        "In-game date",
        input.in_game_date.as_deref(),
        MAX_IN_GAME_DATE_LENGTH,
    )?;

    let (world_id, campaign_id, arc_id, session_id) = if kind.is_tutorial() {
        require_sysadmin_for_tutorials(&auth)?;
        (None, None, None, None)
    } else {
        let world_id = input
            .world_id
            .ok_or_else(|| CoreError::Validation("World is required".into()))?;
        world_access(&state.pool, world_id, auth.user_id)
            .await?
            .require_writer()?;
        check_placement(
            &state.pool,
            world_id,
            input.campaign_id,
            input.arc_id,
            input.session_id,
        )
        .await?;
        (Some(world_id), input.campaign_id, input.arc_id, input.session_id)
    };

    if let Some(parent_id) = input.parent_id {
        let parent = article_access(&state.pool, parent_id, auth.user_id).await?;
        if parent.world_id() != world_id {
            return Err(CoreError::Validation(
                "Parent article must be in the same world".into(),
            )
            .into());
        }
    }

    let taken = ArticleRepo::sibling_slugs(&state.pool, world_id, input.parent_id, None).await?;
    let slug = match input.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => {
            validate_slug(slug)?;
            if taken.iter().any(|t| t == slug) {
                return Err(slug_conflict(slug).into());
            }
            slug.to_string()
        }
        None => unique_slug(&generate_slug(&title), &taken),
    };

    let (links, hashtags) = parse_body(input.body.as_deref());
    let new = NewArticle {
        world_id,
        parent_id: input.parent_id,
        campaign_id,
        arc_id,
        session_id,
        title,
        slug,
        body: input.body,
        article_type: kind,
        visibility: input.visibility.unwrap_or(ArticleVisibility::Public),
        icon_emoji,
        effective_date: input.effective_date.unwrap_or_else(chrono::Utc::now),
        in_game_date,
        player_id: None,
        created_by: auth.user_id,
    };
    let article = ArticleRepo::create(&state.pool, &new, &links, &hashtags).await?;

    tracing::info!(
        user_id = %auth.user_id,
        article_id = %article.id,
        article_type = %kind,
        "Article created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: article })))
}

/// PUT /api/v1/articles/{id}
///
/// Partial update. Links and hashtags are re-synced when the body changes.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateArticle>,
) -> AppResult<impl IntoResponse> {
    let found = article_access(&state.pool, id, auth.user_id).await?;
    let current_kind = found.kind;
    let target_kind = input.article_type.unwrap_or(current_kind);

    if current_kind.is_tutorial() || target_kind.is_tutorial() {
        require_sysadmin_for_tutorials(&auth)?;
    } else {
        found.require_editor(&auth)?;
    }
    if current_kind.is_tutorial() && !target_kind.is_tutorial() {
        return Err(AppError::BadRequest("Tutorial articles cannot be recategorized".into()));
    }

    let article = &found.article;
    let mut changes = ArticleChanges {
        world_id: article.world_id,
        parent_id: article.parent_id,
        campaign_id: article.campaign_id,
        arc_id: article.arc_id,
        session_id: article.session_id,
        title: article.title.clone(),
        slug: article.slug.clone(),
        body: article.body.clone(),
        article_type: target_kind,
        visibility: input.visibility.map_or_else(|| article.visibility_kind(), Ok)?,
        icon_emoji: article.icon_emoji.clone(),
        effective_date: input.effective_date.unwrap_or(article.effective_date),
        in_game_date: article.in_game_date.clone(),
        modified_by: auth.user_id,
    };

    if let Some(title) = input.title.as_deref() {
        changes.title = check_title(title)?;
    }
    if let Some(icon) = input.icon_emoji.as_deref() {
        changes.icon_emoji = optional_text("Icon", Some(icon), MAX_ICON_LENGTH)?;
    }
    if let Some(date) = input.in_game_date.as_deref() {
        changes.in_game_date = optional_text("In-game date", Some(date), MAX_IN_GAME_DATE_LENGTH)?;
    }

    if target_kind.is_tutorial() {
        changes.world_id = None;
        changes.campaign_id = None;
        changes.arc_id = None;
        changes.session_id = None;
        if !current_kind.is_tutorial() {
            changes.parent_id = None;
        }
    }

    let requested_slug = input.slug.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let location_changed = changes.world_id != article.world_id || changes.parent_id != article.parent_id;
    if let Some(slug) = requested_slug.filter(|s| *s != article.slug) {
        validate_slug(slug)?;
        let taken =
            ArticleRepo::sibling_slugs(&state.pool, changes.world_id, changes.parent_id, Some(id))
                .await?;
        if taken.iter().any(|t| t == slug) {
            return Err(slug_conflict(slug).into());
        }
        changes.slug = slug.to_string();
    } else if location_changed {
        let taken =
            ArticleRepo::sibling_slugs(&state.pool, changes.world_id, changes.parent_id, Some(id))
                .await?;
        changes.slug = unique_slug(&changes.slug, &taken);
    }

    let body_changed = input.body.is_some() && input.body != article.body;
    if let Some(body) = input.body {
        changes.body = Some(body);
    }
    let parsed = body_changed.then(|| parse_body(changes.body.as_deref()));
    let resync = parsed
        .as_ref()
        .map(|(links, tags)| (links.as_slice(), tags.as_slice()));

    ArticleRepo::update(&state.pool, id, &changes, resync)
        .await?
        .ok_or_else(|| CoreError::not_found("Article", id))?;

    tracing::info!(
        user_id = %auth.user_id,
        article_id = %id,
        body_changed,
        "Article updated"
    );

    let found = article_access(&state.pool, id, auth.user_id).await?;
    let detail = load_detail(&state.pool, found, auth.user_id).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// DELETE /api/v1/articles/{id}
///
/// Removes the article and all of its descendants.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let found = article_access(&state.pool, id, auth.user_id).await?;
    found.require_editor(&auth)?;

    let removed = ArticleRepo::delete_recursive(&state.pool, id).await?;
    if removed == 0 {
        return Err(CoreError::not_found("Article", id).into());
    }

    tracing::info!(user_id = %auth.user_id, article_id = %id, removed, "Article deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/articles/{id}/move
pub async fn move_article(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<MoveArticle>,
) -> AppResult<impl IntoResponse> {
    let found = article_access(&state.pool, id, auth.user_id).await?;
    found.require_editor(&auth)?;

    if found.article.parent_id == input.new_parent_id {
        return Ok(Json(DataResponse { data: found.article }));
    }

    let world_id = found.world_id();
    if let Some(new_parent_id) = input.new_parent_id {
        let parent = article_access(&state.pool, new_parent_id, auth.user_id).await?;
        if parent.world_id() != world_id {
            return Err(CoreError::Validation(
                "Target article must be in the same world".into(),
            )
            .into());
        }
        let tree = ArticleTree::load(&state.pool, world_id, Viewer::All).await?;
        if tree.is_self_or_descendant(new_parent_id, id) {
            return Err(CoreError::Validation(
                "Cannot move an article to be a child of itself or its descendants".into(),
            )
            .into());
        }
    }

    let taken =
        ArticleRepo::sibling_slugs(&state.pool, world_id, input.new_parent_id, Some(id)).await?;
    let slug = unique_slug(&found.article.slug, &taken);
    let article = ArticleRepo::move_to(&state.pool, id, input.new_parent_id, &slug, auth.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Article", id))?;

    tracing::info!(
        user_id = %auth.user_id,
        article_id = %id,
        new_parent_id = ?input.new_parent_id,
        "Article moved"
    );
    Ok(Json(DataResponse { data: article }))
}

/* --------------------------------------------------------------------------
Aliases and summaries
-------------------------------------------------------------------------- */

/// PUT /api/v1/articles/{id}/aliases
///
/// Replaces the whole alias set with the comma-separated list.
pub async fn update_aliases(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAliases>,
) -> AppResult<impl IntoResponse> {
    let found = article_access(&state.pool, id, auth.user_id).await?;
    found.require_editor(&auth)?;

    let aliases = parse_aliases(&input.aliases, &found.article.title)?;
    let stored = AliasRepo::replace(&state.pool, id, &aliases).await?;

    tracing::info!(
        user_id = %auth.user_id,
        article_id = %id,
        count = stored.len(),
        "Article aliases replaced"
    );
    Ok(Json(DataResponse { data: stored }))
}

/// GET /api/v1/articles/{id}/summary
pub async fn get_summary(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    article_access(&state.pool, id, auth.user_id).await?;
    let summary = ArticleRepo::summary(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Article", id))?;
    Ok(Json(DataResponse { data: summary }))
}

/// DELETE /api/v1/articles/{id}/summary
pub async fn clear_summary(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let found = article_access(&state.pool, id, auth.user_id).await?;
    found.require_editor(&auth)?;

    if !ArticleRepo::clear_summary(&state.pool, id).await? {
        return Err(CoreError::not_found("Article", id).into());
    }

    tracing::info!(user_id = %auth.user_id, article_id = %id, "Article summary cleared");
    Ok(StatusCode::NO_CONTENT)
}
