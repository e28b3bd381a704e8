//! Handlers for wiki links between articles: backlinks, outgoing links,
//! link resolution, auto-link proposals and link suggestions.

use std::collections::{HashMap, HashSet};

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chronicis_core::auto_link::{find_auto_links, AutoLinkMatch, LinkCandidate};
use chronicis_core::search::{LinkSuggestionQuery, MAX_SUGGESTIONS, MIN_SUGGESTION_QUERY_LENGTH};
use chronicis_core::types::DbId;
use chronicis_db::models::article::{AutoLinkRequest, LinkedArticle, ResolveLinks};
use chronicis_db::repositories::{AliasRepo, ArticleRepo, LinkRepo, MemberRepo};
use serde::Serialize;

use crate::access::{article_access, world_access};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::SearchParams;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::tree::{ArticleTree, Viewer};

/// One end of a wiki link, with where it sits in the tree.
#[derive(Debug, Serialize)]
pub struct LinkView {
    pub article_id: DbId,
    pub title: String,
    pub slug: String,
    pub article_type: String,
    pub display_text: Option<String>,
    pub display_path: String,
    pub link_count: i64,
}

fn link_views(rows: Vec<LinkedArticle>, tree: &ArticleTree) -> Vec<LinkView> {
    rows.into_iter()
        .filter(|row| tree.contains(row.article_id))
        .map(|row| LinkView {
            display_path: tree.display_path(row.article_id),
            article_id: row.article_id,
            title: row.title,
            slug: row.slug,
            article_type: row.article_type,
            display_text: row.display_text,
            link_count: row.link_count,
        })
        .collect()
}

/// GET /api/v1/articles/{id}/backlinks
pub async fn backlinks(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let found = article_access(&state.pool, id, auth.user_id).await?;
    let rows = LinkRepo::backlinks(&state.pool, id, auth.user_id).await?;
    let tree = ArticleTree::load(&state.pool, found.world_id(), Viewer::User(auth.user_id)).await?;
    Ok(Json(DataResponse {
        data: link_views(rows, &tree),
    }))
}

/// GET /api/v1/articles/{id}/outgoing-links
pub async fn outgoing(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let found = article_access(&state.pool, id, auth.user_id).await?;
    let rows = LinkRepo::outgoing(&state.pool, id, auth.user_id).await?;
    let tree = ArticleTree::load(&state.pool, found.world_id(), Viewer::User(auth.user_id)).await?;
    Ok(Json(DataResponse {
        data: link_views(rows, &tree),
    }))
}

/// Whether a linked article can still be shown.
#[derive(Debug, Serialize)]
pub struct ResolvedLink {
    pub exists: bool,
    pub title: Option<String>,
    pub slug: Option<String>,
}

/// POST /api/v1/articles/resolve-links
///
/// Articles the caller cannot read are reported as missing.
pub async fn resolve(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ResolveLinks>,
) -> AppResult<impl IntoResponse> {
    let ids: Vec<DbId> = input
        .article_ids
        .into_iter()
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let world_ids: HashSet<DbId> = MemberRepo::world_ids_for_user(&state.pool, auth.user_id)
        .await?
        .into_iter()
        .collect();

    let mut resolved: HashMap<DbId, ResolvedLink> = ids
        .iter()
        .map(|id| {
            (
                *id,
                ResolvedLink {
                    exists: false,
                    title: None,
                    slug: None,
                },
            )
        })
        .collect();

    for article in ArticleRepo::find_many(&state.pool, &ids).await? {
        let in_scope = match article.world_id {
            Some(world_id) => world_ids.contains(&world_id),
            None => article.kind().is_ok_and(|k| k.is_tutorial()),
        };
        let visible = article.visibility != "private" || article.created_by == auth.user_id;
        if in_scope && visible {
            resolved.insert(
                article.id,
                ResolvedLink {
                    exists: true,
                    title: Some(article.title),
                    slug: Some(article.slug),
                },
            );
        }
    }

    Ok(Json(DataResponse { data: resolved }))
}

#[derive(Debug, Serialize)]
pub struct AutoLinkResult {
    pub links_found: usize,
    pub matches: Vec<AutoLinkMatch>,
}

/// POST /api/v1/articles/{id}/auto-link
///
/// Proposes links for titles and aliases of other articles in the same
/// world. Nothing is written.
pub async fn auto_link(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AutoLinkRequest>,
) -> AppResult<impl IntoResponse> {
    if input.body.trim().is_empty() {
        return Err(AppError::BadRequest("Body content is required".into()));
    }
    let found = article_access(&state.pool, id, auth.user_id).await?;
    let world_id = found
        .world_id()
        .ok_or_else(|| AppError::BadRequest("Article must belong to a world".into()))?;

    let tree = ArticleTree::load(&state.pool, Some(world_id), Viewer::User(auth.user_id)).await?;
    let candidates: Vec<LinkCandidate> = AliasRepo::link_terms(&state.pool, world_id, id)
        .await?
        .into_iter()
        .filter(|t| tree.contains(t.article_id))
        .map(|t| LinkCandidate {
            article_id: t.article_id,
            article_title: t.title,
            term: t.term,
            is_alias: t.is_alias,
        })
        .collect();

    let matches = find_auto_links(&input.body, &candidates);
    Ok(Json(DataResponse {
        data: AutoLinkResult {
            links_found: matches.len(),
            matches,
        },
    }))
}

/// A candidate target for a link being typed.
#[derive(Debug, Serialize)]
pub struct LinkSuggestion {
    pub article_id: DbId,
    pub title: String,
    pub slug: String,
    pub article_type: String,
    pub display_path: String,
}

/// Match `query` against every article of `tree`, best paths first.
fn suggest(tree: &ArticleTree, query: &str) -> Vec<LinkSuggestion> {
    let query = query.trim();
    if query.chars().count() < MIN_SUGGESTION_QUERY_LENGTH {
        return Vec::new();
    }
    let parsed = LinkSuggestionQuery::parse(query);

    let mut suggestions: Vec<LinkSuggestion> = tree
        .nodes()
        .filter(|node| parsed.matches(&tree.title_segments(node.id)))
        .map(|node| LinkSuggestion {
            article_id: node.id,
            title: node.title.clone(),
            slug: node.slug.clone(),
            article_type: node.article_type.as_str().to_string(),
            display_path: tree.display_path(node.id),
        })
        .collect();
    suggestions.sort_by(|a, b| {
        a.display_path
            .to_lowercase()
            .cmp(&b.display_path.to_lowercase())
            .then_with(|| a.title.cmp(&b.title))
    });
    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

/// GET /api/v1/worlds/{id}/link-suggestions?query=
pub async fn suggestions(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(world_id): Path<DbId>,
    Query(params): Query<SearchParams>,
) -> AppResult<impl IntoResponse> {
    world_access(&state.pool, world_id, auth.user_id).await?;
    let tree = ArticleTree::load(&state.pool, Some(world_id), Viewer::User(auth.user_id)).await?;
    Ok(Json(DataResponse {
        data: suggest(&tree, &params.query),
    }))
}

#[cfg(test)]
mod tests {
    use chronicis_db::models::article::ArticleSkeleton;

    use super::*;

    fn node(n: u128, parent: Option<u128>, title: &str) -> ArticleSkeleton {
        ArticleSkeleton {
            id: DbId::from_u128(n),
            world_id: Some(DbId::from_u128(100)),
            parent_id: parent.map(DbId::from_u128),
            campaign_id: None,
            arc_id: None,
            title: title.to_string(),
            slug: chronicis_core::slug::generate_slug(title),
            article_type: "wiki_article".into(),
            visibility: "public".into(),
            created_by: DbId::from_u128(1),
        }
    }

    fn tree() -> ArticleTree {
        ArticleTree::from_rows(
            vec![
                node(1, None, "Characters"),
                node(2, Some(1), "Plenty Hollowell"),
                node(3, None, "Locations"),
                node(4, Some(3), "Plains of Ash"),
            ],
            Viewer::Public,
        )
        .unwrap()
    }

    #[test]
    fn short_queries_suggest_nothing() {
        assert!(suggest(&tree(), "pl").is_empty());
    }

    #[test]
    fn suggestions_are_ordered_by_display_path() {
        let titles: Vec<String> = suggest(&tree(), "pla")
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(titles, vec!["Plains of Ash"]);

        let all: Vec<String> = suggest(&tree(), "  ple").into_iter().map(|s| s.display_path).collect();
        assert_eq!(all, vec!["Plenty Hollowell"]);
    }

    #[test]
    fn path_filters_narrow_suggestions() {
        let found = suggest(&tree(), "locations/");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].article_id, DbId::from_u128(4));
    }
}
