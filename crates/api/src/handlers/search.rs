//! Global search across the caller's worlds.

use std::collections::HashSet;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chronicis_core::hierarchy::{Breadcrumb, Scope, WalkOptions};
use chronicis_core::search::{
    escape_like, extract_snippet, is_searchable, RESULTS_PER_CATEGORY, SNIPPET_CONTEXT,
};
use chronicis_core::types::{DbId, Timestamp};
use chronicis_db::models::search::SearchHit;
use chronicis_db::repositories::{MemberRepo, SearchRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::SearchParams;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::tree::{ArticleTree, Viewer};

#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub id: DbId,
    pub world_id: Option<DbId>,
    pub title: String,
    pub slug: String,
    pub article_type: String,
    pub snippet: String,
    pub ancestor_path: Vec<Breadcrumb>,
    pub updated_at: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub title_matches: Vec<SearchResult>,
    pub body_matches: Vec<SearchResult>,
    pub hashtag_matches: Vec<SearchResult>,
    pub total_results: usize,
}

impl SearchResults {
    fn empty(query: String) -> Self {
        Self {
            query,
            title_matches: Vec::new(),
            body_matches: Vec::new(),
            hashtag_matches: Vec::new(),
            total_results: 0,
        }
    }
}

/// Drop hits already reported in an earlier category and decorate the rest.
fn collect(
    hits: Vec<SearchHit>,
    seen: &mut HashSet<DbId>,
    tree: &ArticleTree,
    term: &str,
) -> Vec<SearchResult> {
    let ancestors_only = WalkOptions {
        include_current: false,
        ..WalkOptions::default()
    };
    hits.into_iter()
        .filter(|hit| seen.insert(hit.id))
        .map(|hit| SearchResult {
            snippet: extract_snippet(hit.body.as_deref().unwrap_or(""), term, SNIPPET_CONTEXT),
            ancestor_path: tree.crumbs(hit.id, &Scope::default(), ancestors_only),
            id: hit.id,
            world_id: hit.world_id,
            title: hit.title,
            slug: hit.slug,
            article_type: hit.article_type,
            updated_at: hit.updated_at,
        })
        .collect()
}

/// GET /api/v1/search?query=
///
/// Title hits first, then body hits, then `#query` hashtag hits; an
/// article appears in the first category that finds it. Tutorials are not
/// searched.
pub async fn search(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<impl IntoResponse> {
    let term = params.query.trim().to_string();
    if !is_searchable(&term) {
        return Ok(Json(DataResponse {
            data: SearchResults::empty(term),
        }));
    }

    let world_ids = MemberRepo::world_ids_for_user(&state.pool, auth.user_id).await?;
    if world_ids.is_empty() {
        return Ok(Json(DataResponse {
            data: SearchResults::empty(term),
        }));
    }

    let escaped = escape_like(&term);
    let tag = escape_like(term.trim_start_matches('#'));
    let pool = &state.pool;
    let viewer = auth.user_id;

    let titles =
        SearchRepo::title_matches(pool, &world_ids, viewer, &escaped, RESULTS_PER_CATEGORY).await?;
    let bodies =
        SearchRepo::body_matches(pool, &world_ids, viewer, &escaped, RESULTS_PER_CATEGORY).await?;
    let hashtags =
        SearchRepo::hashtag_matches(pool, &world_ids, viewer, &tag, RESULTS_PER_CATEGORY).await?;

    let tree = ArticleTree::load_many(pool, &world_ids, Viewer::User(viewer)).await?;
    let mut seen = HashSet::new();
    let title_matches = collect(titles, &mut seen, &tree, &term);
    let body_matches = collect(bodies, &mut seen, &tree, &term);
    let hashtag_matches = collect(hashtags, &mut seen, &tree, &term);
    let total_results = title_matches.len() + body_matches.len() + hashtag_matches.len();

    tracing::debug!(user_id = %viewer, total_results, "Search completed");

    Ok(Json(DataResponse {
        data: SearchResults {
            query: term,
            title_matches,
            body_matches,
            hashtag_matches,
            total_results,
        },
    }))
}
