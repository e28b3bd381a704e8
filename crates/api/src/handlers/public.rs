//! Anonymous read-only access to worlds their owners have made public.
//!
//! Only `public` articles are ever returned. An article whose parent is not
//! public is left out of the tree.

use std::collections::{HashMap, HashSet};

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chronicis_core::error::CoreError;
use chronicis_core::hierarchy::{Breadcrumb, WalkOptions};
use chronicis_core::kinds::{ArticleType, ArticleVisibility};
use chronicis_core::slug::virtual_group_slug;
use chronicis_core::types::{DbId, Timestamp};
use chronicis_db::models::article::{Article, ArticleTreeItem};
use chronicis_db::models::campaign::Campaign;
use chronicis_db::models::world::World;
use chronicis_db::repositories::{ArcRepo, ArticleRepo, CampaignRepo, SessionRepo, WorldRepo};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::tree::{scope_for, ArticleTree, Viewer};

#[derive(Debug, Serialize)]
pub struct PublicWorld {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub public_slug: Option<String>,
    pub description: Option<String>,
    pub campaigns: Vec<Campaign>,
}

/// A node of the public tree: an article or a virtual group.
#[derive(Debug, Serialize)]
pub struct PublicTreeNode {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub article_type: Option<String>,
    pub icon_emoji: Option<String>,
    pub is_virtual_group: bool,
    pub children: Vec<PublicTreeNode>,
}

#[derive(Debug, Serialize)]
pub struct PublicArticle {
    pub id: DbId,
    pub world_id: DbId,
    pub title: String,
    pub slug: String,
    pub body: Option<String>,
    pub article_type: String,
    pub icon_emoji: Option<String>,
    pub effective_date: Timestamp,
    pub in_game_date: Option<String>,
    pub updated_at: Timestamp,
    pub breadcrumbs: Vec<Breadcrumb>,
}

async fn public_world(pool: &PgPool, public_slug: &str) -> AppResult<World> {
    let slug = public_slug.trim().to_lowercase();
    WorldRepo::find_public_by_slug(pool, &slug)
        .await?
        .ok_or_else(|| {
            CoreError::NotFoundByKey {
                entity: "World",
                key: slug,
            }
            .into()
        })
}

/// GET /api/v1/public/worlds/{public_slug}
pub async fn get_world(
    State(state): State<AppState>,
    Path(public_slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let world = public_world(&state.pool, &public_slug).await?;
    let campaigns = CampaignRepo::list_for_world(&state.pool, world.id).await?;
    Ok(Json(DataResponse {
        data: PublicWorld {
            id: world.id,
            name: world.name,
            slug: world.slug,
            public_slug: world.public_slug,
            description: world.description,
            campaigns,
        },
    }))
}

/* --------------------------------------------------------------------------
Tree
-------------------------------------------------------------------------- */

/// Campaign structure used to place session notes.
#[derive(Debug, Clone)]
pub struct CampaignOutline {
    pub id: DbId,
    pub name: String,
    pub arcs: Vec<ArcOutline>,
}

#[derive(Debug, Clone)]
pub struct ArcOutline {
    pub id: DbId,
    pub name: String,
    /// `(id, name)` in play order.
    pub sessions: Vec<(DbId, String)>,
}

fn group(id: DbId, title: &str, slug: String, children: Vec<PublicTreeNode>) -> PublicTreeNode {
    PublicTreeNode {
        id,
        title: title.to_string(),
        slug,
        article_type: None,
        icon_emoji: None,
        is_virtual_group: true,
        children,
    }
}

fn sort_by_title(nodes: &mut [PublicTreeNode]) {
    nodes.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
}

/// Arrange public articles into the virtual groups shown to visitors.
///
/// Root session notes hang under campaign, arc and session groups; other
/// roots go under `characters`, `wiki` or `uncategorized`. Empty groups are
/// dropped.
pub fn build_public_tree(items: Vec<ArticleTreeItem>, campaigns: &[CampaignOutline]) -> Vec<PublicTreeNode> {
    let ids: HashSet<DbId> = items.iter().map(|i| i.id).collect();
    let mut by_parent: HashMap<Option<DbId>, Vec<ArticleTreeItem>> = HashMap::new();
    for item in items {
        // Orphans of non-public parents stay hidden.
        if item.parent_id.is_some_and(|p| !ids.contains(&p)) {
            continue;
        }
        by_parent.entry(item.parent_id).or_default().push(item);
    }

    fn build(item: ArticleTreeItem, by_parent: &mut HashMap<Option<DbId>, Vec<ArticleTreeItem>>) -> PublicTreeNode {
        let children_rows = by_parent.remove(&Some(item.id)).unwrap_or_default();
        let mut children: Vec<PublicTreeNode> = children_rows
            .into_iter()
            .map(|c| build(c, by_parent))
            .collect();
        sort_by_title(&mut children);
        PublicTreeNode {
            id: item.id,
            title: item.title,
            slug: item.slug,
            article_type: Some(item.article_type),
            icon_emoji: item.icon_emoji,
            is_virtual_group: false,
            children,
        }
    }

    let roots = by_parent.remove(&None).unwrap_or_default();
    let mut session_notes: HashMap<DbId, Vec<PublicTreeNode>> = HashMap::new();
    let mut characters = Vec::new();
    let mut wiki = Vec::new();
    let mut uncategorized = Vec::new();

    for root in roots {
        let kind = ArticleType::from_name(&root.article_type).ok();
        let session_id = root.session_id;
        let node = build(root, &mut by_parent);
        match (kind, session_id) {
            (Some(ArticleType::SessionNote), Some(session_id)) => {
                session_notes.entry(session_id).or_default().push(node)
            }
            (Some(ArticleType::Character), _) => characters.push(node),
            (Some(ArticleType::WikiArticle), _) => wiki.push(node),
            _ => uncategorized.push(node),
        }
    }

    let mut campaign_nodes = Vec::new();
    for campaign in campaigns {
        let mut arc_nodes = Vec::new();
        for arc in &campaign.arcs {
            let mut session_nodes = Vec::new();
            for (session_id, session_name) in &arc.sessions {
                let Some(mut notes) = session_notes.remove(session_id) else {
                    continue;
                };
                sort_by_title(&mut notes);
                session_nodes.push(group(
                    *session_id,
                    session_name,
                    virtual_group_slug(session_name),
                    notes,
                ));
            }
            if !session_nodes.is_empty() {
                arc_nodes.push(group(arc.id, &arc.name, virtual_group_slug(&arc.name), session_nodes));
            }
        }
        if !arc_nodes.is_empty() {
            campaign_nodes.push(group(
                campaign.id,
                &campaign.name,
                virtual_group_slug(&campaign.name),
                arc_nodes,
            ));
        }
    }
    // Notes whose session is gone have nowhere else to live.
    uncategorized.extend(session_notes.into_values().flatten());

    let mut groups = Vec::new();
    for (title, slug, mut children) in [
        ("Campaigns", "campaigns", campaign_nodes),
        ("Player Characters", "characters", characters),
        ("Wiki", "wiki", wiki),
        ("Uncategorized", "uncategorized", uncategorized),
    ] {
        if children.is_empty() {
            continue;
        }
        if slug != "campaigns" {
            sort_by_title(&mut children);
        }
        groups.push(group(DbId::nil(), title, slug.to_string(), children));
    }
    groups
}

async fn campaign_outlines(pool: &PgPool, world_id: DbId) -> AppResult<Vec<CampaignOutline>> {
    let mut outlines = Vec::new();
    for campaign in CampaignRepo::list_for_world(pool, world_id).await? {
        let mut arcs = Vec::new();
        for arc in ArcRepo::list_for_campaign(pool, campaign.id).await? {
            let sessions = SessionRepo::list_for_arc(pool, arc.arc.id)
                .await?
                .into_iter()
                .map(|s| (s.id, s.name))
                .collect();
            arcs.push(ArcOutline {
                id: arc.arc.id,
                name: arc.arc.name,
                sessions,
            });
        }
        outlines.push(CampaignOutline {
            id: campaign.id,
            name: campaign.name,
            arcs,
        });
    }
    Ok(outlines)
}

/// GET /api/v1/public/worlds/{public_slug}/articles
pub async fn get_tree(
    State(state): State<AppState>,
    Path(public_slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let world = public_world(&state.pool, &public_slug).await?;
    let items = ArticleRepo::list_public(&state.pool, world.id).await?;
    let campaigns = campaign_outlines(&state.pool, world.id).await?;
    Ok(Json(DataResponse {
        data: build_public_tree(items, &campaigns),
    }))
}

/// GET /api/v1/public/worlds/{public_slug}/articles/{*path}
pub async fn get_article(
    State(state): State<AppState>,
    Path((public_slug, path)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let world = public_world(&state.pool, &public_slug).await?;
    let not_found = || CoreError::NotFoundByKey {
        entity: "Article",
        key: path.clone(),
    };

    let mut current: Option<Article> = None;
    for slug in path.split('/').filter(|s| !s.is_empty()) {
        let parent_id = current.as_ref().map(|a| a.id);
        let next = ArticleRepo::find_by_slug(&state.pool, Some(world.id), parent_id, slug)
            .await?
            .filter(|a| a.visibility == ArticleVisibility::Public.as_str())
            .ok_or_else(not_found)?;
        current = Some(next);
    }
    let article = current.ok_or_else(not_found)?;

    let tree = ArticleTree::load(&state.pool, Some(world.id), Viewer::Public).await?;
    let scope = scope_for(&state.pool, &tree, Some(&world), article.id).await?;
    let breadcrumbs = tree.crumbs(
        article.id,
        &scope,
        WalkOptions {
            public_only: true,
            include_world: true,
            include_virtual_groups: true,
            include_current: true,
        },
    );

    Ok(Json(DataResponse {
        data: PublicArticle {
            id: article.id,
            world_id: world.id,
            title: article.title,
            slug: article.slug,
            body: article.body,
            article_type: article.article_type,
            icon_emoji: article.icon_emoji,
            effective_date: article.effective_date,
            in_game_date: article.in_game_date,
            updated_at: article.updated_at,
            breadcrumbs,
        },
    }))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn item(n: u128, parent: Option<u128>, title: &str, kind: &str, session: Option<u128>) -> ArticleTreeItem {
        ArticleTreeItem {
            id: DbId::from_u128(n),
            world_id: Some(DbId::from_u128(100)),
            parent_id: parent.map(DbId::from_u128),
            campaign_id: None,
            arc_id: None,
            session_id: session.map(DbId::from_u128),
            title: title.to_string(),
            slug: chronicis_core::slug::generate_slug(title),
            article_type: kind.to_string(),
            visibility: "public".into(),
            icon_emoji: None,
            effective_date: Utc::now(),
            player_id: None,
            created_by: DbId::from_u128(1),
            has_children: false,
            child_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn outline() -> Vec<CampaignOutline> {
        vec![CampaignOutline {
            id: DbId::from_u128(50),
            name: "Campaign 1".into(),
            arcs: vec![
                ArcOutline {
                    id: DbId::from_u128(60),
                    name: "Arc 1".into(),
                    sessions: vec![
                        (DbId::from_u128(70), "Session 1".into()),
                        (DbId::from_u128(71), "Session 2".into()),
                    ],
                },
                ArcOutline {
                    id: DbId::from_u128(61),
                    name: "Arc 2".into(),
                    sessions: vec![],
                },
            ],
        }]
    }

    #[test]
    fn roots_are_grouped_by_kind() {
        let tree = build_public_tree(
            vec![
                item(1, None, "Vex", "character", None),
                item(2, None, "Locations", "wiki_article", None),
                item(3, Some(2), "Waterdeep", "wiki_article", None),
                item(4, None, "Vex's Notes", "session_note", Some(70)),
                item(5, None, "Old Page", "act", None),
            ],
            &outline(),
        );
        let slugs: Vec<&str> = tree.iter().map(|g| g.slug.as_str()).collect();
        assert_eq!(slugs, vec!["campaigns", "characters", "wiki", "uncategorized"]);

        let campaign = &tree[0].children[0];
        assert_eq!(campaign.title, "Campaign 1");
        assert_eq!(campaign.children.len(), 1, "empty arcs are pruned");
        let session = &campaign.children[0].children[0];
        assert_eq!(session.title, "Session 1");
        assert_eq!(session.children[0].title, "Vex's Notes");

        assert_eq!(tree[2].children[0].children[0].title, "Waterdeep");
    }

    #[test]
    fn children_of_hidden_parents_are_omitted() {
        let tree = build_public_tree(
            vec![item(3, Some(99), "Castle Ward", "wiki_article", None)],
            &outline(),
        );
        assert!(tree.is_empty());
    }

    #[test]
    fn children_are_sorted_by_title() {
        let tree = build_public_tree(
            vec![
                item(1, None, "zebra", "wiki_article", None),
                item(2, None, "Apple", "wiki_article", None),
            ],
            &[],
        );
        let titles: Vec<&str> = tree[0].children.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Apple", "zebra"]);
    }
}
