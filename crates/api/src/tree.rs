//! In-memory article hierarchy for a request.
//!
//! Loads the article skeleton of one or more worlds once and answers
//! breadcrumb and path questions with `chronicis_core::hierarchy`.

use std::collections::HashMap;

use chronicis_core::hierarchy::{
    breadcrumbs, build_display_path, build_path, is_self_or_descendant, title_segments,
    walk_ancestors, ArticleNode, Breadcrumb, NodeLookup, Scope, WalkOptions,
};
use chronicis_core::types::DbId;
use chronicis_db::models::article::ArticleSkeleton;
use chronicis_db::models::world::World;
use chronicis_db::repositories::{ArcRepo, ArticleRepo, CampaignRepo};
use sqlx::PgPool;

use crate::error::AppResult;

/// Who is looking at the tree.
#[derive(Debug, Clone, Copy)]
pub enum Viewer {
    /// A signed-in user: private articles of other users are hidden.
    User(DbId),
    /// Anonymous public access: only public articles are kept.
    Public,
    /// Structural checks: every article, whatever its visibility.
    All,
}

impl Viewer {
    fn can_see(self, skeleton: &ArticleSkeleton) -> bool {
        match self {
            Viewer::User(id) => skeleton.visibility != "private" || skeleton.created_by == id,
            Viewer::Public => skeleton.visibility == "public",
            Viewer::All => true,
        }
    }
}

/// Article nodes indexed by id, filtered for one viewer.
#[derive(Debug, Default)]
pub struct ArticleTree {
    nodes: HashMap<DbId, ArticleNode>,
}

impl NodeLookup for ArticleTree {
    fn node(&self, id: DbId) -> Option<&ArticleNode> {
        self.nodes.get(&id)
    }
}

impl ArticleTree {
    /// Skeleton of one world, or of the tutorials when `world_id` is `None`.
    pub async fn load(pool: &PgPool, world_id: Option<DbId>, viewer: Viewer) -> AppResult<Self> {
        let rows = ArticleRepo::skeleton(pool, world_id).await?;
        Self::from_rows(rows, viewer)
    }

    /// Skeletons of several worlds.
    pub async fn load_many(pool: &PgPool, world_ids: &[DbId], viewer: Viewer) -> AppResult<Self> {
        let rows = ArticleRepo::skeleton_for_worlds(pool, world_ids).await?;
        Self::from_rows(rows, viewer)
    }

    pub(crate) fn from_rows(rows: Vec<ArticleSkeleton>, viewer: Viewer) -> AppResult<Self> {
        let mut nodes = HashMap::with_capacity(rows.len());
        for row in rows.iter().filter(|r| viewer.can_see(r)) {
            nodes.insert(row.id, row.to_node()?);
        }
        Ok(Self { nodes })
    }

    pub fn contains(&self, id: DbId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Every node, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &ArticleNode> {
        self.nodes.values()
    }

    /// Breadcrumbs for `id`; empty when the article is not in the tree.
    pub fn crumbs(&self, id: DbId, scope: &Scope, options: WalkOptions) -> Vec<Breadcrumb> {
        self.nodes
            .get(&id)
            .map(|node| breadcrumbs(node, self, scope, options))
            .unwrap_or_default()
    }

    /// Slug path from the root down to `id`.
    pub fn path(&self, id: DbId) -> String {
        build_path(&self.crumbs(id, &Scope::default(), WalkOptions::default()))
    }

    /// Human-readable ` / ` path of `id`.
    pub fn display_path(&self, id: DbId) -> String {
        build_display_path(&self.crumbs(id, &Scope::default(), WalkOptions::default()))
    }

    /// Titles from the root down to `id`.
    pub fn title_segments(&self, id: DbId) -> Vec<String> {
        self.nodes
            .get(&id)
            .map(|node| title_segments(node, self))
            .unwrap_or_default()
    }

    /// `true` when `candidate` is `ancestor` or below it.
    ///
    /// Only meaningful on a [`Viewer::All`] tree: a hidden article in the
    /// middle of the chain would otherwise end the walk early.
    pub fn is_self_or_descendant(&self, candidate: DbId, ancestor: DbId) -> bool {
        is_self_or_descendant(candidate, ancestor, self)
    }

    /// The root article above `id` (possibly `id` itself).
    pub fn root_of(&self, id: DbId) -> Option<&ArticleNode> {
        let node = self.nodes.get(&id)?;
        walk_ancestors(node, self, false).into_iter().next()
    }
}

/// Resolve the named containers above the root of `id` for virtual-group crumbs.
pub async fn scope_for(
    pool: &PgPool,
    tree: &ArticleTree,
    world: Option<&World>,
    id: DbId,
) -> AppResult<Scope> {
    let mut scope = Scope {
        world: world.map(|w| (w.id, w.name.clone(), w.slug.clone())),
        ..Scope::default()
    };
    let Some(root) = tree.root_of(id) else {
        return Ok(scope);
    };
    if let Some(campaign_id) = root.campaign_id {
        if let Some(campaign) = CampaignRepo::find_by_id(pool, campaign_id).await? {
            scope.campaign = Some((campaign.id, campaign.name));
        }
    }
    if let Some(arc_id) = root.arc_id {
        if let Some(arc) = ArcRepo::find_by_id(pool, arc_id).await? {
            scope.arc = Some((arc.id, arc.name));
        }
    }
    Ok(scope)
}
