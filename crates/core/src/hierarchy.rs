//! Article tree walking: breadcrumbs, paths and cycle checks.
//!
//! The repository layer loads a world's article skeleton once and hands it
//! to these functions as a [`NodeLookup`], so walking never issues one query
//! per ancestor.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::kinds::{ArticleType, ArticleVisibility};
use crate::slug::virtual_group_slug;
use crate::types::DbId;

/// Hard stop for ancestor walks, even on corrupt data.
pub const MAX_DEPTH: usize = 200;

/// Title shown for articles without one.
pub const UNTITLED: &str = "(Untitled)";

// ---------------------------------------------------------------------------
// Node and lookup
// ---------------------------------------------------------------------------

/// The parts of an article needed to place it in the tree.
#[derive(Debug, Clone)]
pub struct ArticleNode {
    pub id: DbId,
    pub parent_id: Option<DbId>,
    pub title: String,
    pub slug: String,
    pub article_type: ArticleType,
    pub visibility: ArticleVisibility,
    pub campaign_id: Option<DbId>,
    pub arc_id: Option<DbId>,
}

/// Read access to article nodes by id.
pub trait NodeLookup {
    fn node(&self, id: DbId) -> Option<&ArticleNode>;
}

impl NodeLookup for HashMap<DbId, ArticleNode> {
    fn node(&self, id: DbId) -> Option<&ArticleNode> {
        self.get(&id)
    }
}

/// Index a list of nodes by id.
pub fn index_nodes(nodes: Vec<ArticleNode>) -> HashMap<DbId, ArticleNode> {
    nodes.into_iter().map(|n| (n.id, n)).collect()
}

// ---------------------------------------------------------------------------
// Breadcrumbs
// ---------------------------------------------------------------------------

/// One step of a breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub article_type: Option<ArticleType>,
    pub is_world: bool,
    pub is_virtual_group: bool,
}

impl Breadcrumb {
    fn from_node(node: &ArticleNode) -> Self {
        let title = if node.title.trim().is_empty() {
            UNTITLED.to_string()
        } else {
            node.title.clone()
        };
        Self {
            id: node.id,
            title,
            slug: node.slug.clone(),
            article_type: Some(node.article_type),
            is_world: false,
            is_virtual_group: false,
        }
    }

    fn virtual_group(id: DbId, title: &str, slug: String) -> Self {
        Self {
            id,
            title: title.to_string(),
            slug,
            article_type: None,
            is_world: false,
            is_virtual_group: true,
        }
    }
}

/// Named containers that sit above an article's root.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    /// `(id, name, slug)` of the world.
    pub world: Option<(DbId, String, String)>,
    /// `(id, name)` of the campaign, when the root belongs to one.
    pub campaign: Option<(DbId, String)>,
    /// `(id, name)` of the arc, when the root belongs to one.
    pub arc: Option<(DbId, String)>,
}

/// Knobs for [`breadcrumbs`].
#[derive(Debug, Clone, Copy)]
pub struct WalkOptions {
    /// Stop at the first ancestor that is not public.
    pub public_only: bool,
    pub include_world: bool,
    pub include_virtual_groups: bool,
    pub include_current: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            public_only: false,
            include_world: false,
            include_virtual_groups: false,
            include_current: true,
        }
    }
}

/// Collect `start` and its ancestors, root first.
///
/// Stops on a missing parent, a repeated id, or after [`MAX_DEPTH`] steps.
pub fn walk_ancestors<'a, L: NodeLookup>(
    start: &'a ArticleNode,
    lookup: &'a L,
    public_only: bool,
) -> Vec<&'a ArticleNode> {
    let mut chain = vec![start];
    let mut visited = HashSet::from([start.id]);
    let mut current = start;

    while let Some(parent_id) = current.parent_id {
        if chain.len() >= MAX_DEPTH || !visited.insert(parent_id) {
            break;
        }
        let Some(parent) = lookup.node(parent_id) else {
            break;
        };
        if public_only && parent.visibility != ArticleVisibility::Public {
            break;
        }
        chain.push(parent);
        current = parent;
    }

    chain.reverse();
    chain
}

/// Build the breadcrumb trail for `start`.
pub fn breadcrumbs<L: NodeLookup>(
    start: &ArticleNode,
    lookup: &L,
    scope: &Scope,
    options: WalkOptions,
) -> Vec<Breadcrumb> {
    let chain = walk_ancestors(start, lookup, options.public_only);
    let mut crumbs = Vec::with_capacity(chain.len() + 3);

    if options.include_world {
        if let Some((id, name, slug)) = &scope.world {
            crumbs.push(Breadcrumb {
                id: *id,
                title: name.clone(),
                slug: slug.clone(),
                article_type: None,
                is_world: true,
                is_virtual_group: false,
            });
        }
    }

    if options.include_virtual_groups {
        if let Some(root) = chain.first() {
            crumbs.extend(virtual_groups_for_root(root, scope));
        }
    }

    let take = if options.include_current {
        chain.len()
    } else {
        chain.len().saturating_sub(1)
    };
    crumbs.extend(chain.iter().take(take).map(|n| Breadcrumb::from_node(n)));
    crumbs
}

/// Virtual containers for a root article.
///
/// Campaign-scoped roots sit under their campaign and arc; other character
/// and wiki roots sit under the fixed "Player Characters" and "Wiki" groups.
pub fn virtual_groups_for_root(root: &ArticleNode, scope: &Scope) -> Vec<Breadcrumb> {
    let mut groups = Vec::new();
    if root.campaign_id.is_some() {
        if let Some((id, name)) = &scope.campaign {
            groups.push(Breadcrumb::virtual_group(*id, name, virtual_group_slug(name)));
        }
        if let Some((id, name)) = &scope.arc {
            groups.push(Breadcrumb::virtual_group(*id, name, virtual_group_slug(name)));
        }
        return groups;
    }
    match root.article_type {
        ArticleType::Character => groups.push(Breadcrumb::virtual_group(
            DbId::nil(),
            "Player Characters",
            "characters".into(),
        )),
        ArticleType::WikiArticle => {
            groups.push(Breadcrumb::virtual_group(DbId::nil(), "Wiki", "wiki".into()))
        }
        _ => {}
    }
    groups
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// Slugs joined with `/`.
pub fn build_path(crumbs: &[Breadcrumb]) -> String {
    crumbs
        .iter()
        .map(|c| c.slug.as_str())
        .collect::<Vec<_>>()
        .join("/")
}

/// Titles joined with ` / `, dropping the first level when there are several.
pub fn build_display_path(crumbs: &[Breadcrumb]) -> String {
    let titles: Vec<&str> = crumbs.iter().map(|c| c.title.as_str()).collect();
    let visible = if titles.len() > 1 { &titles[1..] } else { &titles[..] };
    visible.join(" / ")
}

/// Display path of an article computed straight from the skeleton.
pub fn display_path_for<L: NodeLookup>(start: &ArticleNode, lookup: &L) -> String {
    build_display_path(&breadcrumbs(start, lookup, &Scope::default(), WalkOptions::default()))
}

/// Titles of `start` and its ancestors, root first.
pub fn title_segments<L: NodeLookup>(start: &ArticleNode, lookup: &L) -> Vec<String> {
    walk_ancestors(start, lookup, false)
        .into_iter()
        .map(|n| n.title.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Cycle checks
// ---------------------------------------------------------------------------

/// `true` when `candidate` is `ancestor` or sits somewhere below it.
///
/// Used to refuse moves, so an unanswerable walk counts as a descendant: a
/// chain longer than [`MAX_DEPTH`] or one that already loops both return
/// `true`. A missing parent ends the chain.
pub fn is_self_or_descendant<L: NodeLookup>(candidate: DbId, ancestor: DbId, lookup: &L) -> bool {
    let mut visited = HashSet::new();
    let mut current = Some(candidate);

    while let Some(id) = current {
        if id == ancestor {
            return true;
        }
        if visited.len() >= MAX_DEPTH || !visited.insert(id) {
            return true;
        }
        current = lookup.node(id).and_then(|n| n.parent_id);
    }
    false
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
