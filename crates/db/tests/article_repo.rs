//! Integration tests for articles, links, hashtags and aliases.

use chronicis_core::hashtags::{parse_hashtags, ParsedHashtag};
use chronicis_core::kinds::{ArticleType, ArticleVisibility};
use chronicis_core::links::{parse_links, ParsedLink};
use chronicis_core::types::DbId;
use chronicis_db::models::article::{Article, NewArticle};
use chronicis_db::models::user::{User, UserIdentity};
use chronicis_db::models::world::{NewWorld, World};
use chronicis_db::repositories::{
    AliasRepo, ArticleRepo, HashtagRepo, LinkRepo, SearchRepo, UserRepo, WorldRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn user(pool: &PgPool, subject: &str) -> User {
    UserRepo::get_or_create(
        pool,
        &UserIdentity {
            auth_subject: subject.to_string(),
            email: format!("{subject}@example.com"),
            display_name: subject.to_string(),
            avatar_url: None,
        },
    )
    .await
    .unwrap()
}

async fn world(pool: &PgPool, owner: DbId) -> World {
    WorldRepo::create_with_defaults(
        pool,
        &NewWorld {
            name: "Greyhawk".into(),
            slug: "greyhawk".into(),
            description: None,
            owner_id: owner,
        },
    )
    .await
    .unwrap()
}

fn new_article(world_id: DbId, parent_id: Option<DbId>, title: &str, by: DbId) -> NewArticle {
    NewArticle {
        world_id: Some(world_id),
        parent_id,
        campaign_id: None,
        arc_id: None,
        session_id: None,
        title: title.to_string(),
        slug: chronicis_core::slug::generate_slug(title),
        body: None,
        article_type: ArticleType::WikiArticle,
        visibility: ArticleVisibility::Public,
        icon_emoji: None,
        effective_date: chrono::Utc::now(),
        in_game_date: None,
        player_id: None,
        created_by: by,
    }
}

async fn insert(pool: &PgPool, input: NewArticle) -> Article {
    let body = input.body.clone().unwrap_or_default();
    ArticleRepo::create(pool, &input, &parse_links(&body), &parse_hashtags(&body))
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn children_and_sibling_slugs(pool: PgPool) {
    let gm = user(&pool, "gm").await;
    let w = world(&pool, gm.id).await;
    let parent = insert(&pool, new_article(w.id, None, "Cities", gm.id)).await;
    insert(&pool, new_article(w.id, Some(parent.id), "Waterdeep", gm.id)).await;
    insert(&pool, new_article(w.id, Some(parent.id), "Baldur's Gate", gm.id)).await;

    let children = ArticleRepo::list_children(&pool, parent.id, gm.id).await.unwrap();
    let titles: Vec<&str> = children.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Baldur's Gate", "Waterdeep"]);

    let roots = ArticleRepo::list_roots(&pool, w.id, gm.id).await.unwrap();
    let cities = roots.iter().find(|r| r.id == parent.id).unwrap();
    assert!(cities.has_children);
    assert_eq!(cities.child_count, 2);

    let mut slugs = ArticleRepo::sibling_slugs(&pool, Some(w.id), Some(parent.id), None)
        .await
        .unwrap();
    slugs.sort();
    assert_eq!(slugs, vec!["baldur-s-gate".to_string(), "waterdeep".to_string()]);
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_slug_at_same_location_rejected(pool: PgPool) {
    let gm = user(&pool, "gm").await;
    let w = world(&pool, gm.id).await;
    insert(&pool, new_article(w.id, None, "Harbor", gm.id)).await;

    let dup = ArticleRepo::create(&pool, &new_article(w.id, None, "Harbor", gm.id), &[], &[]).await;
    match dup {
        Err(sqlx::Error::Database(e)) => assert_eq!(e.constraint(), Some("uq_articles_location_slug")),
        other => panic!("expected unique violation, got {other:?}"),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn private_articles_only_visible_to_creator(pool: PgPool) {
    let gm = user(&pool, "gm").await;
    let other = user(&pool, "other").await;
    let w = world(&pool, gm.id).await;
    let mut secret = new_article(w.id, None, "Secret Plans", gm.id);
    secret.visibility = ArticleVisibility::Private;
    let secret = insert(&pool, secret).await;

    let for_gm = ArticleRepo::list_roots(&pool, w.id, gm.id).await.unwrap();
    assert!(for_gm.iter().any(|a| a.id == secret.id));
    let for_other = ArticleRepo::list_roots(&pool, w.id, other.id).await.unwrap();
    assert!(!for_other.iter().any(|a| a.id == secret.id));
    let public = ArticleRepo::list_public(&pool, w.id).await.unwrap();
    assert!(!public.iter().any(|a| a.id == secret.id));
}

#[sqlx::test(migrations = "./migrations")]
async fn move_reparents(pool: PgPool) {
    let gm = user(&pool, "gm").await;
    let w = world(&pool, gm.id).await;
    let a = insert(&pool, new_article(w.id, None, "Region", gm.id)).await;
    let b = insert(&pool, new_article(w.id, None, "Town", gm.id)).await;

    let moved = ArticleRepo::move_to(&pool, b.id, Some(a.id), "town", gm.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.parent_id, Some(a.id));
    assert_eq!(moved.modified_by, Some(gm.id));
    let found = ArticleRepo::find_by_slug(&pool, Some(w.id), Some(a.id), "town")
        .await
        .unwrap();
    assert_eq!(found.map(|f| f.id), Some(b.id));
}

#[sqlx::test(migrations = "./migrations")]
async fn delete_removes_subtree_and_links(pool: PgPool) {
    let gm = user(&pool, "gm").await;
    let w = world(&pool, gm.id).await;
    let root = insert(&pool, new_article(w.id, None, "Kingdom", gm.id)).await;
    let child = insert(&pool, new_article(w.id, Some(root.id), "Duchy", gm.id)).await;
    let grandchild = insert(&pool, new_article(w.id, Some(child.id), "Barony", gm.id)).await;

    let mut linker = new_article(w.id, None, "Chronicle", gm.id);
    linker.body = Some(format!("See [[{}|the barony]].", grandchild.id));
    let linker = insert(&pool, linker).await;
    assert_eq!(LinkRepo::backlinks(&pool, grandchild.id, gm.id).await.unwrap().len(), 1);

    let removed = ArticleRepo::delete_recursive(&pool, root.id).await.unwrap();
    assert_eq!(removed, 3);
    assert!(ArticleRepo::find_by_id(&pool, grandchild.id).await.unwrap().is_none());
    assert!(LinkRepo::outgoing(&pool, linker.id, gm.id).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Links and hashtags
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn links_drop_self_and_missing_targets(pool: PgPool) {
    let gm = user(&pool, "gm").await;
    let w = world(&pool, gm.id).await;
    let target = insert(&pool, new_article(w.id, None, "Target", gm.id)).await;
    let source = insert(&pool, new_article(w.id, None, "Source", gm.id)).await;

    let missing = DbId::new_v4();
    let body = format!(
        "<p>[[{}|Target]] and [[{}]] and [[{missing}]]</p>",
        target.id, source.id
    );
    let mut changes = chronicis_db::models::article::ArticleChanges {
        world_id: source.world_id,
        parent_id: None,
        campaign_id: None,
        arc_id: None,
        session_id: None,
        title: source.title.clone(),
        slug: source.slug.clone(),
        body: Some(body.clone()),
        article_type: ArticleType::WikiArticle,
        visibility: ArticleVisibility::Public,
        icon_emoji: None,
        effective_date: source.effective_date,
        in_game_date: None,
        modified_by: gm.id,
    };
    let links = parse_links(&body);
    let no_tags: &[ParsedHashtag] = &[];
    ArticleRepo::update(&pool, source.id, &changes, Some((links.as_slice(), no_tags)))
        .await
        .unwrap()
        .unwrap();

    let outgoing = LinkRepo::outgoing(&pool, source.id, gm.id).await.unwrap();
    assert_eq!(outgoing.len(), 1);
    assert_eq!(outgoing[0].article_id, target.id);
    assert_eq!(outgoing[0].display_text.as_deref(), Some("Target"));

    // Clearing the body clears the links.
    changes.body = None;
    let no_links: &[ParsedLink] = &[];
    ArticleRepo::update(&pool, source.id, &changes, Some((no_links, no_tags)))
        .await
        .unwrap();
    assert!(LinkRepo::backlinks(&pool, target.id, gm.id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn new_hashtag_links_to_matching_article(pool: PgPool) {
    let gm = user(&pool, "gm").await;
    let w = world(&pool, gm.id).await;
    let dragons = insert(&pool, new_article(w.id, None, "Dragons", gm.id)).await;

    let mut note = new_article(w.id, None, "Session Log", gm.id);
    note.body = Some("<p>We met #dragons and #goblins today</p>".into());
    insert(&pool, note).await;

    let tags = HashtagRepo::list_for_world(&pool, w.id).await.unwrap();
    assert_eq!(tags.len(), 2);
    let dragon_tag = tags.iter().find(|t| t.name == "dragons").unwrap();
    assert_eq!(dragon_tag.linked_article_id, Some(dragons.id));
    assert_eq!(dragon_tag.usage_count, 1);
    let goblin_tag = tags.iter().find(|t| t.name == "goblins").unwrap();
    assert_eq!(goblin_tag.linked_article_id, None);

    let hits = SearchRepo::hashtag_matches(&pool, &[w.id], gm.id, "dragon", 20)
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Session Log");
}

fn tagged_note(world_id: DbId, title: &str, body: &str, by: DbId) -> NewArticle {
    let mut note = new_article(world_id, None, title, by);
    note.body = Some(body.to_string());
    note
}

async fn link_target(pool: &PgPool, world_id: DbId, name: &str) -> Option<DbId> {
    HashtagRepo::list_for_world(pool, world_id)
        .await
        .unwrap()
        .into_iter()
        .find(|t| t.name == name)
        .and_then(|t| t.linked_article_id)
}

#[sqlx::test(migrations = "./migrations")]
async fn existing_unlinked_hashtag_is_linked_when_used_again(pool: PgPool) {
    let gm = user(&pool, "gm").await;
    let other_gm = user(&pool, "other-gm").await;
    let greyhawk = world(&pool, gm.id).await;
    let elsewhere = world(&pool, other_gm.id).await;
    let dragons = insert(&pool, new_article(greyhawk.id, None, "Dragons", gm.id)).await;

    // The tag row is created in a world with no matching article.
    insert(&pool, tagged_note(elsewhere.id, "Rumours", "<p>#dragons</p>", other_gm.id)).await;
    assert_eq!(link_target(&pool, elsewhere.id, "dragons").await, None);

    insert(&pool, tagged_note(greyhawk.id, "Session Log", "<p>#dragons</p>", gm.id)).await;
    assert_eq!(link_target(&pool, greyhawk.id, "dragons").await, Some(dragons.id));
}

#[sqlx::test(migrations = "./migrations")]
async fn creating_an_article_links_pending_hashtags(pool: PgPool) {
    let gm = user(&pool, "gm").await;
    let w = world(&pool, gm.id).await;
    insert(&pool, tagged_note(w.id, "Session Log", "<p>Off to #ravenloft</p>", gm.id)).await;
    assert_eq!(link_target(&pool, w.id, "ravenloft").await, None);

    let ravenloft = insert(&pool, new_article(w.id, None, "Ravenloft", gm.id)).await;
    assert_eq!(link_target(&pool, w.id, "ravenloft").await, Some(ravenloft.id));
}

#[sqlx::test(migrations = "./migrations")]
async fn renaming_an_article_links_pending_hashtags(pool: PgPool) {
    let gm = user(&pool, "gm").await;
    let w = world(&pool, gm.id).await;
    insert(&pool, tagged_note(w.id, "Session Log", "<p>#barovia</p>", gm.id)).await;
    let draft = insert(&pool, new_article(w.id, None, "Draft", gm.id)).await;

    let changes = chronicis_db::models::article::ArticleChanges {
        world_id: draft.world_id,
        parent_id: None,
        campaign_id: None,
        arc_id: None,
        session_id: None,
        title: "Barovia".into(),
        slug: draft.slug.clone(),
        body: None,
        article_type: ArticleType::WikiArticle,
        visibility: ArticleVisibility::Public,
        icon_emoji: None,
        effective_date: draft.effective_date,
        in_game_date: None,
        modified_by: gm.id,
    };
    ArticleRepo::update(&pool, draft.id, &changes, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(link_target(&pool, w.id, "barovia").await, Some(draft.id));
}

#[sqlx::test(migrations = "./migrations")]
async fn hashtags_match_the_title_not_a_custom_slug(pool: PgPool) {
    let gm = user(&pool, "gm").await;
    let w = world(&pool, gm.id).await;
    let mut castle = new_article(w.id, None, "Ravenloft", gm.id);
    castle.slug = "castle-r".into();
    let castle = insert(&pool, castle).await;

    insert(&pool, tagged_note(w.id, "Session Log", "<p>#ravenloft and #castle_r</p>", gm.id)).await;
    assert_eq!(link_target(&pool, w.id, "ravenloft").await, Some(castle.id));
    assert_eq!(link_target(&pool, w.id, "castle_r").await, None);
}

#[sqlx::test(migrations = "./migrations")]
async fn hashtag_links_stay_within_their_world(pool: PgPool) {
    let gm = user(&pool, "gm").await;
    let other_gm = user(&pool, "other-gm").await;
    let greyhawk = world(&pool, gm.id).await;
    let elsewhere = world(&pool, other_gm.id).await;
    let dragons = insert(&pool, new_article(greyhawk.id, None, "Dragons", gm.id)).await;
    insert(&pool, tagged_note(greyhawk.id, "Session Log", "<p>#dragons</p>", gm.id)).await;

    insert(&pool, tagged_note(elsewhere.id, "Rumours", "<p>#dragons</p>", other_gm.id)).await;

    assert_eq!(link_target(&pool, greyhawk.id, "dragons").await, Some(dragons.id));
    assert_eq!(link_target(&pool, elsewhere.id, "dragons").await, None);
}

#[sqlx::test(migrations = "./migrations")]
async fn private_articles_are_not_hashtag_targets(pool: PgPool) {
    let gm = user(&pool, "gm").await;
    let w = world(&pool, gm.id).await;
    let mut secret = new_article(w.id, None, "Lich", gm.id);
    secret.visibility = ArticleVisibility::Private;
    insert(&pool, secret).await;

    insert(&pool, tagged_note(w.id, "Session Log", "<p>#lich</p>", gm.id)).await;
    assert_eq!(link_target(&pool, w.id, "lich").await, None);
}

// ---------------------------------------------------------------------------
// Aliases
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn aliases_replace_and_feed_link_terms(pool: PgPool) {
    let gm = user(&pool, "gm").await;
    let w = world(&pool, gm.id).await;
    let vex = insert(&pool, new_article(w.id, None, "Lord Vex", gm.id)).await;

    AliasRepo::replace(&pool, vex.id, &["The Duke".to_string(), "Vex".to_string()])
        .await
        .unwrap();
    AliasRepo::replace(&pool, vex.id, &["Vex".to_string()]).await.unwrap();

    let aliases = AliasRepo::list_for_article(&pool, vex.id).await.unwrap();
    assert_eq!(aliases.len(), 1);
    assert_eq!(aliases[0].alias_text, "Vex");

    let editing = insert(&pool, new_article(w.id, None, "Session Log", gm.id)).await;
    let terms = AliasRepo::link_terms(&pool, w.id, editing.id).await.unwrap();
    assert!(terms.iter().any(|t| t.article_id == vex.id && t.term == "Lord Vex" && !t.is_alias));
    assert!(terms.iter().any(|t| t.article_id == vex.id && t.term == "Vex" && t.is_alias));
    assert!(!terms.iter().any(|t| t.article_id == editing.id));

    let excluded = AliasRepo::link_terms(&pool, w.id, vex.id).await.unwrap();
    assert!(!excluded.iter().any(|t| t.article_id == vex.id));
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn search_title_and_body(pool: PgPool) {
    let gm = user(&pool, "gm").await;
    let w = world(&pool, gm.id).await;
    let mut tavern = new_article(w.id, None, "The Yawning Portal", gm.id);
    tavern.body = Some("<p>A tavern above Undermountain.</p>".into());
    insert(&pool, tavern).await;

    let by_title = SearchRepo::title_matches(&pool, &[w.id], gm.id, "yawning", 20).await.unwrap();
    assert_eq!(by_title.len(), 1);
    let by_body = SearchRepo::body_matches(&pool, &[w.id], gm.id, "undermountain", 20).await.unwrap();
    assert_eq!(by_body.len(), 1);

    // Wildcards are matched literally once escaped.
    let literal = SearchRepo::title_matches(&pool, &[w.id], gm.id, "\\%", 20).await.unwrap();
    assert!(literal.is_empty());
}

// ---------------------------------------------------------------------------
// Characters
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn claims_are_exclusive(pool: PgPool) {
    let gm = user(&pool, "gm").await;
    let player = user(&pool, "player").await;
    let w = world(&pool, gm.id).await;
    let mut pc = new_article(w.id, None, "Thalia", gm.id);
    pc.article_type = ArticleType::Character;
    let pc = insert(&pool, pc).await;

    assert!(ArticleRepo::set_claim(&pool, pc.id, player.id).await.unwrap());
    assert!(!ArticleRepo::set_claim(&pool, pc.id, gm.id).await.unwrap());

    let claim = ArticleRepo::claim(&pool, pc.id).await.unwrap().unwrap();
    assert_eq!(claim.player_id, Some(player.id));
    assert_eq!(claim.player_name.as_deref(), Some("player"));

    let mine = ArticleRepo::claimed_characters(&pool, player.id).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].world_name.as_deref(), Some("Greyhawk"));

    assert!(!ArticleRepo::release_claim(&pool, pc.id, gm.id).await.unwrap());
    assert!(ArticleRepo::release_claim(&pool, pc.id, player.id).await.unwrap());
}
