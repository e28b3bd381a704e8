//! Integration tests for quests, quest updates and sessions.

use assert_matches::assert_matches;
use chronicis_core::kinds::{ArticleType, ArticleVisibility, QuestStatus};
use chronicis_core::types::DbId;
use chronicis_db::models::article::NewArticle;
use chronicis_db::models::campaign::CreateSession;
use chronicis_db::models::quest::{CreateQuest, CreateQuestUpdate, Quest, UpdateQuest};
use chronicis_db::models::user::{User, UserIdentity};
use chronicis_db::models::world::NewWorld;
use chronicis_db::repositories::{
    ArcRepo, ArticleRepo, CampaignRepo, QuestRepo, QuestUpdateOutcome, SessionRepo, UserRepo,
    WorldRepo,
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

/// Create a world and return `(world_id, seeded arc_id)`.
async fn seeded_arc(pool: &PgPool, owner: DbId) -> (DbId, DbId) {
    let world = WorldRepo::create_with_defaults(
        pool,
        &NewWorld {
            name: "Exandria".into(),
            slug: "exandria".into(),
            description: None,
            owner_id: owner,
        },
    )
    .await
    .unwrap();
    let campaign = CampaignRepo::current_for_world(pool, world.id)
        .await
        .unwrap()
        .unwrap();
    let arc = ArcRepo::current_for_campaign(pool, campaign.id)
        .await
        .unwrap()
        .unwrap();
    (world.id, arc.id)
}

async fn quest(pool: &PgPool, arc_id: DbId, by: DbId, title: &str, gm_only: bool) -> Quest {
    QuestRepo::create(
        pool,
        arc_id,
        by,
        &CreateQuest {
            title: title.to_string(),
            description: Some("Find the thing".into()),
            status: None,
            is_gm_only: gm_only,
            sort_order: None,
        },
    )
    .await
    .unwrap()
}

fn edit(row_version: i32) -> UpdateQuest {
    UpdateQuest {
        title: None,
        description: None,
        status: None,
        is_gm_only: None,
        sort_order: None,
        row_version,
    }
}

// ---------------------------------------------------------------------------
// Quests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn new_quest_defaults(pool: PgPool) {
    let gm = user(&pool, "gm").await;
    let (_, arc_id) = seeded_arc(&pool, gm.id).await;
    let q = quest(&pool, arc_id, gm.id, "Rescue the mayor", false).await;
    assert_eq!(q.status, "active");
    assert_eq!(q.row_version, 1);
    assert_eq!(q.arc_id, arc_id);
}

#[sqlx::test(migrations = "./migrations")]
async fn versioned_update_detects_stale_writers(pool: PgPool) {
    let gm = user(&pool, "gm").await;
    let (_, arc_id) = seeded_arc(&pool, gm.id).await;
    let q = quest(&pool, arc_id, gm.id, "Rescue the mayor", false).await;

    let first = UpdateQuest {
        status: Some(QuestStatus::Completed),
        description: Some("   ".into()),
        ..edit(q.row_version)
    };
    let updated = assert_matches!(
        QuestRepo::update(&pool, q.id, &first).await.unwrap(),
        QuestUpdateOutcome::Updated(u) => u
    );
    assert_eq!(updated.status, "completed");
    assert_eq!(updated.description, None);
    assert_eq!(updated.row_version, 2);

    let late = UpdateQuest {
        title: Some("Late edit".into()),
        ..edit(q.row_version)
    };
    let current = assert_matches!(
        QuestRepo::update(&pool, q.id, &late).await.unwrap(),
        QuestUpdateOutcome::Stale(c) => c
    );
    assert_eq!(current.row_version, 2);
    assert_eq!(current.title, "Rescue the mayor");

    assert_matches!(
        QuestRepo::update(&pool, DbId::new_v4(), &edit(1)).await.unwrap(),
        QuestUpdateOutcome::NotFound
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn gm_only_quests_hidden_from_players(pool: PgPool) {
    let gm = user(&pool, "gm").await;
    let (_, arc_id) = seeded_arc(&pool, gm.id).await;
    quest(&pool, arc_id, gm.id, "Open lead", false).await;
    quest(&pool, arc_id, gm.id, "Villain's scheme", true).await;

    assert_eq!(QuestRepo::list_for_arc(&pool, arc_id, true).await.unwrap().len(), 2);
    let visible = QuestRepo::list_for_arc(&pool, arc_id, false).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].quest.title, "Open lead");
}

// ---------------------------------------------------------------------------
// Quest updates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn updates_page_newest_first_and_touch_quest(pool: PgPool) {
    let gm = user(&pool, "gm").await;
    let (_, arc_id) = seeded_arc(&pool, gm.id).await;
    let q = quest(&pool, arc_id, gm.id, "Rescue the mayor", false).await;

    for body in ["Found tracks", "Met the bandits", "Freed the mayor"] {
        QuestRepo::create_update(
            &pool,
            q.id,
            gm.id,
            &CreateQuestUpdate {
                body: body.to_string(),
                session_id: None,
            },
        )
        .await
        .unwrap();
    }

    let page = QuestRepo::list_updates(&pool, q.id, 0, 2).await.unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].author_name, "gm");

    let stats = QuestRepo::list_for_arc(&pool, arc_id, true).await.unwrap();
    assert_eq!(stats[0].update_count, 3);
    assert!(stats[0].last_update_at.is_some());

    let after = QuestRepo::find_by_id(&pool, q.id).await.unwrap().unwrap();
    assert!(after.updated_at >= q.updated_at);
    assert_eq!(after.row_version, q.row_version);

    let one = &page.items[0];
    assert!(QuestRepo::find_update(&pool, q.id, one.id).await.unwrap().is_some());
    assert!(QuestRepo::delete_update(&pool, one.id).await.unwrap());
    assert_eq!(QuestRepo::list_updates(&pool, q.id, 0, 10).await.unwrap().total, 2);

    assert!(QuestRepo::delete(&pool, q.id).await.unwrap());
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn session_creation_attaches_note(pool: PgPool) {
    let gm = user(&pool, "gm").await;
    let (world_id, arc_id) = seeded_arc(&pool, gm.id).await;
    let (_, campaign_id) = ArcRepo::world_of(&pool, arc_id).await.unwrap().unwrap();

    let note = NewArticle {
        world_id: Some(world_id),
        parent_id: None,
        campaign_id: Some(campaign_id),
        arc_id: Some(arc_id),
        session_id: None,
        title: "Session 1".into(),
        slug: "session-1".into(),
        body: None,
        article_type: ArticleType::SessionNote,
        visibility: ArticleVisibility::Public,
        icon_emoji: None,
        effective_date: chrono::Utc::now(),
        in_game_date: None,
        player_id: None,
        created_by: gm.id,
    };
    let session = SessionRepo::create_with_note(
        &pool,
        arc_id,
        gm.id,
        &CreateSession {
            name: "Session 1".into(),
            session_date: None,
            public_notes: None,
            private_notes: None,
        },
        &note,
    )
    .await
    .unwrap();

    let sessions = SessionRepo::list_for_arc(&pool, arc_id).await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].id, session.id);

    let stored = ArticleRepo::find_by_slug(&pool, Some(world_id), None, "session-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.session_id, Some(session.id));
    assert_eq!(
        SessionRepo::context(&pool, session.id).await.unwrap(),
        Some((arc_id, campaign_id, world_id))
    );
    assert_eq!(ArcRepo::session_count(&pool, arc_id).await.unwrap(), 1);
}
