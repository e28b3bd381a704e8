//! Integration tests for world creation, seeding and membership.

use assert_matches::assert_matches;
use chronicis_core::types::DbId;
use chronicis_db::models::member::NewInvitation;
use chronicis_db::models::user::{User, UserIdentity};
use chronicis_db::models::world::{NewWorld, World};
use chronicis_db::repositories::{
    ArcRepo, ArticleRepo, CampaignRepo, InvitationRepo, JoinOutcome, MemberRepo, UserRepo,
    WorldRepo,
};
use chronicis_core::kinds::WorldRole;
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

async fn world(pool: &PgPool, owner: DbId, name: &str) -> World {
    WorldRepo::create_with_defaults(
        pool,
        &NewWorld {
            name: name.to_string(),
            slug: chronicis_core::slug::generate_slug(name),
            description: None,
            owner_id: owner,
        },
    )
    .await
    .unwrap()
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn get_or_create_is_idempotent_and_refreshes_profile(pool: PgPool) {
    let first = user(&pool, "auth0|alice").await;
    let again = user(&pool, "auth0|alice").await;
    assert_eq!(first.id, again.id);

    let renamed = UserRepo::get_or_create(
        &pool,
        &UserIdentity {
            auth_subject: "auth0|alice".into(),
            email: "alice@example.com".into(),
            display_name: "Alice the Bold".into(),
            avatar_url: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(renamed.id, first.id);
    assert_eq!(renamed.display_name, "Alice the Bold");
    assert_eq!(renamed.email, "alice@example.com");
}

// ---------------------------------------------------------------------------
// Worlds
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn new_world_is_seeded(pool: PgPool) {
    let owner = user(&pool, "owner").await;
    let w = world(&pool, owner.id, "Eberron").await;

    let member = MemberRepo::find(&pool, w.id, owner.id).await.unwrap().unwrap();
    assert_eq!(member.role, "gm");

    let roots = ArticleRepo::list_roots(&pool, w.id, owner.id).await.unwrap();
    let titles: Vec<&str> = roots.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Bestiary", "Characters", "Factions", "Locations", "New Character"]
    );
    let character = roots.iter().find(|a| a.title == "New Character").unwrap();
    assert_eq!(character.article_type, "character");
    assert_eq!(character.player_id, Some(owner.id));
    assert!(roots.iter().all(|a| a.visibility == "public"));

    let campaigns = CampaignRepo::list_for_world(&pool, w.id).await.unwrap();
    assert_eq!(campaigns.len(), 1);
    assert_eq!(campaigns[0].name, "Campaign 1");
    assert!(campaigns[0].is_active);

    let arcs = ArcRepo::list_for_campaign(&pool, campaigns[0].id).await.unwrap();
    assert_eq!(arcs.len(), 1);
    assert_eq!(arcs[0].arc.name, "Arc 1");
    assert_eq!(arcs[0].arc.sort_order, 1);
    assert!(arcs[0].arc.is_active);
}

#[sqlx::test(migrations = "./migrations")]
async fn world_slug_unique_per_owner(pool: PgPool) {
    let owner = user(&pool, "owner").await;
    let other = user(&pool, "other").await;
    world(&pool, owner.id, "Faerun").await;
    world(&pool, other.id, "Faerun").await;

    let dup = WorldRepo::create_with_defaults(
        &pool,
        &NewWorld {
            name: "Faerun".into(),
            slug: "faerun".into(),
            description: None,
            owner_id: owner.id,
        },
    )
    .await;
    assert_matches!(dup, Err(sqlx::Error::Database(e)) if e.constraint() == Some("uq_worlds_owner_slug"));

    let slugs = WorldRepo::slugs_for_owner(&pool, owner.id, None).await.unwrap();
    assert_eq!(slugs, vec!["faerun".to_string()]);
}

#[sqlx::test(migrations = "./migrations")]
async fn list_for_user_reports_role_and_counts(pool: PgPool) {
    let owner = user(&pool, "owner").await;
    let w = world(&pool, owner.id, "Golarion").await;

    let listed = WorldRepo::list_for_user(&pool, owner.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, w.id);
    assert_eq!(listed[0].role, "gm");
    assert_eq!(listed[0].member_count, 1);
    assert_eq!(listed[0].campaign_count, 1);

    let stranger = user(&pool, "stranger").await;
    assert!(WorldRepo::list_for_user(&pool, stranger.id).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Invitations
// ---------------------------------------------------------------------------

async fn invite(pool: &PgPool, world_id: DbId, by: DbId, code: &str, max_uses: Option<i32>) {
    InvitationRepo::create(
        pool,
        &NewInvitation {
            world_id,
            code: code.to_string(),
            role: WorldRole::Player,
            created_by: by,
            expires_at: None,
            max_uses,
        },
    )
    .await
    .unwrap();
}

#[sqlx::test(migrations = "./migrations")]
async fn join_adds_member_and_counts_use(pool: PgPool) {
    let owner = user(&pool, "owner").await;
    let player = user(&pool, "player").await;
    let w = world(&pool, owner.id, "Krynn").await;
    invite(&pool, w.id, owner.id, "BOKA-TEMI", Some(1)).await;

    let outcome = InvitationRepo::join(&pool, "BOKA-TEMI", player.id).await.unwrap();
    let member = assert_matches!(outcome, JoinOutcome::Joined(m) => m);
    assert_eq!(member.role, "player");
    assert_eq!(member.invited_by, Some(owner.id));

    let again = InvitationRepo::join(&pool, "BOKA-TEMI", player.id).await.unwrap();
    assert_matches!(again, JoinOutcome::Exhausted);

    let invitations = InvitationRepo::list_for_world(&pool, w.id).await.unwrap();
    assert_eq!(invitations[0].used_count, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn join_rejections(pool: PgPool) {
    let owner = user(&pool, "owner").await;
    let w = world(&pool, owner.id, "Athas").await;
    invite(&pool, w.id, owner.id, "DAMU-RISO", None).await;

    assert_matches!(
        InvitationRepo::join(&pool, "ZZZZ-ZZZZ", owner.id).await.unwrap(),
        JoinOutcome::UnknownCode
    );
    assert_matches!(
        InvitationRepo::join(&pool, "DAMU-RISO", owner.id).await.unwrap(),
        JoinOutcome::AlreadyMember
    );

    let invitation = &InvitationRepo::list_for_world(&pool, w.id).await.unwrap()[0];
    assert!(InvitationRepo::revoke(&pool, w.id, invitation.id).await.unwrap());
    let newcomer = user(&pool, "newcomer").await;
    assert_matches!(
        InvitationRepo::join(&pool, "DAMU-RISO", newcomer.id).await.unwrap(),
        JoinOutcome::Inactive
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn expired_invitation_cannot_be_used(pool: PgPool) {
    let owner = user(&pool, "owner").await;
    let w = world(&pool, owner.id, "Mystara").await;
    InvitationRepo::create(
        &pool,
        &NewInvitation {
            world_id: w.id,
            code: "KELO-PUNA".into(),
            role: WorldRole::Observer,
            created_by: owner.id,
            expires_at: Some(chrono::Utc::now() - chrono::Duration::days(1)),
            max_uses: None,
        },
    )
    .await
    .unwrap();

    let newcomer = user(&pool, "newcomer").await;
    assert_matches!(
        InvitationRepo::join(&pool, "KELO-PUNA", newcomer.id).await.unwrap(),
        JoinOutcome::Expired
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn gm_count_and_role_changes(pool: PgPool) {
    let owner = user(&pool, "owner").await;
    let player = user(&pool, "player").await;
    let w = world(&pool, owner.id, "Ravenloft").await;
    invite(&pool, w.id, owner.id, "MIRA-DOTE", None).await;
    InvitationRepo::join(&pool, "MIRA-DOTE", player.id).await.unwrap();

    assert_eq!(MemberRepo::count_gms(&pool, w.id).await.unwrap(), 1);
    let membership = MemberRepo::find(&pool, w.id, player.id).await.unwrap().unwrap();
    let promoted = MemberRepo::update_role(&pool, membership.id, WorldRole::Gm)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(promoted.role, "gm");
    assert_eq!(MemberRepo::count_gms(&pool, w.id).await.unwrap(), 2);

    let members = MemberRepo::list(&pool, w.id).await.unwrap();
    assert_eq!(members.len(), 2);
    assert!(MemberRepo::remove(&pool, membership.id).await.unwrap());
    assert_eq!(MemberRepo::list(&pool, w.id).await.unwrap().len(), 1);
}
