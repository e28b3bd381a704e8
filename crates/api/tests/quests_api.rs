//! HTTP-level tests for quests, quest updates and character claims.

mod common;

use axum::http::StatusCode;
use common::{
    add_member, body_json, create_article, create_world, delete_auth, first_arc, first_campaign,
    get_auth, post_json_auth, put_json_auth, token_for,
};
use serde_json::json;
use sqlx::PgPool;

/// Owner token, world id and the seeded arc id.
async fn world_with_arc(app: axum::Router) -> (String, String, String) {
    let owner = token_for("auth0|owner");
    let world = create_world(app.clone(), &owner, "Sigil").await;
    let world_id = world["id"].as_str().unwrap().to_string();
    let campaign = first_campaign(app.clone(), &owner, &world_id).await;
    let arc = first_arc(app, &owner, campaign["id"].as_str().unwrap()).await;
    (owner, world_id, arc["id"].as_str().unwrap().to_string())
}

#[sqlx::test(migrations = "../db/migrations")]
async fn stale_quest_edits_return_the_current_row(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (owner, _, arc_id) = world_with_arc(app.clone()).await;

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/arcs/{arc_id}/quests"),
        &owner,
        json!({ "title": "Find the Lady" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let quest = body_json(response).await["data"].clone();
    assert_eq!(quest["status"], "active");
    let quest_id = quest["id"].as_str().unwrap();
    let version = quest["row_version"].as_i64().unwrap();

    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/quests/{quest_id}"),
        &owner,
        json!({ "status": "completed", "row_version": version }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await["data"].clone();
    assert_eq!(updated["row_version"].as_i64().unwrap(), version + 1);

    let response = put_json_auth(
        app,
        &format!("/api/v1/quests/{quest_id}"),
        &owner,
        json!({ "title": "Lost the race", "row_version": version }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["code"], "CONFLICT");
    assert_eq!(body["current"]["status"], "completed");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn gm_only_quests_are_hidden_from_players(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (owner, world_id, arc_id) = world_with_arc(app.clone()).await;
    add_member(app.clone(), &owner, &world_id, "auth0|player", "player").await;

    for (title, hidden) in [("Public Quest", false), ("Secret Quest", true)] {
        let response = post_json_auth(
            app.clone(),
            &format!("/api/v1/arcs/{arc_id}/quests"),
            &owner,
            json!({ "title": title, "is_gm_only": hidden }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = get_auth(
        app.clone(),
        &format!("/api/v1/arcs/{arc_id}/quests"),
        &token_for("auth0|player"),
    )
    .await;
    let quests = body_json(response).await["data"].clone();
    assert_eq!(quests.as_array().unwrap().len(), 1);
    assert_eq!(quests[0]["title"], "Public Quest");

    let response = get_auth(app, &format!("/api/v1/arcs/{arc_id}/quests"), &owner).await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn players_post_and_delete_their_own_updates(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (owner, world_id, arc_id) = world_with_arc(app.clone()).await;
    add_member(app.clone(), &owner, &world_id, "auth0|player", "player").await;
    let player = token_for("auth0|player");

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/arcs/{arc_id}/quests"),
        &owner,
        json!({ "title": "Escort the caravan" }),
    )
    .await;
    let quest_id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/quests/{quest_id}/updates"),
        &player,
        json!({ "body": "   " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/quests/{quest_id}/updates"),
        &player,
        json!({ "body": "<p>Bandits at the ford.</p>" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let update_id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = get_auth(
        app.clone(),
        &format!("/api/v1/quests/{quest_id}/updates?take=500"),
        &player,
    )
    .await;
    let page = body_json(response).await["data"].clone();
    assert_eq!(page["total"], 1);
    assert_eq!(page["take"], 100);

    let response = delete_auth(
        app,
        &format!("/api/v1/quests/{quest_id}/updates/{update_id}"),
        &player,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn characters_can_only_be_claimed_once(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (owner, world_id, _) = world_with_arc(app.clone()).await;
    add_member(app.clone(), &owner, &world_id, "auth0|player", "player").await;
    add_member(app.clone(), &owner, &world_id, "auth0|rival", "player").await;

    let hero = create_article(
        app.clone(),
        &owner,
        json!({ "world_id": world_id, "title": "Hero", "article_type": "character" }),
    )
    .await;
    let hero_id = hero["id"].as_str().unwrap();
    let player = token_for("auth0|player");

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/characters/{hero_id}/claim"),
        &player,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/characters/{hero_id}/claim"),
        &token_for("auth0|rival"),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = get_auth(app.clone(), &format!("/api/v1/characters/{hero_id}/claim"), &player).await;
    let status = body_json(response).await["data"].clone();
    assert_eq!(status["is_claimed"], true);
    assert_eq!(status["is_claimed_by_me"], true);

    let response = get_auth(app, "/api/v1/characters/claimed", &player).await;
    let claimed = body_json(response).await["data"].clone();
    assert_eq!(claimed[0]["title"], "Hero");
}
