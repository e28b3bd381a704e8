//! The signed-in user's landing page.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use chronicis_core::error::CoreError;
use chronicis_core::types::{DbId, Timestamp};
use chronicis_db::models::article::ClaimedCharacter;
use chronicis_db::models::dashboard::{DashboardCampaignRow, DashboardWorldRow};
use chronicis_db::repositories::{ArticleRepo, DashboardRepo, UserRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// At most this many prompts are shown at once.
pub const MAX_PROMPTS: usize = 3;

#[derive(Debug, Serialize)]
pub struct DashboardWorld {
    #[serde(flatten)]
    pub world: DashboardWorldRow,
    pub campaigns: Vec<DashboardCampaignRow>,
    pub my_characters: Vec<ClaimedCharacter>,
}

/// A suggested next step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    pub key: String,
    pub title: String,
    pub message: String,
    pub action_url: Option<String>,
    /// Lower comes first.
    pub priority: u8,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub display_name: String,
    pub worlds: Vec<DashboardWorld>,
    pub claimed_characters: Vec<ClaimedCharacter>,
    pub prompts: Vec<Prompt>,
}

/// What the prompt rules look at.
pub struct PromptInput<'a> {
    pub worlds: &'a [DashboardWorldRow],
    pub campaigns: &'a [DashboardCampaignRow],
    pub claimed_characters: usize,
    pub has_session_notes: bool,
    pub now: Timestamp,
}

fn prompt(key: String, title: &str, message: String, action_url: Option<String>, priority: u8) -> Prompt {
    Prompt {
        key,
        title: title.to_string(),
        message,
        action_url,
        priority,
    }
}

/// Pick the most useful prompts for the user's current state.
pub fn build_prompts(input: &PromptInput<'_>) -> Vec<Prompt> {
    if input.worlds.is_empty() {
        return vec![prompt(
            "no-worlds".into(),
            "Create your first world",
            "Worlds hold your campaigns, characters and lore.".into(),
            Some("/worlds".into()),
            10,
        )];
    }

    let mut prompts = Vec::new();

    for world in input.worlds {
        if !input.campaigns.iter().any(|c| c.world_id == world.id) {
            prompts.push(prompt(
                format!("no-campaign-{}", world.id),
                "Start a campaign",
                format!("{} has no campaigns yet.", world.name),
                Some(format!("/worlds/{}/campaigns", world.id)),
                20,
            ));
        }
    }

    if input.claimed_characters == 0 && !input.campaigns.is_empty() {
        prompts.push(prompt(
            "no-characters".into(),
            "Claim a character",
            "Claim a character article to track who you play.".into(),
            None,
            30,
        ));
    }

    for campaign in input.campaigns {
        if campaign.session_count == 0 {
            prompts.push(prompt(
                format!("no-sessions-{}", campaign.id),
                "Record your first session",
                format!("{} has no sessions yet.", campaign.name),
                campaign.current_arc_id.map(|arc| format!("/arcs/{arc}/sessions")),
                40,
            ));
        }
    }

    let any_sessions = input.campaigns.iter().any(|c| c.session_count > 0);
    if any_sessions && !input.has_session_notes {
        prompts.push(prompt(
            "write-session-notes".into(),
            "Write session notes",
            "Capture what happened at the table while it is fresh.".into(),
            None,
            50,
        ));
    }

    for campaign in input.campaigns {
        let Some(date) = campaign.latest_session_date else {
            continue;
        };
        let days = (input.now - date).num_days();
        if (2..=7).contains(&days) {
            prompts.push(prompt(
                format!("session-followup-{}", campaign.id),
                "Follow up on last session",
                format!("{} played {days} days ago. Any loose ends?", campaign.name),
                None,
                60,
            ));
        }
    }

    let total_articles: i64 = input.worlds.iter().map(|w| w.article_count).sum();
    if total_articles >= 5 {
        prompts.push(prompt(
            "try-wiki-links".into(),
            "Link your articles",
            "Use [[wiki links]] to connect related pages.".into(),
            None,
            70,
        ));
    }

    prompts.sort_by_key(|p| p.priority);
    prompts.truncate(MAX_PROMPTS);
    prompts
}

/// GET /api/v1/dashboard
pub async fn get_dashboard(auth: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", auth.user_id))?;

    let worlds = DashboardRepo::worlds(&state.pool, auth.user_id).await?;
    let world_ids: Vec<DbId> = worlds.iter().map(|w| w.id).collect();
    let campaigns = DashboardRepo::campaigns(&state.pool, &world_ids).await?;
    let claimed_characters = ArticleRepo::claimed_characters(&state.pool, auth.user_id).await?;
    let has_session_notes = DashboardRepo::has_session_notes(&state.pool, auth.user_id).await?;

    let prompts = build_prompts(&PromptInput {
        worlds: &worlds,
        campaigns: &campaigns,
        claimed_characters: claimed_characters.len(),
        has_session_notes,
        now: Utc::now(),
    });

    let worlds = worlds
        .into_iter()
        .map(|world| DashboardWorld {
            campaigns: campaigns
                .iter()
                .filter(|c| c.world_id == world.id)
                .cloned()
                .collect(),
            my_characters: claimed_characters
                .iter()
                .filter(|c| c.world_id == Some(world.id))
                .cloned()
                .collect(),
            world,
        })
        .collect();

    Ok(Json(DataResponse {
        data: Dashboard {
            display_name: user.display_name,
            worlds,
            claimed_characters,
            prompts,
        },
    }))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn world(n: u128, articles: i64) -> DashboardWorldRow {
        DashboardWorldRow {
            id: DbId::from_u128(n),
            name: format!("World {n}"),
            slug: format!("world-{n}"),
            description: None,
            role: "gm".into(),
            article_count: articles,
        }
    }

    fn campaign(n: u128, world: u128, sessions: i64, latest: Option<Timestamp>) -> DashboardCampaignRow {
        DashboardCampaignRow {
            id: DbId::from_u128(n),
            world_id: DbId::from_u128(world),
            name: format!("Campaign {n}"),
            is_active: true,
            arc_count: 1,
            session_count: sessions,
            current_arc_id: Some(DbId::from_u128(n + 1000)),
            current_arc_name: Some("Arc 1".into()),
            latest_session_date: latest,
        }
    }

    fn keys(prompts: &[Prompt]) -> Vec<&str> {
        prompts.iter().map(|p| p.key.as_str()).collect()
    }

    #[test]
    fn new_users_only_see_the_world_prompt() {
        let prompts = build_prompts(&PromptInput {
            worlds: &[],
            campaigns: &[],
            claimed_characters: 0,
            has_session_notes: false,
            now: Utc::now(),
        });
        assert_eq!(keys(&prompts), vec!["no-worlds"]);
    }

    #[test]
    fn prompts_are_ordered_and_capped() {
        let worlds = [world(1, 10), world(2, 0)];
        let campaigns = [campaign(10, 1, 0, None)];
        let prompts = build_prompts(&PromptInput {
            worlds: &worlds,
            campaigns: &campaigns,
            claimed_characters: 0,
            has_session_notes: false,
            now: Utc::now(),
        });
        let world_two = DbId::from_u128(2);
        let campaign_ten = DbId::from_u128(10);
        assert_eq!(
            keys(&prompts),
            vec![
                format!("no-campaign-{world_two}").as_str(),
                "no-characters",
                format!("no-sessions-{campaign_ten}").as_str(),
            ]
        );
    }

    #[test]
    fn recent_sessions_ask_for_a_followup() {
        let now = Utc::now();
        let worlds = [world(1, 2)];
        let campaigns = [campaign(10, 1, 3, Some(now - Duration::days(3)))];
        let prompts = build_prompts(&PromptInput {
            worlds: &worlds,
            campaigns: &campaigns,
            claimed_characters: 1,
            has_session_notes: true,
            now,
        });
        assert_eq!(
            keys(&prompts),
            vec![format!("session-followup-{}", DbId::from_u128(10)).as_str()]
        );
    }

    #[test]
    fn stale_sessions_do_not() {
        let now = Utc::now();
        let worlds = [world(1, 6)];
        let campaigns = [campaign(10, 1, 3, Some(now - Duration::days(30)))];
        let prompts = build_prompts(&PromptInput {
            worlds: &worlds,
            campaigns: &campaigns,
            claimed_characters: 1,
            has_session_notes: false,
            now,
        });
        assert_eq!(keys(&prompts), vec!["write-session-notes", "try-wiki-links"]);
    }
}
