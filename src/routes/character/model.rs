use serde::{Deserialize, Serialize};

use crate::services::character::dto::LevelUpOutcome;

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    #[serde(default)]
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateCharacterRequest {
    #[serde(default)]
    pub user_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCharacterResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CharacterLevelResponse {
    pub level: i32,
}

#[derive(Debug, Deserialize)]
pub struct LevelUpRequest {
    #[serde(default)]
    pub user_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LevelUpResponse {
    pub success: bool,
    pub new_level: i32,
    pub coins_balance: i64,
    pub settlement_pending: bool,
}

impl From<LevelUpOutcome> for LevelUpResponse {
    fn from(outcome: LevelUpOutcome) -> Self {
        Self {
            success: true,
            new_level: outcome.new_level,
            coins_balance: outcome.coins_balance,
            settlement_pending: outcome.settlement_pending,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangeActiveSkinRequest {
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub skin_id: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChangeActiveSkinResponse {
    pub success: bool,
}
