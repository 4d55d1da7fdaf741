use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    result::ApiResponse,
    services::character::dto::{CharacterProfile, Skin},
    utils::{
        character_error_response, error_codes, error_to_api_response, success_to_api_response,
    },
};

use super::model::{
    ChangeActiveSkinRequest, ChangeActiveSkinResponse, CharacterLevelResponse,
    CreateCharacterRequest, CreateCharacterResponse, LevelUpRequest, LevelUpResponse, UserQuery,
};

/// 校验失败时返回的响应
fn invalid_id<T>(field: &str) -> (StatusCode, Json<ApiResponse<T>>) {
    (
        StatusCode::BAD_REQUEST,
        error_to_api_response(error_codes::VALIDATION_ERROR, format!("{} is required", field)),
    )
}

#[axum::debug_handler]
pub async fn create_character(
    State(state): State<AppState>,
    Json(req): Json<CreateCharacterRequest>,
) -> impl IntoResponse {
    if req.user_id == 0 {
        return invalid_id::<CreateCharacterResponse>("user_id");
    }

    match state.characters.create_character(req.user_id).await {
        Ok(()) => (
            StatusCode::OK,
            success_to_api_response(CreateCharacterResponse { success: true }),
        ),
        Err(e) => character_error_response(&e),
    }
}

#[axum::debug_handler]
pub async fn get_character_level(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> impl IntoResponse {
    if query.user_id == 0 {
        return invalid_id::<CharacterLevelResponse>("user_id");
    }

    match state.characters.get_character_level(query.user_id).await {
        Ok(level) => (
            StatusCode::OK,
            success_to_api_response(CharacterLevelResponse { level }),
        ),
        Err(e) => character_error_response(&e),
    }
}

#[axum::debug_handler]
pub async fn get_character(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> impl IntoResponse {
    if query.user_id == 0 {
        return invalid_id::<CharacterProfile>("user_id");
    }

    match state.characters.get_character(query.user_id).await {
        Ok(profile) => (StatusCode::OK, success_to_api_response(profile)),
        Err(e) => character_error_response(&e),
    }
}

#[axum::debug_handler]
pub async fn get_all_skins(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> impl IntoResponse {
    if query.user_id == 0 {
        return invalid_id::<Vec<Skin>>("user_id");
    }

    match state.characters.get_skins(query.user_id).await {
        Ok(skins) => (StatusCode::OK, success_to_api_response(skins.skins)),
        Err(e) => character_error_response(&e),
    }
}

#[axum::debug_handler]
pub async fn get_level_prices(State(state): State<AppState>) -> impl IntoResponse {
    match state.characters.get_level_prices().await {
        Ok(prices) => (StatusCode::OK, success_to_api_response(prices.levels)),
        Err(e) => character_error_response(&e),
    }
}

#[axum::debug_handler]
pub async fn level_up_character(
    State(state): State<AppState>,
    Json(req): Json<LevelUpRequest>,
) -> impl IntoResponse {
    if req.user_id == 0 {
        return invalid_id::<LevelUpResponse>("user_id");
    }

    match state.characters.level_up_character(req.user_id).await {
        Ok(outcome) => (
            StatusCode::OK,
            success_to_api_response(LevelUpResponse::from(outcome)),
        ),
        Err(e) => character_error_response(&e),
    }
}

#[axum::debug_handler]
pub async fn change_active_skin(
    State(state): State<AppState>,
    Json(req): Json<ChangeActiveSkinRequest>,
) -> impl IntoResponse {
    if req.user_id == 0 {
        return invalid_id::<ChangeActiveSkinResponse>("user_id");
    }
    if req.skin_id == 0 {
        return invalid_id::<ChangeActiveSkinResponse>("skin_id");
    }

    match state
        .characters
        .change_active_skin(req.user_id, req.skin_id)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            success_to_api_response(ChangeActiveSkinResponse { success: true }),
        ),
        Err(e) => character_error_response(&e),
    }
}
