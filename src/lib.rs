use std::sync::Arc;

use config::Config;
use services::CharacterService;

pub mod cache;
pub mod clients;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod result;
pub mod router;
pub mod routes;
pub mod services;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub characters: Arc<CharacterService>,
}
