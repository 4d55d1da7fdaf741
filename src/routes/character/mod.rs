mod handler;
mod model;

pub use handler::{
    change_active_skin, create_character, get_all_skins, get_character, get_character_level,
    get_level_prices, level_up_character,
};
pub use model::{
    ChangeActiveSkinRequest, ChangeActiveSkinResponse, CharacterLevelResponse,
    CreateCharacterRequest, CreateCharacterResponse, LevelUpRequest, LevelUpResponse, UserQuery,
};
