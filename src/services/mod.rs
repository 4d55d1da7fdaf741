pub mod character;

pub use character::CharacterService;
