pub mod best_score;
pub mod engine;
pub mod error;
pub mod game;
pub mod input;
pub mod spawn;
