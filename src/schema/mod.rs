pub mod ending;
pub mod scene;
pub mod score;
