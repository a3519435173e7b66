pub mod loading;
pub mod render;
pub mod slider;
pub mod theme;
pub mod time;
