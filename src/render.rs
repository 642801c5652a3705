pub mod background;
pub mod blur;
pub mod canvas;
pub mod effects;
