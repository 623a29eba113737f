pub mod display;
pub mod font;
pub mod render_util;

pub use display::WindowPresenter;
