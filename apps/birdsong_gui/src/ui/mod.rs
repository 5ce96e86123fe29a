//! UI 组件

mod clip_list;
mod deck;
mod theme;
mod viewer;

pub use clip_list::ClipList;
pub use deck::PlayerDeck;
pub use theme::BirdsongTheme;
pub use viewer::ImageViewer;
