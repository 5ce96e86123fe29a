//! birdsong_player - 播放引擎
//!
//! 固定鸟鸣目录 + 单会话播放控制器。

mod catalog;
mod command;
mod decoder;
mod engine;
mod output;
mod store;

pub use catalog::*;
pub use command::*;
pub use decoder::*;
pub use engine::*;
pub use output::*;
pub use store::*;
