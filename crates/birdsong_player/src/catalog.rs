//! 固定曲目表
//!
//! 启动时构建一次，之后只读。

use serde::Serialize;
use uuid::Uuid;

/// 一条鸟鸣记录：显示名 + 音频资源名 + 缩略图资源名
#[derive(Debug, Clone, Serialize)]
pub struct Clip {
    /// 构造时生成，同名条目也能区分
    pub id: Uuid,
    pub display_name: String,
    pub audio_resource: String,
    pub image_resource: String,
}

impl Clip {
    fn new(display_name: &str, resource: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name: display_name.to_string(),
            audio_resource: resource.to_string(),
            image_resource: resource.to_string(),
        }
    }
}

/// 有序、不可变的片段目录
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    clips: Vec<Clip>,
}

impl Catalog {
    /// 内置的鸟鸣目录
    pub fn builtin() -> Self {
        Self {
            clips: vec![
                Clip::new("Cinciallegra", "Cinciallegra"),
                Clip::new("Cinciarella", "Cinciarella"),
                Clip::new("Codibugnolo", "Codibugnolo"),
                Clip::new("Fringuello", "Fringuello"),
                Clip::new("Gazza", "Gazza"),
                Clip::new("Martin Pescatore", "MartinPescatore"),
                Clip::new("Passero", "Passero"),
                Clip::new("Pettirosso", "Pettirosso"),
                Clip::new("Picchio Muratore", "PicchioMuratore"),
                Clip::new("Picchio Rosso Maggiore", "PicchioRossoMaggiore"),
                Clip::new("Storno europeo", "Storno"),
            ],
        }
    }

    /// 目录条目，顺序固定
    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    /// 按音频资源名查找
    pub fn find(&self, resource: &str) -> Option<&Clip> {
        self.clips.iter().find(|c| c.audio_resource == resource)
    }
}
