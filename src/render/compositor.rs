/// 合成器 (Compositor)
///
/// 把一份种群快照画到帧缓冲上: 每个精灵按 oldest → newest
/// 逐层绘制, 每层先画偏移阴影再画图像 (逐层投影, 不是
/// 先全部阴影后全部图像), 图像居中在精灵当前边界中心。
///
/// 像素数据在采集线程生成, 纹理上传必须在渲染线程;
/// 按图层ID惰性上传并缓存, 图层消失时释放纹理
use std::collections::{HashMap, HashSet};

use macroquad::prelude::*;

use crate::assets::LayerImage;
use crate::tracking::sprite::Sprite;

pub struct Compositor {
    textures: HashMap<u64, (Texture2D, Texture2D)>,
    shadow_offset: f32,
}

impl Compositor {
    pub fn new(shadow_offset: f32) -> Self {
        Self {
            textures: HashMap::new(),
            shadow_offset,
        }
    }

    /// 绘制一个tick的种群快照
    pub fn draw(&mut self, sprites: &[Sprite]) {
        let mut live: HashSet<u64> = HashSet::new();

        for sprite in sprites {
            let (cx, cy) = sprite.bounds.center();
            for layer in sprite.layers() {
                live.insert(layer.id);
                let (image, shadow) = self.textures.entry(layer.id).or_insert_with(|| {
                    (upload(&layer.image), upload(&layer.shadow))
                });

                // 阴影在图像斜下方
                draw_texture(
                    shadow,
                    cx + self.shadow_offset - shadow.width() / 2.0,
                    cy + self.shadow_offset - shadow.height() / 2.0,
                    WHITE,
                );
                draw_texture(
                    image,
                    cx - image.width() / 2.0,
                    cy - image.height() / 2.0,
                    WHITE,
                );
            }
        }

        // 释放已消失图层的纹理
        self.textures.retain(|id, _| live.contains(id));
    }
}

fn upload(img: &LayerImage) -> Texture2D {
    Texture2D::from_rgba8(img.width as u16, img.height as u16, &img.rgba)
}
