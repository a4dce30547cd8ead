/// 精灵与图层栈 (Sprite and bounded layer stack)
///
/// 一个精灵对应一个被跟踪的目标, 持有最近若干次合成图像的有界栈:
/// 连续命中时视觉上"叠加", 丢失时逐帧"淡出"
use std::sync::Arc;

use crate::assets::LayerImage;
use crate::tracking::types::Rect;

/// 精灵关联键
///
/// 固件携带稳定目标ID时用 Identity, 纯检测框流用跟踪器分配的序号
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    Identity(u32),
    Anonymous(u64),
}

/// 一个合成图层 (图像 + 同角度旋转的阴影)
///
/// 创建时按当时的边界尺寸生成, 精灵移动后不重新适配
#[derive(Clone)]
pub struct VisualLayer {
    /// 全局递增图层ID (渲染端纹理缓存键)
    pub id: u64,
    pub image: Arc<LayerImage>,
    pub shadow: Arc<LayerImage>,
}

/// 被跟踪的屏上精灵
#[derive(Clone)]
pub struct Sprite {
    pub key: SpriteKey,

    /// 当前显示坐标矩形 (始终跟随最新报告)
    pub bounds: Rect,

    /// 图层栈, 严格 oldest → newest
    layers: Vec<VisualLayer>,

    /// 栈深上限
    capacity: usize,
}

impl Sprite {
    pub fn new(key: SpriteKey, bounds: Rect, capacity: usize) -> Self {
        Self {
            key,
            bounds,
            layers: Vec::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// 压入新图层, 超过容量先淘汰最旧的一层
    pub fn push(&mut self, layer: VisualLayer) {
        if self.layers.len() >= self.capacity {
            self.layers.remove(0);
        }
        self.layers.push(layer);
    }

    /// 淘汰最旧图层 (衰减), 空栈时为空操作
    pub fn pop_oldest(&mut self) {
        if !self.layers.is_empty() {
            self.layers.remove(0);
        }
    }

    /// 空栈即可从种群中移除
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// 渲染按此顺序绘制, 新图层盖在旧图层上面
    pub fn layers(&self) -> &[VisualLayer] {
        &self.layers
    }
}
