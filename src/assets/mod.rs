/// 素材系统 (Asset system)
///
/// 跟踪器每收到一个检测就向图片提供者索取一对
/// "图像 + 阴影", 提供者内部随机选图/缩放/旋转/模糊
pub mod folder;

use std::sync::Arc;

pub use folder::{FolderProvider, ProviderSettings};

/// CPU侧RGBA图像缓冲
///
/// 纹理上传在渲染线程进行, 采集线程只生成像素数据
#[derive(Clone)]
pub struct LayerImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl LayerImage {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        debug_assert_eq!(rgba.len(), (width * height * 4) as usize);
        Self {
            width,
            height,
            rgba,
        }
    }

    /// 纯色图像 (测试与占位用)
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        let mut rgba = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            rgba.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            rgba,
        }
    }
}

/// 图片提供者接口
///
/// 对跟踪器状态无副作用; 允许非确定性 (随机选图/角度/缩放)。
/// 素材池在启动时固定且非空, 因此逐帧请求不会失败
pub trait ImageProvider: Send {
    /// 生成一对适配目标尺寸的图像与阴影
    ///
    /// 图像保持素材自身宽高比, 高度缩放到目标高度的随机比例;
    /// 阴影由同一素材模糊后按相同角度旋转得到
    fn request_layer(&mut self, target_w: u32, target_h: u32) -> (Arc<LayerImage>, Arc<LayerImage>);
}
