/// 命令行配置 (CLI configuration)
use clap::Parser;

use crate::assets::ProviderSettings;
use crate::render::RenderSettings;
use crate::tracking::TrackerSettings;

/// 互动装置参数
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "互动装置 - 检测驱动的贴图合成引擎", long_about = None)]
pub struct Args {
    /// 设备数据路径 (串口设备节点/FIFO/录制文件)
    #[arg(short, long, default_value = "/dev/ttyACM0")]
    pub source: String,

    /// 演示模式: 不连接设备, 使用内置合成检测流
    #[arg(long)]
    pub demo: bool,

    /// PNG素材文件夹
    #[arg(short, long, default_value = "images_png")]
    pub images: String,

    /// 循环音乐文件 (可选)
    #[arg(short, long)]
    pub music: Option<String>,

    /// 渲染帧率
    #[arg(long, default_value_t = 30)]
    pub fps: u32,

    /// 每个精灵的图层栈深度
    #[arg(long, default_value_t = 3)]
    pub stack: usize,

    /// 关联策略: identity / overlap / iou
    #[arg(long, default_value = "overlap")]
    pub association: String,

    /// 初始相机分辨率 (设备消息携带时会被更新)
    #[arg(long, default_value_t = 240)]
    pub camera_width: u32,

    #[arg(long, default_value_t = 240)]
    pub camera_height: u32,

    /// 全屏运行 (装置现场)
    #[arg(long)]
    pub fullscreen: bool,

    /// 窗口尺寸 (非全屏)
    #[arg(long, default_value_t = 1280)]
    pub window_width: u32,

    #[arg(long, default_value_t = 720)]
    pub window_height: u32,

    /// 阴影偏移像素
    #[arg(long, default_value_t = 2.0)]
    pub shadow_offset: f32,

    /// 素材整体尺寸抖动 (0.4-1.0 随机缩放)
    #[arg(long)]
    pub size_jitter: bool,
}

impl Args {
    pub fn tracker_settings(&self, display: (f32, f32)) -> TrackerSettings {
        TrackerSettings {
            capacity: self.stack,
            display,
            camera: (self.camera_width, self.camera_height),
        }
    }

    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            size_jitter: if self.size_jitter {
                Some((0.4, 1.0))
            } else {
                None
            },
            ..Default::default()
        }
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            fps: self.fps,
            shadow_offset: self.shadow_offset,
        }
    }
}
