//! 互动装置核心 (Interactive installation core)
//!
//! 视觉设备经串口上报检测框, 本库把这条嘈杂的逐帧流
//! 变成稳定的屏上精灵种群, 并以固定帧率合成渲染:
//!
//! 采集线程: 传输读取 → 解码帧报告 → Tracker::ingest (独占种群)
//! 主线程:   固定周期渲染循环 → 读种群快照 → 逐层绘制 + 音频
pub mod assets; // 素材系统 (图片提供者)
pub mod config; // 命令行配置
pub mod render; // 渲染循环与合成器
pub mod runtime; // 连接状态机与停止信号
pub mod source; // 检测源 (串口消息解码/合成流)
pub mod tracking; // 精灵跟踪系统

pub use crate::assets::{FolderProvider, ImageProvider, LayerImage, ProviderSettings};
pub use crate::config::Args;
pub use crate::render::{AudioCue, RenderSettings};
pub use crate::runtime::{CancelToken, ConnectionState, Lifecycle, SourceEvent};
pub use crate::source::{DetectionSource, LineSource, ReplaySource};
pub use crate::tracking::{
    strategy_by_name, Detection, FrameReport, PopulationHandle, Rect, Sprite, SpriteKey,
    SpriteTracker, TrackerSettings,
};
