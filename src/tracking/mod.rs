/// 跟踪系统 (Sprite tracking system)
///
/// 把嘈杂的逐帧检测框流变成稳定的屏上精灵种群:
/// - types:       检测/帧报告/矩形/坐标映射
/// - sprite:      精灵与有界图层栈
/// - association: 可插拔关联策略
/// - tracker:     种群维护与快照发布
pub mod association;
pub mod sprite;
pub mod tracker;
pub mod types;

// ========== 重新导出常用类型 ==========

pub use association::{strategy_by_name, AssociationStrategy, ByBestOverlap, ByFirstOverlap, ByIdentity};
pub use sprite::{Sprite, SpriteKey, VisualLayer};
pub use tracker::{PopulationHandle, SpriteTracker, TrackerSettings};
pub use types::{Detection, FrameReport, Rect, ScreenMapper, DEFAULT_CAMERA_RES};
