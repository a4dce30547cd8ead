/// 跟踪系统数据结构定义
/// Data structures for the sprite tracking system

// ========== 公共常量 ==========

/// 设备默认相机分辨率 (Grove Vision 类设备)
pub const DEFAULT_CAMERA_RES: (u32, u32) = (240, 240);

// ========== 数据结构 ==========

/// 检测框 (相机坐标系, 一帧里的一个目标)
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// 置信度 (设备原始值, 0-100 或 0-1)
    pub score: f32,
    /// 稳定目标ID (仅部分固件携带)
    pub identity: Option<u32>,
}

impl Detection {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            score: 0.0,
            identity: None,
        }
    }

    pub fn with_identity(mut self, identity: u32) -> Self {
        self.identity = Some(identity);
        self
    }

    /// 宽高必须为正, 否则是"无检测"哨兵值, 不可跟踪
    pub fn is_actionable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// 帧报告 (一条设备监控消息解码后的载荷)
#[derive(Clone, Debug, Default)]
pub struct FrameReport {
    /// 帧序号 (按到达顺序递增)
    pub seq: u64,
    /// 相机分辨率 (消息携带时更新, 否则沿用上一次)
    pub resolution: Option<(u32, u32)>,
    /// 零个或多个检测框, 保持报告顺序
    pub detections: Vec<Detection>,
}

impl FrameReport {
    pub fn empty(seq: u64) -> Self {
        Self {
            seq,
            ..Default::default()
        }
    }
}

/// 显示坐标系矩形, 全库统一 (x, y, width, height) 约定
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn area(&self) -> f32 {
        self.w * self.h
    }

    /// 两矩形是否相交 (边重合不算)
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }

    /// 计算 IOU (Intersection over Union)
    pub fn iou(&self, other: &Rect) -> f32 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.w).min(other.x + other.w);
        let y2 = (self.y + self.h).min(other.y + other.h);

        if x2 <= x1 || y2 <= y1 {
            return 0.0;
        }

        let intersection = (x2 - x1) * (y2 - y1);
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            return 0.0;
        }

        intersection / union
    }
}

/// 相机坐标系 → 显示坐标系映射
///
/// 缩放系数取 display_h / camera_h, 相机画面窄于屏幕时
/// 在水平方向加 (display_w - display_h) / 2 的居中偏移 (letterbox)
#[derive(Clone, Copy, Debug)]
pub struct ScreenMapper {
    display_w: f32,
    display_h: f32,
    camera_w: u32,
    camera_h: u32,
}

impl ScreenMapper {
    pub fn new(display_w: f32, display_h: f32, camera: (u32, u32)) -> Self {
        Self {
            display_w,
            display_h,
            camera_w: camera.0.max(1),
            camera_h: camera.1.max(1),
        }
    }

    /// 更新相机分辨率 (设备每条监控消息都会携带)
    pub fn set_camera(&mut self, camera: (u32, u32)) {
        if camera.0 > 0 && camera.1 > 0 {
            self.camera_w = camera.0;
            self.camera_h = camera.1;
        }
    }

    pub fn camera(&self) -> (u32, u32) {
        (self.camera_w, self.camera_h)
    }

    pub fn scale(&self) -> f32 {
        self.display_h / self.camera_h as f32
    }

    /// 水平居中偏移
    pub fn offset_x(&self) -> f32 {
        (self.display_w - self.display_h) / 2.0
    }

    /// 检测框 → 显示坐标矩形
    pub fn to_display(&self, det: &Detection) -> Rect {
        let s = self.scale();
        Rect::new(
            det.x * s + self.offset_x(),
            det.y * s,
            det.width * s,
            det.height * s,
        )
    }
}
