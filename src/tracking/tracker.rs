/// 精灵跟踪器 (Sprite tracker)
///
/// 消费帧报告流, 维护屏上精灵种群:
/// 1. 按报告顺序逐个检测做关联 (命中→压层+移动, 未命中→新建)
/// 2. 全部检测处理完后, 本报告未触达的精灵统一衰减一层
/// 3. 空栈精灵移出种群, 随后发布一份一致的渲染快照
///
/// 种群只被采集线程修改; 渲染线程通过 PopulationHandle
/// 读取指针交换出来的快照, 永远不会看到改了一半的报告
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::assets::ImageProvider;
use crate::tracking::association::AssociationStrategy;
use crate::tracking::sprite::{Sprite, SpriteKey, VisualLayer};
use crate::tracking::types::{FrameReport, ScreenMapper, DEFAULT_CAMERA_RES};

/// 跟踪器参数
#[derive(Clone, Copy, Debug)]
pub struct TrackerSettings {
    /// 每个精灵的图层栈深度
    pub capacity: usize,
    /// 显示分辨率
    pub display: (f32, f32),
    /// 初始相机分辨率 (报告携带时会被更新)
    pub camera: (u32, u32),
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            capacity: 3,
            display: (1920.0, 1080.0),
            camera: DEFAULT_CAMERA_RES,
        }
    }
}

/// 种群快照句柄 (采集线程写入, 渲染线程读取)
///
/// 内部是互斥锁保护的 Arc 指针交换: 发布方整体替换,
/// 读取方克隆 Arc, 临界区只有一次指针拷贝
#[derive(Clone, Default)]
pub struct PopulationHandle {
    inner: Arc<Mutex<Arc<Vec<Sprite>>>>,
}

impl PopulationHandle {
    pub fn publish(&self, sprites: Vec<Sprite>) {
        let mut guard = self.inner.lock().unwrap();
        *guard = Arc::new(sprites);
    }

    /// 取当前快照 (每个渲染tick调用一次)
    pub fn snapshot(&self) -> Arc<Vec<Sprite>> {
        self.inner.lock().unwrap().clone()
    }
}

pub struct SpriteTracker {
    sprites: Vec<Sprite>,
    strategy: Box<dyn AssociationStrategy>,
    provider: Box<dyn ImageProvider>,
    mapper: ScreenMapper,
    capacity: usize,
    population: PopulationHandle,

    /// 匿名精灵键序号
    next_anon: u64,
    /// 全局图层ID (渲染端纹理缓存键)
    next_layer_id: u64,
}

impl SpriteTracker {
    pub fn new(
        settings: TrackerSettings,
        strategy: Box<dyn AssociationStrategy>,
        provider: Box<dyn ImageProvider>,
    ) -> Self {
        let mapper = ScreenMapper::new(settings.display.0, settings.display.1, settings.camera);
        log::info!(
            "跟踪器就绪: 策略={} 栈深={} 显示={}x{}",
            strategy.name(),
            settings.capacity,
            settings.display.0,
            settings.display.1
        );
        Self {
            sprites: Vec::new(),
            strategy,
            provider,
            mapper,
            capacity: settings.capacity.max(1),
            population: PopulationHandle::default(),
            next_anon: 0,
            next_layer_id: 0,
        }
    }

    /// 渲染线程持有的快照句柄
    pub fn population(&self) -> PopulationHandle {
        self.population.clone()
    }

    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    /// 处理一条帧报告
    ///
    /// 返回后种群恰好反映这一帧的更新; 衰减永远发生在
    /// 本报告全部检测应用之后, 且每个精灵至多衰减一次
    pub fn ingest(&mut self, report: &FrameReport) {
        if let Some(res) = report.resolution {
            self.mapper.set_camera(res);
        }

        // 按下标记录命中: overlap 策略下同一设备ID可能裂成
        // 多个同键精灵, 按键记录会让失联的旧精灵永不衰减
        let mut touched: HashSet<usize> = HashSet::new();

        for det in report.detections.iter().filter(|d| d.is_actionable()) {
            let bounds = self.mapper.to_display(det);

            let idx = match self.strategy.resolve(det, &bounds, &self.sprites) {
                Some(idx) => idx,
                None => {
                    let key = match det.identity {
                        Some(id) => SpriteKey::Identity(id),
                        None => {
                            self.next_anon += 1;
                            SpriteKey::Anonymous(self.next_anon)
                        }
                    };
                    log::debug!("新建精灵 {:?} @ {:?}", key, bounds);
                    self.sprites.push(Sprite::new(key, bounds, self.capacity));
                    self.sprites.len() - 1
                }
            };

            // 图层按本次检测的边界尺寸生成, 之后不再重新适配
            let (image, shadow) = self
                .provider
                .request_layer(bounds.w.max(1.0) as u32, bounds.h.max(1.0) as u32);
            self.next_layer_id += 1;
            let layer = VisualLayer {
                id: self.next_layer_id,
                image,
                shadow,
            };

            let sprite = &mut self.sprites[idx];
            sprite.push(layer);
            sprite.bounds = bounds;
            touched.insert(idx);
        }

        // 衰减: 本报告没有命中的精灵各掉一层, 空栈出场
        for (idx, sprite) in self.sprites.iter_mut().enumerate() {
            if !touched.contains(&idx) {
                sprite.pop_oldest();
            }
        }
        self.sprites.retain(|s| {
            if s.is_empty() {
                log::debug!("移除精灵 {:?}", s.key);
                false
            } else {
                true
            }
        });

        self.population.publish(self.sprites.clone());
    }
}
