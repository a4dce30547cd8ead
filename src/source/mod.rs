/// 检测源 (Detection source)
///
/// 采集线程: 阻塞读取传输层 → 解码帧报告 → 喂给跟踪器。
/// I/O 只允许在这里阻塞; 报告按到达顺序逐条处理, 不合并。
/// 断连不致命: 种群在无报告时自行衰减到空
pub mod replay;
pub mod wire;

use std::io::BufRead;

use crossbeam_channel::Sender;

pub use replay::ReplaySource;

use crate::runtime::{CancelToken, ConnectionState, Lifecycle, SourceEvent};
use crate::tracking::tracker::SpriteTracker;
use crate::tracking::types::FrameReport;

/// 检测源统一接口
///
/// Ok(None) 表示流结束 (设备拔出/文件读完)
pub trait DetectionSource: Send {
    fn next_report(&mut self) -> anyhow::Result<Option<FrameReport>>;
}

/// 按行读取JSON监控消息的检测源
///
/// 读取对象可以是串口设备节点、FIFO或录制文件;
/// 波特率等串口参数由系统层配置, 不属于本层
pub struct LineSource<R: BufRead + Send> {
    reader: R,
    seq: u64,
}

impl<R: BufRead + Send> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, seq: 0 }
    }
}

impl<R: BufRead + Send> DetectionSource for LineSource<R> {
    fn next_report(&mut self) -> anyhow::Result<Option<FrameReport>> {
        let mut line = String::new();
        loop {
            line.clear();
            let n = self.reader.read_line(&mut line)?;
            if n == 0 {
                return Ok(None); // 流结束
            }
            // 非监控行 (设备日志等) 跳过继续读
            if let Some(report) = wire::parse_line(&line, self.seq) {
                self.seq += 1;
                return Ok(Some(report));
            }
        }
    }
}

/// 采集循环: 驱动跟踪器直到取消、流结束或读错误
///
/// 跟踪器归本线程独占; 渲染侧只通过快照句柄读取
pub fn run_ingest<S: DetectionSource>(
    mut source: S,
    mut tracker: SpriteTracker,
    lifecycle: Lifecycle,
    cancel: CancelToken,
    events: Sender<SourceEvent>,
) {
    lifecycle.transition(ConnectionState::Connecting);
    lifecycle.transition(ConnectionState::Connected);
    let _ = events.send(SourceEvent::Connected);
    log::info!("采集循环启动");

    let mut count: u64 = 0;
    while !cancel.is_cancelled() {
        match source.next_report() {
            Ok(Some(report)) => {
                // 阻塞读期间可能已经取消, 取消后的报告不再入库
                if cancel.is_cancelled() {
                    break;
                }
                tracker.ingest(&report);
                count += 1;
            }
            Ok(None) => {
                log::info!("检测流结束 (共 {} 条报告)", count);
                break;
            }
            Err(e) => {
                log::error!("读取检测流失败: {}", e);
                let _ = events.send(SourceEvent::Error(e.to_string()));
                break;
            }
        }
    }

    lifecycle.transition(ConnectionState::Disconnected);
    let _ = events.send(SourceEvent::Disconnected);
    log::info!("采集循环退出");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{ImageProvider, LayerImage};
    use crate::tracking::association::ByFirstOverlap;
    use crate::tracking::tracker::TrackerSettings;
    use crate::tracking::types::Detection;
    use std::io::Cursor;
    use std::sync::Arc;

    struct StubProvider;

    impl ImageProvider for StubProvider {
        fn request_layer(&mut self, w: u32, h: u32) -> (Arc<LayerImage>, Arc<LayerImage>) {
            let img = Arc::new(LayerImage::solid(w.max(1), h.max(1), [0, 0, 0, 255]));
            (img.clone(), img)
        }
    }

    fn tracker() -> SpriteTracker {
        SpriteTracker::new(
            TrackerSettings {
                capacity: 3,
                display: (240.0, 240.0),
                camera: (240, 240),
            },
            Box::new(ByFirstOverlap),
            Box::new(StubProvider),
        )
    }

    #[test]
    fn test_line_source_skips_noise_lines() {
        let data = "boot ok\n{\"boxes\":[[10,10,20,20]]}\ngarbage\n{\"boxes\":[]}\n";
        let mut src = LineSource::new(Cursor::new(data));

        let a = src.next_report().unwrap().unwrap();
        assert_eq!(a.detections.len(), 1);
        let b = src.next_report().unwrap().unwrap();
        assert!(b.detections.is_empty());
        assert_eq!(b.seq, 1);
        assert!(src.next_report().unwrap().is_none());
    }

    #[test]
    fn test_run_ingest_drives_tracker_and_lifecycle() {
        // 两条命中 + 三条空报告: 精灵先建立再完全淡出
        let data = "{\"boxes\":[[10,10,50,50]]}\n\
                    {\"boxes\":[[12,12,50,50]]}\n\
                    {\"boxes\":[]}\n\
                    {\"boxes\":[]}\n\
                    {\"boxes\":[]}\n";
        let source = LineSource::new(Cursor::new(data));
        let tracker = tracker();
        let population = tracker.population();
        let lifecycle = Lifecycle::new();
        let cancel = CancelToken::new();
        let (tx, rx) = crossbeam_channel::unbounded();

        run_ingest(source, tracker, lifecycle.clone(), cancel, tx);

        assert!(population.snapshot().is_empty());
        assert_eq!(lifecycle.state(), ConnectionState::Disconnected);

        let events: Vec<SourceEvent> = rx.try_iter().collect();
        assert!(matches!(events.first(), Some(SourceEvent::Connected)));
        assert!(matches!(events.last(), Some(SourceEvent::Disconnected)));
    }

    /// 读到一条报告的同时触发取消 (模拟阻塞读期间收到停止信号)
    struct CancelWhileReading {
        cancel: CancelToken,
    }

    impl DetectionSource for CancelWhileReading {
        fn next_report(&mut self) -> anyhow::Result<Option<FrameReport>> {
            self.cancel.cancel();
            Ok(Some(FrameReport {
                seq: 0,
                resolution: None,
                detections: vec![Detection::new(10.0, 10.0, 50.0, 50.0)],
            }))
        }
    }

    #[test]
    fn test_report_arriving_after_cancel_is_not_ingested() {
        let cancel = CancelToken::new();
        let source = CancelWhileReading {
            cancel: cancel.clone(),
        };
        let tracker = tracker();
        let population = tracker.population();
        let (tx, _rx) = crossbeam_channel::unbounded();

        run_ingest(source, tracker, Lifecycle::new(), cancel, tx);

        // 取消之后到达的报告不应改动种群
        assert!(population.snapshot().is_empty());
    }

    #[test]
    fn test_run_ingest_stops_on_cancel() {
        let source = ReplaySource::new(1000);
        let tracker = tracker();
        let lifecycle = Lifecycle::new();
        let cancel = CancelToken::new();
        cancel.cancel(); // 预先取消: 一条报告都不该处理
        let (tx, rx) = crossbeam_channel::unbounded();

        run_ingest(source, tracker, lifecycle.clone(), cancel, tx);

        assert_eq!(lifecycle.state(), ConnectionState::Disconnected);
        drop(rx);
    }
}
