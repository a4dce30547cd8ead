/// 合成检测流 (Synthetic detection stream)
///
/// 无硬件时的演示/排练模式: 两个目标沿平滑轨迹运动,
/// 周期性消失一段时间, 用来演练精灵的建立与淡出
use std::time::Duration;

use super::DetectionSource;
use crate::tracking::types::{Detection, FrameReport, DEFAULT_CAMERA_RES};

pub struct ReplaySource {
    seq: u64,
    interval: Duration,
}

impl ReplaySource {
    /// `rate` 每秒报告数
    pub fn new(rate: u32) -> Self {
        Self {
            seq: 0,
            interval: Duration::from_secs_f32(1.0 / rate.max(1) as f32),
        }
    }

    fn make_report(&self) -> FrameReport {
        let t = self.seq as f32 * 0.05;
        let mut detections = Vec::new();

        // 目标1: 走8字, 每120帧隐身30帧
        if self.seq % 120 >= 30 {
            detections.push(
                Detection {
                    x: 90.0 + 60.0 * t.sin(),
                    y: 90.0 + 45.0 * (2.0 * t).sin(),
                    width: 60.0,
                    height: 60.0,
                    score: 90.0,
                    identity: Some(1),
                },
            );
        }

        // 目标2: 横向往返, 相位错开的隐身窗口
        if (self.seq + 60) % 150 >= 40 {
            detections.push(
                Detection {
                    x: 110.0 + 80.0 * (0.6 * t).cos(),
                    y: 150.0,
                    width: 48.0,
                    height: 48.0,
                    score: 75.0,
                    identity: Some(2),
                },
            );
        }

        FrameReport {
            seq: self.seq,
            resolution: Some(DEFAULT_CAMERA_RES),
            detections,
        }
    }
}

impl DetectionSource for ReplaySource {
    fn next_report(&mut self) -> anyhow::Result<Option<FrameReport>> {
        std::thread::sleep(self.interval);
        let report = self.make_report();
        self.seq += 1;
        Ok(Some(report))
    }
}
