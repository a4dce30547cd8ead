/// 渲染循环 (Render loop)
///
/// 固定周期重绘, 与报告到达速率无关:
/// 每tick取一次种群快照 → 清屏 → 合成器逐层绘制 →
/// 同步音频 → 按配置帧率补齐剩余间隔。
/// Q/Esc 触发取消令牌, 当前tick画完后干净退出
pub mod audio;
pub mod compositor;

use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use macroquad::prelude::*;

pub use audio::AudioCue;
pub use compositor::Compositor;

use crate::runtime::{CancelToken, Lifecycle, SourceEvent};
use crate::tracking::tracker::PopulationHandle;

/// 渲染参数
#[derive(Clone, Copy, Debug)]
pub struct RenderSettings {
    /// 目标帧率
    pub fps: u32,
    /// 阴影偏移 (像素, 斜向右下)
    pub shadow_offset: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            fps: 30,
            shadow_offset: 2.0,
        }
    }
}

/// 渲染主循环 (主线程, macroquad 事件循环内)
pub async fn run(
    population: PopulationHandle,
    events: Receiver<SourceEvent>,
    cancel: CancelToken,
    lifecycle: Lifecycle,
    mut audio: Option<AudioCue>,
    settings: RenderSettings,
) {
    let mut compositor = Compositor::new(settings.shadow_offset);
    let interval = Duration::from_secs_f32(1.0 / settings.fps.max(1) as f32);
    let mut last_error: Option<String> = None;

    log::info!("渲染循环启动: {} fps", settings.fps);

    loop {
        let tick = Instant::now();

        if cancel.is_cancelled() {
            break;
        }
        if is_key_pressed(KeyCode::Q) || is_key_pressed(KeyCode::Escape) {
            log::info!("收到退出按键");
            cancel.cancel(); // 本tick画完再退出
        }

        while let Ok(event) = events.try_recv() {
            match event {
                SourceEvent::Connected => last_error = None,
                SourceEvent::Disconnected => {}
                SourceEvent::Error(e) => last_error = Some(e),
            }
        }

        clear_background(BLACK);

        // 空种群是常态 (没人经过装置), 照常清屏
        let snapshot = population.snapshot();
        compositor.draw(&snapshot);

        if !lifecycle.is_connected() {
            let notice = match &last_error {
                Some(e) => format!("设备错误: {} (Q退出)", e),
                None => String::from("等待设备连接... (Q退出)"),
            };
            draw_text(&notice, 20.0, 40.0, 28.0, GRAY);
        }

        if let Some(cue) = &mut audio {
            let any_visible = snapshot.iter().any(|s| !s.is_empty());
            cue.sync(any_visible);
        }

        // 固定帧率: 补齐剩余间隔
        let elapsed = tick.elapsed();
        if elapsed < interval {
            std::thread::sleep(interval - elapsed);
        }
        next_frame().await;
    }

    if let Some(cue) = &mut audio {
        cue.stop();
    }
    log::info!("渲染循环退出");
}
