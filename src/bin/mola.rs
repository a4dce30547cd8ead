/// 互动装置主程序 (mola)
///
/// 系统架构:
/// 1. 采集线程: 读取设备串口消息 → 解码帧报告 → 跟踪器 (独立工作线程)
/// 2. 主线程:   固定帧率渲染循环 (macroquad事件循环) + 音频 + 退出按键
use std::io::BufReader;
use std::path::Path;

use clap::Parser;
use macroquad::prelude::*;

use mola_rs::config::Args;
use mola_rs::render::{self, AudioCue};
use mola_rs::runtime::{CancelToken, ConnectionState, Lifecycle, SourceEvent};
use mola_rs::source::{self, LineSource, ReplaySource};
use mola_rs::tracking::{strategy_by_name, SpriteTracker};
use mola_rs::FolderProvider;

fn window_conf() -> Conf {
    let args = Args::parse();
    Conf {
        window_title: String::from("mola - 互动装置"),
        window_width: args.window_width as i32,
        window_height: args.window_height as i32,
        fullscreen: args.fullscreen,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("❌ 启动失败: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    println!("🚀 互动装置启动");

    // 素材池为空是致命配置错误, 在这里报出, 不进入逐帧路径
    let provider = FolderProvider::from_dir(Path::new(&args.images), args.provider_settings())?;
    println!("🖼  素材池: {} 张 ({})", provider.pool_len(), args.images);

    // 窗口已创建, 用真实屏幕尺寸建立相机→显示映射
    let display = (screen_width(), screen_height());
    println!("🖥  显示: {}x{} | 渲染 {} fps", display.0, display.1, args.fps);
    println!("🎯 关联策略: {} | 栈深: {}", args.association, args.stack);

    let tracker = SpriteTracker::new(
        args.tracker_settings(display),
        strategy_by_name(&args.association),
        Box::new(provider),
    );
    let population = tracker.population();

    let lifecycle = Lifecycle::new();
    let cancel = CancelToken::new();
    let (event_tx, event_rx) = crossbeam_channel::unbounded::<SourceEvent>();

    // ========== 启动采集线程 ==========
    let ingest_lifecycle = lifecycle.clone();
    let ingest_cancel = cancel.clone();
    if args.demo {
        println!("🎛  演示模式: 合成检测流");
        let rate = args.fps.max(15);
        std::thread::spawn(move || {
            source::run_ingest(
                ReplaySource::new(rate),
                tracker,
                ingest_lifecycle,
                ingest_cancel,
                event_tx,
            );
        });
    } else {
        println!("📡 设备数据源: {}", args.source);
        lifecycle.transition(ConnectionState::Connecting);
        let path = args.source.clone();
        std::thread::spawn(move || {
            match std::fs::File::open(&path) {
                Ok(file) => source::run_ingest(
                    LineSource::new(BufReader::new(file)),
                    tracker,
                    ingest_lifecycle,
                    ingest_cancel,
                    event_tx,
                ),
                Err(e) => {
                    log::error!("打开设备失败 {}: {}", path, e);
                    ingest_lifecycle.transition(ConnectionState::Disconnected);
                    let _ = event_tx.send(SourceEvent::Error(e.to_string()));
                }
            }
        });
    }

    // ========== 音频 (可选) ==========
    let audio = match &args.music {
        Some(path) => {
            println!("🎵 音乐: {}", path);
            Some(AudioCue::load(path).await?)
        }
        None => None,
    };

    // ========== 主线程: 渲染循环 ==========
    println!("✅ 系统就绪 (Q/Esc 退出)\n");
    render::run(
        population,
        event_rx,
        cancel.clone(),
        lifecycle,
        audio,
        args.render_settings(),
    )
    .await;

    // 渲染退出后通知采集线程停止提交
    cancel.cancel();
    println!("👋 已退出");
    Ok(())
}
