/// 音频提示 (Audio cue)
///
/// 有任何精灵持有图层时循环播放音乐, 全部淡出后停止。
/// 每tick评估一次, 状态未变时幂等 (不会重新起播)
use macroquad::audio::{load_sound, play_sound, stop_sound, PlaySoundParams, Sound};

pub struct AudioCue {
    sound: Sound,
    playing: bool,
}

impl AudioCue {
    pub async fn load(path: &str) -> anyhow::Result<Self> {
        let sound = load_sound(path)
            .await
            .map_err(|e| anyhow::anyhow!("加载音频失败 {}: {:?}", path, e))?;
        log::info!("音频就绪: {}", path);
        Ok(Self {
            sound,
            playing: false,
        })
    }

    /// 把播放状态同步到"是否有可见精灵"
    pub fn sync(&mut self, active: bool) {
        if active && !self.playing {
            play_sound(
                &self.sound,
                PlaySoundParams {
                    looped: true,
                    volume: 1.0,
                },
            );
            self.playing = true;
        } else if !active && self.playing {
            stop_sound(&self.sound);
            self.playing = false;
        }
    }

    /// 退出时确保停止 (恰好释放一次)
    pub fn stop(&mut self) {
        self.sync(false);
    }
}
