/// 文件夹图片提供者 (Folder image provider)
///
/// 启动时解码文件夹内全部PNG素材 (空池是致命配置错误),
/// 每次请求随机选图 → Lanczos3缩放 → 随机旋转 → 生成模糊阴影
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::{ImageProvider, LayerImage};

/// 随机化参数
#[derive(Clone, Copy, Debug)]
pub struct ProviderSettings {
    /// 高度占目标高度的随机比例区间
    pub scale_range: (f32, f32),
    /// 随机旋转角度上限 (度, 取 ±max_angle_deg)
    pub max_angle_deg: i32,
    /// 旋转后对图像与阴影整体再做一次随机缩放 (可选)
    pub size_jitter: Option<(f32, f32)>,
    /// 固定随机种子 (测试用; None = 熵源)
    pub seed: Option<u64>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            scale_range: (0.5, 0.8),
            max_angle_deg: 60,
            size_jitter: None,
            seed: None,
        }
    }
}

pub struct FolderProvider {
    pool: Vec<RgbaImage>,
    settings: ProviderSettings,
    rng: StdRng,
}

impl FolderProvider {
    /// 从文件夹加载全部PNG素材
    pub fn from_dir(dir: &Path, settings: ProviderSettings) -> anyhow::Result<Self> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("读取素材文件夹失败: {}", dir.display()))?;

        let mut pool = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_png = path
                .extension()
                .map(|e| e.eq_ignore_ascii_case("png"))
                .unwrap_or(false);
            if !is_png {
                continue;
            }
            match image::open(&path) {
                Ok(img) => pool.push(img.to_rgba8()),
                Err(e) => log::warn!("跳过无法解码的素材 {}: {}", path.display(), e),
            }
        }

        log::info!("素材池加载完成: {} 张 ({})", pool.len(), dir.display());
        Self::from_images(pool, settings)
    }

    /// 从已解码图像构建 (测试与内嵌素材用)
    pub fn from_images(pool: Vec<RgbaImage>, settings: ProviderSettings) -> anyhow::Result<Self> {
        if pool.is_empty() {
            bail!("素材池为空, 至少需要一张PNG图片");
        }
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            pool,
            settings,
            rng,
        })
    }

    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }
}

impl ImageProvider for FolderProvider {
    fn request_layer(
        &mut self,
        _target_w: u32,
        target_h: u32,
    ) -> (Arc<LayerImage>, Arc<LayerImage>) {
        let base = self
            .pool
            .choose(&mut self.rng)
            .expect("素材池非空由构造保证");

        // 高度取目标高度的随机比例, 宽度按素材自身宽高比跟随
        let (lo, hi) = self.settings.scale_range;
        let fraction = if hi > lo { self.rng.gen_range(lo..hi) } else { lo };
        let new_h = ((target_h as f32 * fraction).round() as u32).max(1);
        let aspect = base.width() as f32 / base.height() as f32;
        let new_w = ((new_h as f32 * aspect).round() as u32).max(1);
        let resized = imageops::resize(base, new_w, new_h, FilterType::Lanczos3);

        // 图像与阴影用同一个随机角度; 阴影先模糊再旋转
        let max_angle = self.settings.max_angle_deg;
        let angle = if max_angle > 0 {
            self.rng.gen_range(-max_angle..=max_angle) as f32
        } else {
            0.0
        };
        let mut img = rotate_expanded(&resized, angle);
        let mut shadow = rotate_expanded(&imageops::blur(&resized, 2.0), angle);

        if let Some((jlo, jhi)) = self.settings.size_jitter {
            let jitter = if jhi > jlo {
                self.rng.gen_range(jlo..jhi)
            } else {
                jlo
            };
            let jw = ((img.width() as f32 * jitter).round() as u32).max(1);
            let jh = ((img.height() as f32 * jitter).round() as u32).max(1);
            img = imageops::resize(&img, jw, jh, FilterType::Lanczos3);
            shadow = imageops::resize(&shadow, jw, jh, FilterType::Lanczos3);
        }

        let img = clamp_texture_limit(img);
        let shadow = clamp_texture_limit(shadow);
        (Arc::new(to_layer(img)), Arc::new(to_layer(shadow)))
    }
}

/// 纹理上传按 u16 传递尺寸; 极端宽高比的素材垫到对角线
/// 方形后可能超界, 超界时等比缩回
fn clamp_texture_limit(img: RgbaImage) -> RgbaImage {
    const MAX_DIM: u32 = u16::MAX as u32;
    let (w, h) = img.dimensions();
    if w <= MAX_DIM && h <= MAX_DIM {
        return img;
    }
    let scale = MAX_DIM as f32 / w.max(h) as f32;
    let nw = ((w as f32 * scale).floor() as u32).clamp(1, MAX_DIM);
    let nh = ((h as f32 * scale).floor() as u32).clamp(1, MAX_DIM);
    imageops::resize(&img, nw, nh, FilterType::Lanczos3)
}

fn to_layer(img: RgbaImage) -> LayerImage {
    let (width, height) = img.dimensions();
    LayerImage::new(width, height, img.into_raw())
}

/// 旋转并扩展画布, 保证旋转后的图像完整可见
///
/// imageproc 的旋转保持画布尺寸不变, 所以先把素材垫到
/// 对角线边长的方形画布, 绕中心旋转后再裁剪到旋转包围盒
pub(crate) fn rotate_expanded(img: &RgbaImage, angle_deg: f32) -> RgbaImage {
    if angle_deg == 0.0 {
        return img.clone();
    }

    let (w, h) = (img.width() as f32, img.height() as f32);
    let rad = angle_deg.to_radians();
    let (sin, cos) = (rad.sin().abs(), rad.cos().abs());

    let diag = (w * w + h * h).sqrt().ceil() as u32;
    let mut canvas = RgbaImage::from_pixel(diag.max(1), diag.max(1), Rgba([0, 0, 0, 0]));
    let dx = ((diag - img.width()) / 2) as i64;
    let dy = ((diag - img.height()) / 2) as i64;
    imageops::overlay(&mut canvas, img, dx, dy);

    let rotated = rotate_about_center(&canvas, rad, Interpolation::Bilinear, Rgba([0, 0, 0, 0]));

    // 旋转包围盒不会超过对角线方形
    let out_w = ((w * cos + h * sin).ceil() as u32).clamp(1, diag);
    let out_h = ((w * sin + h * cos).ceil() as u32).clamp(1, diag);
    imageops::crop_imm(
        &rotated,
        (diag - out_w) / 2,
        (diag - out_h) / 2,
        out_w,
        out_h,
    )
    .to_image()
}
