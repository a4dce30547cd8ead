/// 关联策略 (Association strategies)
///
/// 决定一个新检测框更新哪个已有精灵:
/// - ByIdentity:     按固件稳定目标ID精确匹配
/// - ByFirstOverlap: 第一个边界相交的精灵 (原始装置的简单策略)
/// - ByBestOverlap:  贪心最大IOU匹配 (更强的替代方案)
use crate::tracking::sprite::{Sprite, SpriteKey};
use crate::tracking::types::{Detection, Rect};

/// 关联策略统一接口
///
/// 返回匹配到的精灵下标; None 表示应新建精灵
pub trait AssociationStrategy: Send {
    fn name(&self) -> &'static str;

    fn resolve(&self, detection: &Detection, bounds: &Rect, sprites: &[Sprite]) -> Option<usize>;
}

/// 按稳定目标ID匹配; 无ID的检测不匹配任何已有精灵
pub struct ByIdentity;

impl AssociationStrategy for ByIdentity {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn resolve(&self, detection: &Detection, _bounds: &Rect, sprites: &[Sprite]) -> Option<usize> {
        let id = detection.identity?;
        sprites
            .iter()
            .position(|s| s.key == SpriteKey::Identity(id))
    }
}

/// 第一个边界相交的精灵胜出, 不做面积排序
pub struct ByFirstOverlap;

impl AssociationStrategy for ByFirstOverlap {
    fn name(&self) -> &'static str {
        "overlap"
    }

    fn resolve(&self, _detection: &Detection, bounds: &Rect, sprites: &[Sprite]) -> Option<usize> {
        sprites.iter().position(|s| s.bounds.intersects(bounds))
    }
}

/// 贪心IOU匹配: 取IOU最大且为正的精灵
pub struct ByBestOverlap;

impl AssociationStrategy for ByBestOverlap {
    fn name(&self) -> &'static str {
        "iou"
    }

    fn resolve(&self, _detection: &Detection, bounds: &Rect, sprites: &[Sprite]) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (idx, sprite) in sprites.iter().enumerate() {
            let iou = sprite.bounds.iou(bounds);
            if iou > 0.0 && best.map_or(true, |(_, b)| iou > b) {
                best = Some((idx, iou));
            }
        }
        best.map(|(idx, _)| idx)
    }
}

/// 按名称构建策略 (命令行参数用)
pub fn strategy_by_name(name: &str) -> Box<dyn AssociationStrategy> {
    match name.to_lowercase().as_str() {
        "identity" => Box::new(ByIdentity),
        "iou" => Box::new(ByBestOverlap),
        _ => Box::new(ByFirstOverlap),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sprite_at(key: SpriteKey, x: f32, y: f32) -> Sprite {
        Sprite::new(key, Rect::new(x, y, 20.0, 20.0), 3)
    }

    #[test]
    fn test_identity_matches_regardless_of_position() {
        let sprites = vec![
            sprite_at(SpriteKey::Identity(1), 0.0, 0.0),
            sprite_at(SpriteKey::Identity(2), 100.0, 100.0),
        ];
        // 位置完全不同, ID相同仍然匹配
        let det = Detection::new(500.0, 500.0, 10.0, 10.0).with_identity(2);
        let bounds = Rect::new(500.0, 500.0, 10.0, 10.0);
        assert_eq!(ByIdentity.resolve(&det, &bounds, &sprites), Some(1));
    }

    #[test]
    fn test_identity_without_id_never_matches() {
        let sprites = vec![sprite_at(SpriteKey::Identity(1), 0.0, 0.0)];
        let det = Detection::new(0.0, 0.0, 10.0, 10.0);
        let bounds = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(ByIdentity.resolve(&det, &bounds, &sprites), None);
    }

    #[test]
    fn test_first_overlap_picks_first_found() {
        // 两个精灵都与检测框相交, 取下标靠前的
        let sprites = vec![
            sprite_at(SpriteKey::Anonymous(0), 0.0, 0.0),
            sprite_at(SpriteKey::Anonymous(1), 10.0, 10.0),
        ];
        let det = Detection::new(15.0, 15.0, 10.0, 10.0);
        let bounds = Rect::new(15.0, 15.0, 10.0, 10.0);
        assert_eq!(ByFirstOverlap.resolve(&det, &bounds, &sprites), Some(0));
    }

    #[test]
    fn test_first_overlap_none_when_disjoint() {
        let sprites = vec![sprite_at(SpriteKey::Anonymous(0), 0.0, 0.0)];
        let det = Detection::new(100.0, 100.0, 10.0, 10.0);
        let bounds = Rect::new(100.0, 100.0, 10.0, 10.0);
        assert_eq!(ByFirstOverlap.resolve(&det, &bounds, &sprites), None);
    }

    #[test]
    fn test_best_overlap_prefers_higher_iou() {
        let sprites = vec![
            sprite_at(SpriteKey::Anonymous(0), 0.0, 0.0),  // 交集很小
            sprite_at(SpriteKey::Anonymous(1), 16.0, 16.0), // 几乎重合
        ];
        let det = Detection::new(15.0, 15.0, 20.0, 20.0);
        let bounds = Rect::new(15.0, 15.0, 20.0, 20.0);
        assert_eq!(ByBestOverlap.resolve(&det, &bounds, &sprites), Some(1));
    }

    #[test]
    fn test_strategy_by_name() {
        assert_eq!(strategy_by_name("identity").name(), "identity");
        assert_eq!(strategy_by_name("IOU").name(), "iou");
        assert_eq!(strategy_by_name("overlap").name(), "overlap");
        assert_eq!(strategy_by_name("whatever").name(), "overlap");
    }
}
