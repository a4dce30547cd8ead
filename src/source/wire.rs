/// 设备监控消息解码 (Device monitor message decoding)
///
/// 视觉设备经串口按行输出JSON监控消息, 两种形态:
/// - 信封:   {"type":1,"name":"INVOKE","data":{...}}
/// - 裸载荷: {"boxes":[[x,y,w,h,score,target],...],"resolution":[240,240],...}
///
/// boxes 行至少4个元素 (x,y,w,h), score/target 可选;
/// 全库统一 (x, y, width, height) 约定
use serde::Deserialize;

use crate::tracking::types::{Detection, FrameReport};

#[derive(Deserialize, Default)]
struct MonitorPayload {
    #[serde(default)]
    boxes: Option<Vec<Vec<f32>>>,
    #[serde(default)]
    resolution: Option<[u32; 2]>,
}

#[derive(Deserialize)]
struct Envelope {
    data: MonitorPayload,
}

/// 解码一行设备输出
///
/// 返回 None 表示这行不是带 boxes 的监控消息 (日志行/其他事件);
/// boxes 为空数组仍是有效报告 ("当前无检测", 触发衰减)
pub fn parse_line(line: &str, seq: u64) -> Option<FrameReport> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let payload = match serde_json::from_str::<Envelope>(line) {
        Ok(env) => env.data,
        Err(_) => serde_json::from_str::<MonitorPayload>(line).ok()?,
    };

    let boxes = payload.boxes?;
    let detections = boxes
        .iter()
        .filter(|row| row.len() >= 4)
        .map(|row| Detection {
            x: row[0],
            y: row[1],
            width: row[2],
            height: row[3],
            score: row.get(4).copied().unwrap_or(0.0),
            identity: row.get(5).map(|t| *t as u32),
        })
        .collect();

    Some(FrameReport {
        seq,
        resolution: payload.resolution.map(|r| (r[0], r[1])),
        detections,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_payload() {
        let line = r#"{"boxes":[[10,20,30,40,85,2]],"resolution":[240,240]}"#;
        let report = parse_line(line, 7).unwrap();
        assert_eq!(report.seq, 7);
        assert_eq!(report.resolution, Some((240, 240)));
        assert_eq!(report.detections.len(), 1);

        let det = &report.detections[0];
        assert_eq!((det.x, det.y, det.width, det.height), (10.0, 20.0, 30.0, 40.0));
        assert_eq!(det.score, 85.0);
        assert_eq!(det.identity, Some(2));
    }

    #[test]
    fn test_parse_envelope() {
        let line = r#"{"type":1,"name":"INVOKE","data":{"boxes":[[1,2,3,4]],"count":1}}"#;
        let report = parse_line(line, 0).unwrap();
        assert_eq!(report.detections.len(), 1);
        // score/target 缺省
        assert_eq!(report.detections[0].score, 0.0);
        assert_eq!(report.detections[0].identity, None);
    }

    #[test]
    fn test_empty_boxes_is_valid_empty_report() {
        let report = parse_line(r#"{"boxes":[]}"#, 3).unwrap();
        assert!(report.detections.is_empty());
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let report = parse_line(r#"{"boxes":[[],[1,2,3],[5,6,7,8]]}"#, 0).unwrap();
        assert_eq!(report.detections.len(), 1);
        assert_eq!(report.detections[0].x, 5.0);
    }

    #[test]
    fn test_zero_sized_rows_pass_through_as_sentinels() {
        // 哨兵行由跟踪器丢弃, 解码层忠实转发
        let report = parse_line(r#"{"boxes":[[0,0,0,0,0,0]]}"#, 0).unwrap();
        assert_eq!(report.detections.len(), 1);
        assert!(!report.detections[0].is_actionable());
    }

    #[test]
    fn test_non_monitor_lines_are_ignored() {
        assert!(parse_line("", 0).is_none());
        assert!(parse_line("boot: device ready", 0).is_none());
        assert!(parse_line(r#"{"name":"LOG","data":{}}"#, 0).is_none());
        assert!(parse_line(r#"{"perf":[1,2,3]}"#, 0).is_none());
    }
}
