// リダクション計画: 1ページ分の塗りつぶし矩形リストを作る

use tracing::{debug, warn};

use crate::geometry::{PixelBox, union_bounding_box};
use crate::matcher::PhraseMatcher;
use crate::ocr::{QrDetection, Word};

/// リダクション矩形の由来。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RedactionKind {
    /// フレーズマッチ由来。confidenceはマッチャーが報告した値。
    Phrase { confidence: f64 },
    /// QR検出由来。
    Qr,
}

/// ピクセル座標系の塗りつぶし対象矩形。
#[derive(Debug, Clone)]
pub struct RedactionBox {
    pub bounds: PixelBox,
    pub kind: RedactionKind,
}

/// 1ページ分のリダクション矩形を計画する。
///
/// 各フレーズをマッチャーで照合し、マッチごとに単語ボックスの結合
/// 矩形を作る。QR検出はpage（1-based）が一致するものをそのまま矩形
/// にする。重なり合う矩形の統合や重複排除は行わない（不透明塗り
/// つぶし同士の重なりは無害）。
///
/// 1フレーズの計画失敗はログに残してスキップし、残りの処理を
/// 続行する。OCR結果がないページ（words空）でもQR矩形は作られる。
pub fn plan_page_redactions(
    words: &[Word],
    qr_detections: &[QrDetection],
    page_number: u32,
    phrases: &[String],
    matcher: &dyn PhraseMatcher,
) -> Vec<RedactionBox> {
    let mut boxes = Vec::new();

    for phrase in phrases {
        let found = matcher.find_matches(words, phrase);
        if found.is_empty() {
            continue;
        }
        debug!(
            page = page_number,
            occurrences = found.len(),
            "phrase \"{phrase}\" matched"
        );

        for phrase_match in found {
            match union_bounding_box(&phrase_match.words) {
                Ok(bounds) => boxes.push(RedactionBox {
                    bounds,
                    kind: RedactionKind::Phrase {
                        confidence: phrase_match.confidence,
                    },
                }),
                Err(e) => {
                    warn!(
                        page = page_number,
                        "skipping one occurrence of \"{phrase}\": {e}"
                    );
                }
            }
        }
    }

    for qr in qr_detections.iter().filter(|qr| qr.page == page_number) {
        boxes.push(RedactionBox {
            bounds: qr.bbox.to_pixel_box(),
            kind: RedactionKind::Qr,
        });
    }

    boxes
}
