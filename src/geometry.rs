// 幾何ユーティリティ: バウンディングボックス結合と座標系変換

use serde::Deserialize;

use crate::ocr::Word;

/// OCRピクセル座標系の矩形（原点は左上、yは下向き）。
///
/// 不変条件: `x1 >= x0`, `y1 >= y0`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PixelBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl PixelBox {
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

/// PDFポイント座標系の矩形（原点は左下、yは上向き）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// マッチした単語列全体を覆う最小の軸平行矩形を返す。
///
/// 結果は入力順序に依存しない。空の単語列はInvalidInputエラー。
pub fn union_bounding_box(words: &[Word]) -> crate::error::Result<PixelBox> {
    if words.is_empty() {
        return Err(crate::error::SanitizeError::invalid_input(
            "cannot union an empty word sequence",
        ));
    }

    let mut x0 = f64::INFINITY;
    let mut y0 = f64::INFINITY;
    let mut x1 = f64::NEG_INFINITY;
    let mut y1 = f64::NEG_INFINITY;

    for w in words {
        if w.bbox.x0 < x0 {
            x0 = w.bbox.x0;
        }
        if w.bbox.y0 < y0 {
            y0 = w.bbox.y0;
        }
        if w.bbox.x1 > x1 {
            x1 = w.bbox.x1;
        }
        if w.bbox.y1 > y1 {
            y1 = w.bbox.y1;
        }
    }

    Ok(PixelBox { x0, y0, x1, y1 })
}

/// ピクセル座標の矩形をPDFポイント座標の矩形に変換する。
///
/// 水平方向は1/divideスケールのパススルー、垂直方向はY軸反転:
/// `y_pdf = pdf_page_height - y_px/divide`
/// paddingは変換後の矩形を全辺へ外側に拡張する。
pub fn to_pdf_rect(bounds: &PixelBox, pdf_page_height: f64, divide: f64, padding: f64) -> PdfRect {
    PdfRect {
        x: bounds.x0 / divide - padding,
        y: pdf_page_height - bounds.y1 / divide - padding,
        width: bounds.width() / divide + padding * 2.0,
        height: bounds.height() / divide + padding * 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(x0: f64, y0: f64, x1: f64, y1: f64) -> Word {
        Word {
            text: "w".to_string(),
            bbox: PixelBox { x0, y0, x1, y1 },
            page_width: 1000.0,
            page_height: 1000.0,
        }
    }

    #[test]
    fn test_union_of_single_word_is_its_own_box() {
        let w = word(10.0, 20.0, 30.0, 40.0);
        let bounds = union_bounding_box(std::slice::from_ref(&w)).unwrap();
        assert_eq!(bounds, w.bbox);
    }

    #[test]
    fn test_union_is_smallest_covering_box() {
        let words = vec![
            word(10.0, 10.0, 50.0, 30.0),
            word(55.0, 12.0, 90.0, 28.0),
            word(95.0, 8.0, 140.0, 32.0),
        ];
        let bounds = union_bounding_box(&words).unwrap();

        // Every input box is fully contained
        for w in &words {
            assert!(bounds.x0 <= w.bbox.x0 && bounds.x1 >= w.bbox.x1);
            assert!(bounds.y0 <= w.bbox.y0 && bounds.y1 >= w.bbox.y1);
        }

        // Each edge is contributed by some input box (no smaller box covers all)
        assert_eq!(bounds.x0, 10.0);
        assert_eq!(bounds.y0, 8.0);
        assert_eq!(bounds.x1, 140.0);
        assert_eq!(bounds.y1, 32.0);
    }

    #[test]
    fn test_union_is_order_independent() {
        let mut words = vec![
            word(10.0, 10.0, 50.0, 30.0),
            word(55.0, 12.0, 90.0, 28.0),
        ];
        let forward = union_bounding_box(&words).unwrap();
        words.reverse();
        let backward = union_bounding_box(&words).unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_union_of_empty_sequence_is_invalid_input() {
        let result = union_bounding_box(&[]);
        assert!(matches!(
            result,
            Err(crate::error::SanitizeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_to_pdf_rect_flips_y_and_scales() {
        let bounds = PixelBox {
            x0: 10.0,
            y0: 10.0,
            x1: 50.0,
            y1: 30.0,
        };
        let rect = to_pdf_rect(&bounds, 800.0, 2.0, 2.0);
        assert_eq!(rect.x, 3.0);
        assert_eq!(rect.y, 783.0);
        assert_eq!(rect.width, 24.0);
        assert_eq!(rect.height, 14.0);
    }

    #[test]
    fn test_to_pdf_rect_contains_source_box() {
        let bounds = PixelBox {
            x0: 100.0,
            y0: 200.0,
            x1: 300.0,
            y1: 260.0,
        };
        let rect = to_pdf_rect(&bounds, 842.0, 1.0, 3.0);

        // 変換後の矩形はpadding適用後も元のボックスを完全に含む
        assert!(rect.x <= bounds.x0);
        assert!(rect.x + rect.width >= bounds.x1);
        assert!(rect.y <= 842.0 - bounds.y1);
        assert!(rect.y + rect.height >= 842.0 - bounds.y0);
        assert!(rect.width > 0.0 && rect.height > 0.0);
    }
}
