// OCR/QRサービス応答のデータモデル

pub mod client;

use serde::Deserialize;

use crate::geometry::PixelBox;

/// OCRが認識した1トークン分の単語。
///
/// bboxはサービスがレンダリングしたページのピクセル座標系
/// （原点左上、y下向き）。page_width/page_heightはそのレンダリング
/// 寸法で、ポイント座標系への逆変換の根拠となる。
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Word {
    pub text: String,
    pub bbox: PixelBox,
    pub page_width: f64,
    pub page_height: f64,
}

/// 1ページ分のOCR結果。
#[derive(Debug, Clone, Deserialize)]
pub struct OcrPage {
    #[serde(default)]
    pub text: String,
    pub words: Vec<Word>,
    pub page_width: f64,
    pub page_height: f64,
}

/// QR検出のbbox。ワイヤ形式のフィールド名はx1/y1/x2/y2だが、
/// 意味はWordのbboxと同じ左上/右下。
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct QrBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl QrBox {
    /// PixelBoxへ正規化する（座標順を保証する）。
    pub fn to_pixel_box(&self) -> PixelBox {
        PixelBox {
            x0: self.x1.min(self.x2),
            y0: self.y1.min(self.y2),
            x1: self.x1.max(self.x2),
            y1: self.y1.max(self.y2),
        }
    }
}

/// ページ上で検出されたQRコード1件。pageは1-based。
#[derive(Debug, Clone, Deserialize)]
pub struct QrDetection {
    pub page: u32,
    pub bbox: QrBox,
}

/// 1ドキュメント分のOCR/QR抽出結果。
#[derive(Debug, Clone, Default)]
pub struct OcrDocument {
    pub pages: Vec<OcrPage>,
    pub qr_detections: Vec<QrDetection>,
}
