// ページラスタのドキュメント内キャッシュ
//
// 背景色サンプリングは同一ページ上の複数ボックスから繰り返し参照
// されるため、ページ単位でラスタを保持する。キャッシュの寿命は
// 1ドキュメントの処理に限られ、ドキュメント間で共有してはならない。

use std::collections::HashMap;

use image::RgbaImage;

/// 1ドキュメント分のページラスタキャッシュ（ページインデックスがキー）。
pub struct RasterCache<'a> {
    #[cfg_attr(not(feature = "sample"), allow(dead_code))]
    pdf_bytes: &'a [u8],
    pages: HashMap<u32, Option<RgbaImage>>,
}

impl<'a> RasterCache<'a> {
    pub fn new(pdf_bytes: &'a [u8]) -> Self {
        Self {
            pdf_bytes,
            pages: HashMap::new(),
        }
    }

    /// 0-indexedページのラスタ（1.0スケール、ピクセル==ポイント）を返す。
    ///
    /// 初回アクセス時にレンダリングし、以後は保持した画像を返す。
    /// レンダリング失敗はNoneとして記憶し、同じページで再試行しない。
    #[cfg(feature = "sample")]
    pub fn page(&mut self, page_index: u32) -> Option<&RgbaImage> {
        self.pages
            .entry(page_index)
            .or_insert_with(|| {
                match crate::render::pdfium::render_page_raster(self.pdf_bytes, page_index) {
                    Ok(image) => Some(image),
                    Err(e) => {
                        tracing::warn!("page {page_index}: raster render failed: {e}");
                        None
                    }
                }
            })
            .as_ref()
    }

    /// sampleフィーチャ無効時はラスタを提供しない。
    /// 呼び出し側は固定色フォールバックを使う。
    #[cfg(not(feature = "sample"))]
    pub fn page(&mut self, _page_index: u32) -> Option<&RgbaImage> {
        None
    }
}
