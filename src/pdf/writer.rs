// ドキュメント書き換え: リダクション矩形の塗りつぶし、カバーページ
// 挿入、シリアライズ

use std::io::Write;
use std::path::Path;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::{Document, Object, Stream, dictionary};

use crate::color::Rgb;
use crate::error::SanitizeError;
use crate::geometry::PdfRect;

/// 先頭ページが横長だった場合に使うカバーページの固定サイズ（pt）。
const COVER_FALLBACK_WIDTH: f64 = 1190.0;
const COVER_FALLBACK_HEIGHT: f64 = 1684.0;

/// ロード済みPDFを書き換えて出力するライター。
///
/// 1ドキュメントの処理を通して同じインスタンスを使う。状態遷移は
/// 一方向: ロード → 塗りつぶし → カバー挿入 → 保存。
pub struct SanitizedPdfWriter {
    doc: Document,
}

impl SanitizedPdfWriter {
    /// PDFバイト列からライターを作成する。
    pub fn from_bytes(bytes: &[u8]) -> crate::error::Result<Self> {
        let doc = Document::load_mem(bytes)
            .map_err(|e| SanitizeError::pdf_load(e.to_string()))?;
        Ok(Self { doc })
    }

    /// PDFファイルを開いてライターを作成する。
    pub fn open(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let doc = Document::load(path)?;
        Ok(Self { doc })
    }

    /// 内部のlopdf Documentへの参照を返す。
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// ページ数を返す。
    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// 指定ページ辞書からMediaBoxを取得する（Parent経由の継承も考慮）。
    fn get_media_box(&self, dict: &lopdf::Dictionary) -> crate::error::Result<lopdf::Object> {
        if let Ok(obj) = dict.get(b"MediaBox") {
            return Ok(obj.clone());
        }

        // 見つからなければParentをたどって継承を確認する
        if let Ok(lopdf::Object::Reference(parent_id)) = dict.get(b"Parent") {
            let parent_dict = self.doc.get_dictionary(*parent_id)?;
            return self.get_media_box(parent_dict);
        }

        Err(SanitizeError::pdf_load("MediaBox not found"))
    }

    /// 指定ページ(1-indexed)のMediaBoxからページ寸法(width_pts, height_pts)を返す。
    pub fn page_dimensions(&self, page_num: u32) -> crate::error::Result<(f64, f64)> {
        let page_id = self.get_page_id(page_num)?;
        let page_dict = self.doc.get_dictionary(page_id)?;

        let media_box = self.get_media_box(page_dict)?;

        let media_box_array = media_box.as_array()?;
        if media_box_array.len() < 4 {
            return Err(SanitizeError::pdf_load("Invalid MediaBox"));
        }

        // MediaBoxの値は整数または実数の可能性がある
        let to_f64 = |obj: &lopdf::Object| -> crate::error::Result<f64> {
            match obj {
                lopdf::Object::Integer(i) => Ok(*i as f64),
                lopdf::Object::Real(f) => Ok(*f as f64),
                _ => Err(SanitizeError::pdf_load("Invalid MediaBox value")),
            }
        };

        let x0 = to_f64(&media_box_array[0])?;
        let y0 = to_f64(&media_box_array[1])?;
        let x1 = to_f64(&media_box_array[2])?;
        let y1 = to_f64(&media_box_array[3])?;

        let width = (x1 - x0).abs();
        let height = (y1 - y0).abs();

        if width <= 0.0 || height <= 0.0 {
            return Err(SanitizeError::pdf_load(
                "Invalid MediaBox: non-positive page dimensions",
            ));
        }

        Ok((width, height))
    }

    /// 指定ページ(1-indexed)にリダクション矩形を塗る。
    ///
    /// 元のコンテンツストリームをq/Qで包み、直後に矩形描画オペレータ
    /// を連結した新しいストリームでContentsを差し替える。元ストリーム
    /// が不均衡なグラフィックス状態を残していても矩形の座標が
    /// 影響を受けないようにするため。塗りは不透明なので同一ページ内の
    /// 矩形同士の描画順は見た目に影響しない。
    pub fn paint_redactions(
        &mut self,
        page_num: u32,
        rects: &[(PdfRect, Rgb)],
    ) -> crate::error::Result<()> {
        if rects.is_empty() {
            return Ok(());
        }

        let page_id = self.get_page_id(page_num)?;
        let original = self.doc.get_page_content(page_id)?;

        let mut content = Vec::with_capacity(original.len() + 64 * rects.len());
        content.extend_from_slice(b"q\n");
        content.extend_from_slice(&original);
        content.extend_from_slice(b"\nQ\n");
        for (rect, fill) in rects {
            content.extend_from_slice(
                format!(
                    "{:.4} {:.4} {:.4} rg {:.3} {:.3} {:.3} {:.3} re f\n",
                    fill.r, fill.g, fill.b, rect.x, rect.y, rect.width, rect.height
                )
                .as_bytes(),
            );
        }

        let stream_id = self
            .doc
            .add_object(Object::Stream(Stream::new(dictionary! {}, content)));

        let page_dict = self.doc.get_object_mut(page_id)?.as_dict_mut()?;
        page_dict.set("Contents", Object::Reference(stream_id));
        Ok(())
    }

    /// カバーページをドキュメントの先頭に挿入する。
    ///
    /// ページサイズは先頭コンテンツページに合わせる。先頭ページが
    /// 横長の場合は歪んだカバーを避けるため固定のポートレートサイズ
    /// に差し替える。呼び出し後はページ0がカバーとなり、元のページが
    /// 元の順序で続く。余分なページは残らない。
    pub fn prepend_cover_page(&mut self, png_bytes: &[u8]) -> crate::error::Result<()> {
        let image_id = self.add_cover_image_xobject(png_bytes)?;

        let (mut width, mut height) = self.page_dimensions(1)?;
        if width > height {
            width = COVER_FALLBACK_WIDTH;
            height = COVER_FALLBACK_HEIGHT;
        }

        // カバー画像をページ全面に拡大描画する
        let content = format!("q {width:.3} 0 0 {height:.3} 0 0 cm /CoverImg Do Q");
        let content_id = self
            .doc
            .add_object(Object::Stream(Stream::new(dictionary! {}, content.into_bytes())));

        let mut xobject_dict = lopdf::Dictionary::new();
        xobject_dict.set("CoverImg", Object::Reference(image_id));
        let resources_id = self.doc.add_object(dictionary! {
            "XObject" => Object::Dictionary(xobject_dict),
        });

        let pages_id = self.root_pages_id()?;
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(width as f32),
                Object::Real(height as f32),
            ],
            "Resources" => resources_id,
            "Contents" => content_id,
        });

        // ルートPagesノードのKids先頭に挿入し、Countを更新する
        let pages_dict = self.doc.get_object_mut(pages_id)?.as_dict_mut()?;
        let count = pages_dict
            .get(b"Count")
            .and_then(Object::as_i64)
            .unwrap_or(0);
        let kids = pages_dict.get_mut(b"Kids")?.as_array_mut()?;
        kids.insert(0, Object::Reference(page_id));
        pages_dict.set("Count", count + 1);

        Ok(())
    }

    /// カバーPNGをデコードし、FlateDecode圧縮のRGB画像XObjectとして追加する。
    ///
    /// 戻り値はXObjectのオブジェクトID。
    fn add_cover_image_xobject(&mut self, png_bytes: &[u8]) -> crate::error::Result<lopdf::ObjectId> {
        let decoded = image::load_from_memory(png_bytes)?;
        let rgb = decoded.to_rgb8();
        let (width, height) = rgb.dimensions();

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(rgb.as_raw())?;
        let data = encoder.finish()?;

        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        };
        Ok(self.doc.add_object(Object::Stream(Stream::new(dict, data))))
    }

    /// PDFドキュメントをバイト列として出力する。
    pub fn save_to_bytes(&self) -> crate::error::Result<Vec<u8>> {
        let mut buf = Vec::new();
        // clone to avoid borrowing issues with save_to (takes &mut self in lopdf)
        self.doc
            .clone()
            .save_to(&mut buf)
            .map_err(|e| SanitizeError::pdf_save(e.to_string()))?;
        Ok(buf)
    }

    /// ドキュメントを出力パスへアトミックに書き込む。
    ///
    /// 一時ファイルに書いてからrenameで最終パスへ移動する。途中で
    /// 失敗しても最終パスに不完全なファイルが残ることはない。
    pub fn save_atomic(&self, path: &Path) -> crate::error::Result<()> {
        let bytes = self.save_to_bytes()?;

        let tmp_path = path.with_extension("pdf.tmp");
        std::fs::write(&tmp_path, &bytes)
            .map_err(|e| SanitizeError::pdf_save(format!("{}: {e}", tmp_path.display())))?;

        if let Err(e) = std::fs::rename(&tmp_path, path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(SanitizeError::pdf_save(format!("{}: {e}", path.display())));
        }
        Ok(())
    }

    /// ページ番号(1-indexed)からObjectIdを取得する。
    fn get_page_id(&self, page_num: u32) -> crate::error::Result<lopdf::ObjectId> {
        let pages = self.doc.get_pages();
        pages
            .get(&page_num)
            .copied()
            .ok_or_else(|| SanitizeError::pdf_load(format!("page {} not found", page_num)))
    }

    /// カタログ経由でルートPagesノードのObjectIdを取得する。
    fn root_pages_id(&self) -> crate::error::Result<lopdf::ObjectId> {
        let root_id = self.doc.trailer.get(b"Root").and_then(Object::as_reference)?;
        let catalog = self.doc.get_dictionary(root_id)?;
        Ok(catalog.get(b"Pages").and_then(Object::as_reference)?)
    }
}
