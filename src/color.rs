// 背景色推定: ボックス周辺のストリップをサンプリングし、
// 量子化ヒストグラムの最頻色を返す

use std::collections::BTreeMap;

use image::RgbaImage;

use crate::geometry::PixelBox;

/// サンプリングストリップの幅（ピクセル）。
const STRIP_SIZE: i64 = 5;

/// 量子化バケットの幅（0-1スケール）。
const BUCKET_WIDTH: f32 = 0.05;

/// RGBカラー。各チャンネルは0..=1。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// リダクション矩形の塗りつぶし色を、矩形のすぐ外側の背景から推定する。
///
/// rasterは対象ページを1.0スケール（ピクセル==ポイント）でラスタライズ
/// した画像。ボックスの上下左右にSTRIP_SIZE幅のストリップを取り、
/// ページ内に完全に収まるストリップの不透明ピクセル（alpha > 0.5）を
/// BUCKET_WIDTH刻みで量子化して数え、最頻バケットの色を返す。
///
/// 有効なストリップが1つもない、または不透明ピクセルが見つからない
/// 場合は白を返す。同一ラスタに対して決定的。
pub fn estimate_surrounding_color(raster: &RgbaImage, bounds: &PixelBox, divide: f64) -> Rgb {
    let page_w = raster.width() as i64;
    let page_h = raster.height() as i64;

    let x = (bounds.x0 / divide).floor() as i64;
    let y = (bounds.y0 / divide).floor() as i64;
    let w = (bounds.width() / divide).floor() as i64;
    let h = (bounds.height() / divide).floor() as i64;

    // (x, y, width, height)
    let strips = [
        (x, y - STRIP_SIZE, w, STRIP_SIZE),
        (x, y + h, w, STRIP_SIZE),
        (x - STRIP_SIZE, y, STRIP_SIZE, h),
        (x + w, y, STRIP_SIZE, h),
    ];

    // BTreeMapで数えることで最頻色の選択を決定的にする
    let mut buckets: BTreeMap<(u8, u8, u8), u32> = BTreeMap::new();

    for &(sx, sy, sw, sh) in &strips {
        // ページ境界からはみ出すストリップは丸ごと捨てる
        if sx < 0 || sy < 0 || sx + sw > page_w || sy + sh > page_h {
            continue;
        }
        for py in sy..sy + sh {
            for px in sx..sx + sw {
                let pixel = raster.get_pixel(px as u32, py as u32);
                let alpha = pixel[3] as f32 / 255.0;
                if alpha <= 0.5 {
                    continue;
                }
                let key = (
                    quantize(pixel[0]),
                    quantize(pixel[1]),
                    quantize(pixel[2]),
                );
                *buckets.entry(key).or_insert(0) += 1;
            }
        }
    }

    match buckets.iter().max_by_key(|&(_, &count)| count) {
        Some((&(r, g, b), _)) => Rgb {
            r: bucket_value(r),
            g: bucket_value(g),
            b: bucket_value(b),
        },
        None => Rgb::WHITE,
    }
}

/// チャンネル値を最も近いバケットのインデックスに量子化する。
fn quantize(channel: u8) -> u8 {
    ((channel as f32 / 255.0) / BUCKET_WIDTH).round() as u8
}

/// バケットインデックスを代表色値に戻す。
fn bucket_value(index: u8) -> f32 {
    (index as f32 * BUCKET_WIDTH).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn uniform_raster(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(rgba))
    }

    #[test]
    fn test_uniform_page_returns_that_color() {
        let raster = uniform_raster(200, 200, [128, 64, 192, 255]);
        let bounds = PixelBox {
            x0: 40.0,
            y0: 40.0,
            x1: 80.0,
            y1: 80.0,
        };
        let color = estimate_surrounding_color(&raster, &bounds, 1.0);

        // 量子化1バケット以内で元の色に一致する
        assert!((color.r - 128.0 / 255.0).abs() <= BUCKET_WIDTH);
        assert!((color.g - 64.0 / 255.0).abs() <= BUCKET_WIDTH);
        assert!((color.b - 192.0 / 255.0).abs() <= BUCKET_WIDTH);
    }

    #[test]
    fn test_uniform_page_independent_of_box_position() {
        let raster = uniform_raster(300, 300, [200, 200, 200, 255]);
        let near_corner = PixelBox {
            x0: 10.0,
            y0: 10.0,
            x1: 40.0,
            y1: 40.0,
        };
        let center = PixelBox {
            x0: 130.0,
            y0: 130.0,
            x1: 170.0,
            y1: 170.0,
        };
        assert_eq!(
            estimate_surrounding_color(&raster, &near_corner, 1.0),
            estimate_surrounding_color(&raster, &center, 1.0)
        );
    }

    #[test]
    fn test_box_touching_all_edges_returns_white() {
        let raster = uniform_raster(100, 100, [10, 10, 10, 255]);
        let bounds = PixelBox {
            x0: 0.0,
            y0: 0.0,
            x1: 100.0,
            y1: 100.0,
        };
        assert_eq!(
            estimate_surrounding_color(&raster, &bounds, 1.0),
            Rgb::WHITE
        );
    }

    #[test]
    fn test_transparent_pixels_are_ignored() {
        let raster = uniform_raster(100, 100, [30, 30, 30, 0]);
        let bounds = PixelBox {
            x0: 40.0,
            y0: 40.0,
            x1: 60.0,
            y1: 60.0,
        };
        assert_eq!(
            estimate_surrounding_color(&raster, &bounds, 1.0),
            Rgb::WHITE
        );
    }

    #[test]
    fn test_divide_scales_sampling_region() {
        // divide=2: ピクセル座標200..400はラスタ上の100..200に対応する
        let raster = uniform_raster(300, 300, [255, 0, 0, 255]);
        let bounds = PixelBox {
            x0: 200.0,
            y0: 200.0,
            x1: 400.0,
            y1: 400.0,
        };
        let color = estimate_surrounding_color(&raster, &bounds, 2.0);
        assert!((color.r - 1.0).abs() <= BUCKET_WIDTH);
        assert!(color.g <= BUCKET_WIDTH);
    }
}
