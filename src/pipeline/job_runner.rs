// ジョブ単位: PDF読込 -> OCR/QR抽出 -> リダクション -> カバー挿入 -> 出力

use std::path::PathBuf;
use std::time::Duration;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::color::{Rgb, estimate_surrounding_color};
use crate::config::job::FillMode;
use crate::error::SanitizeError;
use crate::geometry::{PixelBox, to_pdf_rect};
use crate::matcher::{FuzzyOptions, MatchMode};
use crate::ocr::client::OcrClient;
use crate::pdf::SanitizedPdfWriter;
use crate::pipeline::{JobError, PipelineStage};
use crate::planner::plan_page_redactions;
use crate::render::RasterCache;

/// Configuration for a single job.
pub struct JobConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub cover_image_path: PathBuf,
    pub phrases: Vec<String>,
    /// OCRレンダリングスケール（ピクセル座標 / divide = ポイント座標）。
    pub divide: f64,
    pub padding: f64,
    pub match_mode: MatchMode,
    pub fuzzy_options: FuzzyOptions,
    pub fill: FillMode,
    pub fixed_fill: Rgb,
    pub ocr_endpoint: String,
    pub ocr_timeout_secs: u64,
    pub ocr_max_retries: u32,
}

/// Result of processing a single job.
pub struct JobResult {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub pages_processed: usize,
    pub boxes_painted: usize,
    /// 計画はされたが塗れなかったボックス数。0でない場合も処理は
    /// 完了しているが、呼び出し側が可視化できるように返す。
    pub boxes_failed: usize,
}

/// Run a single sanitize job through the pipeline.
///
/// Load: 入力PDFを読み込む
/// Ocr: 外部サービスから単語ボックスとQR検出を取得する（リトライ付き）
/// Redact: ページごとに矩形を計画し（rayon並列）、塗りつぶす
/// Cover: カバーページを先頭に挿入する
/// Save: アトミックに書き出す
///
/// 個々のボックスの失敗はドキュメントを中断しない。ドキュメント
/// レベルの失敗は段階付きのJobErrorとして返し、出力は残さない。
pub fn run_job(config: &JobConfig) -> Result<JobResult, JobError> {
    let fail = |stage: PipelineStage, source: SanitizeError| JobError {
        input_path: config.input_path.clone(),
        stage,
        source,
    };

    // --- Load ---
    let pdf_bytes = std::fs::read(&config.input_path)
        .map_err(|e| fail(PipelineStage::Load, e.into()))?;
    let mut writer = SanitizedPdfWriter::from_bytes(&pdf_bytes)
        .map_err(|e| fail(PipelineStage::Load, e))?;
    let page_count = writer.page_count();
    if page_count == 0 {
        return Err(fail(
            PipelineStage::Load,
            SanitizeError::pdf_load("document has no pages"),
        ));
    }

    // --- Ocr ---
    let filename = config
        .input_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string());
    let document_id = config
        .input_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned());

    let client = OcrClient::new(
        &config.ocr_endpoint,
        Duration::from_secs(config.ocr_timeout_secs),
    )
    .map_err(|e| fail(PipelineStage::Ocr, e))?;
    let ocr = client
        .extract_with_retry(
            &pdf_bytes,
            &filename,
            document_id.as_deref(),
            config.ocr_max_retries,
        )
        .map_err(|e| fail(PipelineStage::Ocr, e))?;

    if ocr.pages.len() < page_count as usize {
        // OCR結果がPDFより少ないページ数しかないケース。不足ページは
        // テキスト矩形なし、QR矩形のみになる。
        warn!(
            "{}: OCR returned {} page(s) for a {} page document",
            config.input_path.display(),
            ocr.pages.len(),
            page_count
        );
    }

    // --- Redact: 計画（並列） ---
    let matcher = config.match_mode.build_matcher(config.fuzzy_options.clone());
    let planned: Vec<_> = (1..=page_count)
        .into_par_iter()
        .map(|page_num| {
            let words = ocr
                .pages
                .get((page_num - 1) as usize)
                .map(|p| p.words.as_slice())
                .unwrap_or(&[]);
            let boxes = plan_page_redactions(
                words,
                &ocr.qr_detections,
                page_num,
                &config.phrases,
                matcher.as_ref(),
            );
            (page_num, boxes)
        })
        .collect();

    // --- Redact: 塗りつぶし（逐次） ---
    let mut raster_cache = RasterCache::new(&pdf_bytes);
    let mut boxes_painted = 0;
    let mut boxes_failed = 0;

    for (page_num, boxes) in planned {
        if boxes.is_empty() {
            continue;
        }

        let (_, page_height) = match writer.page_dimensions(page_num) {
            Ok(dims) => dims,
            Err(e) => {
                warn!(
                    "{}: page {page_num}: cannot resolve dimensions, skipping {} box(es): {e}",
                    config.input_path.display(),
                    boxes.len()
                );
                boxes_failed += boxes.len();
                continue;
            }
        };

        let rects: Vec<_> = boxes
            .iter()
            .map(|b| {
                let fill = resolve_fill(config, &mut raster_cache, page_num, &b.bounds);
                (
                    to_pdf_rect(&b.bounds, page_height, config.divide, config.padding),
                    fill,
                )
            })
            .collect();

        match writer.paint_redactions(page_num, &rects) {
            Ok(()) => boxes_painted += rects.len(),
            Err(e) => {
                warn!(
                    "{}: page {page_num}: failed to paint {} box(es): {e}",
                    config.input_path.display(),
                    rects.len()
                );
                boxes_failed += rects.len();
            }
        }
    }

    // --- Cover ---
    let cover_bytes = std::fs::read(&config.cover_image_path).map_err(|e| {
        fail(
            PipelineStage::Cover,
            SanitizeError::missing_cover(format!(
                "{}: {e}",
                config.cover_image_path.display()
            )),
        )
    })?;
    writer
        .prepend_cover_page(&cover_bytes)
        .map_err(|e| fail(PipelineStage::Cover, e))?;

    // --- Save ---
    if let Some(parent) = config.output_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| fail(PipelineStage::Save, e.into()))?;
    }
    writer
        .save_atomic(&config.output_path)
        .map_err(|e| fail(PipelineStage::Save, e))?;

    info!(
        "{} -> {}: {} box(es) painted, {} failed",
        config.input_path.display(),
        config.output_path.display(),
        boxes_painted,
        boxes_failed
    );

    Ok(JobResult {
        input_path: config.input_path.clone(),
        output_path: config.output_path.clone(),
        pages_processed: page_count as usize,
        boxes_painted,
        boxes_failed,
    })
}

/// 1ボックス分の塗りつぶし色を決める。
///
/// fill=sampleの場合はページラスタから背景色を推定し、ラスタが
/// 得られないときは固定色に落ちる。
fn resolve_fill(
    config: &JobConfig,
    raster_cache: &mut RasterCache<'_>,
    page_num: u32,
    bounds: &PixelBox,
) -> Rgb {
    match config.fill {
        FillMode::Fixed => config.fixed_fill,
        FillMode::Sample => match raster_cache.page(page_num - 1) {
            Some(raster) => estimate_surrounding_color(raster, bounds, config.divide),
            None => config.fixed_fill,
        },
    }
}
