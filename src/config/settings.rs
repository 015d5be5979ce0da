use std::path::Path;

use serde::Deserialize;

use crate::config::job::FillMode;
use crate::matcher::MatchMode;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// OCR/QRサービスのアップロードエンドポイント。
    pub ocr_endpoint: String,
    pub ocr_timeout_secs: u64,
    pub ocr_max_retries: u32,
    /// OCRのレンダリングスケール。OCRピクセル座標をこの値で割ると
    /// PDFポイント座標になる。全リダクションで共通の唯一の真実。
    pub divide: f64,
    /// リダクション矩形を全辺へ拡張するマージン（pt）。
    pub padding: f64,
    pub match_mode: MatchMode,
    pub similarity_threshold: f64,
    pub partial_match_threshold: f64,
    pub max_skips: u32,
    pub fill: FillMode,
    /// サンプリング不能時・fill=fixed時の塗りつぶし色（RGB、0-1）。
    pub fixed_fill: [f32; 3],
    /// ジョブがphrasesを省略した場合に使う既定のフレーズリスト。
    pub default_phrases: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            ocr_endpoint: "http://localhost:4000/api/upload".to_string(),
            ocr_timeout_secs: 120,
            ocr_max_retries: 3,
            divide: 2.0,
            padding: 3.0,
            match_mode: MatchMode::Fuzzy,
            similarity_threshold: 0.7,
            partial_match_threshold: 0.8,
            max_skips: 1,
            fill: FillMode::Sample,
            fixed_fill: [0.95, 0.95, 0.95],
            default_phrases: Vec::new(),
        }
    }
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> crate::error::Result<Self> {
        serde_yml::from_str(yaml).map_err(|e| {
            crate::error::SanitizeError::config(format!("Failed to parse settings YAML: {e}"))
        })
    }

    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}
