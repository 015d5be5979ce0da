use serde::Deserialize;

use crate::matcher::MatchMode;

#[derive(Debug, Clone, Deserialize)]
pub struct JobFile {
    pub jobs: Vec<Job>,
}

/// 1ドキュメント分のジョブ指定。
///
/// Option値はSomeの場合のみsettings.yamlの値を上書きする。
#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    pub input: String,
    pub output: String,
    pub cover_image: String,
    /// このドキュメントで塗りつぶす対象フレーズ。
    /// 省略時はSettingsのdefault_phrasesを使う。
    #[serde(default)]
    pub phrases: Vec<String>,
    pub divide: Option<f64>,
    pub padding: Option<f64>,
    pub match_mode: Option<MatchMode>,
    pub similarity_threshold: Option<f64>,
    pub fill: Option<FillMode>,
}

/// リダクション矩形の塗りつぶし色の決め方。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMode {
    /// ボックス周辺の背景色をサンプリングする。
    Sample,
    /// 固定色で塗る。
    Fixed,
}
