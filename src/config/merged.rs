use super::job::{FillMode, Job};
use super::settings::Settings;
use crate::matcher::MatchMode;

#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub ocr_endpoint: String,
    pub ocr_timeout_secs: u64,
    pub ocr_max_retries: u32,
    pub divide: f64,
    pub padding: f64,
    pub match_mode: MatchMode,
    pub similarity_threshold: f64,
    pub partial_match_threshold: f64,
    pub max_skips: u32,
    pub fill: FillMode,
    pub fixed_fill: [f32; 3],
    pub phrases: Vec<String>,
}

impl MergedConfig {
    /// JobのOption値がSomeならJobの値を、NoneならSettingsの値を使用する。
    /// phrasesはジョブ側が空の場合のみdefault_phrasesに落ちる。
    pub fn new(settings: &Settings, job: &Job) -> Self {
        let phrases = if job.phrases.is_empty() {
            settings.default_phrases.clone()
        } else {
            job.phrases.clone()
        };

        MergedConfig {
            ocr_endpoint: settings.ocr_endpoint.clone(),
            ocr_timeout_secs: settings.ocr_timeout_secs,
            ocr_max_retries: settings.ocr_max_retries,
            divide: job.divide.unwrap_or(settings.divide),
            padding: job.padding.unwrap_or(settings.padding),
            match_mode: job.match_mode.unwrap_or(settings.match_mode),
            similarity_threshold: job
                .similarity_threshold
                .unwrap_or(settings.similarity_threshold),
            partial_match_threshold: settings.partial_match_threshold,
            max_skips: settings.max_skips,
            fill: job.fill.unwrap_or(settings.fill),
            fixed_fill: settings.fixed_fill,
            phrases,
        }
    }
}
