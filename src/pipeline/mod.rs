pub mod job_runner;
pub mod orchestrator;

use std::fmt;
use std::path::PathBuf;

use crate::error::SanitizeError;

/// 1ドキュメント処理の段階。遷移は一方向:
/// Load → Ocr → Redact → Cover → Save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Load,
    Ocr,
    Redact,
    Cover,
    Save,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Load => "load",
            PipelineStage::Ocr => "ocr",
            PipelineStage::Redact => "redact",
            PipelineStage::Cover => "cover",
            PipelineStage::Save => "save",
        };
        f.write_str(name)
    }
}

/// ドキュメント単位の構造化された失敗情報。
///
/// どのドキュメントがどの段階で何故失敗したかを呼び出し側に返す。
/// 失敗したドキュメントの最終出力パスにファイルは残らない。
#[derive(Debug)]
pub struct JobError {
    pub input_path: PathBuf,
    pub stage: PipelineStage,
    pub source: SanitizeError,
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} stage failed: {}",
            self.input_path.display(),
            self.stage,
            self.source
        )
    }
}

impl std::error::Error for JobError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
