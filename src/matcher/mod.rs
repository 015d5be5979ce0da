// フレーズ照合: 厳密一致とファジー一致の2ストラテジ

pub mod exact;
pub mod fuzzy;

pub use exact::ExactMatcher;
pub use fuzzy::{FuzzyMatcher, FuzzyOptions};

use serde::Deserialize;

use crate::ocr::Word;

/// 1フレーズ分のマッチ結果。
///
/// confidenceはトークンごとの類似度の平均。coverageはマッチした
/// フレーズトークンの割合で、完全一致なら1.0、部分一致フォール
/// バックが発動した場合のみ1.0未満になる。
#[derive(Debug, Clone)]
pub struct PhraseMatch {
    pub words: Vec<Word>,
    pub confidence: f64,
    pub coverage: f64,
}

/// フレーズ照合ストラテジの共通インターフェース。
///
/// 実装は決定的であること。マッチ同士は重ならない（走査位置は
/// 成功したマッチの直後へ進む）。
pub trait PhraseMatcher: Send + Sync {
    fn find_matches(&self, words: &[Word], phrase: &str) -> Vec<PhraseMatch>;
}

/// 設定で選択する照合モード。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// 連続トークンの厳密一致（大文字小文字は無視）。
    /// OCRが安定して読み取る短い商標文字列などに向く。
    Exact,
    /// OCRノイズを許容するファジー一致。
    Fuzzy,
}

impl MatchMode {
    /// モードに対応するマッチャーを構築する。
    pub fn build_matcher(self, options: FuzzyOptions) -> Box<dyn PhraseMatcher> {
        match self {
            MatchMode::Exact => Box::new(ExactMatcher),
            MatchMode::Fuzzy => Box::new(FuzzyMatcher::new(options)),
        }
    }
}
