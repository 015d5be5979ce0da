// ファジーフレーズ照合: OCRノイズ（文字誤認識・単語分割・余分な
// トークン）を許容してフレーズの出現位置を探す

use crate::matcher::{PhraseMatch, PhraseMatcher};
use crate::ocr::Word;

/// ファジー照合の調整パラメータ。
#[derive(Debug, Clone)]
pub struct FuzzyOptions {
    /// 2トークンを同一視する最小正規化類似度。
    pub similarity_threshold: f64,
    /// 次のフレーズトークンを探す間、一致しないOCRトークンの
    /// スキップを許可する（OCRの挿入ノイズ対策）。
    pub allow_skipped_words: bool,
    /// スキップ可能なOCRトークンの上限。
    pub max_skips: u32,
    /// 現在のOCRトークンと次のトークンを連結してフレーズトークンと
    /// 比較する（OCRが単語を割ってしまった場合の対策）。
    pub allow_partial_words: bool,
    /// 連結トークン比較の最小類似度。
    pub partial_match_threshold: f64,
}

impl Default for FuzzyOptions {
    fn default() -> Self {
        FuzzyOptions {
            similarity_threshold: 0.7,
            allow_skipped_words: true,
            max_skips: 1,
            allow_partial_words: true,
            partial_match_threshold: 0.8,
        }
    }
}

/// ページ境界などでフレーズが途切れた場合の部分一致候補。
struct PartialCandidate {
    words: Vec<Word>,
    confidence: f64,
    matched: usize,
    total: usize,
}

/// OCRノイズ許容のファジーフレーズマッチャー。
pub struct FuzzyMatcher {
    options: FuzzyOptions,
}

impl FuzzyMatcher {
    pub fn new(options: FuzzyOptions) -> Self {
        Self { options }
    }
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new(FuzzyOptions::default())
    }
}

impl PhraseMatcher for FuzzyMatcher {
    /// 各開始位置から貪欲にフレーズトークンを順に消費する。
    /// 優先順位: 単一トークンのファジー一致 → 連結トークン一致 →
    /// スキップして再試行。フレーズ全体を消費できたら、トークン
    /// ごとの類似度の平均をconfidenceとして記録する。
    ///
    /// 完全一致がページ内に1つもない場合のみ、過半数のトークンが
    /// マッチした最良の部分一致へフォールバックする（confidenceと
    /// coverageの両方が閾値を満たすことが条件）。
    fn find_matches(&self, words: &[Word], phrase: &str) -> Vec<PhraseMatch> {
        let o = &self.options;
        let tokens: Vec<String> = phrase
            .to_lowercase()
            .split_whitespace()
            .map(String::from)
            .collect();

        let mut matches: Vec<PhraseMatch> = Vec::new();
        if tokens.is_empty() || words.is_empty() {
            return matches;
        }

        let total = words.len();
        let phrase_len = tokens.len();
        let mut partials: Vec<PartialCandidate> = Vec::new();

        let mut i = 0;
        while i < total {
            let mut quality = 0.0;
            let mut matched_words: Vec<Word> = Vec::new();
            let mut phrase_idx = 0;
            let mut skipped = 0u32;

            let mut j = i;
            while j < total && phrase_idx < phrase_len {
                let current = words[j].text.to_lowercase();
                let target = &tokens[phrase_idx];
                let similarity = string_similarity(&current, target);

                if similarity >= o.similarity_threshold {
                    matched_words.push(words[j].clone());
                    quality += similarity;
                    phrase_idx += 1;
                } else if o.allow_partial_words && j + 1 < total {
                    // 分割された単語: 次のトークンと連結して比較する
                    let combined =
                        format!("{current}{}", words[j + 1].text.to_lowercase());
                    let combined_similarity = string_similarity(&combined, target);

                    if combined_similarity >= o.partial_match_threshold {
                        matched_words.push(words[j].clone());
                        matched_words.push(words[j + 1].clone());
                        quality += combined_similarity;
                        phrase_idx += 1;
                        // 連結に使った次のトークンも消費済み
                        j += 1;
                    } else if o.allow_skipped_words && skipped < o.max_skips {
                        skipped += 1;
                    } else {
                        break;
                    }
                } else if o.allow_skipped_words && skipped < o.max_skips {
                    skipped += 1;
                } else {
                    break;
                }

                j += 1;
            }

            if phrase_idx == phrase_len {
                let confidence = quality / phrase_len as f64;
                if confidence >= o.similarity_threshold {
                    let advance = matched_words.len().max(1);
                    matches.push(PhraseMatch {
                        words: matched_words,
                        confidence,
                        coverage: 1.0,
                    });
                    // 重複マッチを避けるためマッチ区間の直後へ進む
                    i += advance;
                    continue;
                }
            } else if phrase_idx * 2 > phrase_len {
                partials.push(PartialCandidate {
                    words: matched_words,
                    confidence: quality / phrase_idx as f64,
                    matched: phrase_idx,
                    total: phrase_len,
                });
            }

            i += 1;
        }

        if matches.is_empty() && !partials.is_empty() {
            // confidence × coverage で最良の部分一致を選ぶ
            partials.sort_by(|a, b| {
                let score_a = a.confidence * (a.matched as f64 / a.total as f64);
                let score_b = b.confidence * (b.matched as f64 / b.total as f64);
                score_b
                    .partial_cmp(&score_a)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let best = &partials[0];
            if best.confidence >= o.similarity_threshold
                && best.matched as f64 >= phrase_len as f64 * 0.7
            {
                matches.push(PhraseMatch {
                    words: best.words.clone(),
                    confidence: best.confidence,
                    coverage: best.matched as f64 / best.total as f64,
                });
            }
        }

        matches
    }
}

/// 正規化Levenshtein類似度: `1 - distance / max_len`。
///
/// 大文字小文字は無視する。同一文字列は1.0。
pub fn string_similarity(s1: &str, s2: &str) -> f64 {
    if s1 == s2 {
        return 1.0;
    }

    let a: Vec<char> = s1.to_lowercase().chars().collect();
    let b: Vec<char> = s2.to_lowercase().chars().collect();

    if a.is_empty() && b.is_empty() {
        return 1.0;
    }

    // 2行DPで編集距離を計算する
    let mut prev: Vec<usize> = (0..=a.len()).collect();
    let mut curr: Vec<usize> = vec![0; a.len() + 1];

    for j in 1..=b.len() {
        curr[0] = j;
        for i in 1..=a.len() {
            let substitution = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[i] = (curr[i - 1] + 1)
                .min(prev[i] + 1)
                .min(prev[i - 1] + substitution);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    let distance = prev[a.len()];
    let max_len = a.len().max(b.len());
    1.0 - distance as f64 / max_len as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similarity_of_equal_strings_is_one() {
        assert_eq!(string_similarity("datasheet", "datasheet"), 1.0);
        assert_eq!(string_similarity("Motor", "motor"), 1.0);
    }

    #[test]
    fn test_similarity_of_ocr_typo() {
        // "Adress" vs "Address": 1挿入 / 7文字
        let sim = string_similarity("Adress", "Address");
        assert!((sim - (1.0 - 1.0 / 7.0)).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_of_disjoint_strings_is_low() {
        assert!(string_similarity("omega", "fax") < 0.3);
    }

    #[test]
    fn test_similarity_with_empty_string() {
        assert_eq!(string_similarity("", ""), 1.0);
        assert_eq!(string_similarity("abc", ""), 0.0);
    }
}
