use crate::matcher::{PhraseMatch, PhraseMatcher};
use crate::ocr::Word;

/// 連続トークンの厳密一致マッチャー。
///
/// フレーズを空白で分割し、OCR単語列の中から大文字小文字を無視した
/// 完全一致の連続区間を探す。成功したマッチの直後から走査を再開する
/// ため、マッチ同士は重ならない。
pub struct ExactMatcher;

impl PhraseMatcher for ExactMatcher {
    fn find_matches(&self, words: &[Word], phrase: &str) -> Vec<PhraseMatch> {
        let tokens: Vec<String> = phrase
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();

        let mut matches = Vec::new();
        if tokens.is_empty() || words.len() < tokens.len() {
            return matches;
        }

        let mut i = 0;
        while i + tokens.len() <= words.len() {
            let hit = tokens
                .iter()
                .enumerate()
                .all(|(j, token)| words[i + j].text.to_lowercase() == *token);

            if hit {
                matches.push(PhraseMatch {
                    words: words[i..i + tokens.len()].to_vec(),
                    confidence: 1.0,
                    coverage: 1.0,
                });
                // 重複マッチを避けるためマッチ区間の直後へ進む
                i += tokens.len();
            } else {
                i += 1;
            }
        }

        matches
    }
}
