use pdf_sanitize::geometry::PixelBox;
use pdf_sanitize::matcher::{
    ExactMatcher, FuzzyMatcher, FuzzyOptions, MatchMode, PhraseMatcher,
};
use pdf_sanitize::ocr::Word;

/// ヘルパー: x位置だけずらした単語を作る
fn word(text: &str, index: usize) -> Word {
    let x0 = index as f64 * 60.0;
    Word {
        text: text.to_string(),
        bbox: PixelBox {
            x0,
            y0: 100.0,
            x1: x0 + 50.0,
            y1: 120.0,
        },
        page_width: 1200.0,
        page_height: 1600.0,
    }
}

fn words(texts: &[&str]) -> Vec<Word> {
    texts.iter().enumerate().map(|(i, t)| word(t, i)).collect()
}

#[test]
fn test_exact_match_spans_all_phrase_words() {
    let page = words(&["Omega", "Motor"]);
    let matches = ExactMatcher.find_matches(&page, "Omega Motor");

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].words.len(), 2);
    assert_eq!(matches[0].words[0].text, "Omega");
    assert_eq!(matches[0].words[1].text, "Motor");
    assert_eq!(matches[0].confidence, 1.0);
    assert_eq!(matches[0].coverage, 1.0);
}

#[test]
fn test_exact_match_is_case_insensitive() {
    let page = words(&["Omega", "Motor"]);
    let matches = ExactMatcher.find_matches(&page, "omega motor");
    assert_eq!(matches.len(), 1);
}

#[test]
fn test_exact_match_rejects_different_phrase() {
    let page = words(&["Omega", "Motor"]);
    let matches = ExactMatcher.find_matches(&page, "Omega Generator");
    assert!(matches.is_empty());
}

#[test]
fn test_exact_match_does_not_overlap() {
    let page = words(&["A", "B", "A", "B"]);
    let matches = ExactMatcher.find_matches(&page, "A B");
    // 3箇所ではなく、重ならない2箇所
    assert_eq!(matches.len(), 2);
}

#[test]
fn test_fuzzy_match_tolerates_ocr_typo() {
    let page = words(&["Adress", ":", "Dudullu"]);
    let matches = FuzzyMatcher::default().find_matches(&page, "Address : Dudullu");

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].words.len(), 3);
    assert!(matches[0].confidence > 0.85);
    assert_eq!(matches[0].coverage, 1.0);
}

#[test]
fn test_fuzzy_match_does_not_overlap() {
    let page = words(&["A", "B", "A", "B"]);
    let matches = FuzzyMatcher::default().find_matches(&page, "A B");
    assert_eq!(matches.len(), 2);
}

#[test]
fn test_fuzzy_match_combines_split_words() {
    // OCRが"TECHNICAL"を2トークンに割ったケース
    let page = words(&["TECHNI", "CAL", "DATASHEET"]);
    let matches = FuzzyMatcher::default().find_matches(&page, "TECHNICAL DATASHEET");

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].words.len(), 3);
    assert_eq!(matches[0].coverage, 1.0);
}

#[test]
fn test_fuzzy_match_skips_inserted_token() {
    // OCRがフレーズの間に余分なトークンを挟んだケース
    let page = words(&["Omega", "GmbH", "Motor"]);
    let matches = FuzzyMatcher::default().find_matches(&page, "Omega Motor");

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].words.len(), 2);
    assert_eq!(matches[0].words[0].text, "Omega");
    assert_eq!(matches[0].words[1].text, "Motor");
}

#[test]
fn test_fuzzy_match_respects_max_skips() {
    let options = FuzzyOptions {
        allow_skipped_words: false,
        max_skips: 0,
        ..FuzzyOptions::default()
    };
    let page = words(&["Omega", "GmbH", "Motor"]);
    let matches = FuzzyMatcher::new(options).find_matches(&page, "Omega Motor");
    assert!(matches.is_empty());
}

#[test]
fn test_fuzzy_partial_fallback_for_truncated_phrase() {
    // ページ境界でフレーズが途切れたケース: 4トークン中3トークンのみ
    let page = words(&["alpha", "beta", "gamma"]);
    let matches = FuzzyMatcher::default().find_matches(&page, "alpha beta gamma delta");

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].words.len(), 3);
    assert!(matches[0].coverage < 1.0);
    assert!((matches[0].coverage - 0.75).abs() < 1e-9);
}

#[test]
fn test_fuzzy_partial_fallback_requires_coverage() {
    // 4トークン中2トークンでは部分一致として不十分
    let page = words(&["alpha", "beta"]);
    let matches = FuzzyMatcher::default().find_matches(&page, "alpha beta gamma delta");
    assert!(matches.is_empty());
}

#[test]
fn test_fuzzy_match_rejects_unrelated_page() {
    let page = words(&["three", "phase", "induction", "frame"]);
    let matches = FuzzyMatcher::default().find_matches(&page, "Omega Motor");
    assert!(matches.is_empty());
}

#[test]
fn test_match_mode_builds_selected_strategy() {
    let page = words(&["Adress", ":", "Dudullu"]);
    let phrase = "Address : Dudullu";

    let fuzzy = MatchMode::Fuzzy.build_matcher(FuzzyOptions::default());
    assert_eq!(fuzzy.find_matches(&page, phrase).len(), 1);

    // 厳密一致はOCRタイポを許容しない
    let exact = MatchMode::Exact.build_matcher(FuzzyOptions::default());
    assert!(exact.find_matches(&page, phrase).is_empty());
}

#[test]
fn test_matchers_are_deterministic() {
    let page = words(&["Adress", ":", "Dudullu", "Adress", ":", "Dudullu"]);
    let matcher = FuzzyMatcher::default();
    let first = matcher.find_matches(&page, "Address : Dudullu");
    let second = matcher.find_matches(&page, "Address : Dudullu");

    assert_eq!(first.len(), 2);
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(a.words, b.words);
    }
}
