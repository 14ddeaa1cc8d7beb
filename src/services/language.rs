//! Approximate target-language detection for the enrichment call.
//!
//! This is a cheap script heuristic, not a language-ID model: it inspects a
//! small sample for Vietnamese diacritics/keywords, then Hangul, then
//! Hiragana/Katakana, then CJK ideographs, in that priority order, and
//! defaults to English.

const SAMPLE_CHARS: usize = 400;

const VIETNAMESE_KEYWORDS: [&str; 6] = [" của ", " và ", " là ", " không ", " được ", " người "];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Language {
    Vietnamese,
    Korean,
    Japanese,
    Chinese,
    English,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Vietnamese => "vi",
            Language::Korean => "ko",
            Language::Japanese => "ja",
            Language::Chinese => "zh",
            Language::English => "en",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::Vietnamese => "Vietnamese",
            Language::Korean => "Korean",
            Language::Japanese => "Japanese",
            Language::Chinese => "Chinese",
            Language::English => "English",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "vi" => Some(Language::Vietnamese),
            "ko" => Some(Language::Korean),
            "ja" => Some(Language::Japanese),
            "zh" => Some(Language::Chinese),
            "en" => Some(Language::English),
            _ => None,
        }
    }
}

pub fn detect(content: &str) -> Language {
    let sample: String = content.chars().take(SAMPLE_CHARS).collect();
    let lower = sample.to_lowercase();

    if sample.chars().any(is_vietnamese_char)
        || VIETNAMESE_KEYWORDS.iter().any(|k| lower.contains(k))
    {
        return Language::Vietnamese;
    }
    if sample.chars().any(is_hangul) {
        return Language::Korean;
    }
    if sample.chars().any(is_kana) {
        return Language::Japanese;
    }
    if sample.chars().any(is_cjk_ideograph) {
        return Language::Chinese;
    }
    Language::English
}

/// Resolves a settings language value ("auto" or a code) to a concrete
/// language for the prompt.
pub fn resolve(target: &str, content: &str) -> Language {
    if target.trim().eq_ignore_ascii_case("auto") || target.trim().is_empty() {
        detect(content)
    } else {
        Language::from_code(target).unwrap_or(Language::English)
    }
}

fn is_vietnamese_char(c: char) -> bool {
    // tone-marked vowels and the đ/Đ pair unique to Vietnamese Latin script
    matches!(c,
        'ạ'..='ỹ' | 'đ' | 'Đ' | 'ă' | 'Ă' | 'ơ' | 'Ơ' | 'ư' | 'Ư' | 'ề' | 'ế' | 'ầ' | 'ấ'
    )
}

fn is_hangul(c: char) -> bool {
    matches!(c, '\u{AC00}'..='\u{D7AF}' | '\u{1100}'..='\u{11FF}')
}

fn is_kana(c: char) -> bool {
    matches!(c, '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}')
}

fn is_cjk_ideograph(c: char) -> bool {
    matches!(c, '\u{4E00}'..='\u{9FFF}')
}
