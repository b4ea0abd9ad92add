//! 헤드라인 언어 판별.
//!
//! 한글 문자 포함 여부만으로 국문/영문을 구분하는 단순한 판별입니다.

/// 한글 문자인지 확인합니다 (자모 + 완성형).
pub fn is_hangul(c: char) -> bool {
    matches!(c, 'ㄱ'..='ㅎ' | 'ㅏ'..='ㅣ' | '가'..='힣')
}

/// 텍스트에 한글이 하나라도 포함되어 있는지 확인합니다.
pub fn contains_hangul(text: &str) -> bool {
    text.chars().any(is_hangul)
}

/// 원래 위치를 보존한 언어별 분리 결과.
#[derive(Debug, Default)]
pub struct LanguageSplit {
    /// 한글 헤드라인 (원본 인덱스, 텍스트)
    pub korean: Vec<(usize, String)>,
    /// 그 외 헤드라인 (원본 인덱스, 텍스트)
    pub foreign: Vec<(usize, String)>,
}

/// 헤드라인을 언어별로 나눕니다. 인덱스 맵으로 재조립이 가능합니다.
pub fn split_by_language(headlines: &[String]) -> LanguageSplit {
    let mut split = LanguageSplit::default();
    for (i, headline) in headlines.iter().enumerate() {
        if contains_hangul(headline) {
            split.korean.push((i, headline.clone()));
        } else {
            split.foreign.push((i, headline.clone()));
        }
    }
    split
}
