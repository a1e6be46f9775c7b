//! Spacing between CJK and non-CJK runs.

/// Editor caret sentinel. Never spaced against.
pub const CARET: char = '\u{2038}';

/// Insert one space at every CJK/non-CJK boundary in `text`.
///
/// Idempotent: spacing already present suppresses further insertion.
///
/// ```
/// use lucent_render::autospace::space;
///
/// assert_eq!(space("Lute是一款Markdown引擎"), "Lute 是一款 Markdown 引擎");
/// assert_eq!(space("中文，English"), "中文，English");
/// ```
#[must_use]
pub fn space(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 8);
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        out.push(c);
        if is_han(c) && chars.get(i + 1..i + 4) == Some(&['i', 'n', 'g'][..]) {
            out.push_str("ing");
            i += 3;
        }
        if let Some(&next) = chars.get(i + 1)
            && allow_space(chars[i], next)
        {
            out.push(' ');
        }
        i += 1;
    }
    out
}

/// Whether a space belongs between `prev` and `next`.
#[must_use]
pub fn allow_space(prev: char, next: char) -> bool {
    if prev.is_whitespace()
        || next.is_whitespace()
        || prev == CARET
        || next == CARET
        || is_non_printable(prev)
        || is_non_printable(next)
    {
        return false;
    }
    // Keycap sequences such as `1️⃣`.
    if ('1'..='9').contains(&prev) && next == '\u{FE0F}' {
        return false;
    }
    let (prev_cjk, next_cjk) = (is_cjk(prev), is_cjk(next));
    if prev_cjk == next_cjk {
        return false;
    }
    if (prev_cjk && is_punctuation(next)) || (next_cjk && is_punctuation(prev)) {
        return false;
    }
    true
}

/// Han, Hiragana, Katakana, Hangul and CJK letter modifiers.
#[must_use]
pub fn is_cjk(c: char) -> bool {
    is_han(c)
        || matches!(c,
            '\u{3040}'..='\u{309F}'
            | '\u{30A0}'..='\u{30FF}'
            | '\u{31F0}'..='\u{31FF}'
            | '\u{FF66}'..='\u{FF9F}'
            | '\u{1100}'..='\u{11FF}'
            | '\u{3130}'..='\u{318F}'
            | '\u{A960}'..='\u{A97F}'
            | '\u{AC00}'..='\u{D7AF}'
            | '\u{D7B0}'..='\u{D7FF}'
            | '\u{3005}'
            | '\u{303B}')
}

fn is_han(c: char) -> bool {
    matches!(c,
        '\u{2E80}'..='\u{2FDF}'
        | '\u{3007}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{20000}'..='\u{2A6DF}'
        | '\u{2A700}'..='\u{2EBEF}'
        | '\u{2F800}'..='\u{2FA1F}')
}

/// Unicode punctuation (general category P) in the ASCII, Latin-1, general
/// and CJK blocks, excluding `%` and `@`. Symbols such as `+` or `$` do not
/// count.
fn is_punctuation(c: char) -> bool {
    matches!(c,
        '!'..='#'
        | '&'..='*'
        | ','..='/'
        | ':' | ';' | '?'
        | '['..=']'
        | '_' | '{' | '}'
        | '\u{00A1}' | '\u{00A7}' | '\u{00AB}' | '\u{00B6}' | '\u{00B7}' | '\u{00BB}' | '\u{00BF}'
        | '\u{2010}'..='\u{2027}'
        | '\u{2030}'..='\u{2043}'
        | '\u{2045}'..='\u{2051}'
        | '\u{2053}'..='\u{205E}'
        | '\u{3001}'..='\u{3003}'
        | '\u{3008}'..='\u{3011}'
        | '\u{3014}'..='\u{301F}'
        | '\u{3030}'
        | '\u{FE10}'..='\u{FE19}'
        | '\u{FE30}'..='\u{FE4F}'
        | '\u{FF01}'..='\u{FF03}'
        | '\u{FF05}'..='\u{FF0A}'
        | '\u{FF0C}'..='\u{FF0F}'
        | '\u{FF1A}' | '\u{FF1B}' | '\u{FF1F}' | '\u{FF20}'
        | '\u{FF3B}'..='\u{FF3D}'
        | '\u{FF3F}' | '\u{FF5B}' | '\u{FF5D}'
        | '\u{FF5F}'..='\u{FF65}')
}

fn is_non_printable(c: char) -> bool {
    c.is_control() || matches!(c, '\u{200B}'..='\u{200F}' | '\u{2060}'..='\u{2064}' | '\u{FEFF}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_boundaries() {
        assert_eq!(space("中文English中文"), "中文 English 中文");
        assert_eq!(space("使用2个"), "使用 2 个");
        assert_eq!(space("かなabc"), "かな abc");
        assert_eq!(space("한국어text"), "한국어 text");
    }

    #[test]
    fn test_space_is_idempotent() {
        for input in ["中文English中文", "a中b文c", "打码ing中", "50%的人", "中 文 abc"] {
            let once = space(input);
            assert_eq!(space(&once), once);
        }
    }

    #[test]
    fn test_no_space_at_caret() {
        assert_eq!(space("中\u{2038}a"), "中\u{2038}a");
        assert_eq!(space("a\u{2038}中"), "a\u{2038}中");
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(space("你好,world"), "你好,world");
        assert_eq!(space("(中文)"), "(中文)");
        assert_eq!(space("中文。English"), "中文。English");
    }

    #[test]
    fn test_percent_and_at_are_spaced() {
        assert_eq!(space("50%的人"), "50% 的人");
        assert_eq!(space("发给@bob"), "发给 @bob");
    }

    #[test]
    fn test_symbols_are_spaced() {
        assert_eq!(space("中+"), "中 +");
        assert_eq!(space("中$a"), "中 $a");
        assert_eq!(space("1<中"), "1< 中");
        assert_eq!(space("中_a"), "中_a");
    }

    #[test]
    fn test_han_ing_unit() {
        assert_eq!(space("打码ing"), "打码ing");
        assert_eq!(space("打码ing中"), "打码ing 中");
    }

    #[test]
    fn test_same_script_untouched() {
        assert_eq!(space("hello world"), "hello world");
        assert_eq!(space("中文字符"), "中文字符");
    }

    #[test]
    fn test_allow_space_keycap() {
        assert!(!allow_space('1', '\u{FE0F}'));
        assert!(!allow_space('\u{200B}', '中'));
    }
}
