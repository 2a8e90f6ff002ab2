//! Fixed word sets recognised in user replies.

/// Replies that accept a proposal (compared lowercased).
pub const AFFIRMATIVE: &[&str] = &["да", "ok", "давай", "сохранить", "yes"];

/// Replies that abort the current dialogue (compared lowercased).
pub const NEGATIVE: &[&str] = &["нет", "no", "отмена", "cancel"];

/// Replies that finish category collection (compared lowercased).
pub const COMPLETION: &[&str] = &["готово", "всё", "все", "done", "finish", "finished"];

/// Relative day words and their offset from today, checked in order.
pub const RELATIVE_DAYS: &[(&str, i64)] = &[("сегодня", 0), ("завтра", 1), ("today", 0), ("tomorrow", 1)];

/// Words that mark a free-text message as a question to the secretary.
pub const QUESTION_WORDS: &[&str] = &["когда", "подскажи", "что", "где", "сколько", "запланировано"];

/// Words ignored when matching a question against task texts.
pub const STOP_WORDS: &[&str] = &["когда", "что", "где", "сколько", "запланировано", "подскажи", "у", "меня"];

fn matches(set: &[&str], input: &str) -> bool {
    let normalized = input.trim().to_lowercase();
    set.iter().any(|word| *word == normalized)
}

#[must_use]
pub fn is_affirmative(input: &str) -> bool {
    matches(AFFIRMATIVE, input)
}

#[must_use]
pub fn is_negative(input: &str) -> bool {
    matches(NEGATIVE, input)
}

#[must_use]
pub fn is_completion(input: &str) -> bool {
    matches(COMPLETION, input)
}

/// A question for the secretary: ends with `?` and contains a question word.
#[must_use]
pub fn looks_like_question(input: &str) -> bool {
    let trimmed = input.trim();
    if !trimmed.ends_with('?') {
        return false;
    }
    let lower = trimmed.to_lowercase();
    QUESTION_WORDS.iter().any(|word| lower.contains(word))
}

/// Search words of a question: longer than two characters and not stop words.
///
/// Falls back to every word when filtering leaves nothing.
#[must_use]
pub fn query_words(query: &str) -> Vec<String> {
    let words: Vec<String> = query
        .to_lowercase()
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_owned())
        .filter(|w| !w.is_empty())
        .collect();
    let filtered: Vec<String> = words
        .iter()
        .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(&w.as_str()))
        .cloned()
        .collect();
    if filtered.is_empty() { words } else { filtered }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_sets_are_case_insensitive() {
        assert!(is_affirmative(" Да "));
        assert!(is_affirmative("OK"));
        assert!(is_negative("Отмена"));
        assert!(is_completion("ГОТОВО"));
        assert!(is_completion("Всё"));
        assert!(!is_completion("готово!"));
        assert!(!is_affirmative("да, но"));
    }

    #[test]
    fn question_detection() {
        assert!(looks_like_question("Когда у меня встреча?"));
        assert!(looks_like_question("что запланировано на завтра?"));
        assert!(!looks_like_question("Когда у меня встреча"));
        assert!(!looks_like_question("Купить молоко?"));
    }

    #[test]
    fn query_words_drop_stop_words_and_short_words() {
        assert_eq!(query_words("Когда у меня встреча с врачом?"), vec!["встреча", "врачом"]);
        assert_eq!(query_words("когда что?"), vec!["когда", "что"]);
    }
}
