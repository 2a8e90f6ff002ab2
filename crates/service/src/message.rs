//! Transport-neutral outgoing message model.

use serde::{Deserialize, Serialize};

use crate::callback::Callback;

/// Inline button: visible label plus the opaque payload sent back on press.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub payload: String,
}

impl Button {
    pub fn new(label: impl Into<String>, callback: &Callback) -> Self {
        Self { label: label.into(), payload: callback.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "rows", rename_all = "snake_case")]
pub enum Keyboard {
    /// Buttons attached to the message itself.
    Inline(Vec<Vec<Button>>),
    /// Persistent reply keyboard; pressing a label sends it as text.
    Reply(Vec<Vec<String>>),
    /// Hide a previously shown reply keyboard.
    Remove,
}

impl Keyboard {
    /// All inline buttons in row order; empty for reply keyboards.
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        let rows: &[Vec<Button>] = match self {
            Self::Inline(rows) => rows,
            Self::Reply(_) | Self::Remove => &[],
        };
        rows.iter().flatten()
    }

    fn reply(rows: &[&[&str]]) -> Self {
        Self::Reply(rows.iter().map(|row| row.iter().map(|l| (*l).to_owned()).collect()).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<Keyboard>,
}

impl Message {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), keyboard: None }
    }

    pub fn inline(text: impl Into<String>, rows: Vec<Vec<Button>>) -> Self {
        Self { text: text.into(), keyboard: Some(Keyboard::Inline(rows)) }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self { text: text.into(), keyboard: Some(keyboard) }
    }

    /// Payloads of every inline button, handy for assertions and console output.
    pub fn payloads(&self) -> Vec<&str> {
        self.keyboard
            .iter()
            .flat_map(Keyboard::buttons)
            .map(|b| b.payload.as_str())
            .collect()
    }
}

pub const LABEL_TODAY: &str = "📋 Сегодня";
pub const LABEL_INBOX: &str = "🔔 Инбокс";
pub const LABEL_WEEK: &str = "🗓 Неделя";
pub const LABEL_MONTH: &str = "📆 Месяц";
pub const LABEL_FULL_MENU: &str = "💼 Меню";
pub const LABEL_SECRETARY: &str = "🤖 Секретарь";
pub const LABEL_GOALS: &str = "🎯 Цели";
pub const LABEL_STATS: &str = "📊 Статистика";
pub const LABEL_SETTINGS: &str = "⚙️ Настройки";
pub const LABEL_COLLAPSE: &str = "⬅️ Свернуть";
pub const LABEL_BACK_TO_MENU: &str = "⬅️ В меню";

/// Compact two-column reply keyboard shown after `/start`.
pub fn quick_menu() -> Keyboard {
    Keyboard::reply(&[
        &[LABEL_TODAY, LABEL_INBOX],
        &[LABEL_WEEK, LABEL_MONTH],
        &[LABEL_FULL_MENU, LABEL_SECRETARY],
    ])
}

/// Expanded menu behind `💼 Меню`.
pub fn main_menu() -> Keyboard {
    Keyboard::reply(&[&[LABEL_GOALS, LABEL_STATS], &[LABEL_SETTINGS, LABEL_COLLAPSE]])
}

pub fn settings_menu() -> Keyboard {
    Keyboard::reply(&[&[LABEL_BACK_TO_MENU]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_serializes_with_type_tag() {
        let msg = Message::inline("x", vec![vec![Button::new("🔄 Обновить", &Callback::TodayRefresh)]]);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["keyboard"]["type"], "inline");
        assert_eq!(json["keyboard"]["rows"][0][0]["payload"], "today_refresh");

        let plain = serde_json::to_value(Message::text("hi")).unwrap();
        assert!(plain.get("keyboard").is_none());
    }

    #[test]
    fn quick_menu_layout() {
        let Keyboard::Reply(rows) = quick_menu() else { panic!("reply keyboard expected") };
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], vec![LABEL_FULL_MENU.to_owned(), LABEL_SECRETARY.to_owned()]);
    }
}
