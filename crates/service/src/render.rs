//! Menu renderers: store contents in, [`Message`] out.
//!
//! Every function here is pure. Callers load the records (already owner
//! scoped) and pass them in; nothing is written back.

use chrono::{FixedOffset, NaiveTime};
use planbot_core::constants::INBOX_PREVIEW_CHARS;
use planbot_core::dates::{month_abbrev, month_name_ru};
use planbot_core::json_utils::preview;
use planbot_core::{
    Category, DailyStat, InboxNote, KeyResult, Objective, OkrBranch, Quarter, Stage, Task, TaskLevel,
    WeekTarget, average_progress, progress_dot,
};

use crate::callback::{Callback, DayChoice};
use crate::message::{Button, Message};

const STAGE_BUTTON_CHARS: usize = 24;

fn button(label: impl Into<String>, callback: Callback) -> Button {
    Button::new(label, &callback)
}

const fn toggle_label(done: bool) -> &'static str {
    if done { "↩️" } else { "☑️" }
}

/// Day-level tasks due today, numbered in store order.
pub fn today_view(tasks: &[Task]) -> Message {
    let mut rows: Vec<Vec<Button>> = tasks
        .iter()
        .map(|t| {
            vec![
                button("✏️", Callback::TodayEdit(t.id)),
                button(toggle_label(t.done), Callback::TodayToggle(t.id)),
            ]
        })
        .collect();
    rows.push(vec![button("➕ Добавить", Callback::TodayAdd), button("🔄 Обновить", Callback::TodayRefresh)]);

    let text = if tasks.is_empty() {
        "Сегодня пока нет задач. Добавь первую!".to_owned()
    } else {
        let lines: Vec<String> = tasks
            .iter()
            .enumerate()
            .map(|(i, t)| format!("{} {}. {}", if t.done { "✅" } else { "🔸" }, i + 1, t.text))
            .collect();
        format!("📅 Задачи на сегодня:\n{}", lines.join("\n"))
    };
    Message::inline(text, rows)
}

/// Week-level tasks of the current week plus the week's targets.
pub fn week_view(tasks: &[Task], targets: &[WeekTarget]) -> Message {
    let mut rows: Vec<Vec<Button>> = tasks
        .iter()
        .map(|t| {
            vec![
                button("📤 На день", Callback::WeekPush(t.id)),
                button(toggle_label(t.done), Callback::WeekToggle(t.id)),
            ]
        })
        .collect();
    rows.push(vec![
        button("➕ Добавить", Callback::WeekAdd),
        button("↪️ След. нед", Callback::WeekMoveNext),
        button("🔄 Обновить", Callback::WeekRefresh),
    ]);

    let mut text = if tasks.is_empty() {
        "На этой неделе пока нет задач. Добавь первую!".to_owned()
    } else {
        format!("Спринт недели:\n{}", numbered_by_id(tasks))
    };
    if !targets.is_empty() {
        let lines: Vec<String> = targets.iter().map(|w| format!("• {}", w.title)).collect();
        text.push_str(&format!("\n\n🎯 Цели недели:\n{}", lines.join("\n")));
    }
    Message::inline(text, rows)
}

fn numbered_by_id(tasks: &[Task]) -> String {
    tasks
        .iter()
        .map(|t| format!("{} {}: {}", if t.done { "✅" } else { "▫️" }, t.id, t.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Stages of one month grouped under their goal, then month-level tasks.
pub fn month_view(month: u32, stages: &[Stage], goals: &[Objective], tasks: &[Task]) -> Message {
    let name = month_name_ru(month);
    let mut text = if stages.is_empty() {
        format!("📆 {name}: пока нет этапов.\nНажми ➕ чтобы добавить.")
    } else {
        let mut goal_order: Vec<i64> = Vec::new();
        for stage in stages {
            if !goal_order.contains(&stage.goal_id) {
                goal_order.push(stage.goal_id);
            }
        }
        let mut lines = Vec::new();
        for goal_id in goal_order {
            let title = goals.iter().find(|g| g.id == goal_id).map_or("Без цели", |g| g.title.as_str());
            lines.push(format!("🎯 {title}"));
            lines.extend(
                stages.iter().filter(|s| s.goal_id == goal_id).map(|s| format!("   • {}", s.title)),
            );
        }
        format!("📆 {name}:\n{}", lines.join("\n"))
    };
    if !tasks.is_empty() {
        text.push_str(&format!("\n\nЗадачи месяца:\n{}", numbered_by_id(tasks)));
    }

    let mut rows: Vec<Vec<Button>> = tasks
        .iter()
        .map(|t| {
            vec![
                button("📤 На неделю", Callback::MonthPush(t.id)),
                button(toggle_label(t.done), Callback::MonthToggle(t.id)),
            ]
        })
        .collect();
    rows.extend(stages.iter().map(|s| {
        vec![button(
            format!("➕ Неделя: {}", preview(&s.title, STAGE_BUTTON_CHARS)),
            Callback::WeekTargetAdd(s.id),
        )]
    }));
    rows.push(vec![button("➕ Этап", Callback::MonthAddStage), button("➕ Задача", Callback::MonthAdd)]);
    rows.push(vec![button("🔄 Обновить", Callback::MonthRefresh)]);
    Message::inline(text, rows)
}

/// Button label of an objective: progress dot, title, deadline, average progress.
pub fn objective_label(branch: &OkrBranch) -> String {
    let objective = &branch.objective;
    let core = match objective.due {
        Some(due) => format!("{}  ⏳{due}", objective.title),
        None => objective.title.clone(),
    };
    match average_progress(&branch.key_results) {
        Some(avg) => format!("{} {core}  [{avg}%]", progress_dot(avg)),
        None => core,
    }
}

pub fn goals_view(branches: &[OkrBranch]) -> Message {
    let mut rows: Vec<Vec<Button>> = branches
        .iter()
        .map(|b| {
            vec![
                button(objective_label(b), Callback::OkrObjective(b.objective.id)),
                button("➕ Этап", Callback::GoalAddStage(b.objective.id)),
            ]
        })
        .collect();
    rows.push(vec![button("➕ Новая цель", Callback::OkrAddGoal)]);
    let text = if branches.is_empty() { "У тебя пока нет целей. Добавь первую!" } else { "🎯 Твои цели:" };
    Message::inline(text, rows)
}

pub fn quarters_view(objective: &Objective) -> Message {
    let due = objective.due.map_or_else(|| "—".to_owned(), |d| d.to_string());
    let quarters = Quarter::ALL
        .iter()
        .map(|&quarter| {
            button(
                format!("{} кв", quarter.roman()),
                Callback::OkrQuarter { objective: objective.id, quarter },
            )
        })
        .collect();
    Message::inline(
        format!("Цель: {}\nСрок: ⏳{due}\n\nВыбери квартал:", objective.title),
        vec![
            quarters,
            vec![button("📅 Срок", Callback::OkrDue(objective.id))],
            vec![button("⬅️ Назад", Callback::OkrBack)],
        ],
    )
}

/// Key results of one objective and quarter; `objective` is `None` when it is gone.
pub fn key_results_view(
    objective_id: i64,
    objective: Option<&Objective>,
    quarter: Quarter,
    krs: &[KeyResult],
) -> Message {
    let Some(objective) = objective else {
        return Message::inline("Цель не найдена.", vec![vec![button("⬅️ Назад", Callback::OkrBack)]]);
    };
    let mut rows: Vec<Vec<Button>> = krs
        .iter()
        .map(|kr| {
            vec![
                button("+10%", Callback::KrStep { kr: kr.id, delta: 10 }),
                button("-10%", Callback::KrStep { kr: kr.id, delta: -10 }),
                button("✏️", Callback::KrProgress(kr.id)),
                button("📌", Callback::KrPin(kr.id)),
            ]
        })
        .collect();
    rows.push(vec![
        button("➕ Новый КР", Callback::KrAdd { objective: objective_id, quarter }),
        button("⬅️ К кварталам", Callback::OkrObjective(objective_id)),
    ]);

    let text = if krs.is_empty() {
        format!("Нет КР для цели «{}», квартал {quarter}.", objective.title)
    } else {
        let lines: Vec<String> = krs
            .iter()
            .map(|kr| format!("{} {}  [{}%]", progress_dot(kr.progress), kr.title, kr.progress))
            .collect();
        format!(
            "Ключевые результаты для цели:\n«{}»\nКвартал: {quarter}\n\n{}",
            objective.title,
            lines.join("\n")
        )
    };
    Message::inline(text, rows)
}

pub fn pin_level_picker(kr: &KeyResult) -> Message {
    Message::inline(
        format!("Куда добавить задачу из КР «{}»?", kr.title),
        vec![
            vec![
                button("📆 В месяц", Callback::KrPinLevel { kr: kr.id, level: TaskLevel::Month }),
                button("🗓 В неделю", Callback::KrPinLevel { kr: kr.id, level: TaskLevel::Week }),
                button("📋 На день", Callback::KrPinLevel { kr: kr.id, level: TaskLevel::Day }),
            ],
            vec![button("⬅️ Отмена", Callback::OkrBack)],
        ],
    )
}

/// Non-archived notes, one button each.
pub fn inbox_view(notes: &[InboxNote]) -> Message {
    let visible: Vec<&InboxNote> = notes.iter().filter(|n| !n.archived).collect();
    let mut rows: Vec<Vec<Button>> = visible
        .iter()
        .map(|n| {
            let label = if n.text.is_empty() { "(пусто)".to_owned() } else { preview(&n.text, INBOX_PREVIEW_CHARS) };
            vec![button(label, Callback::InboxNote(n.id))]
        })
        .collect();
    rows.push(vec![button("➕ Добавить", Callback::InboxAdd)]);
    let text = if visible.is_empty() {
        "Инбокс пуст.\nДобавь идею, мысль или план — позже их можно будет превратить в цель или задачу!"
    } else {
        "🔔 Инбокс — идеи, мысли и планы.\nПозже ты сможешь превратить запись в цель или задачу:"
    };
    Message::inline(text, rows)
}

pub fn note_view(note_id: i64, note: Option<&InboxNote>, offset: FixedOffset) -> Message {
    let text = note.map_or_else(
        || "Запись не найдена.".to_owned(),
        |n| {
            let ts = n.created_at.with_timezone(&offset).format("%Y-%m-%d %H:%M");
            format!("🗒 Идея (ID {note_id})\n«{}»\n\n⏱ {ts}", n.text)
        },
    );
    Message::inline(
        text,
        vec![
            vec![
                button("✏️ Изменить", Callback::InboxEdit(note_id)),
                button("🎯 В цель", Callback::InboxGoal(note_id)),
            ],
            vec![
                button("🗓 В задачу", Callback::InboxTask(note_id)),
                button("🗄 Архив", Callback::InboxArchive(note_id)),
            ],
            vec![button("⬅️ Назад", Callback::InboxBack)],
        ],
    )
}

pub fn note_day_picker(note_id: i64) -> Message {
    Message::inline(
        "На какой день поставить задачу?",
        vec![
            vec![
                button("Завтра", Callback::TaskDay { note: note_id, choice: DayChoice::Tomorrow }),
                button("📅 Дата…", Callback::TaskDay { note: note_id, choice: DayChoice::Ask }),
            ],
            vec![button("⬅️ Назад", Callback::InboxNote(note_id))],
        ],
    )
}

pub fn stats_root() -> Message {
    Message::inline(
        "📊 Статистика:",
        vec![vec![button("📆 Сегодня", Callback::StatsToday)], vec![button("⬅️ Назад", Callback::StatsBack)]],
    )
}

pub fn stats_today(stat: &DailyStat) -> Message {
    Message::inline(
        format!(
            "📆 Сегодня\nЗадач всего: {}\nВыполнено:   {}\nПроцент дня:  {}%",
            stat.total,
            stat.done,
            stat.percent()
        ),
        vec![vec![button("⬅️ Назад", Callback::StatsBack)]],
    )
}

pub fn settings_view(digest_enabled: bool) -> Message {
    let (state, action) = if digest_enabled { ("включено", "Выключить") } else { ("выключено", "Включить") };
    Message::inline(
        format!("🔔 Вечернее напоминание об инбоксе: {state}"),
        vec![vec![button(action, Callback::SettingsDigest)]],
    )
}

/// Twelve month buttons, four per row, then `✅ Готово`.
pub fn month_picker() -> Message {
    let mut rows: Vec<Vec<Button>> = (1..=12_u32)
        .collect::<Vec<_>>()
        .chunks(4)
        .map(|chunk| chunk.iter().map(|&m| button(month_abbrev(m), Callback::StageMonth(m))).collect())
        .collect();
    rows.push(vec![button("✅ Готово", Callback::StageMonthDone)]);
    Message::inline("Выберите месяц:", rows)
}

pub fn stage_added(title: &str, month: u32, goal_id: i64) -> Message {
    Message::inline(
        format!("Этап «{title}» добавлен на {}.\nДобавить ещё этап к этой цели?", month_name_ru(month)),
        vec![
            vec![button("➕ Да", Callback::GoalAddStage(goal_id))],
            vec![button("✅ Готово", Callback::StageMonthDone)],
        ],
    )
}

pub fn stage_goal_picker(objectives: &[Objective]) -> Message {
    let mut rows: Vec<Vec<Button>> =
        objectives.iter().map(|g| vec![button(g.title.clone(), Callback::StageGoal(g.id))]).collect();
    rows.push(vec![button("⬅️ Отмена", Callback::MonthRefresh)]);
    Message::inline("К какой цели добавить этап?", rows)
}

pub fn category_picker(categories: &[Category]) -> Message {
    let mut rows: Vec<Vec<Button>> = categories
        .iter()
        .map(|c| vec![button(c.title.clone(), Callback::ChooseCategory(Some(c.id)))])
        .collect();
    rows.push(vec![button("Без категории", Callback::ChooseCategory(None))]);
    Message::inline("Выбери категорию для новой задачи:", rows)
}

/// Confirmation after a timed task was added, offering to link it to a goal.
pub fn task_added(task_id: i64, start: NaiveTime, duration: u32) -> Message {
    Message::inline(
        format!(
            "Задача добавлена! Время старта: {}, длительность: {duration} минут.\nПривязать её к одной из целей?",
            start.format("%H:%M")
        ),
        vec![vec![button("Нет", Callback::LinkSkip), button("Выбрать цель", Callback::LinkChooseGoal(task_id))]],
    )
}

pub fn link_goal_picker(task_id: i64, objectives: &[Objective]) -> Message {
    let mut rows: Vec<Vec<Button>> = objectives
        .iter()
        .map(|g| vec![button(g.title.clone(), Callback::LinkGoal { task: task_id, goal: g.id })])
        .collect();
    if rows.is_empty() {
        rows.push(vec![button("Нет целей", Callback::LinkSkip)]);
    }
    rows.push(vec![button("⬅️ Отмена", Callback::LinkSkip)]);
    Message::inline("Выбери цель:", rows)
}

pub fn start_reminder(task_id: i64, title: &str) -> Message {
    Message::inline(
        format!("⏰ Время начать задачу «{title}»"),
        vec![
            vec![button("✅ Начал", Callback::TaskStartOk(task_id))],
            vec![button("⏰ Отложить", Callback::TaskStartSnooze(task_id))],
        ],
    )
}

pub fn end_reminder(task_id: i64, title: &str) -> Message {
    Message::inline(
        format!("🕑 Подходит время завершить задачу «{title}»"),
        vec![
            vec![button("✅ Завершил", Callback::TaskEndOk(task_id))],
            vec![button("⏰ Отложить", Callback::TaskEndSnooze(task_id))],
        ],
    )
}

pub fn inbox_digest(count: usize) -> Message {
    Message::text(format!(
        "🔔 Сегодня появилось {count} новых заметок в Инбоксе.\nПодумай, нужно ли превратить их в цели или задачи!"
    ))
}
