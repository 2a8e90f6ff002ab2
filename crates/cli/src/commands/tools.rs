use anyhow::{Result, bail};
use chrono::NaiveDate;
use planbot_core::dates::due_within_year;
use planbot_core::{extract_slot, parse_due};

pub(crate) fn run_slot(text: &str, today: NaiveDate) -> Result<()> {
    match extract_slot(text, today) {
        Some(slot) => println!("{}", serde_json::to_string_pretty(&slot)?),
        None => println!("No slot found"),
    }
    Ok(())
}

pub(crate) fn run_due(input: &str, today: NaiveDate) -> Result<()> {
    let Some(due) = parse_due(input) else {
        bail!("not a deadline: {input} (expected Qn-YYYY or DD.MM.YYYY)");
    };
    let report = serde_json::json!({
        "due": due,
        "within_year": due_within_year(&due, today),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
