//! Output formatting utilities for the CLI.

use comfy_table::{presets, Attribute, Cell, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;

const SPINNER_TEMPLATE: &str = "[{elapsed_precise}] {spinner:.green} {msg}";
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&result.to_json()).unwrap_or_default());
    } else {
        println!("{}", result.to_human());
    }
}

/// A table with bold headers and the UTF-8 preset.
pub fn table<const N: usize>(headers: [&str; N]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.map(|h| Cell::new(h).add_attribute(Attribute::Bold)));
    table
}

/// Spinner for a long-running step. Hidden in JSON mode.
pub fn spinner(message: impl Into<String>, json_mode: bool) -> ProgressBar {
    if json_mode {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template(SPINNER_TEMPLATE) {
        spinner.set_style(style.tick_chars(SPINNER_CHARS));
    }
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Greeting {
        text: String,
    }

    impl CommandOutput for Greeting {
        fn to_human(&self) -> String {
            self.text.clone()
        }
    }

    #[test]
    fn test_default_json_uses_serialize() {
        let greeting = Greeting { text: "box box".to_string() };
        assert_eq!(greeting.to_json(), serde_json::json!({"text": "box box"}));
    }

    #[test]
    fn test_table_renders_headers_and_rows() {
        let mut t = table(["Round", "Race"]);
        t.add_row(vec!["1", "Bahrain Grand Prix"]);
        let rendered = t.to_string();
        assert!(rendered.contains("Round"));
        assert!(rendered.contains("Bahrain Grand Prix"));
    }
}
