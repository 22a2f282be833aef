use std::io::IsTerminal;

use anstyle::{AnsiColor, Effects, Style};
use stablepin_core::ReportSink;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

/// `STABLEPIN_OUTPUT=plain|rich` wins; otherwise rich only on a terminal.
pub(crate) fn current_output_style() -> OutputStyle {
    output_style_from_env(
        std::env::var("STABLEPIN_OUTPUT").ok().as_deref(),
        std::io::stdout().is_terminal(),
    )
}

pub(crate) fn output_style_from_env(value: Option<&str>, is_terminal: bool) -> OutputStyle {
    match value.map(str::trim).map(str::to_ascii_lowercase).as_deref() {
        Some("plain") => OutputStyle::Plain,
        Some("rich") => OutputStyle::Rich,
        _ if is_terminal => OutputStyle::Rich,
        _ => OutputStyle::Plain,
    }
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct TerminalRenderer {
    style: OutputStyle,
}

impl TerminalRenderer {
    pub(crate) fn from_style(style: OutputStyle) -> Self {
        Self { style }
    }

    pub(crate) fn current() -> Self {
        Self::from_style(current_output_style())
    }

    pub(crate) fn print_status(self, status: &str, message: &str) {
        println!("{}", render_status_line(self.style, status, message));
    }

    pub(crate) fn print_report(self, title: &str, lines: &[String]) {
        for line in render_report_lines(self.style, title, lines) {
            println!("{line}");
        }
    }

    pub(crate) fn print_lines(self, lines: &[String]) {
        for line in lines {
            println!("{line}");
        }
    }
}

impl ReportSink for TerminalRenderer {
    fn status_line(&mut self, line: &str) {
        self.print_status("ok", line);
    }

    fn titled_report(&mut self, title: &str, lines: &[String]) {
        self.print_report(title, lines);
    }
}

pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => message.to_string(),
        OutputStyle::Rich => format!("{} {message}", status_badge(status)),
    }
}

fn status_badge(status: &str) -> &'static str {
    match status {
        "ok" => "[OK]",
        "warn" => "[WARN]",
        "err" => "[ERR]",
        _ => "[..]",
    }
}

pub(crate) fn render_report_lines(style: OutputStyle, title: &str, lines: &[String]) -> Vec<String> {
    let mut rendered = Vec::with_capacity(lines.len() + 1);
    match style {
        OutputStyle::Plain => {
            rendered.push(title.to_string());
            rendered.extend(lines.iter().map(|line| format!("  {line}")));
        }
        OutputStyle::Rich => {
            rendered.push(colorize(section_style(), &format!("== {title} ==")));
            rendered.extend(lines.iter().map(|line| format!("  {line}")));
        }
    }
    rendered
}

fn section_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightBlue.into()))
        .effects(Effects::BOLD)
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}
