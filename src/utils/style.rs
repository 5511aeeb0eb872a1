use colored::Colorize;

/// How terminal text should be decorated. Passed explicitly to every formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStyle {
    #[default]
    Color,
    Plain,
}

impl OutputStyle {
    pub fn from_flag(no_color: bool) -> Self {
        if no_color {
            OutputStyle::Plain
        } else {
            OutputStyle::Color
        }
    }
}

pub fn bold(text: &str, style: OutputStyle) -> String {
    match style {
        OutputStyle::Color => text.bold().to_string(),
        OutputStyle::Plain => text.to_string(),
    }
}

pub fn heading(text: &str, style: OutputStyle) -> String {
    match style {
        OutputStyle::Color => text.yellow().to_string(),
        OutputStyle::Plain => text.to_string(),
    }
}

pub fn accent(text: &str, style: OutputStyle) -> String {
    match style {
        OutputStyle::Color => text.cyan().to_string(),
        OutputStyle::Plain => text.to_string(),
    }
}

pub fn muted(text: &str, style: OutputStyle) -> String {
    match style {
        OutputStyle::Color => text.bright_black().to_string(),
        OutputStyle::Plain => text.to_string(),
    }
}

pub fn processing_marker(style: OutputStyle) -> String {
    match style {
        OutputStyle::Color => "[+]".bright_blue().to_string(),
        OutputStyle::Plain => "[+]".to_string(),
    }
}

pub fn warning_marker(style: OutputStyle) -> String {
    match style {
        OutputStyle::Color => "[!]".yellow().bold().to_string(),
        OutputStyle::Plain => "[!]".to_string(),
    }
}

pub fn error_marker(style: OutputStyle) -> String {
    match style {
        OutputStyle::Color => "[x]".red().bold().to_string(),
        OutputStyle::Plain => "[x]".to_string(),
    }
}
