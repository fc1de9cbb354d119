//! Colored status messages for the terminal

use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

fn print_marked(mut out: impl std::io::Write, color: Color, mark: &str, msg: &str) {
    let _ = crossterm::execute!(
        out,
        SetForegroundColor(color),
        Print(mark),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a success message (green check mark)
pub fn print_success(msg: &str) {
    print_marked(std::io::stderr(), Color::Green, "✓ ", msg);
}

/// Print an error message (red cross)
pub fn print_error(msg: &str) {
    print_marked(std::io::stderr(), Color::Red, "✗ ", msg);
}

/// Print a warning message (yellow warning sign)
pub fn print_warning(msg: &str) {
    print_marked(std::io::stderr(), Color::Yellow, "⚠ ", msg);
}

/// Print an informational message (cyan info sign)
pub fn print_info(msg: &str) {
    print_marked(std::io::stderr(), Color::Cyan, "ℹ ", msg);
}
