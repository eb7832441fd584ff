//! Console rendering helpers

pub mod table;
pub use table::Table;

const RESET: &str = "\x1b[0m";

pub fn red(text: impl std::fmt::Display) -> String {
    format!("\x1b[91m{}{}", text, RESET)
}

pub fn green(text: impl std::fmt::Display) -> String {
    format!("\x1b[92m{}{}", text, RESET)
}

pub fn blue(text: impl std::fmt::Display) -> String {
    format!("\x1b[94m{}{}", text, RESET)
}

/// Horizontal rule printed between report sections
pub fn separator() -> String {
    red("=".repeat(77))
}
