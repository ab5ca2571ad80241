//! Parameter placeholder allocation.

use serde::Serialize;

/// Placeholder syntax of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderStyle {
    /// `?`
    Positional,
    /// `$1`, `$2`, …
    Dollar,
    /// `:val1`, `:val2`, …
    Named,
    /// `@p1`, `@p2`, …
    At,
}

impl PlaceholderStyle {
    /// Token for the 1-based parameter `n`.
    pub fn token(&self, n: usize) -> String {
        match self {
            PlaceholderStyle::Positional => "?".to_string(),
            PlaceholderStyle::Dollar => format!("${}", n),
            PlaceholderStyle::Named => format!(":val{}", n),
            PlaceholderStyle::At => format!("@p{}", n),
        }
    }
}

/// Hands out placeholders in parameter order.
#[derive(Debug, Clone)]
pub struct Placeholders {
    style: PlaceholderStyle,
    issued: usize,
}

impl Placeholders {
    pub fn new(style: PlaceholderStyle) -> Self {
        Self { style, issued: 0 }
    }

    pub fn next(&mut self) -> String {
        self.issued += 1;
        self.style.token(self.issued)
    }

    /// `n` consecutive placeholders joined with `,`.
    pub fn list(&mut self, n: usize) -> String {
        (0..n).map(|_| self.next()).collect::<Vec<_>>().join(",")
    }

    pub fn issued(&self) -> usize {
        self.issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_styles() {
        assert_eq!(PlaceholderStyle::Positional.token(3), "?");
        assert_eq!(PlaceholderStyle::Dollar.token(3), "$3");
        assert_eq!(PlaceholderStyle::Named.token(3), ":val3");
        assert_eq!(PlaceholderStyle::At.token(3), "@p3");
    }

    #[test]
    fn test_allocation_is_sequential() {
        let mut ph = Placeholders::new(PlaceholderStyle::Dollar);
        assert_eq!(ph.next(), "$1");
        assert_eq!(ph.list(3), "$2,$3,$4");
        assert_eq!(ph.next(), "$5");
        assert_eq!(ph.issued(), 5);
    }
}
