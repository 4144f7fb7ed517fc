//! Formatting configuration for Pep/10 source and listings.
//!
//! Based on the column layout of the Pep/10 textbook listings.

/// Formatting configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatConfig {
    /// Width of the `symbol:` column
    pub symbol_width: usize,
    /// Width of the mnemonic / dot command column
    pub mnemonic_width: usize,
    /// Width of the argument column
    pub argument_width: usize,
    /// Case of mnemonics and dot commands
    pub mnemonic_case: MnemonicCase,
    /// Object code bytes shown on each listing row
    pub bytes_per_line: usize,
}

/// Spelling of mnemonics and dot commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MnemonicCase {
    Upper,
    Lower,
}

impl MnemonicCase {
    pub fn apply(self, text: &str) -> String {
        match self {
            MnemonicCase::Upper => text.to_uppercase(),
            MnemonicCase::Lower => text.to_lowercase(),
        }
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            symbol_width: 9,
            mnemonic_width: 8,
            argument_width: 12,
            mnemonic_case: MnemonicCase::Upper,
            bytes_per_line: 3,
        }
    }
}

impl FormatConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the symbol column width
    pub fn with_symbol_width(mut self, width: usize) -> Self {
        self.symbol_width = width;
        self
    }

    /// Set the mnemonic column width
    pub fn with_mnemonic_width(mut self, width: usize) -> Self {
        self.mnemonic_width = width;
        self
    }

    /// Set the argument column width
    pub fn with_argument_width(mut self, width: usize) -> Self {
        self.argument_width = width;
        self
    }

    /// Set the mnemonic case
    pub fn with_mnemonic_case(mut self, case: MnemonicCase) -> Self {
        self.mnemonic_case = case;
        self
    }

    /// Set the number of object code bytes per listing row; zero is treated as one
    pub fn with_bytes_per_line(mut self, count: usize) -> Self {
        self.bytes_per_line = count.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // Default config tests
    // ========================================

    #[test]
    fn test_default_config_columns() {
        let config = FormatConfig::default();
        assert_eq!(config.symbol_width, 9);
        assert_eq!(config.mnemonic_width, 8);
        assert_eq!(config.argument_width, 12);
    }

    #[test]
    fn test_default_config_mnemonic_case() {
        let config = FormatConfig::default();
        assert_eq!(config.mnemonic_case, MnemonicCase::Upper);
    }

    #[test]
    fn test_default_config_bytes_per_line() {
        let config = FormatConfig::default();
        assert_eq!(config.bytes_per_line, 3);
    }

    #[test]
    fn test_new_equals_default() {
        assert_eq!(FormatConfig::new(), FormatConfig::default());
    }

    // ========================================
    // Builder method tests
    // ========================================

    #[test]
    fn test_with_symbol_width() {
        let config = FormatConfig::new().with_symbol_width(12);
        assert_eq!(config.symbol_width, 12);
        // Other fields unchanged
        assert_eq!(config.mnemonic_width, 8);
    }

    #[test]
    fn test_with_mnemonic_and_argument_width() {
        let config = FormatConfig::new().with_mnemonic_width(6).with_argument_width(20);
        assert_eq!(config.mnemonic_width, 6);
        assert_eq!(config.argument_width, 20);
    }

    #[test]
    fn test_with_mnemonic_case() {
        let config = FormatConfig::new().with_mnemonic_case(MnemonicCase::Lower);
        assert_eq!(config.mnemonic_case.apply("LDWA"), "ldwa");
    }

    #[test]
    fn test_with_bytes_per_line_zero() {
        let config = FormatConfig::new().with_bytes_per_line(0);
        assert_eq!(config.bytes_per_line, 1);
    }
}
