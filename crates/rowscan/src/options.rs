use super::DecodeMode;
use rowscan_core::extension::TomlTableExt;
use toml::Table;

/// Options for scanning rows.
///
/// The options can be loaded from the `[scan]` table of a configuration file:
///
/// ```toml
/// [scan]
/// lenient = true
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Tolerates columns and fields that do not match. Defaults to `false`.
    pub lenient: bool,
}

impl ScanOptions {
    /// Creates a new instance with the default settings.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether decoding should be lenient.
    #[inline]
    pub fn with_lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    /// Reads the options from the `[scan]` table of the config,
    /// falling back to the defaults for missing entries.
    pub fn from_config(config: &Table) -> Self {
        let mut options = Self::default();
        if let Some(scan) = config.get_table("scan") {
            if let Some(lenient) = scan.get_bool("lenient") {
                options.lenient = lenient;
            }
        }
        options
    }

    /// Returns the decode mode.
    #[inline]
    pub fn decode_mode(&self) -> DecodeMode {
        if self.lenient {
            DecodeMode::Lenient
        } else {
            DecodeMode::Strict
        }
    }
}
