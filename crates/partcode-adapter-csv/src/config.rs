//! CSV configuration options

/// Configuration for CSV reading and writing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvConfig {
    /// Field delimiter character (default: comma)
    pub delimiter: char,
    /// Quote character for fields containing special characters (default: double quote)
    pub quote_char: char,
    /// Trim whitespace around headers and cells on read (default: true)
    pub trim: bool,
    /// Encodings tried in order on read
    pub encodings: Vec<Encoding>,
    /// Prefix written files with a UTF-8 byte order mark (default: true)
    pub write_bom: bool,
    /// Record terminator (default: CRLF for writing)
    pub record_terminator: RecordTerminator,
}

/// Text encodings of hand-maintained input files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// UTF-8 without a byte order mark
    Utf8,
    /// UTF-8 starting with a byte order mark, as spreadsheet tools save it
    Utf8Bom,
    /// Korean legacy encoding; the WHATWG EUC-KR decoder also covers CP949
    EucKr,
    /// Latin-1 (decoded as windows-1252); accepts any byte sequence
    Latin1,
}

impl Encoding {
    /// Default read order: UTF-8, UTF-8 with BOM, Korean legacy, Latin-1
    pub const FALLBACK_ORDER: [Encoding; 4] = [
        Encoding::Utf8,
        Encoding::Utf8Bom,
        Encoding::EucKr,
        Encoding::Latin1,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Utf8Bom => "utf-8-sig",
            Encoding::EucKr => "euc-kr",
            Encoding::Latin1 => "latin-1",
        }
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record terminator for writing CSV
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordTerminator {
    /// CRLF (Windows-style, default for RFC 4180)
    CRLF,
    /// LF (Unix-style)
    LF,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote_char: '"',
            trim: true,
            encodings: Encoding::FALLBACK_ORDER.to_vec(),
            write_bom: true,
            record_terminator: RecordTerminator::CRLF,
        }
    }
}

impl CsvConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delimiter character
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the quote character
    pub fn quote_char(mut self, quote_char: char) -> Self {
        self.quote_char = quote_char;
        self
    }

    /// Configure whitespace trimming on read
    pub fn trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Replace the read encoding order
    pub fn encodings(mut self, encodings: impl IntoIterator<Item = Encoding>) -> Self {
        self.encodings = encodings.into_iter().collect();
        self
    }

    /// Configure the byte order mark on write
    pub fn write_bom(mut self, write_bom: bool) -> Self {
        self.write_bom = write_bom;
        self
    }

    /// Set record terminator
    pub fn record_terminator(mut self, terminator: RecordTerminator) -> Self {
        self.record_terminator = terminator;
        self
    }

    /// Convert delimiter to u8 for csv crate
    pub fn delimiter_u8(&self) -> u8 {
        self.delimiter as u8
    }

    /// Convert quote char to u8 for csv crate
    pub fn quote_char_u8(&self) -> u8 {
        self.quote_char as u8
    }

    /// Terminator setting for `csv::WriterBuilder`
    pub fn terminator(&self) -> csv::Terminator {
        match self.record_terminator {
            RecordTerminator::CRLF => csv::Terminator::CRLF,
            RecordTerminator::LF => csv::Terminator::Any(b'\n'),
        }
    }

    /// Reader builder carrying this configuration
    pub fn reader_builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .delimiter(self.delimiter_u8())
            .quote(self.quote_char_u8())
            .has_headers(true)
            .flexible(true)
            .trim(if self.trim { csv::Trim::All } else { csv::Trim::None });
        builder
    }

    /// Writer builder carrying this configuration
    pub fn writer_builder(&self) -> csv::WriterBuilder {
        let mut builder = csv::WriterBuilder::new();
        builder
            .delimiter(self.delimiter_u8())
            .quote(self.quote_char_u8())
            .terminator(self.terminator());
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CsvConfig::default();
        assert_eq!(config.delimiter, ',');
        assert_eq!(config.quote_char, '"');
        assert!(config.trim);
        assert!(config.write_bom);
        assert_eq!(config.encodings, Encoding::FALLBACK_ORDER.to_vec());
        assert_eq!(config.record_terminator, RecordTerminator::CRLF);
    }

    #[test]
    fn test_config_builder() {
        let config = CsvConfig::new()
            .delimiter(';')
            .quote_char('\'')
            .trim(false)
            .encodings([Encoding::EucKr])
            .write_bom(false)
            .record_terminator(RecordTerminator::LF);

        assert_eq!(config.delimiter_u8(), b';');
        assert_eq!(config.quote_char_u8(), b'\'');
        assert!(!config.trim);
        assert_eq!(config.encodings, vec![Encoding::EucKr]);
        assert!(!config.write_bom);
        assert!(matches!(config.terminator(), csv::Terminator::Any(b'\n')));
    }

    #[test]
    fn test_encoding_names() {
        assert_eq!(Encoding::Utf8Bom.to_string(), "utf-8-sig");
        assert_eq!(Encoding::Latin1.as_str(), "latin-1");
    }
}
