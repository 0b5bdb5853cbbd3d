// nc_loader/src/config.rs
// Loader configuration: connection, collection mapping, text properties and projection.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use csv::Terminator;
use encoding_rs::{BIG5, EUC_KR, Encoding, GB18030, GBK, SHIFT_JIS};
use serde::{Deserialize, Serialize};

use crate::error::{LoaderError, Result};
use crate::projection::FieldProjection;

/// How the source files are laid out on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
#[serde(default)]
pub struct TextProperties {
    pub line_terminator: String,
    pub encoding:        String,
    pub delimiter:       String,
}

impl Default for TextProperties {
    fn default() -> Self {
        Self {
            line_terminator: "\n".to_string(),
            encoding:        "utf-8".to_string(),
            delimiter:       ",".to_string(),
        }
    }
}

/// Validated form of [`TextProperties`], ready to configure a reader.
#[derive(Debug, Clone, Copy,)]
pub struct ReaderSettings {
    pub terminator: Terminator,
    pub delimiter:  u8,
    pub encoding:   &'static Encoding,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            terminator: Terminator::CRLF,
            delimiter:  b',',
            encoding:   encoding_rs::UTF_8,
        }
    }
}

impl TextProperties {
    pub fn reader_settings(&self,) -> Result<ReaderSettings,> {
        let settings = ReaderSettings {
            terminator: parse_terminator(&self.line_terminator,)?,
            delimiter:  parse_delimiter(&self.delimiter,)?,
            encoding:   parse_encoding(&self.encoding,)?,
        };
        let mut separators = vec![settings.delimiter];
        if let Terminator::Any(byte,) = settings.terminator {
            separators.push(byte,);
        }
        if let Some(byte,) = separators
            .into_iter()
            .find(|byte| splits_trail_bytes(settings.encoding, *byte,),)
        {
            return Err(LoaderError::ConfigurationError(format!(
                "separator {:?} can occur inside multibyte {} characters",
                char::from(byte,),
                settings.encoding.name()
            ),),);
        }
        Ok(settings,)
    }
}

/// `\n` also ends a record on `\r\n`, so a trailing `\r` never leaks into the last field.
fn parse_terminator(raw: &str,) -> Result<Terminator,> {
    match raw {
        "\n" | "\\n" | "lf" | "LF" => Ok(Terminator::CRLF,),
        "\r" | "\\r" | "cr" | "CR" => Ok(Terminator::Any(b'\r',),),
        "\r\n" | "\\r\\n" | "crlf" | "CRLF" => Ok(Terminator::CRLF,),
        other if other.len() == 1 => Ok(Terminator::Any(other.as_bytes()[0],),),
        other => Err(LoaderError::ConfigurationError(format!(
            "unsupported line terminator {:?}: use a single byte, \\n, \\r or \\r\\n",
            other
        ),),),
    }
}

fn parse_delimiter(raw: &str,) -> Result<u8,> {
    let unescaped = match raw {
        "\\t" | "tab" => "\t",
        other => other,
    };
    match unescaped.as_bytes() {
        [byte,] if *byte != b'\n' && *byte != b'\r' => Ok(*byte,),
        _ => Err(LoaderError::ConfigurationError(format!(
            "field delimiter must be a single byte, got {:?}",
            raw
        ),),),
    }
}

/// Trail bytes of these encodings overlap printable ASCII, and fields are split before
/// decoding.
fn splits_trail_bytes(encoding: &'static Encoding, byte: u8,) -> bool {
    if encoding == GB18030 && byte.is_ascii_digit() {
        return true;
    }
    [SHIFT_JIS, GBK, GB18030, BIG5, EUC_KR,].contains(&encoding,) && (0x40..=0x7e).contains(&byte,)
}

fn parse_encoding(label: &str,) -> Result<&'static Encoding,> {
    let encoding = Encoding::for_label(label.trim().as_bytes(),).ok_or_else(|| {
        LoaderError::ConfigurationError(format!("unknown character encoding '{}'", label),)
    },)?;
    // Field splitting happens on raw bytes, so the delimiter must mean the same
    // thing before and after decoding.
    if !encoding.is_ascii_compatible() {
        return Err(LoaderError::ConfigurationError(format!(
            "character encoding '{}' is not ASCII-compatible",
            encoding.name()
        ),),);
    }
    Ok(encoding,)
}

/// Full loader configuration, as read from a TOML file and overridden by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize,)]
#[serde(default)]
pub struct LoaderConfig {
    pub uri:                 Option<String,>,
    pub host:                String,
    pub port:                u16,
    pub database:            String,
    pub collections:         BTreeMap<String, PathBuf,>,
    pub clear_before_insert: bool,
    pub text:                TextProperties,
    pub include:             Vec<String,>,
    pub exclude:             Vec<String,>,
    pub batch_size:          usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            uri:                 None,
            host:                crate::DEFAULT_HOST.to_string(),
            port:                crate::DEFAULT_PORT,
            database:            crate::DEFAULT_DATABASE_NAME.to_string(),
            collections:         BTreeMap::new(),
            clear_before_insert: false,
            text:                TextProperties::default(),
            include:             Vec::new(),
            exclude:             Vec::new(),
            batch_size:          crate::DEFAULT_BATCH_SIZE,
        }
    }
}

impl LoaderConfig {
    pub fn from_toml_str(raw: &str,) -> Result<Self,> {
        toml::from_str(raw,).map_err(|e| {
            LoaderError::ConfigurationError(format!("Failed to parse configuration: {}", e),)
        },)
    }

    pub fn from_file(path: &Path,) -> Result<Self,> {
        let raw = std::fs::read_to_string(path,).map_err(|e| {
            LoaderError::ConfigurationError(format!(
                "Failed to read configuration file {}: {}",
                path.display(),
                e
            ),)
        },)?;
        Self::from_toml_str(&raw,)
    }

    /// Connection string for the database, built from host and port unless a URI is set.
    pub fn connection_uri(&self,) -> String {
        match &self.uri {
            Some(uri,) => uri.clone(),
            None => format!("mongodb://{}:{}", self.host, self.port),
        }
    }

    /// Validates everything a run needs and returns the per-run options.
    pub fn run_options(&self,) -> Result<RunOptions,> {
        if self.batch_size == 0 {
            return Err(LoaderError::ConfigurationError(
                "batch size must be greater than zero".to_string(),
            ),);
        }
        Ok(RunOptions {
            clear_before_insert: self.clear_before_insert,
            reader:              self.text.reader_settings()?,
            projection:          FieldProjection::new(self.include.clone(), self.exclude.clone(),)?,
            batch_size:          self.batch_size,
        },)
    }
}

/// Immutable options for a single ingestion run.
#[derive(Debug, Clone,)]
pub struct RunOptions {
    pub clear_before_insert: bool,
    pub reader:              ReaderSettings,
    pub projection:          FieldProjection,
    pub batch_size:          usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            clear_before_insert: false,
            reader:              ReaderSettings::default(),
            projection:          FieldProjection::All,
            batch_size:          crate::DEFAULT_BATCH_SIZE,
        }
    }
}
