// nc_loader/tests/config_tests.rs

use std::path::PathBuf;

use csv::Terminator;
use nc_loader::config::{LoaderConfig, RunOptions, TextProperties};
use nc_loader::error::LoaderError;
use nc_loader::projection::FieldProjection;

#[test]
fn defaults_match_documented_values() {
    let config = LoaderConfig::default();
    assert_eq!(config.batch_size, 10_000);
    assert_eq!(config.connection_uri(), "mongodb://localhost:27017");
    assert!(!config.clear_before_insert);

    let settings = config.text.reader_settings().unwrap();
    assert_eq!(settings.delimiter, b',');
    assert_eq!(settings.terminator, Terminator::CRLF);
    assert_eq!(RunOptions::default().reader.terminator, Terminator::CRLF);
    assert_eq!(settings.encoding, encoding_rs::UTF_8);
}

#[test]
fn parses_a_full_toml_file() {
    let raw = r#"
        host = "db.internal"
        port = 27018
        database = "warehouse"
        clear_before_insert = true
        batch_size = 2500
        exclude = ["ssn"]

        [collections]
        customers = "data/customers.tsv"
        orders = "data/orders.tsv"

        [text]
        delimiter = "\t"
        encoding = "windows-1252"
        line_terminator = "crlf"
    "#;
    let config = LoaderConfig::from_toml_str(raw,).unwrap();

    assert_eq!(config.connection_uri(), "mongodb://db.internal:27018");
    assert_eq!(config.database, "warehouse");
    assert_eq!(
        config.collections.get("orders"),
        Some(&PathBuf::from("data/orders.tsv"))
    );

    let options = config.run_options().unwrap();
    assert!(options.clear_before_insert);
    assert_eq!(options.batch_size, 2500);
    assert_eq!(options.projection, FieldProjection::Exclude(vec!["ssn".to_string()]));
    assert_eq!(options.reader.delimiter, b'\t');
    assert_eq!(options.reader.terminator, Terminator::CRLF);
    assert_eq!(options.reader.encoding.name(), "windows-1252");
}

#[test]
fn explicit_uri_wins_over_host_and_port() {
    let config =
        LoaderConfig::from_toml_str("uri = \"mongodb://user@replica/?replicaSet=rs0\"\nport = 1",)
            .unwrap();
    assert_eq!(config.connection_uri(), "mongodb://user@replica/?replicaSet=rs0");
}

#[test]
fn include_and_exclude_in_one_file_are_rejected() {
    let config = LoaderConfig::from_toml_str("include = [\"id\"]\nexclude = [\"name\"]",).unwrap();
    assert!(matches!(
        config.run_options(),
        Err(LoaderError::ConfigurationError(_))
    ));
}

#[test]
fn invalid_text_properties_are_configuration_errors() {
    let cases = [
        TextProperties {
            delimiter: "::".to_string(),
            ..TextProperties::default()
        },
        TextProperties {
            encoding: "klingon".to_string(),
            ..TextProperties::default()
        },
        TextProperties {
            encoding: "utf-16le".to_string(),
            ..TextProperties::default()
        },
        TextProperties {
            line_terminator: "\n\n".to_string(),
            ..TextProperties::default()
        },
    ];
    for text in cases {
        assert!(
            matches!(text.reader_settings(), Err(LoaderError::ConfigurationError(_))),
            "{text:?} should be rejected"
        );
    }
}

#[test]
fn multibyte_encodings_reject_separators_inside_their_trail_bytes() {
    for (encoding, delimiter, line_terminator,) in [
        ("shift_jis", "|", "\n",),
        ("gbk", "\\", "\n",),
        ("big5", "~", "\n",),
        ("euc-kr", "a", "\n",),
        ("gb18030", "5", "\n",),
        ("shift_jis", ",", "@",),
    ] {
        let text = TextProperties {
            line_terminator: line_terminator.to_string(),
            encoding:        encoding.to_string(),
            delimiter:       delimiter.to_string(),
        };
        assert!(
            matches!(text.reader_settings(), Err(LoaderError::ConfigurationError(_))),
            "{text:?} should be rejected"
        );
    }

    for (encoding, delimiter,) in [("shift_jis", ","), ("big5", "\t"), ("gbk", ";"), ("latin1", "|")] {
        let text = TextProperties {
            encoding: encoding.to_string(),
            delimiter: delimiter.to_string(),
            ..TextProperties::default()
        };
        assert!(text.reader_settings().is_ok(), "{text:?} should be accepted");
    }
}

#[test]
fn escaped_terminators_are_understood() {
    for (raw, expected,) in [
        ("\\n", Terminator::CRLF,),
        ("lf", Terminator::CRLF,),
        ("\\r\\n", Terminator::CRLF,),
        ("cr", Terminator::Any(b'\r',),),
    ] {
        let text = TextProperties {
            line_terminator: raw.to_string(),
            ..TextProperties::default()
        };
        assert_eq!(text.reader_settings().unwrap().terminator, expected);
    }
}

#[test]
fn zero_batch_size_is_rejected() {
    let config = LoaderConfig::from_toml_str("batch_size = 0",).unwrap();
    assert!(config.run_options().is_err());
}

#[test]
fn malformed_toml_is_a_configuration_error() {
    assert!(matches!(
        LoaderConfig::from_toml_str("batch_size = \"many\""),
        Err(LoaderError::ConfigurationError(_))
    ));
}
