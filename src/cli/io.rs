//! JSON I/O handling for the CLI
//!
//! - Input: one JSON object on stdin
//! - Output: one JSON object on stdout

use std::io::{self, Read, Write};

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read a JSON object from stdin
pub fn read_request() -> CliResult<Value> {
    let mut input = String::new();
    io::stdin().lock().read_to_string(&mut input)?;
    parse_request(&input)
}

pub(crate) fn parse_request(input: &str) -> CliResult<Value> {
    if input.trim().is_empty() {
        return Err(CliError::input_error("Empty input"));
    }
    let value: Value = serde_json::from_str(input)?;
    if !value.is_object() {
        return Err(CliError::input_error("Expected a JSON object"));
    }
    Ok(value)
}

fn write_line(response: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, response)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_line(&serde_json::json!({
        "status": "ok",
        "data": data
    }))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_line(&serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request() {
        assert!(parse_request(r#"{"name": "ann"}"#).is_ok());
        assert_eq!(
            parse_request("  ").unwrap_err().code_str(),
            "SIFT_CLI_INPUT_ERROR"
        );
        assert!(parse_request("[1, 2]").is_err());
    }
}
