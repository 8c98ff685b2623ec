pub mod check;
pub mod dev;
pub mod finalize;

use serde::Serialize;

/// Schema version of the `--json` outputs. Bump when changing the format.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
pub struct ErrorJson {
    pub code: &'static str,
    pub message: String,
}

/// Failure result for JSON output.
#[derive(Serialize)]
pub struct ErrorResult {
    pub schema_version: u32,
    pub ok: bool,
    pub error: ErrorJson,
    pub notes: Vec<String>,
}

impl ErrorResult {
    pub fn new(err: &swkit_core::Error) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            ok: false,
            error: ErrorJson {
                code: err.code(),
                message: err.to_string(),
            },
            notes: Vec::new(),
        }
    }
}

/// Print a value as pretty JSON to stdout.
pub fn print_json<T: Serialize>(value: &T) -> miette::Result<()> {
    use miette::IntoDiagnostic;

    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{json}");
    Ok(())
}
