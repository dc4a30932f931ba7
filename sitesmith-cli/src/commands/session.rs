//! Line-oriented tool session over stdin/stdout

use std::io::{self, BufRead, Write};

use sitesmith_core::Toolbox;
use tracing::debug;

/// Dispatch each stdin line as a tool call and print one record per line
///
/// The repository binding carries over from call to call. Returns whether
/// every call succeeded.
pub fn run(toolbox: &mut Toolbox) -> anyhow::Result<bool> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    serve(toolbox, stdin.lock(), &mut stdout)
}

fn serve(
    toolbox: &mut Toolbox,
    input: impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<bool> {
    let mut all_ok = true;
    let mut calls = 0usize;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let record = toolbox.dispatch_json(&line);
        all_ok &= record["success"].as_bool().unwrap_or(false);
        calls += 1;

        writeln!(out, "{}", serde_json::to_string(&record)?)?;
        out.flush()?;
    }

    debug!(calls, all_ok, "Session finished");
    Ok(all_ok)
}
