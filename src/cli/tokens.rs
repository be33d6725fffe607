//! `tokens` command: print highlight spans.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::syntax::{Token, tokenize};

pub fn print_tokens(file: &Path, json: bool) -> Result<()> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let tokens: Vec<Token> = tokenize(&text).collect();

    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &tokens)?;
        writeln!(out)?;
    } else {
        write_table(&mut out, &text, &tokens)?;
    }

    crate::debug!("tokens"; "{} spans in {}", tokens.len(), file.display());
    Ok(())
}

fn write_table(out: &mut impl Write, text: &str, tokens: &[Token]) -> io::Result<()> {
    for token in tokens {
        let range = format!("{}..{}", token.range.start, token.range.end);
        writeln!(
            out,
            "{:<12} {:<9} {:?}",
            range,
            token.kind.tag(),
            &text[token.range.clone()]
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_layout() {
        let text = "= Hi";
        let tokens: Vec<Token> = tokenize(text).collect();

        let mut out = Vec::new();
        write_table(&mut out, text, &tokens).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.starts_with("0..2         heading1  \"= \""));
    }
}
