//! Line-oriented file helpers. A path of `-` means stdin or stdout.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

const DASH: &str = "-";

/// Read non-empty, trimmed lines from `path`.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    if path.as_os_str() == DASH {
        return collect_lines(io::stdin().lock());
    }

    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    collect_lines(BufReader::new(file))
        .with_context(|| format!("Failed to read {}", path.display()))
}

/// Write each item on its own line to `path`.
pub fn write_lines<S: AsRef<str>>(path: &Path, lines: &[S]) -> Result<()> {
    if path.as_os_str() == DASH {
        let stdout = io::stdout();
        return emit_lines(stdout.lock(), lines);
    }

    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    emit_lines(BufWriter::new(file), lines)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn collect_lines<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            out.push(trimmed.to_string());
        }
    }
    Ok(out)
}

fn emit_lines<W: Write, S: AsRef<str>>(mut writer: W, lines: &[S]) -> Result<()> {
    for line in lines {
        writeln!(writer, "{}", line.as_ref())?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_skips_blank_lines() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("names.txt");
        std::fs::write(&path, "alice\n\n  @packager \r\nbob\n   \n").unwrap();

        assert_eq!(read_lines(&path).unwrap(), vec!["alice", "@packager", "bob"]);
    }

    #[test]
    fn test_write_then_read() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.txt");
        write_lines(&path, &["a@example.org", "b@example.org"]).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "a@example.org\nb@example.org\n"
        );
    }

    #[test]
    fn test_missing_input_names_the_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.txt");
        let err = read_lines(&path).unwrap_err();
        assert!(err.to_string().contains("absent.txt"));
    }
}
