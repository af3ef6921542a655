use thiserror::Error;

/// A source line no grammar entry accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct UnrecognizedLine {
    /// 1-based line number.
    pub line: usize,
    pub text: String,
}

impl std::fmt::Display for UnrecognizedLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown token `{}` on line {}", self.text, self.line)
    }
}

/// Failure to turn source text into a runnable program.
///
/// Load errors are fatal: nothing is executed when one is returned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{} unrecognized line(s):{}", .0.len(), render_lines(.0))]
    UnrecognizedLines(Vec<UnrecognizedLine>),
}

fn render_lines(lines: &[UnrecognizedLine]) -> String {
    lines.iter().map(|l| format!("\n  {}", l)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lists_every_line() {
        let err = LoadError::UnrecognizedLines(vec![
            UnrecognizedLine {
                line: 2,
                text: "FOO".to_string(),
            },
            UnrecognizedLine {
                line: 5,
                text: "BAR x".to_string(),
            },
        ]);
        assert_eq!(
            err.to_string(),
            "2 unrecognized line(s):\n  unknown token `FOO` on line 2\n  unknown token `BAR x` on line 5"
        );
    }
}
