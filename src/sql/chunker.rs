//! Statement-aligned splitting of SQL scripts

/// Result of splitting a script
#[derive(Debug, Clone, PartialEq)]
pub struct SqlSplit {
    /// Chunk texts in script order
    pub chunks: Vec<String>,
    /// Number of statements found in the script
    pub statement_count: usize,
}

/// Split a script into trimmed statements
///
/// Any line containing `;` ends the current statement. Literals and
/// comments are not parsed, so a semicolon inside a string also ends it.
/// Text after the last semicolon becomes a final statement.
pub fn split_statements(script: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in script_lines(script) {
        current.push_str(line);
        current.push('\n');

        if line.contains(';') {
            statements.push(current.trim().to_string());
            current.clear();
        }
    }

    let trailing = current.trim();
    if !trailing.is_empty() {
        statements.push(trailing.to_string());
    }

    statements
}

/// Lines split on `\n`, `\r\n`, or a bare `\r`
fn script_lines(script: &str) -> impl Iterator<Item = &str> {
    script.split_terminator('\n').flat_map(|line| {
        let line = line.strip_suffix('\r').unwrap_or(line);
        line.split('\r')
    })
}

/// Pack statements greedily into chunks of at most `max_lines` lines
///
/// A statement is never split; one longer than `max_lines` forms its own
/// chunk.
pub fn split_sql(script: &str, max_lines: usize) -> SqlSplit {
    let statements = split_statements(script);

    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_lines = 0usize;

    for statement in &statements {
        let lines = statement.lines().count();

        if current_lines + lines > max_lines && !current.is_empty() {
            chunks.push(current.join("\n"));
            current.clear();
            current_lines = 0;
        }

        current.push(statement);
        current_lines += lines;
    }

    if !current.is_empty() {
        chunks.push(current.join("\n"));
    }

    SqlSplit {
        chunks,
        statement_count: statements.len(),
    }
}
