//! Portable-SQL translation for Postgres.
//!
//! The engine emits a portable dialect: `?` positional placeholders and
//! backtick-quoted identifiers. Postgres wants `$1..$n` and double quotes.
//! The rewrite is a single pass that leaves single-quoted string literals
//! (including `''` escapes) untouched, so a `?` or backtick inside a literal
//! is never reinterpreted. Argument values themselves are never spliced into
//! the text; they go through the driver's bind API.

/// Rewrite portable SQL into the Postgres dialect, preserving placeholder
/// positions.
pub fn to_postgres(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut placeholder = 0usize;
    let mut chars = sql.chars().peekable();
    let mut in_literal = false;

    while let Some(c) = chars.next() {
        if in_literal {
            out.push(c);
            if c == '\'' {
                // '' inside a literal is an escaped quote, not a terminator
                if chars.peek() == Some(&'\'') {
                    out.push(chars.next().expect("peeked"));
                } else {
                    in_literal = false;
                }
            }
            continue;
        }
        match c {
            '\'' => {
                in_literal = true;
                out.push(c);
            }
            '?' => {
                placeholder += 1;
                out.push('$');
                out.push_str(&placeholder.to_string());
            }
            '`' => out.push('"'),
            _ => out.push(c),
        }
    }
    out
}
