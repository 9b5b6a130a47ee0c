//! Shell-style glob filters for list commands.

use regex::Regex;

use crate::error::CliError;

/// A compiled glob pattern, anchored at both ends.
#[derive(Debug, Clone)]
pub struct Glob {
    regex: Regex,
}

impl Glob {
    /// Compile a pattern supporting `*`, `?`, `[..]`, `[!..]`, `{a,b}` and
    /// `\` escapes.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::UnknownGlob`] for unbalanced classes or braces.
    pub fn compile(pattern: &str) -> Result<Self, CliError> {
        let invalid = || CliError::UnknownGlob(pattern.to_string());
        let mut re = String::from("^");
        let mut chars = pattern.chars();
        let mut depth = 0usize;

        while let Some(c) = chars.next() {
            match c {
                '*' => re.push_str(".*"),
                '?' => re.push('.'),
                '\\' => push_literal(&mut re, chars.next().ok_or_else(invalid)?),
                '[' => {
                    re.push('[');
                    if chars.clone().next() == Some('!') {
                        chars.next();
                        re.push('^');
                    }
                    let mut empty = true;
                    loop {
                        match chars.next().ok_or_else(invalid)? {
                            ']' if !empty => break,
                            ']' => return Err(invalid()),
                            '-' if !empty => re.push('-'),
                            '\\' => push_literal(&mut re, chars.next().ok_or_else(invalid)?),
                            other => push_literal(&mut re, other),
                        }
                        empty = false;
                    }
                    re.push(']');
                }
                '{' => {
                    depth += 1;
                    re.push_str("(?:");
                }
                ',' if depth > 0 => re.push('|'),
                '}' if depth > 0 => {
                    depth -= 1;
                    re.push(')');
                }
                other => push_literal(&mut re, other),
            }
        }
        if depth != 0 {
            return Err(invalid());
        }
        re.push('$');

        let regex = Regex::new(&re).map_err(|_| invalid())?;
        Ok(Self { regex })
    }

    /// Whole-string match.
    #[must_use]
    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }
}

fn push_literal(re: &mut String, c: char) {
    let mut buf = [0u8; 4];
    re.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

/// Compile every pattern, failing on the first bad one.
///
/// # Errors
///
/// Returns [`CliError::UnknownGlob`] naming the pattern that failed.
pub fn compile_all(patterns: &[String]) -> Result<Vec<Glob>, CliError> {
    patterns.iter().map(|p| Glob::compile(p)).collect()
}

/// True when there are no globs or any glob matches any candidate.
#[must_use]
pub fn matches_any(globs: &[Glob], candidates: &[&str]) -> bool {
    globs.is_empty() || globs.iter().any(|g| candidates.iter().any(|c| g.is_match(c)))
}
