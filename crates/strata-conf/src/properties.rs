//! `.properties` decoder
//!
//! Supports `key=value`, `key: value` and `key value` lines, `#`/`!`
//! comments, backslash line continuations and the usual escapes
//! (`\t`, `\n`, `\r`, `\f`, `\uXXXX`, escaped separators).

use indexmap::IndexMap;

/// Parse properties content into an ordered map; later duplicates win
///
/// # Examples
///
/// ```
/// use strata_conf::properties::parse;
///
/// let values = parse("# comment\napp.name = demo\napp.tags: a,b\n").unwrap();
/// assert_eq!(values["app.name"], "demo");
/// assert_eq!(values["app.tags"], "a,b");
/// ```
pub fn parse(content: &str) -> Result<IndexMap<String, String>, String> {
	let mut values = IndexMap::new();

	for (line_no, logical) in logical_lines(content) {
		let (raw_key, raw_value) = split_entry(&logical);
		let key = unescape(raw_key).map_err(|e| format!("line {}: {}", line_no, e))?;
		let value = unescape(raw_value).map_err(|e| format!("line {}: {}", line_no, e))?;
		values.insert(key, value);
	}

	Ok(values)
}

/// Join continuation lines, dropping blanks and comments.
/// Yields the 1-based number of the first physical line of each entry.
fn logical_lines(content: &str) -> Vec<(usize, String)> {
	let mut lines = Vec::new();
	let mut current: Option<(usize, String)> = None;

	for (index, physical) in content.lines().enumerate() {
		let trimmed = physical.trim_start();

		let (start, mut buffer) = match current.take() {
			Some(pending) => pending,
			None => {
				if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
					continue;
				}
				(index + 1, String::new())
			}
		};

		if ends_with_continuation(trimmed) {
			buffer.push_str(&trimmed[..trimmed.len() - 1]);
			current = Some((start, buffer));
		} else {
			buffer.push_str(trimmed);
			lines.push((start, buffer));
		}
	}

	if let Some(pending) = current {
		lines.push(pending);
	}
	lines
}

/// A line continues when it ends with an odd number of backslashes
fn ends_with_continuation(line: &str) -> bool {
	line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Split at the first unescaped `=`, `:` or whitespace
fn split_entry(line: &str) -> (&str, &str) {
	let mut escaped = false;
	for (i, c) in line.char_indices() {
		if escaped {
			escaped = false;
			continue;
		}
		match c {
			'\\' => escaped = true,
			'=' | ':' => {
				return (
					trim_unescaped_end(&line[..i]),
					trim_unescaped_end(line[i + 1..].trim_start()),
				);
			}
			c if c.is_whitespace() => {
				let rest = line[i..].trim_start();
				let rest = rest
					.strip_prefix(['=', ':'])
					.map(str::trim_start)
					.unwrap_or(rest);
				return (&line[..i], trim_unescaped_end(rest));
			}
			_ => {}
		}
	}
	(line, "")
}

/// Trim trailing whitespace, keeping a whitespace character written as `\ `
fn trim_unescaped_end(s: &str) -> &str {
	let trimmed = s.trim_end();
	match s[trimmed.len()..].chars().next() {
		Some(c) if ends_with_continuation(trimmed) => &s[..trimmed.len() + c.len_utf8()],
		_ => trimmed,
	}
}

fn unescape(raw: &str) -> Result<String, String> {
	let mut out = String::with_capacity(raw.len());
	let mut chars = raw.chars();

	while let Some(c) = chars.next() {
		if c != '\\' {
			out.push(c);
			continue;
		}
		match chars.next() {
			Some('t') => out.push('\t'),
			Some('n') => out.push('\n'),
			Some('r') => out.push('\r'),
			Some('f') => out.push('\u{000C}'),
			Some('u') => {
				let hex: String = chars.by_ref().take(4).collect();
				let code = u32::from_str_radix(&hex, 16)
					.ok()
					.filter(|_| hex.len() == 4)
					.and_then(char::from_u32)
					.ok_or_else(|| format!("malformed \\u escape '\\u{}'", hex))?;
				out.push(code);
			}
			Some(other) => out.push(other),
			None => {}
		}
	}

	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("a=b", "a", "b")]
	#[case("a = b", "a", "b")]
	#[case("a: b", "a", "b")]
	#[case("a b", "a", "b")]
	#[case("a   =   b c", "a", "b c")]
	#[case("a=", "a", "")]
	#[case("a", "a", "")]
	#[case(r"a\=b=c", "a=b", "c")]
	#[case(r"url=http\://host", "url", "http://host")]
	fn test_entry_forms(#[case] line: &str, #[case] key: &str, #[case] value: &str) {
		let values = parse(line).unwrap();

		assert_eq!(values.get(key).map(String::as_str), Some(value));
	}

	#[test]
	fn test_comments_and_blank_lines() {
		let values = parse("# header\n\n! bang\n  key=value\n").unwrap();

		assert_eq!(values.len(), 1);
		assert_eq!(values["key"], "value");
	}

	#[test]
	fn test_line_continuation() {
		let values = parse("browsers = chrome, \\\n    firefox, \\\n    edge\nnext=1").unwrap();

		assert_eq!(values["browsers"], "chrome, firefox, edge");
		assert_eq!(values["next"], "1");
	}

	#[test]
	fn test_escaped_backslash_is_not_continuation() {
		let values = parse("path=C:\\\\\nnext=1").unwrap();

		assert_eq!(values["path"], "C:\\");
		assert_eq!(values["next"], "1");
	}

	#[test]
	fn test_escaped_trailing_whitespace_is_kept() {
		let values = parse("a=b   \nc=d\\ \ne d\\  \n").unwrap();

		assert_eq!(values["a"], "b");
		assert_eq!(values["c"], "d ");
		assert_eq!(values["e"], "d ");
	}

	#[test]
	fn test_escaped_whitespace_in_key() {
		let values = parse("my\\ key = value").unwrap();

		assert_eq!(values["my key"], "value");
	}

	#[test]
	fn test_unicode_escape() {
		let values = parse(r"greeting=caf\u00e9").unwrap();

		assert_eq!(values["greeting"], "café");
	}

	#[test]
	fn test_malformed_unicode_escape_reports_line() {
		let err = parse("ok=1\nbad=\\u12").unwrap_err();

		assert!(err.starts_with("line 2"));
	}

	#[test]
	fn test_duplicate_keys_last_wins() {
		let values = parse("a=1\na=2").unwrap();

		assert_eq!(values["a"], "2");
	}
}
