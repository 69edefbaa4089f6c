use std::borrow::Cow;
use std::collections::BTreeMap;

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

const COMMENT_PREFIX: &str = "#";
const EXPORT_PREFIX: &str = "export";
const SEPARATORS: [char; 2] = ['=', ':'];

/// Key/value pairs parsed from env file text.
///
/// Parsing is total: lines that match no assignment pattern (comments, blank
/// lines, garbage) are skipped, and a quoted value whose closing quote never
/// arrives is discarded. Duplicate keys keep the last occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedEnv {
  pub vars: BTreeMap<String, String>,
}

impl From<&str> for ParsedEnv {
  fn from(s: &str) -> Self {
    #[cfg(feature = "tracing")]
    debug!("Parsing {} lines of env text", s.lines().count());

    let normalized = normalize_line_endings(s);
    let mut vars = BTreeMap::new();
    let mut pending: Option<PendingValue> = None;

    for line in normalized.split('\n') {
      let line = line.trim_end();

      if let Some(mut open) = pending.take() {
        open.buffer.push('\n');
        open.buffer.push_str(line);

        if !line.ends_with(open.quote.delimiter()) {
          pending = Some(open);
          continue;
        }

        #[cfg(feature = "tracing")]
        trace!("Closing multiline value for {}", open.key);

        if let Some(raw) = between_quotes(&open.buffer, open.quote) {
          vars.insert(open.key, open.quote.decode(raw));
        }
        continue;
      }

      let Some((key, rest)) = split_assignment(line) else {
        #[cfg(feature = "tracing")]
        trace!("Skipping line: {:?}", line);
        continue;
      };

      match Quote::detect(rest) {
        Some(quote) if quote.closes_line(rest) => {
          let raw = &rest[1..rest.len() - 1];
          vars.insert(key.to_owned(), quote.decode(raw));
        }
        Some(quote) => {
          #[cfg(feature = "tracing")]
          trace!("Opening multiline value for {}", key);

          pending = Some(PendingValue {
            key: key.to_owned(),
            buffer: rest.to_owned(),
            quote,
          });
        }
        None => {
          let value = rest
            .split_once(COMMENT_PREFIX)
            .map(|(head, _)| head)
            .unwrap_or(rest)
            .trim();
          vars.insert(key.to_owned(), value.to_owned());
        }
      }
    }

    // A value still open at end of input never found its closing quote;
    // the partial buffer is dropped rather than reported.
    #[cfg(feature = "tracing")]
    if let Some(open) = pending {
      debug!("Discarding unterminated value for {}", open.key);
    }

    Self { vars }
  }
}

impl ParsedEnv {
  pub fn get(&self, key: &str) -> Option<&str> {
    self.vars.get(key).map(String::as_str)
  }

  pub fn is_empty(&self) -> bool {
    self.vars.is_empty()
  }

  pub fn len(&self) -> usize {
    self.vars.len()
  }
}

/// Quote style of a value, which decides the escape policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
  Single,
  Double,
  Backtick,
}

impl Quote {
  fn detect(value: &str) -> Option<Self> {
    match value.chars().next() {
      Some('\'') => Some(Self::Single),
      Some('"') => Some(Self::Double),
      Some('`') => Some(Self::Backtick),
      _ => None,
    }
  }

  fn delimiter(self) -> char {
    match self {
      Self::Single => '\'',
      Self::Double => '"',
      Self::Backtick => '`',
    }
  }

  /// Whether a value opened by this quote also closes on the same line.
  fn closes_line(self, value: &str) -> bool {
    value.len() >= 2 && value.ends_with(self.delimiter())
  }

  /// Double quotes decode `\n` and `\r`; the other styles stay literal.
  fn decode(self, raw: &str) -> String {
    match self {
      Self::Double => raw.replace("\\n", "\n").replace("\\r", "\r"),
      Self::Single | Self::Backtick => raw.to_owned(),
    }
  }
}

/// A quoted value whose closing quote has not been seen yet.
struct PendingValue {
  key: String,
  buffer: String,
  quote: Quote,
}

/// Content between the first and the last occurrence of the delimiter, so
/// identical quote characters embedded in the value survive.
fn between_quotes(buffer: &str, quote: Quote) -> Option<&str> {
  let delimiter = quote.delimiter();
  let start = buffer.find(delimiter)?;
  let end = buffer.rfind(delimiter)?;
  if start == end {
    return None;
  }
  Some(&buffer[start + delimiter.len_utf8()..end])
}

fn split_assignment(line: &str) -> Option<(&str, &str)> {
  let working = line.trim_start();

  if let Some(rest) = working.strip_prefix(EXPORT_PREFIX)
    && rest.starts_with(char::is_whitespace)
    && let Some(found) = split_key_value(rest.trim_start())
  {
    return Some(found);
  }

  split_key_value(working)
}

fn split_key_value(working: &str) -> Option<(&str, &str)> {
  let key_end = working
    .find(|ch: char| !is_key_char(ch))
    .unwrap_or(working.len());
  if key_end == 0 {
    return None;
  }

  let (key, rest) = working.split_at(key_end);
  let rest = rest.trim_start().strip_prefix(SEPARATORS)?;
  Some((key, rest.trim_start()))
}

fn is_key_char(ch: char) -> bool {
  ch.is_ascii_alphanumeric() || ch == '.' || ch == '_' || ch == '-'
}

fn normalize_line_endings(input: &str) -> Cow<'_, str> {
  if !input.contains('\r') {
    return Cow::Borrowed(input);
  }

  let mut out = String::with_capacity(input.len());
  let mut chars = input.chars().peekable();
  while let Some(ch) = chars.next() {
    if ch == '\r' {
      if chars.peek() == Some(&'\n') {
        chars.next();
      }
      out.push('\n');
      continue;
    }
    out.push(ch);
  }

  Cow::Owned(out)
}
