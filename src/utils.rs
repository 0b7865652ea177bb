use super::*;

pub(crate) fn format_count(count: u64, noun: &str) -> String {
  match count {
    1 => format!("1 {noun}"),
    _ => format!("{count} {noun}s"),
  }
}

pub(crate) fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
  timestamp
    .with_timezone(&Local)
    .format("%Y-%m-%d %H:%M")
    .to_string()
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
  if text.chars().count() <= max_chars {
    return text.to_string();
  }

  let mut result = text.chars().take(max_chars).collect::<String>();

  result.truncate(result.trim_end().len());
  result.push_str("...");

  result
}

pub(crate) fn wrap_text(text: &str, width: usize) -> Vec<String> {
  let mut lines = Vec::new();

  for paragraph in text.lines() {
    let mut current = String::new();
    let mut current_width = 0;

    for word in paragraph.split_whitespace() {
      let word_width = word.chars().count();

      if current.is_empty() {
        current.push_str(word);
        current_width = word_width;
      } else if current_width + 1 + word_width <= width {
        current.push(' ');
        current.push_str(word);
        current_width += 1 + word_width;
      } else {
        lines.push(std::mem::take(&mut current));
        current.push_str(word);
        current_width = word_width;
      }
    }

    lines.push(current);
  }

  while lines.last().is_some_and(String::is_empty) {
    lines.pop();
  }

  lines
}
