use std::io::{self, BufRead};

/// Reads pasted text up to the first empty line that follows some content,
/// or to the end of input. Blank lines before any content are skipped so a
/// stray Enter does not end the paste.
pub fn read_text_block<R: BufRead>(reader: R) -> io::Result<String> {
    let mut lines = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            if lines.is_empty() {
                continue;
            }
            break;
        }
        lines.push(line.to_string());
    }

    Ok(lines.join("\n"))
}
