/// Cleans up raw extractor output for prompting.
///
/// Line endings become `\n`, form feeds become line breaks, runs of spaces
/// and tabs collapse to one space, words split by an end-of-line hyphen are
/// re-joined, and blank-line runs shrink to a single blank line.
pub fn normalize_text(raw: &str) -> String {
    let unified = raw
        .replace("\r\n", "\n")
        .replace(['\r', '\u{c}'], "\n")
        .replace('\0', "");

    let mut out = String::with_capacity(unified.len());
    let mut blank_run = 0usize;
    let mut join_next = false;

    for line in unified.lines().map(collapse_spaces) {
        if line.is_empty() {
            blank_run += 1;
            join_next = false;
            continue;
        }

        if join_next && line.starts_with(|c: char| c.is_lowercase()) {
            // drop the hyphen, glue the word back together
            out.pop();
        } else if !out.is_empty() {
            out.push_str(if blank_run > 0 { "\n\n" } else { "\n" });
        }
        blank_run = 0;

        out.push_str(&line);
        join_next = ends_with_hyphenated_word(&line);
    }

    out
}

fn collapse_spaces(line: &str) -> String {
    line.split([' ', '\t'])
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn ends_with_hyphenated_word(line: &str) -> bool {
    let mut rev = line.chars().rev();
    rev.next() == Some('-') && rev.next().is_some_and(char::is_alphabetic)
}
