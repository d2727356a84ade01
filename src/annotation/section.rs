/// A titled section of an annotation block.
///
/// A trimmed line starting with `OpenAPI` (any case) and ending with `:` opens a section;
/// every following line up to the next title is its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Title without the trailing colon, e.g. `OpenAPI Path`
    pub title: String,
    /// Body with the indentation common to all lines removed
    pub body: String,
}

impl Section {
    /// Lower-cased title without the `openapi` prefix: `path`, `query string parameters`
    pub fn key(&self) -> String {
        let lowered = self.title.to_lowercase();
        let rest = lowered.strip_prefix("openapi").unwrap_or(&lowered);
        rest.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Non-empty body lines, trimmed
    pub fn lines(&self) -> Vec<&str> {
        self.body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines().get(index).copied()
    }

    /// Body as free text, blank lines at either end removed
    pub fn text(&self) -> Option<String> {
        let text = self.body.trim_matches('\n').trim_end();
        if text.trim().is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }
}

fn is_title(line: &str) -> bool {
    let lowered = line.to_lowercase();
    lowered.starts_with("openapi") && lowered.ends_with(':')
}

/// Split an annotation block into its sections; text before the first title is dropped.
pub fn parse_sections(block: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut title: Option<String> = None;
    let mut body: Vec<&str> = Vec::new();

    for line in block.lines() {
        let trimmed = line.trim();
        if is_title(trimmed) {
            if let Some(previous) = title.take() {
                sections.push(Section {
                    title: previous,
                    body: dedent(&body),
                });
            }
            title = Some(trimmed.trim_end_matches(':').trim_end().to_string());
            body.clear();
        } else if title.is_some() {
            body.push(line);
        }
    }

    if let Some(last) = title {
        sections.push(Section {
            title: last,
            body: dedent(&body),
        });
    }

    sections
}

/// Remove the leading whitespace shared by every non-blank line
fn dedent(lines: &[&str]) -> String {
    let mut common: Option<&str> = None;
    for line in lines.iter().filter(|line| !line.trim().is_empty()) {
        let indent = &line[..line.len() - line.trim_start().len()];
        common = Some(match common {
            None => indent,
            Some(current) => common_prefix(current, indent),
        });
    }
    let common = common.unwrap_or("");

    lines
        .iter()
        .map(|line| line.strip_prefix(common).unwrap_or("").trim_end())
        .collect::<Vec<&str>>()
        .join("\n")
}

fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let length = a
        .char_indices()
        .zip(b.chars())
        .take_while(|((_, x), y)| x == y)
        .last()
        .map(|((index, x), _)| index + x.len_utf8())
        .unwrap_or(0);
    &a[..length]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BLOCK: &str = " Lists the villages.

 OpenAPI Summary:
     List Villages

 OpenAPI Query String Parameters:
     world  String  required  World UUID
     x      i32     optional  X-coordinate

 openapi description:
     Returns every village.

       Indented detail.
";

    #[test]
    fn test_parse_sections() {
        let sections = parse_sections(BLOCK);
        let keys: Vec<String> = sections.iter().map(Section::key).collect();

        assert_eq!(
            keys,
            vec![
                "summary".to_string(),
                "query string parameters".to_string(),
                "description".to_string()
            ]
        );
        assert_eq!(sections[0].title, "OpenAPI Summary");
        assert_eq!(sections[0].line(0), Some("List Villages"));
        assert_eq!(sections[0].line(1), None);
        assert_eq!(
            sections[1].lines(),
            vec!["world  String  required  World UUID", "x      i32     optional  X-coordinate"]
        );
        assert_eq!(
            sections[2].text().as_deref(),
            Some("Returns every village.\n\n  Indented detail.")
        );
    }

    #[test]
    fn test_block_without_sections() {
        assert!(parse_sections("Just a comment mentioning OpenAPI").is_empty());
    }

    #[test]
    fn test_empty_section_body() {
        let sections = parse_sections("OpenAPI Path:\nOpenAPI Method:\n GET");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].line(0), None);
        assert_eq!(sections[0].text(), None);
        assert_eq!(sections[1].line(0), Some("GET"));
    }

    #[test]
    fn test_dedent_mixed_indentation() {
        assert_eq!(dedent(&["\t\ta", "\t\t  b", "", "\tc"]), "\ta\n\t  b\n\nc");
    }
}
