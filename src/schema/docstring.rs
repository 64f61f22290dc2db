//! Documentation text parsing
//!
//! Splits a doc comment into a short description and per-parameter texts.
//! Parameter blocks are recognised in four conventions:
//!
//! - rustdoc: a `# Arguments` (or `# Parameters`) heading followed by
//!   ``* `name` - text`` bullets
//! - reST: `:param name: text` or `:param type name: text` tags
//! - Google: an `Args:` section with `name (type): text` entries
//! - NumPy: a `Parameters` heading underlined with dashes, `name : type`
//!   entries and indented text
//!
//! The short description is the first free-text paragraph before any tag.

use indexmap::IndexMap;

/// Headings that introduce a parameter block
const PARAM_HEADERS: &[&str] = &[
    "args",
    "arguments",
    "parameters",
    "params",
    "keyword args",
    "keyword arguments",
    "other parameters",
];

/// Google-style section headers that are not parameter blocks
const OTHER_HEADERS: &[&str] = &[
    "returns",
    "return",
    "raises",
    "yields",
    "example",
    "examples",
    "note",
    "notes",
    "attributes",
    "see also",
    "todo",
    "warning",
    "warnings",
];

/// reST field names that document a parameter
const REST_PARAM_FIELDS: &[&str] = &["param", "parameter", "arg", "argument", "key", "keyword"];

/// Result of parsing a doc comment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDoc {
    /// First free-text paragraph
    pub short_description: Option<String>,
    /// Remaining free-text paragraphs
    pub long_description: Option<String>,
    /// Parameter name to description, in documentation order
    pub params: IndexMap<String, String>,
}

impl ParsedDoc {
    /// Description documented for `name`
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Parse documentation text. Never fails; unrecognised text is ignored.
pub fn parse_doc(text: &str) -> ParsedDoc {
    let lines = dedent(text);
    let mut parser = Parser::default();
    let mut index = 0;
    while index < lines.len() {
        let next = lines.get(index + 1).map(String::as_str);
        index += if parser.feed(&lines[index], next) { 2 } else { 1 };
    }
    parser.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Free,
    Rest,
    Markdown,
    Google { indent: usize },
    Numpy,
    Ignored,
}

#[derive(Debug)]
struct OpenParam {
    names: Vec<String>,
    text: Vec<String>,
    indent: usize,
}

#[derive(Debug)]
struct Parser {
    section: Section,
    paragraphs: Vec<String>,
    paragraph: Vec<String>,
    current: Option<OpenParam>,
    params: IndexMap<String, String>,
    after_blank: bool,
    in_code: bool,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            section: Section::Free,
            paragraphs: Vec::new(),
            paragraph: Vec::new(),
            current: None,
            params: IndexMap::new(),
            after_blank: false,
            in_code: false,
        }
    }
}

impl Parser {
    /// Consume one line; returns true when `next` was consumed as well
    fn feed(&mut self, line: &str, next: Option<&str>) -> bool {
        let trimmed = line.trim();
        let indent = line.len() - line.trim_start().len();

        if trimmed.starts_with("```") {
            self.in_code = !self.in_code;
            self.start_section(Section::Ignored);
            return false;
        }
        if self.in_code {
            return false;
        }
        if trimmed.is_empty() {
            self.blank();
            return false;
        }

        if indent == 0 && next.is_some_and(is_underline) {
            let section = if is_param_header(trimmed) {
                Section::Numpy
            } else {
                Section::Ignored
            };
            self.start_section(section);
            return true;
        }

        if trimmed.starts_with(':') || trimmed.starts_with('@') {
            self.start_section(Section::Rest);
            if let Some((name, text)) = parse_rest_field(trimmed) {
                self.open(vec![name], text, indent);
            }
            return false;
        }

        if let Some(heading) = trimmed.strip_prefix('#') {
            let heading = heading.trim_start_matches('#').trim();
            let section = if is_param_header(heading) {
                Section::Markdown
            } else {
                Section::Ignored
            };
            self.start_section(section);
            return false;
        }

        if let Some(header) = trimmed.strip_suffix(':') {
            let lower = header.trim().to_lowercase();
            if PARAM_HEADERS.contains(&lower.as_str()) {
                self.start_section(Section::Google { indent });
                return false;
            }
            if OTHER_HEADERS.contains(&lower.as_str()) {
                self.start_section(Section::Ignored);
                return false;
            }
        }

        match self.section {
            Section::Free => self.paragraph.push(trimmed.to_string()),
            Section::Rest => {
                if !self.after_blank {
                    self.append(trimmed);
                }
            }
            Section::Markdown => {
                if let Some(item) = strip_bullet(trimmed) {
                    self.close();
                    if let Some((name, text)) = parse_markdown_item(item) {
                        self.open(vec![name], text, indent);
                    }
                } else if self.current.is_some() && (!self.after_blank || indent > 0) {
                    self.append(trimmed);
                } else {
                    self.start_section(Section::Ignored);
                }
            }
            Section::Google { indent: header } => {
                if indent <= header {
                    self.start_section(Section::Ignored);
                } else if self.current.as_ref().is_some_and(|open| indent > open.indent) {
                    self.append(trimmed);
                } else {
                    self.close();
                    let (names, text) = parse_google_item(trimmed);
                    self.open(names, text, indent);
                }
            }
            Section::Numpy => {
                if indent == 0 {
                    self.close();
                    self.open(parse_numpy_item(trimmed), String::new(), 0);
                } else {
                    self.append(trimmed);
                }
            }
            Section::Ignored => {}
        }
        self.after_blank = false;
        false
    }

    fn blank(&mut self) {
        self.after_blank = true;
        match self.section {
            Section::Free => self.end_paragraph(),
            Section::Rest => self.close(),
            _ => {}
        }
    }

    fn start_section(&mut self, section: Section) {
        self.close();
        self.end_paragraph();
        self.section = section;
        self.after_blank = false;
    }

    fn open(&mut self, names: Vec<String>, text: String, indent: usize) {
        self.close();
        let text = if text.is_empty() { Vec::new() } else { vec![text] };
        self.current = Some(OpenParam { names, text, indent });
    }

    fn append(&mut self, line: &str) {
        if let Some(open) = self.current.as_mut() {
            open.text.push(line.to_string());
        }
    }

    fn close(&mut self) {
        let Some(open) = self.current.take() else {
            return;
        };
        let text = open.text.join(" ");
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        for name in open.names {
            self.params.insert(name, text.to_string());
        }
    }

    fn end_paragraph(&mut self) {
        if !self.paragraph.is_empty() {
            self.paragraphs.push(self.paragraph.join(" "));
            self.paragraph.clear();
        }
    }

    fn finish(mut self) -> ParsedDoc {
        self.close();
        self.end_paragraph();
        let mut paragraphs = self.paragraphs.into_iter();
        let short_description = paragraphs.next();
        let rest: Vec<String> = paragraphs.collect();
        ParsedDoc {
            short_description,
            long_description: (!rest.is_empty()).then(|| rest.join("\n\n")),
            params: self.params,
        }
    }
}

/// Remove the common indentation of every line after the first
fn dedent(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    let indent = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            if index == 0 || line.trim().is_empty() {
                line.trim_start().to_string()
            } else {
                line.get(indent..).unwrap_or_else(|| line.trim_start()).to_string()
            }
        })
        .collect()
}

fn is_underline(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 3 && trimmed.chars().all(|c| c == '-')
}

fn is_param_header(heading: &str) -> bool {
    let lower = heading.trim().trim_end_matches(':').to_lowercase();
    PARAM_HEADERS.contains(&lower.as_str())
}

fn strip_bullet(line: &str) -> Option<&str> {
    ["* ", "- ", "+ "]
        .iter()
        .find_map(|bullet| line.strip_prefix(bullet))
        .map(str::trim_start)
}

/// `:param [type] name: text` or `@param name text`
fn parse_rest_field(line: &str) -> Option<(String, String)> {
    if let Some(rest) = line.strip_prefix('@') {
        let mut tokens = rest.splitn(3, char::is_whitespace);
        let field = tokens.next()?;
        if !REST_PARAM_FIELDS.contains(&field) {
            return None;
        }
        let name = tokens.next()?.trim();
        let text = tokens.next().unwrap_or("").trim();
        return (!name.is_empty()).then(|| (name.to_string(), text.to_string()));
    }

    let rest = line.strip_prefix(':')?;
    let (field, text) = rest.split_once(':')?;
    let tokens: Vec<&str> = field.split_whitespace().collect();
    match tokens.as_slice() {
        [kind, .., name] if tokens.len() >= 2 && REST_PARAM_FIELDS.contains(kind) => {
            Some((name.to_string(), text.trim().to_string()))
        }
        _ => None,
    }
}

/// ```name` - text``, `name - text` or `name: text`
fn parse_markdown_item(item: &str) -> Option<(String, String)> {
    let (name, rest) = match item.strip_prefix('`') {
        Some(quoted) => {
            let end = quoted.find('`')?;
            (&quoted[..end], &quoted[end + 1..])
        }
        None => {
            let end = item
                .find(|c: char| c.is_whitespace() || c == ':')
                .unwrap_or(item.len());
            (&item[..end], &item[end..])
        }
    };
    let name = name.split(':').next().unwrap_or("").trim();
    if name.is_empty() {
        return None;
    }
    let text = rest
        .trim_start()
        .trim_start_matches(['-', ':', '–', '—'])
        .trim();
    Some((name.to_string(), text.to_string()))
}

/// `name (type): text` or `name: text`
fn parse_google_item(item: &str) -> (Vec<String>, String) {
    let (head, text) = item.split_once(':').unwrap_or((item, ""));
    let name = head
        .split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .unwrap_or("")
        .trim_start_matches('*');
    let names = if name.is_empty() {
        Vec::new()
    } else {
        vec![name.to_string()]
    };
    (names, text.trim().to_string())
}

/// `name : type` or `a, b : type`
fn parse_numpy_item(item: &str) -> Vec<String> {
    let head = item.split_once(':').map_or(item, |(head, _)| head);
    head.split(',')
        .map(|name| name.trim().trim_start_matches('*'))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_doc() {
        let doc = parse_doc("");
        assert_eq!(doc, ParsedDoc::default());
    }

    #[test]
    fn test_rustdoc_arguments_section() {
        let doc = parse_doc(
            " Get the current weather in a given location\n\
             \n \
             Uses a fixed forecast.\n\
             \n \
             # Arguments\n\
             \n \
             * `location` - The city and state, e.g. San Francisco, CA\n \
             * `unit` - Temperature unit,\n   \
               either celsius or fahrenheit\n\
             \n \
             # Examples\n\
             \n \
             * `ignored` - not a parameter",
        );

        assert_eq!(
            doc.short_description.as_deref(),
            Some("Get the current weather in a given location")
        );
        assert_eq!(doc.long_description.as_deref(), Some("Uses a fixed forecast."));
        assert_eq!(
            doc.param("location"),
            Some("The city and state, e.g. San Francisco, CA")
        );
        assert_eq!(
            doc.param("unit"),
            Some("Temperature unit, either celsius or fahrenheit")
        );
        assert_eq!(doc.param("ignored"), None);
    }

    #[test]
    fn test_rest_fields() {
        let doc = parse_doc(
            "Add two numbers.\n\n\
             :param a: first operand\n\
             :param int b: second\n    operand\n\
             :returns: the sum\n",
        );

        assert_eq!(doc.short_description.as_deref(), Some("Add two numbers."));
        assert_eq!(doc.param("a"), Some("first operand"));
        assert_eq!(doc.param("b"), Some("second operand"));
        assert_eq!(doc.params.len(), 2);
    }

    #[test]
    fn test_google_args_section() {
        let doc = parse_doc(
            "Book a flight.\n\n\
             Args:\n    \
             origin (str): Departure airport\n    \
             destination: Arrival airport,\n        \
             as an IATA code\n\n\
             Returns:\n    \
             booking: not a parameter\n",
        );

        assert_eq!(doc.short_description.as_deref(), Some("Book a flight."));
        assert_eq!(doc.param("origin"), Some("Departure airport"));
        assert_eq!(doc.param("destination"), Some("Arrival airport, as an IATA code"));
        assert_eq!(doc.param("booking"), None);
    }

    #[test]
    fn test_numpy_parameters_section() {
        let doc = parse_doc(
            "Scale a vector.\n\n\
             Parameters\n\
             ----------\n\
             x, y : float\n    \
             Coordinates\n\
             factor : int\n    \
             Multiplier\n\n\
             Returns\n\
             -------\n\
             tuple\n",
        );

        assert_eq!(doc.short_description.as_deref(), Some("Scale a vector."));
        assert_eq!(doc.param("x"), Some("Coordinates"));
        assert_eq!(doc.param("y"), Some("Coordinates"));
        assert_eq!(doc.param("factor"), Some("Multiplier"));
        assert_eq!(doc.param("tuple"), None);
    }

    #[test]
    fn test_short_description_is_first_paragraph() {
        let doc = parse_doc("Line one\ncontinues here.\n\nSecond paragraph.");
        assert_eq!(doc.short_description.as_deref(), Some("Line one continues here."));
        assert_eq!(doc.long_description.as_deref(), Some("Second paragraph."));
    }

    #[test]
    fn test_tags_only_has_no_short_description() {
        let doc = parse_doc(":param location: where");
        assert_eq!(doc.short_description, None);
        assert_eq!(doc.param("location"), Some("where"));
    }

    #[test]
    fn test_code_blocks_are_skipped() {
        let doc = parse_doc("Summary\n\n```\n# Arguments\n* `x` - nope\n```\n");
        assert_eq!(doc.short_description.as_deref(), Some("Summary"));
        assert!(doc.params.is_empty());
    }

    #[test]
    fn test_undocumented_entry_is_omitted() {
        let doc = parse_doc("# Arguments\n* `bare`\n* `named` - text");
        assert_eq!(doc.param("bare"), None);
        assert_eq!(doc.param("named"), Some("text"));
    }
}
