//! Parsed view of documentation markup
//!
//! Pages are parsed once with `scraper`, which recovers from unclosed tags,
//! stray `<` characters, quoted `>` in attributes and entities the way a
//! browser does. The extractors only ask for text: titles, headings, table
//! cells, code blocks and the visible text of the whole page.

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// Elements whose text is never visible
const SKIP_ELEMENTS: &[&str] = &[
    "head", "script", "style", "noscript", "iframe", "svg", "template",
];

/// Elements that end a line of visible text
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "br", "h1", "h2", "h3", "h4", "h5", "h6", "li", "tr", "pre", "table", "section",
    "article", "header", "footer", "blockquote", "dt", "dd",
];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("hardcoded selector is valid")
}

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static META: LazyLock<Selector> = LazyLock::new(|| selector("meta"));
static SCRIPT_SRC: LazyLock<Selector> = LazyLock::new(|| selector("script[src]"));
static HEADINGS: LazyLock<Selector> = LazyLock::new(|| selector("h1, h2, h3, h4, h5, h6"));
static TABLES: LazyLock<Selector> = LazyLock::new(|| selector("table"));
static ROWS: LazyLock<Selector> = LazyLock::new(|| selector("tr"));
static CODE: LazyLock<Selector> = LazyLock::new(|| selector("pre, code"));

/// A table as its flattened text plus the cell text of each of its rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub text: String,
    pub rows: Vec<Vec<String>>,
}

/// A parsed HTML document
pub struct Page {
    document: Html,
}

impl Page {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// Text of the first non-empty `<title>`
    pub fn title(&self) -> Option<String> {
        self.document
            .select(&TITLE)
            .map(inline_text)
            .find(|t| !t.is_empty())
    }

    /// `content` of the first `<meta>` whose `name` (or else `property`) matches
    pub fn meta_content(&self, meta_name: &str) -> Option<String> {
        self.document.select(&META).find_map(|meta| {
            let element = meta.value();
            let name = element.attr("name").or_else(|| element.attr("property"))?;
            if !name.eq_ignore_ascii_case(meta_name) {
                return None;
            }
            element
                .attr("content")
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
        })
    }

    /// `src` of every external script, in document order
    pub fn script_sources(&self) -> Vec<String> {
        self.document
            .select(&SCRIPT_SRC)
            .filter_map(|script| script.value().attr("src"))
            .map(str::trim)
            .filter(|src| !src.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Non-empty headings as (level, text) pairs in document order
    pub fn headings(&self) -> Vec<(u8, String)> {
        self.document
            .select(&HEADINGS)
            .filter_map(|heading| {
                let level = heading_level(heading.value().name())?;
                let text = inline_text(heading);
                (!text.is_empty()).then_some((level, text))
            })
            .collect()
    }

    /// Single-line text of every element matched by `selector`
    pub fn texts(&self, selector: &Selector) -> Vec<String> {
        self.document.select(selector).map(inline_text).collect()
    }

    /// Every table with the rows that belong to it (not to nested tables)
    pub fn tables(&self) -> Vec<Table> {
        self.document
            .select(&TABLES)
            .map(|table| Table {
                text: inline_text(table),
                rows: table
                    .select(&ROWS)
                    .filter(|row| nearest_ancestor(*row, "table").is_some_and(|t| t.id() == table.id()))
                    .map(row_cells)
                    .collect(),
            })
            .collect()
    }

    /// Raw text of `<pre>` blocks and of multi-line `<code>` outside them
    ///
    /// Whitespace is kept as served since indentation matters in code.
    pub fn code_blocks(&self) -> Vec<String> {
        self.document
            .select(&CODE)
            .filter_map(|element| {
                let code: String = element.text().collect();
                let keep = element.value().name() == "pre"
                    || (code.contains('\n') && nearest_ancestor(element, "pre").is_none());
                keep.then_some(code)
            })
            .collect()
    }

    /// Visible text with line structure preserved
    pub fn visible_text(&self) -> String {
        enum Walk<'a> {
            Enter(ElementRef<'a>),
            Text(&'a str),
            Break,
        }

        let mut output = String::new();
        let mut stack = vec![Walk::Enter(self.document.root_element())];

        while let Some(step) = stack.pop() {
            match step {
                Walk::Text(text) => output.push_str(text),
                Walk::Break => output.push('\n'),
                Walk::Enter(element) => {
                    let name = element.value().name();
                    if SKIP_ELEMENTS.contains(&name) {
                        continue;
                    }
                    if BLOCK_ELEMENTS.contains(&name) {
                        output.push('\n');
                        stack.push(Walk::Break);
                    } else if matches!(name, "td" | "th") {
                        output.push(' ');
                    }

                    let children: Vec<_> = element.children().collect();
                    for child in children.into_iter().rev() {
                        if let Some(child) = ElementRef::wrap(child) {
                            stack.push(Walk::Enter(child));
                        } else if let Node::Text(text) = child.value() {
                            stack.push(Walk::Text(&**text));
                        }
                    }
                }
            }
        }

        clean_whitespace(&output)
    }
}

/// Element text collapsed onto one line
fn inline_text(element: ElementRef<'_>) -> String {
    let text: String = element.text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn row_cells(row: ElementRef<'_>) -> Vec<String> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| matches!(cell.value().name(), "td" | "th"))
        .map(inline_text)
        .collect()
}

fn nearest_ancestor<'a>(element: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == name)
}

fn heading_level(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Clean whitespace: collapse runs, trim, keep max 2 newlines
pub fn clean_whitespace(s: &str) -> String {
    let mut result = String::new();
    let mut last_was_space = false;
    let mut newline_count = 0;

    for c in s.chars() {
        if c == '\n' {
            if last_was_space && result.ends_with(' ') {
                result.pop();
            }
            newline_count += 1;
            last_was_space = true;
            if newline_count <= 2 {
                result.push(c);
            }
        } else if c.is_whitespace() {
            if !last_was_space {
                result.push(' ');
                last_was_space = true;
            }
        } else {
            newline_count = 0;
            last_was_space = false;
            result.push(c);
        }
    }

    result.trim().to_string()
}
