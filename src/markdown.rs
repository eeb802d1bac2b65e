//! Minimal HTML to markdown conversion for puzzle descriptions.
//!
//! Rendering walks the element tree bottom-up: the children of an element are
//! rendered first and the resulting text is handed to the first [`Rule`] that
//! claims the element. Custom rules are consulted before the built-in ones, so
//! callers can override how any tag is rendered.

use scraper::node::Node;
use scraper::ElementRef;

/// A node transform: turns an element and its already rendered content into markdown.
pub trait Rule: Send + Sync {
    fn applies(&self, element: &ElementRef<'_>) -> bool;

    fn replace(&self, content: &str, element: &ElementRef<'_>) -> String;
}

/// Renders `<em>` as bold, which is how the puzzle site highlights key facts.
pub struct EmphasisAsBold;

impl Rule for EmphasisAsBold {
    fn applies(&self, element: &ElementRef<'_>) -> bool {
        element.value().name() == "em"
    }

    fn replace(&self, content: &str, _element: &ElementRef<'_>) -> String {
        format!("**{content}**")
    }
}

#[derive(Default)]
pub struct Renderer {
    rules: Vec<Box<dyn Rule>>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule that takes precedence over the built-in conversions and
    /// over rules added later.
    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Renders the children of every given element, concatenated.
    pub fn render_all<'a>(&self, elements: impl IntoIterator<Item = ElementRef<'a>>) -> String {
        let raw: String = elements
            .into_iter()
            .map(|element| self.render_children(&element))
            .collect();
        tidy(&raw)
    }

    fn render_children(&self, element: &ElementRef<'_>) -> String {
        let mut out = String::new();
        let list = matches!(element.value().name(), "ul" | "ol");
        for child in element.children() {
            match child.value() {
                Node::Text(text) if list && text.trim().is_empty() => {}
                Node::Text(text) => out.push_str(text),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        out.push_str(&self.render_element(&child));
                    }
                }
                _ => {}
            }
        }
        out
    }

    fn render_element(&self, element: &ElementRef<'_>) -> String {
        let content = self.render_children(element);
        match self.rules.iter().find(|rule| rule.applies(element)) {
            Some(rule) => rule.replace(&content, element),
            None => builtin(&content, element),
        }
    }
}

const FENCE: &str = "```";

fn builtin(content: &str, element: &ElementRef<'_>) -> String {
    let name = element.value().name();
    match name {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let depth = name[1..].parse().unwrap_or(1);
            format!("\n\n{} {}\n\n", "#".repeat(depth), content.trim())
        }
        "p" | "div" => format!("\n\n{}\n\n", content.trim()),
        "br" => "  \n".to_string(),
        "hr" => "\n\n* * *\n\n".to_string(),
        "em" | "i" => format!("_{content}_"),
        "strong" | "b" => format!("**{content}**"),
        "code" if !inside_pre(element) => format!("`{content}`"),
        "pre" => format!(
            "\n\n{FENCE}\n{}\n{FENCE}\n\n",
            content.trim_end_matches('\n')
        ),
        "a" => match element.value().attr("href") {
            Some(href) => format!("[{content}]({href})"),
            None => content.to_string(),
        },
        "ul" | "ol" => format!("\n\n{}\n\n", content.trim()),
        "li" => list_item(content, element),
        "script" | "style" => String::new(),
        _ => content.to_string(),
    }
}

fn inside_pre(element: &ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().name() == "pre")
}

fn list_item(content: &str, element: &ElementRef<'_>) -> String {
    let parent = element.parent().and_then(ElementRef::wrap);
    let prefix = match parent {
        Some(list) if list.value().name() == "ol" => {
            let index = element
                .prev_siblings()
                .filter_map(ElementRef::wrap)
                .filter(|sibling| sibling.value().name() == "li")
                .count();
            format!("{}.  ", index + 1)
        }
        _ => "*   ".to_string(),
    };
    let body = content.trim().replace('\n', "\n    ");
    format!("{prefix}{body}\n")
}

/// Collapses runs of blank lines and trims the document. Fenced code is
/// copied verbatim.
fn tidy(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut blank = 0;
    let mut fenced = false;
    for line in raw.lines() {
        if fenced {
            out.push('\n');
            out.push_str(line);
            fenced = line.trim() != FENCE;
            continue;
        }
        if line.trim() == FENCE {
            fenced = true;
        }
        if line.trim().is_empty() {
            blank += 1;
            continue;
        }
        if !out.is_empty() {
            out.push_str(if blank > 0 { "\n\n" } else { "\n" });
        }
        out.push_str(line.trim_end_matches(' ').trim_start_matches('\t'));
        if line.ends_with("  ") {
            out.push_str("  ");
        }
        blank = 0;
    }
    out
}

#[cfg(test)]
mod tests {
    use scraper::Html;

    use super::*;

    fn renderer() -> Renderer {
        Renderer::new().with_rule(EmphasisAsBold)
    }

    trait RenderFragment {
        fn render_fragment(&self, html: &str) -> String;
    }

    impl RenderFragment for Renderer {
        fn render_fragment(&self, html: &str) -> String {
            let fragment = Html::parse_fragment(html);
            self.render_all([fragment.root_element()])
        }
    }

    #[test]
    fn emphasis_should_render_bold() {
        let md = renderer().render_fragment("<p>You find <em>two</em> stars.</p>");
        assert_eq!(md, "You find **two** stars.");
    }

    #[test]
    fn builtin_emphasis_should_render_underscores() {
        let md = Renderer::new().render_fragment("<p>a <em>b</em></p>");
        assert_eq!(md, "a _b_");
    }

    #[test]
    fn earlier_rules_should_win() {
        struct Shout;
        impl Rule for Shout {
            fn applies(&self, element: &ElementRef<'_>) -> bool {
                element.value().name() == "em"
            }
            fn replace(&self, content: &str, _element: &ElementRef<'_>) -> String {
                content.to_uppercase()
            }
        }

        let md = Renderer::new()
            .with_rule(Shout)
            .with_rule(EmphasisAsBold)
            .render_fragment("<em>loud</em>");
        assert_eq!(md, "LOUD");
    }

    #[test]
    fn description_should_render_markdown() {
        let html = r#"<h2>--- Day 1: No Time for a Taxicab ---</h2>
<p>Santa's sleigh uses a <a href="/2016/about">very</a> high-precision clock.</p>
<p>For example:</p>
<ul>
<li>Following <code>R2, L3</code> leaves you <em>5</em> blocks away.</li>
<li><code>R5, L5, R5, R3</code> leaves you <em>12</em> blocks away.</li>
</ul>
<pre><code>a
b
</code></pre>"#;

        let md = renderer().render_fragment(html);

        insta::assert_snapshot!(md, @r###"
        ## --- Day 1: No Time for a Taxicab ---

        Santa's sleigh uses a [very](/2016/about) high-precision clock.

        For example:

        *   Following `R2, L3` leaves you **5** blocks away.
        *   `R5, L5, R5, R3` leaves you **12** blocks away.

        ```
        a
        b
        ```
        "###);
    }

    #[test]
    fn code_blocks_should_be_copied_verbatim() {
        let md = Renderer::new()
            .render_fragment("<p>Example:</p><pre><code>a\n\n\n\tb  \nc</code></pre><p>done</p>");
        assert_eq!(md, "Example:\n\n```\na\n\n\n\tb  \nc\n```\n\ndone");
    }

    #[test]
    fn ordered_lists_should_be_numbered() {
        let md = Renderer::new().render_fragment("<ol><li>one</li><li>two</li></ol>");
        assert_eq!(md, "1.  one\n2.  two");
    }
}
