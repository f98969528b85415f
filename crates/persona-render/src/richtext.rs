//! Rich-text formatting.
//!
//! Turns styled fragments into an [`Inline`] tree, one node per fragment.
//! Styles nest in a fixed order, innermost first: bold, italic,
//! strikethrough, underline, code. A fragment with an `href` is wrapped in a
//! link around its styled content.

use html_escape::{encode_double_quoted_attribute_to_string, encode_text_to_string};
use persona_core::StyledTextFragment;

/// A renderable inline node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    /// Unstyled text.
    Text(String),
    /// `<strong>`
    Bold(Box<Inline>),
    /// `<em>`
    Italic(Box<Inline>),
    /// `<s>`
    Strikethrough(Box<Inline>),
    /// `<u>`
    Underline(Box<Inline>),
    /// `<code>`
    Code(Box<Inline>),
    /// Link opening in a new browsing context.
    Link {
        /// Exact link target.
        href: String,
        /// Link content.
        content: Box<Inline>,
    },
}

impl Inline {
    /// The text carried by this node.
    pub fn plain_text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Bold(inner)
            | Self::Italic(inner)
            | Self::Strikethrough(inner)
            | Self::Underline(inner)
            | Self::Code(inner)
            | Self::Link { content: inner, .. } => inner.plain_text(),
        }
    }

    /// The link target, if this node is a link.
    pub fn href(&self) -> Option<&str> {
        match self {
            Self::Link { href, .. } => Some(href),
            _ => None,
        }
    }

    /// Appends the HTML for this node to `out`.
    pub fn write_html(&self, out: &mut String) {
        match self {
            Self::Text(text) => {
                encode_text_to_string(text, out);
            }
            Self::Bold(inner) => wrap(out, "strong", inner),
            Self::Italic(inner) => wrap(out, "em", inner),
            Self::Strikethrough(inner) => wrap(out, "s", inner),
            Self::Underline(inner) => wrap(out, "u", inner),
            Self::Code(inner) => wrap(out, "code", inner),
            Self::Link { href, content } => {
                out.push_str("<a href=\"");
                encode_double_quoted_attribute_to_string(href, out);
                out.push_str("\" target=\"_blank\" rel=\"noopener noreferrer\">");
                content.write_html(out);
                out.push_str("</a>");
            }
        }
    }

    /// HTML for this node.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }
}

fn wrap(out: &mut String, tag: &str, inner: &Inline) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    inner.write_html(out);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

/// Formats one fragment.
pub fn format_fragment(fragment: &StyledTextFragment) -> Inline {
    let style = &fragment.annotations;
    let mut node = Inline::Text(fragment.plain_text.clone());

    if style.bold {
        node = Inline::Bold(Box::new(node));
    }
    if style.italic {
        node = Inline::Italic(Box::new(node));
    }
    if style.strikethrough {
        node = Inline::Strikethrough(Box::new(node));
    }
    if style.underline {
        node = Inline::Underline(Box::new(node));
    }
    if style.code {
        node = Inline::Code(Box::new(node));
    }

    match &fragment.href {
        Some(href) => Inline::Link {
            href: href.clone(),
            content: Box::new(node),
        },
        None => node,
    }
}

/// Formats a run of fragments, preserving their order.
pub fn format_rich_text(fragments: &[StyledTextFragment]) -> Vec<Inline> {
    fragments.iter().map(format_fragment).collect()
}

/// HTML for a formatted inline sequence.
pub fn render_inlines(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        inline.write_html(&mut out);
    }
    out
}

/// Formats and renders fragments straight to HTML.
pub fn rich_text_html(fragments: &[StyledTextFragment]) -> String {
    render_inlines(&format_rich_text(fragments))
}

/// Concatenated plain text of all fragments.
pub fn plain_text(fragments: &[StyledTextFragment]) -> String {
    fragments.iter().map(|f| f.plain_text.as_str()).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_input() {
        assert!(format_rich_text(&[]).is_empty());
        assert_eq!(rich_text_html(&[]), "");
    }

    #[test]
    fn test_plain_fragment() {
        let inlines = format_rich_text(&[StyledTextFragment::plain("hello")]);
        assert_eq!(inlines, vec![Inline::Text("hello".into())]);
        assert_eq!(render_inlines(&inlines), "hello");
    }

    #[test]
    fn test_style_nesting_order() {
        let fragment = StyledTextFragment::plain("x")
            .code()
            .underline()
            .strikethrough()
            .italic()
            .bold();
        assert_eq!(
            format_fragment(&fragment).to_html(),
            "<code><u><s><em><strong>x</strong></em></s></u></code>"
        );
    }

    #[test]
    fn test_bold_italic() {
        let fragment = StyledTextFragment::plain("hi").bold().italic();
        assert_eq!(
            format_fragment(&fragment),
            Inline::Italic(Box::new(Inline::Bold(Box::new(Inline::Text("hi".into())))))
        );
    }

    #[test]
    fn test_href_wraps_styled_text() {
        let fragment = StyledTextFragment::plain("site")
            .bold()
            .code()
            .with_href("https://example.com/a?b=1&c=2");
        let inline = format_fragment(&fragment);

        assert_eq!(inline.href(), Some("https://example.com/a?b=1&c=2"));
        assert_eq!(inline.plain_text(), "site");
        assert_eq!(
            inline.to_html(),
            "<a href=\"https://example.com/a?b=1&amp;c=2\" target=\"_blank\" \
             rel=\"noopener noreferrer\"><code><strong>site</strong></code></a>"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        let html = rich_text_html(&[StyledTextFragment::plain("<script>alert(1)</script> & co")]);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&amp; co"));
    }

    #[test]
    fn test_href_quote_is_escaped() {
        let html = rich_text_html(&[
            StyledTextFragment::plain("x").with_href("https://e.com/\" onclick=\"evil()")
        ]);
        assert!(!html.contains("\" onclick=\""));
    }

    #[test]
    fn test_format_is_pure() {
        let fragments = vec![
            StyledTextFragment::plain("a").bold(),
            StyledTextFragment::plain("b").with_href("https://b"),
        ];
        assert_eq!(format_rich_text(&fragments), format_rich_text(&fragments));
    }

    #[test]
    fn test_plain_text_concat() {
        let fragments = vec![
            StyledTextFragment::plain("Ada ").bold(),
            StyledTextFragment::plain("Lovelace"),
        ];
        assert_eq!(plain_text(&fragments), "Ada Lovelace");
    }

    fn fragment_strategy() -> impl Strategy<Value = (String, [bool; 5], bool)> {
        ("[a-z ]{0,8}", any::<[bool; 5]>(), any::<bool>())
    }

    proptest! {
        #[test]
        fn prop_order_and_exactly_once(specs in prop::collection::vec(fragment_strategy(), 0..12)) {
            let fragments: Vec<StyledTextFragment> = specs
                .iter()
                .enumerate()
                .map(|(i, (text, flags, link))| {
                    let mut fragment = StyledTextFragment::plain(format!("w{i}x{text}"));
                    fragment.annotations.bold = flags[0];
                    fragment.annotations.italic = flags[1];
                    fragment.annotations.strikethrough = flags[2];
                    fragment.annotations.underline = flags[3];
                    fragment.annotations.code = flags[4];
                    if *link {
                        fragment.href = Some(format!("https://example.com/{i}"));
                    }
                    fragment
                })
                .collect();

            let inlines = format_rich_text(&fragments);
            prop_assert_eq!(inlines.len(), fragments.len());
            for (inline, fragment) in inlines.iter().zip(&fragments) {
                prop_assert_eq!(inline.plain_text(), fragment.plain_text.as_str());
                prop_assert_eq!(inline.href(), fragment.href.as_deref());
            }

            let html = render_inlines(&inlines);
            let mut last = 0;
            for fragment in &fragments {
                prop_assert_eq!(html.matches(fragment.plain_text.as_str()).count(), 1);
                let at = html.find(fragment.plain_text.as_str()).unwrap();
                prop_assert!(at >= last);
                last = at;
            }
        }
    }
}
