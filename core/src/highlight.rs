//! A small JSON highlighter that renders settings as HTML spans.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use cascade_sdk::{CascadeError, CascadeResult, Highlighted, Highlighter};

pub const DEFAULT_MAX_BYTES: usize = 1024 * 1024;

/// Tokens rendered between deadline checks.
const DEADLINE_STRIDE: usize = 256;

#[derive(Debug, Clone)]
pub struct JsonHighlighter {
    max_bytes: usize,
    time_limit: Option<Duration>,
}

impl Default for JsonHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonHighlighter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            time_limit: None,
        }
    }

    #[must_use]
    pub const fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    #[must_use]
    pub const fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Renders `code` as `<pre class="hl-json">` markup.
    ///
    /// Comments are highlighted too, so raw default documents render as-is.
    #[must_use]
    pub fn render_html(&self, code: &str) -> Highlighted {
        if code.len() > self.max_bytes {
            tracing::debug!(bytes = code.len(), max_bytes = self.max_bytes, "input too large to highlight");
            return aborted();
        }
        let deadline = self.time_limit.map(|limit| Instant::now() + limit);

        let mut html = String::with_capacity(code.len() * 2);
        html.push_str(r#"<pre class="hl-json">"#);

        let mut scanner = Scanner { text: code, pos: 0 };
        let mut tokens = 0usize;
        while let Some((class, token)) = scanner.next_token() {
            tokens += 1;
            if tokens % DEADLINE_STRIDE == 0 && deadline.is_some_and(|d| Instant::now() >= d) {
                tracing::debug!(tokens, "highlight deadline passed");
                return aborted();
            }
            match class {
                Some(class) => {
                    html.push_str(r#"<span class=""#);
                    html.push_str(class);
                    html.push_str(r#"">"#);
                    escape_html(token, &mut html);
                    html.push_str("</span>");
                }
                None => escape_html(token, &mut html),
            }
        }

        html.push_str("</pre>");
        Highlighted {
            html,
            aborted: false,
        }
    }
}

#[async_trait]
impl Highlighter for JsonHighlighter {
    async fn render(&self, code: &str, language: &str) -> CascadeResult<Highlighted> {
        if !language.eq_ignore_ascii_case("json") {
            return Err(CascadeError::highlighter_unavailable(format!(
                "no grammar for language {language:?}"
            )));
        }
        Ok(self.render_html(code))
    }
}

fn aborted() -> Highlighted {
    Highlighted {
        html: String::new(),
        aborted: true,
    }
}

fn escape_html(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn take(&mut self, len: usize) -> &'a str {
        let token = &self.text[self.pos..self.pos + len];
        self.pos += len;
        token
    }

    /// Length of the longest prefix of the rest whose chars satisfy `pred`.
    fn span_while(&self, pred: impl Fn(char) -> bool) -> usize {
        self.rest()
            .char_indices()
            .find(|&(_, c)| !pred(c))
            .map_or(self.rest().len(), |(i, _)| i)
    }

    fn next_token(&mut self) -> Option<(Option<&'static str>, &'a str)> {
        let rest = self.rest();
        let first = rest.chars().next()?;

        let token = match first {
            c if c.is_whitespace() => {
                let len = self.span_while(char::is_whitespace);
                (None, self.take(len))
            }
            '"' => {
                let len = string_len(rest);
                let token = self.take(len);
                let class = if self.followed_by_colon() { "hl-key" } else { "hl-string" };
                (Some(class), token)
            }
            '{' | '}' | '[' | ']' | ':' | ',' => (Some("hl-punct"), self.take(1)),
            '-' | '0'..='9' => {
                let len = self.span_while(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'));
                (Some("hl-number"), self.take(len))
            }
            '/' if rest.starts_with("//") => {
                let len = rest.find('\n').unwrap_or(rest.len());
                (Some("hl-comment"), self.take(len))
            }
            '/' if rest.starts_with("/*") => {
                let len = rest[2..].find("*/").map_or(rest.len(), |end| end + 4);
                (Some("hl-comment"), self.take(len))
            }
            c if c.is_alphabetic() => {
                let len = self.span_while(char::is_alphanumeric);
                let word = self.take(len);
                let class = matches!(word, "true" | "false" | "null").then_some("hl-literal");
                (class, word)
            }
            c => (None, self.take(c.len_utf8())),
        };
        Some(token)
    }

    fn followed_by_colon(&self) -> bool {
        self.rest().trim_start().starts_with(':')
    }
}

/// Byte length of the string literal at the start of `text`, quotes included.
/// An unterminated literal runs to the end of the text.
fn string_len(text: &str) -> usize {
    let mut escaped = false;
    for (i, c) in text.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return i + 1,
            _ => {}
        }
    }
    text.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(code: &str) -> String {
        let out = JsonHighlighter::new().render_html(code);
        assert!(!out.aborted);
        out.html
    }

    #[test]
    fn keys_and_values_are_classified() {
        let html = render(r#"{"a": "b", "n": -1.5e3, "t": true, "z": null}"#);
        assert!(html.starts_with(r#"<pre class="hl-json"><span class="hl-punct">{</span>"#));
        assert!(html.contains(r#"<span class="hl-key">&quot;a&quot;</span>"#));
        assert!(html.contains(r#"<span class="hl-string">&quot;b&quot;</span>"#));
        assert!(html.contains(r#"<span class="hl-number">-1.5e3</span>"#));
        assert!(html.contains(r#"<span class="hl-literal">true</span>"#));
        assert!(html.contains(r#"<span class="hl-literal">null</span>"#));
        assert!(html.ends_with("</pre>"));
    }

    #[test]
    fn comments_are_highlighted() {
        let html = render("// top\n{ /* in */ }");
        assert!(html.contains(r#"<span class="hl-comment">// top</span>"#));
        assert!(html.contains(r#"<span class="hl-comment">/* in */</span>"#));
    }

    #[test]
    fn markup_is_escaped() {
        let html = render(r#"{"x": "<script>&'"}"#);
        assert!(html.contains("&lt;script&gt;&amp;&#39;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn escaped_quotes_stay_inside_strings() {
        let html = render(r#"{"k": "say \"hi\""}"#);
        assert!(html.contains(r#"<span class="hl-string">&quot;say \&quot;hi\&quot;&quot;</span>"#));
    }

    #[test]
    fn key_followed_by_whitespace_then_colon() {
        let html = render("{\"spaced\"\n  : 1}");
        assert!(html.contains(r#"<span class="hl-key">&quot;spaced&quot;</span>"#));
    }

    #[test]
    fn non_ascii_text_is_preserved() {
        let html = render(r#"{"motd": ["héllo ✓"]}"#);
        assert!(html.contains("héllo ✓"));
    }

    #[test]
    fn oversized_input_aborts() {
        let out = JsonHighlighter::new().with_max_bytes(4).render_html("[1, 2, 3]");
        assert!(out.aborted);
        assert!(out.html.is_empty());
    }

    #[test]
    fn expired_deadline_aborts() {
        let code = format!("[{}]", vec!["1"; 2000].join(","));
        let out = JsonHighlighter::new()
            .with_time_limit(Duration::ZERO)
            .render_html(&code);
        assert!(out.aborted);
    }

    #[tokio::test]
    async fn only_json_is_supported() {
        let err = JsonHighlighter::new().render("x", "go").await.unwrap_err();
        assert!(matches!(err, CascadeError::HighlighterUnavailable(_)));
        assert!(JsonHighlighter::new().render("{}", "JSON").await.is_ok());
    }
}
