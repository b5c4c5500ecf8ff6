//! Raw email to plain-text subject and body

use crate::types::ParsedEmail;
use mailparse::{MailHeaderMap, ParsedMail};
use regex::Regex;
use scraper::{Html, Node};
use std::borrow::Cow;
use tracing::{debug, warn};

/// A line that can open a header block: `From ` envelope, a field name
/// followed by `:`, or a folded continuation
static HEADER_LINE_REGEX: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"^(From |[\x21-\x39\x3b-\x7e]*:|[\t ])").unwrap()
});

/// Parse raw email source into a plain-text subject and body
///
/// Never fails. Input whose first line is not a header, or that is not a
/// parseable message at all, is treated as a bare body with no subject.
#[must_use]
pub fn parse_email(raw: &str) -> ParsedEmail {
    if !starts_with_header(raw) {
        debug!("No header block, treating input as body");
        return headerless(raw);
    }

    let parsed = match mailparse::parse_mail(raw.as_bytes()) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Unparseable email structure, treating input as body: {e}");
            return headerless(raw);
        }
    };

    let subject = parsed.headers.get_first_value("Subject");
    let body = strip_html(&extract_body(&parsed));

    debug!(
        "Parsed email: subject={:?}, {} body chars",
        subject,
        body.chars().count()
    );

    ParsedEmail { subject, body }
}

fn starts_with_header(raw: &str) -> bool {
    raw.lines()
        .next()
        .is_none_or(|line| line.is_empty() || HEADER_LINE_REGEX.is_match(line))
}

fn headerless(raw: &str) -> ParsedEmail {
    ParsedEmail {
        subject: None,
        body: strip_html(raw),
    }
}

fn extract_body(parsed: &ParsedMail) -> String {
    if is_multipart(parsed) {
        // HTML-only multiparts deliberately yield an empty body
        find_plain_part(parsed).map_or_else(String::new, decode_payload)
    } else {
        decode_payload(parsed)
    }
}

fn is_multipart(parsed: &ParsedMail) -> bool {
    !parsed.subparts.is_empty() || parsed.ctype.mimetype.to_lowercase().starts_with("multipart/")
}

/// First inline `text/plain` part, depth-first in document order
fn find_plain_part<'a, 'b>(part: &'b ParsedMail<'a>) -> Option<&'b ParsedMail<'a>> {
    if is_inline_plain_text(part) {
        return Some(part);
    }
    part.subparts.iter().find_map(find_plain_part)
}

fn is_inline_plain_text(part: &ParsedMail) -> bool {
    let is_plain = part.ctype.mimetype.eq_ignore_ascii_case("text/plain");
    let is_attachment = part
        .headers
        .get_first_value("Content-Disposition")
        .is_some_and(|disposition| disposition.contains("attachment"));

    is_plain && !is_attachment
}

fn decode_payload(part: &ParsedMail) -> String {
    match part.get_body_raw() {
        Ok(bytes) => lossy_utf8(&bytes),
        Err(e) => {
            warn!("Failed to decode body payload: {e}");
            String::new()
        }
    }
}

/// UTF-8 decode that drops invalid byte sequences instead of replacing them
fn lossy_utf8(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

/// Visible text of an HTML fragment
///
/// Tags, comments and the contents of `<script>` and `<style>` are removed and
/// entities are decoded. Whitespace, including `\r\n` line endings, is
/// preserved. Text without `<` or `&` is returned unchanged.
#[must_use]
pub fn strip_html(text: &str) -> String {
    if !text.contains(['<', '&']) {
        return text.to_string();
    }

    let fragment = Html::parse_fragment(&protect_carriage_returns(text));
    let mut result = String::with_capacity(text.len());

    for node in fragment.root_element().descendants() {
        if let Node::Text(content) = node.value() {
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| matches!(el.name(), "script" | "style"))
            });
            if !hidden {
                result.push_str(content);
            }
        }
    }

    result
}

/// Encode carriage returns outside tags as `&#13;`
///
/// The HTML tokenizer folds `\r\n` into `\n` before tokenizing, but a
/// character reference to CR survives into the text. Carriage returns inside
/// tags are left alone so tag names such as `</script\r\n>` still close.
fn protect_carriage_returns(html: &str) -> Cow<'_, str> {
    if !html.contains('\r') {
        return Cow::Borrowed(html);
    }

    let mut result = String::with_capacity(html.len() + 16);
    let mut in_tag = false;
    let mut chars = html.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '<' if chars
                .peek()
                .is_some_and(|next| next.is_ascii_alphabetic() || matches!(next, '/' | '!' | '?')) =>
            {
                in_tag = true;
            }
            '>' => in_tag = false,
            '\r' if !in_tag => {
                result.push_str("&#13;");
                continue;
            }
            _ => {}
        }
        result.push(c);
    }

    Cow::Owned(result)
}
