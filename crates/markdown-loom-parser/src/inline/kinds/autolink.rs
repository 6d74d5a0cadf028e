use std::ops::ControlFlow;
use std::sync::OnceLock;

use regex::Regex;

use super::scan;
use crate::ast::{
    Node, NodeKind,
    node_type::{LINK, NodeType},
};
use crate::inline::{Delimiter, InlineContext, InlineToken, InlineTokenData, InlineTokenizer};
use crate::source::{
    CodePoint, NodeInterval,
    chars::{is_scheme_char, is_whitespace},
    slice_string,
};
use crate::syntax::{chars, starts_with_ignore_case};

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
        )
        .expect("Invalid email autolink regex")
    })
}

fn domain_regex() -> &'static Regex {
    static DOMAIN_REGEX: OnceLock<Regex> = OnceLock::new();
    DOMAIN_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_-]+(?:\.[A-Za-z0-9_-]+)*").expect("Invalid domain regex")
    })
}

/// `scheme:rest` with a scheme of 2 to 32 characters.
fn is_absolute_uri(s: &str) -> bool {
    let Some((scheme, _)) = s.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(is_scheme_char)
        && (2..=32).contains(&scheme.len())
}

fn link_node(token: &InlineToken, text: NodeInterval, ctx: &InlineContext<'_>) -> Node {
    let (url, title) = match &token.data {
        InlineTokenData::Link { url, title } => (url.clone(), title.clone()),
        _ => (String::new(), None),
    };
    Node::with_children(
        NodeKind::Link { url, title },
        vec![Node::text(slice_string(ctx.points, text), ctx.position(text))],
        ctx.position(token.interval),
    )
}

/// `<scheme:...>` and `<user@host>`.
#[derive(Debug, Default)]
pub struct Autolink;

impl Autolink {
    pub const NAME: &'static str = "autolink";

    fn at(points: &[CodePoint], i: usize, end: usize) -> Option<Delimiter> {
        let mut j = i + 1;
        loop {
            if j >= end {
                return None;
            }
            match points[j].code_point {
                '>' => break,
                '<' => return None,
                c if is_whitespace(c) || c.is_control() => return None,
                _ => j += 1,
            }
        }
        let inner: String = chars(points, i + 1, j).into_iter().collect();
        let url = if is_absolute_uri(&inner) {
            inner
        } else if email_regex().is_match(&inner) {
            format!("mailto:{inner}")
        } else {
            return None;
        };
        Some(Delimiter::full(InlineToken::atomic(
            LINK,
            NodeInterval::new(i, j + 1),
            InlineTokenData::Link { url, title: None },
        )))
    }
}

impl InlineTokenizer for Autolink {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[LINK]
    }

    fn find_delimiter(
        &self,
        start: usize,
        end: usize,
        ctx: &InlineContext<'_>,
    ) -> Option<Delimiter> {
        let points = ctx.points;
        scan(points, start, end, |i| {
            if points[i].code_point == '<' {
                if let Some(found) = Self::at(points, i, end) {
                    return ControlFlow::Break(found);
                }
            }
            ControlFlow::Continue(i + 1)
        })
    }

    fn parse(&self, token: InlineToken, _children: Vec<Node>, ctx: &InlineContext<'_>) -> Node {
        let text = NodeInterval::new(token.interval.start_index + 1, token.interval.end_index - 1);
        link_node(&token, text, ctx)
    }
}

fn is_email_local(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '+')
}

fn is_domain_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_')
}

/// Length of `run` once trailing punctuation, unbalanced `)` and a trailing
/// entity-like `&name;` are dropped.
fn trim_trailing(run: &[char]) -> usize {
    let mut len = run.len();
    while len > 0 {
        match run[len - 1] {
            '?' | '!' | '.' | ',' | ':' | '*' | '_' | '~' | '"' | '\'' => len -= 1,
            ')' => {
                let opens = run[..len].iter().filter(|&&c| c == '(').count();
                let closes = run[..len].iter().filter(|&&c| c == ')').count();
                if closes > opens {
                    len -= 1;
                } else {
                    break;
                }
            }
            ';' => {
                let name_start = run[..len - 1]
                    .iter()
                    .rposition(|c| !c.is_ascii_alphanumeric())
                    .map_or(0, |k| k + 1);
                if name_start > 0 && name_start < len - 1 && run[name_start - 1] == '&' {
                    len = name_start - 1;
                } else {
                    break;
                }
            }
            _ => break,
        }
    }
    len
}

/// A domain of period-separated segments with no `_` in its last two
/// segments; `short` allows a single segment.
fn valid_domain(domain: &str, short: bool) -> bool {
    let segments: Vec<&str> = domain.split('.').collect();
    if segments.len() < 2 && !short {
        return false;
    }
    segments.iter().rev().take(2).all(|s| !s.contains('_'))
}

/// GFM extended autolinks: `www.`, `http://`, `https://` and bare emails.
#[derive(Debug, Default)]
pub struct AutolinkExtension;

impl AutolinkExtension {
    pub const NAME: &'static str = "autolinkExtension";

    fn web(points: &[CodePoint], i: usize, end: usize) -> Option<(usize, String)> {
        let bounded = &points[..end];
        let (prefix, short) = if starts_with_ignore_case(bounded, i, "www.") {
            (0, false)
        } else if starts_with_ignore_case(bounded, i, "https://") {
            (8, true)
        } else if starts_with_ignore_case(bounded, i, "http://") {
            (7, true)
        } else {
            return None;
        };
        let run_end = (i..end)
            .find(|&k| is_whitespace(points[k].code_point) || points[k].code_point == '<')
            .unwrap_or(end);
        let run = chars(points, i, run_end);
        let len = trim_trailing(&run);
        let rest: String = run[prefix.min(len)..len].iter().collect();
        let domain = domain_regex().find(&rest)?.as_str();
        if domain.is_empty() || !valid_domain(domain, short) {
            return None;
        }
        let text: String = run[..len].iter().collect();
        let url = if prefix == 0 {
            format!("http://{text}")
        } else {
            text
        };
        Some((len, url))
    }

    fn email(points: &[CodePoint], i: usize, end: usize) -> Option<(usize, String)> {
        if i > 0 && is_email_local(points[i - 1].code_point) {
            return None;
        }
        let at = (i..end).find(|&k| !is_email_local(points[k].code_point))?;
        if at == i || points[at].code_point != '@' {
            return None;
        }
        let mut k = at + 1;
        let mut last_dot = None;
        while k < end {
            let c = points[k].code_point;
            if is_domain_char(c) {
                k += 1;
            } else if c == '.'
                && k > at + 1
                && k + 1 < end
                && is_domain_char(points[k + 1].code_point)
            {
                last_dot = Some(k);
                k += 1;
            } else {
                break;
            }
        }
        last_dot?;
        if matches!(points[k - 1].code_point, '-' | '_') {
            return None;
        }
        let text: String = chars(points, i, k).into_iter().collect();
        Some((k - i, format!("mailto:{text}")))
    }
}

impl InlineTokenizer for AutolinkExtension {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[LINK]
    }

    fn find_delimiter(
        &self,
        start: usize,
        end: usize,
        ctx: &InlineContext<'_>,
    ) -> Option<Delimiter> {
        if ctx.in_link {
            return None;
        }
        let points = ctx.points;
        scan(points, start, end, |i| {
            let after_boundary = i == 0
                || matches!(points[i - 1].code_point, '*' | '_' | '~' | '(')
                || is_whitespace(points[i - 1].code_point);
            let found = if after_boundary {
                Self::web(points, i, end)
            } else {
                None
            };
            match found.or_else(|| Self::email(points, i, end)) {
                Some((len, url)) => ControlFlow::Break(Delimiter::full(InlineToken::atomic(
                    LINK,
                    NodeInterval::new(i, i + len),
                    InlineTokenData::Link { url, title: None },
                ))),
                None => ControlFlow::Continue(i + 1),
            }
        })
    }

    fn parse(&self, token: InlineToken, _children: Vec<Node>, ctx: &InlineContext<'_>) -> Node {
        link_node(&token, token.interval, ctx)
    }
}
