//! Markdown to sanitized HTML, anchored to a repository context.
//!
//! Pipeline:
//! 1. Parse with pulldown-cmark (tables, strikethrough, task lists,
//!    footnotes enabled).
//! 2. Rewrite image events: missing/empty destinations degrade to their alt
//!    text, absolute `http(s)` destinations pass through, everything else is
//!    resolved against the repository's raw-content URL with a leading `./`
//!    stripped.
//! 3. Substitute GitHub `:shortcode:` emoji in text events. Code spans and
//!    code blocks keep their shortcodes literal.
//! 4. Sanitize the whole fragment through ammonia's allow-list. README text
//!    is authored by third parties and is untrusted; this step runs on every
//!    render.
//!
//! The default branch is assumed to be `main` rather than queried from the
//! API. Repositories whose primary branch has another name will get broken
//! image links; known limitation.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

pub const RAW_CONTENT_HOST: &str = "https://raw.githubusercontent.com";
pub const DEFAULT_BRANCH: &str = "main";

/// Presentational class attached to every rendered image. Styling contract
/// only; security comes from the sanitizer.
const README_IMAGE_CLASS: &str = "readme-image";

/// Fixed fragment substituted when a repository has no README.
pub const README_MISSING_HTML: &str =
    r#"<p class="readme-missing">No README.md found for this project.</p>"#;

/// Renders one repository's README. Replaced wholesale when the selected
/// repository changes.
pub struct ReadmeRenderer {
    owner: String,
    repo: String,
    branch: String,
}

impl ReadmeRenderer {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: DEFAULT_BRANCH.to_string(),
        }
    }

    /// Parse, resolve image links, and sanitize. Pure: the same input in the
    /// same repository context always yields the same fragment.
    pub fn render(&self, markdown: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_FOOTNOTES);

        let parser = Parser::new_ext(markdown, options);
        let events = self.rewrite_images(parser);

        let mut raw_html = String::new();
        html::push_html(&mut raw_html, events.into_iter());

        sanitize(&raw_html)
    }

    /// Replace every markdown image with a pre-built `<img>` fragment (or
    /// bare alt text when the destination is unusable). Alt text is collected
    /// from the events between the image start and end tags.
    fn rewrite_images<'a>(&self, parser: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
        let mut events = Vec::new();
        let mut pending: Option<PendingImage> = None;
        let mut in_code_block = false;

        for event in parser {
            match event {
                Event::Start(Tag::Image { dest_url, title, .. }) => {
                    pending = Some(PendingImage {
                        dest: dest_url.into_string(),
                        title: title.into_string(),
                        alt: String::new(),
                    });
                }
                Event::End(TagEnd::Image) => {
                    if let Some(image) = pending.take() {
                        events.push(Event::Html(CowStr::from(self.image_html(&image))));
                    }
                }
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code_block = true;
                    events.push(Event::Start(Tag::CodeBlock(kind)));
                }
                Event::End(TagEnd::CodeBlock) => {
                    in_code_block = false;
                    events.push(Event::End(TagEnd::CodeBlock));
                }
                Event::Text(text) => {
                    let text = if in_code_block {
                        text
                    } else {
                        replace_emoji_shortcodes(text)
                    };
                    match pending.as_mut() {
                        Some(image) => image.alt.push_str(&text),
                        None => events.push(Event::Text(text)),
                    }
                }
                other => match pending.as_mut() {
                    Some(image) => match other {
                        Event::Code(code) => image.alt.push_str(&code),
                        Event::SoftBreak | Event::HardBreak => image.alt.push(' '),
                        _ => {}
                    },
                    None => events.push(other),
                },
            }
        }

        events
    }

    fn image_html(&self, image: &PendingImage) -> String {
        let Some(url) = self.resolve_image_url(&image.dest) else {
            // No usable path: render the alt text alone, not a broken image.
            return escape_html(&image.alt);
        };

        let mut img = format!(
            r#"<img src="{}" alt="{}""#,
            escape_attr(&url),
            escape_attr(&image.alt)
        );
        if !image.title.is_empty() {
            img.push_str(&format!(r#" title="{}""#, escape_attr(&image.title)));
        }
        img.push_str(&format!(r#" class="{}">"#, README_IMAGE_CLASS));
        img
    }

    /// Absolute-scheme destinations pass through untouched; relative ones are
    /// rewritten to `<raw-host>/<owner>/<repo>/<branch>/<path>` with any
    /// leading `./` stripped. Empty destinations resolve to nothing.
    fn resolve_image_url(&self, dest: &str) -> Option<String> {
        if dest.is_empty() {
            return None;
        }
        if dest.starts_with("http") {
            return Some(dest.to_string());
        }

        let path = dest.strip_prefix("./").unwrap_or(dest);
        Some(format!(
            "{}/{}/{}/{}/{}",
            RAW_CONTENT_HOST, self.owner, self.repo, self.branch, path
        ))
    }
}

struct PendingImage {
    dest: String,
    title: String,
    alt: String,
}

/// Allow-list sanitization. Ammonia's defaults already strip scripts, inline
/// event handlers, and javascript: URLs; the only addition is the
/// presentational `class` on images.
fn sanitize(html: &str) -> String {
    ammonia::Builder::default()
        .add_tag_attributes("img", &["class"])
        .clean(html)
        .to_string()
}

/// Substitute GitHub emoji shortcodes (`:tada:` → 🎉) in display text.
/// Unrecognized codes stay literal, as do stray colons.
fn replace_emoji_shortcodes(text: CowStr<'_>) -> CowStr<'_> {
    if !text.contains(':') {
        return text;
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text.as_ref();
    while let Some(start) = rest.find(':') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find(':') {
            Some(end) if end > 0 => match emojis::get_by_shortcode(&after[..end]) {
                Some(emoji) => {
                    out.push_str(emoji.as_str());
                    rest = &after[end + 1..];
                }
                None => {
                    out.push(':');
                    rest = after;
                }
            },
            _ => {
                out.push(':');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    CowStr::from(out)
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(text: &str) -> String {
    escape_html(text).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> ReadmeRenderer {
        ReadmeRenderer::new("alice", "tool-x")
    }

    #[test]
    fn relative_image_resolves_to_raw_content_url() {
        let html = renderer().render("![logo](./img/logo.png)");
        assert!(
            html.contains(r#"src="https://raw.githubusercontent.com/alice/tool-x/main/img/logo.png""#),
            "unexpected output: {}",
            html
        );
    }

    #[test]
    fn relative_image_without_dot_slash_also_resolves() {
        let html = renderer().render("![shot](docs/shot.png)");
        assert!(html.contains(r#"src="https://raw.githubusercontent.com/alice/tool-x/main/docs/shot.png""#));
    }

    #[test]
    fn absolute_image_passes_through_unchanged() {
        let html = renderer().render("![badge](https://img.shields.io/badge.svg)");
        assert!(html.contains(r#"src="https://img.shields.io/badge.svg""#));
    }

    #[test]
    fn empty_destination_degrades_to_alt_text() {
        let html = renderer().render("![just the alt]()");
        assert!(!html.contains("<img"));
        assert!(html.contains("just the alt"));
    }

    #[test]
    fn image_carries_title_and_styling_class() {
        let html = renderer().render(r#"![alt](./a.png "A title")"#);
        assert!(html.contains(r#"title="A title""#));
        assert!(html.contains(r#"class="readme-image""#));
    }

    #[test]
    fn emoji_shortcodes_are_substituted() {
        let html = renderer().render("Release :tada: now with :rocket: speed");
        assert!(html.contains('🎉'), "unexpected output: {}", html);
        assert!(html.contains('🚀'));
        assert!(!html.contains(":tada:"));
    }

    #[test]
    fn unknown_shortcodes_stay_literal() {
        let html = renderer().render("ratio 3:2:1 and :definitely_not_an_emoji:");
        assert!(html.contains("3:2:1"));
        assert!(html.contains(":definitely_not_an_emoji:"));
    }

    #[test]
    fn shortcodes_in_code_are_untouched() {
        let html = renderer().render("`:tada:`\n\n```\nprint(':rocket:')\n```");
        assert!(html.contains(":tada:"));
        assert!(html.contains(":rocket:"));
        assert!(!html.contains('🎉'));
        assert!(!html.contains('🚀'));
    }

    #[test]
    fn script_tags_are_stripped() {
        let html = renderer().render("hello\n\n<script>alert('xss')</script>\n\nworld");
        assert!(!html.contains("<script"));
        assert!(html.contains("hello"));
        assert!(html.contains("world"));
    }

    #[test]
    fn inline_event_handlers_are_stripped() {
        let html = renderer().render(r#"<img src="x" onerror="alert(1)">"#);
        assert!(!html.contains("onerror"));
    }

    #[test]
    fn render_is_idempotent_for_same_context() {
        let markdown = "# Title\n\n![logo](./logo.png)\n\n- a\n- b\n\n`code`";
        let first = renderer().render(markdown);
        let second = renderer().render(markdown);
        assert_eq!(first, second);
    }

    #[test]
    fn markdown_structure_survives_sanitization() {
        let html = renderer().render("# Heading\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n```rust\nfn x() {}\n```");
        assert!(html.contains("<h1"));
        assert!(html.contains("<table"));
        assert!(html.contains("<code"));
    }
}
