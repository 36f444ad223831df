use crate::parsers::text::{self, TextCleanOptions};
use crate::results::ExtractedItem;
use crate::sources::SourceSpec;
use crate::utils::absolute_url;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Per-source limits applied while mapping result blocks to items
#[derive(Debug, Clone, Copy)]
pub struct ItemLimits {
    /// Stop after this many items
    pub max_items: usize,
    /// Skip blocks whose title is shorter than this
    pub min_title_chars: usize,
    /// Cut summaries to this many characters
    pub summary_max_chars: usize,
}

impl Default for ItemLimits {
    fn default() -> Self {
        Self {
            max_items: 5,
            min_title_chars: 5,
            summary_max_chars: 300,
        }
    }
}

/// Extracts result items from an HTML snapshot of a source's results page.
///
/// Result containers come from the first of `spec.result_selectors` that
/// matches anything; containers are visited in document order. Blocks
/// without a usable title or link are skipped.
pub fn extract_items(
    html: &str,
    base: &Url,
    spec: &SourceSpec,
    limits: &ItemLimits,
) -> Vec<ExtractedItem> {
    let doc = Html::parse_document(html);

    let Some((matched, containers)) = first_match(&doc, &spec.result_selectors) else {
        ::log::debug!("{}: no result selector matched the snapshot", spec.id);
        return Vec::new();
    };
    ::log::debug!(
        "{}: selector {:?} matched {} result blocks",
        spec.id,
        matched,
        containers.len()
    );

    let title_selectors = compile_all(&spec.title_selectors);
    let summary_selectors = compile_all(&spec.summary_selectors);

    let mut items = Vec::new();
    for (index, container) in containers.into_iter().enumerate() {
        if items.len() >= limits.max_items {
            break;
        }

        match build_item(
            container,
            base,
            spec,
            &title_selectors,
            &summary_selectors,
            limits,
        ) {
            Some(item) => items.push(item),
            None => ::log::trace!("{}: skipped result block {}", spec.id, index),
        }
    }

    items
}

/// First candidate that matches at least one element, with its matches
fn first_match<'a, 'c>(
    doc: &'a Html,
    candidates: &'c [String],
) -> Option<(&'c str, Vec<ElementRef<'a>>)> {
    for candidate in candidates {
        let Some(selector) = compile(candidate) else {
            continue;
        };
        let found: Vec<ElementRef<'a>> = doc.select(&selector).collect();
        if !found.is_empty() {
            return Some((candidate.as_str(), found));
        }
    }
    None
}

fn compile(candidate: &str) -> Option<Selector> {
    match Selector::parse(candidate) {
        Ok(selector) => Some(selector),
        Err(e) => {
            ::log::warn!("Skipping unparseable selector {:?}: {:?}", candidate, e);
            None
        }
    }
}

fn compile_all(candidates: &[String]) -> Vec<Selector> {
    candidates.iter().filter_map(|c| compile(c)).collect()
}

fn build_item(
    container: ElementRef<'_>,
    base: &Url,
    spec: &SourceSpec,
    title_selectors: &[Selector],
    summary_selectors: &[Selector],
    limits: &ItemLimits,
) -> Option<ExtractedItem> {
    let title_el = title_selectors
        .iter()
        .find_map(|selector| container.select(selector).next())?;

    let title = text::clean(&element_text(title_el));
    if !text::is_substantive(&title, limits.min_title_chars) {
        return None;
    }

    let url = link_of(title_el)
        .or_else(|| first_link(container))
        .and_then(|href| absolute_url(base, href))?;

    let summary_options = TextCleanOptions {
        max_chars: Some(limits.summary_max_chars),
        ..TextCleanOptions::default()
    };
    let summary = summary_selectors
        .iter()
        .flat_map(|selector| container.select(selector))
        .map(|el| text::clean(&element_text(el)))
        .find(|s| !s.is_empty() && *s != title)
        .map(|s| text::clean_with_options(&s, &summary_options))
        .unwrap_or_default();

    Some(ExtractedItem::new(
        title,
        url,
        summary,
        spec.category.clone(),
        spec.id.clone(),
    ))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

/// The element's own href if it is an anchor, else its first descendant link
fn link_of(el: ElementRef<'_>) -> Option<&str> {
    if el.value().name() == "a" {
        if let Some(href) = el.value().attr("href") {
            return Some(href);
        }
    }
    first_link(el)
}

fn first_link(el: ElementRef<'_>) -> Option<&str> {
    let selector = Selector::parse("a[href]").ok()?;
    el.select(&selector)
        .find_map(|a| a.value().attr("href"))
}
