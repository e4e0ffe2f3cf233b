//! Small helpers over `scraper` for the labelled-table pages we read
//!
//! Both scraped sites lay out facts as `<tr><th>Label</th><td>Value</td></tr>`.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static TH_SELECTOR: Lazy<Selector> = Lazy::new(|| css("th"));

/// Compile a selector known at build time
pub fn css(selector: &str) -> Selector {
    Selector::parse(selector).unwrap_or_else(|e| panic!("invalid selector {:?}: {}", selector, e))
}

/// Concatenated, trimmed text content
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// First element after `element` among its siblings
pub fn next_element_sibling(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

/// The `td` immediately following the first `th` whose text contains `label`
pub fn labeled_cell<'a>(document: &'a Html, label: &str) -> Option<ElementRef<'a>> {
    document
        .select(&TH_SELECTOR)
        .filter(|th| element_text(*th).contains(label))
        .find_map(|th| next_element_sibling(th).filter(|cell| cell.value().name() == "td"))
}

/// Trimmed text of the labelled cell; `None` when missing or empty
pub fn labeled_value(document: &Html, label: &str) -> Option<String> {
    labeled_cell(document, label)
        .map(element_text)
        .filter(|value| !value.is_empty())
}

/// Trimmed text of the first element matching `selector`
pub fn first_text(root: ElementRef<'_>, selector: &Selector) -> Option<String> {
    root.select(selector).next().map(element_text)
}

/// First capture group of `pattern` in `text`, parsed as an integer
pub fn first_number(text: &str, pattern: &Regex) -> Option<u32> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
