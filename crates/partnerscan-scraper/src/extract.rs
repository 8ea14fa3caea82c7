//! Selector-driven extraction of partner entries from one listing page.
//!
//! A [`CompiledSource`] holds the parsed CSS selectors of a
//! [`SourceConfig`]. `scraper::Html` is not `Send`; callers keep a parsed
//! document inside a block that contains no `.await`.

use partnerscan_core::{locate, NewPartnerRecord, PartnerRecord, PopularityTier, SourceConfig};
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use crate::client::resolve_link;
use crate::error::ScraperError;
use crate::normalize::{
    collapse_whitespace, normalize_phone, parse_cashback, parse_miles, parse_terms,
};

/// Records and skip count for one page.
#[derive(Debug, Default)]
pub struct PageExtraction {
    pub records: Vec<PartnerRecord>,
    /// Entry elements that matched `entry_selector` but yielded no record.
    pub skipped: usize,
}

struct CompiledField {
    /// `None` reads from the entry element itself.
    selector: Option<Selector>,
    attr: Option<String>,
}

struct CompiledFields {
    name: CompiledField,
    phone: Option<CompiledField>,
    address: Option<CompiledField>,
    city: Option<CompiledField>,
    category: Option<CompiledField>,
    cashback: Option<CompiledField>,
    miles: Option<CompiledField>,
    installments: Option<CompiledField>,
    popularity: Option<CompiledField>,
}

/// A source with its selectors parsed and ready to run.
pub struct CompiledSource {
    name: String,
    entry: Selector,
    fields: CompiledFields,
    next_page: Option<Selector>,
}

impl std::fmt::Debug for CompiledSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledSource")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl CompiledSource {
    /// Parses every selector in `source`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] naming the first selector
    /// that does not parse.
    pub fn compile(source: &SourceConfig) -> Result<Self, ScraperError> {
        let name = source.name.clone();
        let parse = |field: &str, css: &str| -> Result<Selector, ScraperError> {
            Selector::parse(css).map_err(|e| ScraperError::InvalidSelector {
                source_name: name.clone(),
                field: field.to_owned(),
                reason: e.to_string(),
            })
        };
        let compile_field = |field: &str,
                             sel: &partnerscan_core::FieldSelector|
         -> Result<CompiledField, ScraperError> {
            Ok(CompiledField {
                selector: sel.selector().map(|css| parse(field, css)).transpose()?,
                attr: sel.attr().map(str::to_owned),
            })
        };
        let optional = |field: &str,
                        sel: Option<&partnerscan_core::FieldSelector>|
         -> Result<Option<CompiledField>, ScraperError> {
            sel.map(|s| compile_field(field, s)).transpose()
        };

        let f = &source.fields;
        let fields = CompiledFields {
            name: compile_field("name", &f.name)?,
            phone: optional("phone", f.phone.as_ref())?,
            address: optional("address", f.address.as_ref())?,
            city: optional("city", f.city.as_ref())?,
            category: optional("category", f.category.as_ref())?,
            cashback: optional("cashback", f.cashback.as_ref())?,
            miles: optional("miles", f.miles.as_ref())?,
            installments: optional("installments", f.installments.as_ref())?,
            popularity: optional("popularity", f.popularity.as_ref())?,
        };

        Ok(Self {
            entry: parse("entry_selector", &source.entry_selector)?,
            next_page: source
                .next_page_selector
                .as_deref()
                .map(|css| parse("next_page_selector", css))
                .transpose()?,
            fields,
            name,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `href` of the first element matching `next_page_selector`, resolved
    /// against `page_url`.
    #[must_use]
    pub fn next_link(&self, document: &Html, page_url: &Url) -> Option<Url> {
        let selector = self.next_page.as_ref()?;
        document
            .select(selector)
            .filter_map(|el| el.value().attr("href"))
            .find_map(|href| resolve_link(page_url, href))
    }

    /// Builds one record per entry element, in document order.
    #[must_use]
    pub fn extract_entries(&self, document: &Html) -> PageExtraction {
        let mut out = PageExtraction::default();
        for (index, entry) in document.select(&self.entry).enumerate() {
            match self.extract_entry(entry) {
                Ok(record) => out.records.push(record),
                Err(reason) => {
                    tracing::warn!(
                        source = %self.name,
                        index,
                        reason = %reason,
                        "skipping partner entry"
                    );
                    out.skipped += 1;
                }
            }
        }
        out
    }

    fn extract_entry(&self, entry: ElementRef<'_>) -> Result<PartnerRecord, String> {
        let f = &self.fields;
        let name = read_first(entry, &f.name).ok_or_else(|| "entry has no name".to_owned())?;

        let read =
            |field: &Option<CompiledField>| field.as_ref().and_then(|c| read_first(entry, c));

        let address = read(&f.address);
        let city = read(&f.city);
        let location = locate(city.as_deref(), address.as_deref());

        let fields = NewPartnerRecord {
            source: self.name.clone(),
            name,
            phone: read(&f.phone).as_deref().and_then(normalize_phone),
            address,
            location: Some(location),
            category: read(&f.category),
            cashback_rate: read(&f.cashback).as_deref().and_then(parse_cashback),
            miles_rate: read(&f.miles).as_deref().and_then(parse_miles),
            installment_terms: f
                .installments
                .as_ref()
                .map(|c| parse_terms(&read_all(entry, c)))
                .unwrap_or_default(),
            popularity_tier: read(&f.popularity)
                .as_deref()
                .and_then(PopularityTier::parse),
        };

        PartnerRecord::new(fields).map_err(|e| e.to_string())
    }
}

/// Parses `html` with `source`, ignoring pagination.
#[must_use]
pub fn extract_page(source: &CompiledSource, html: &str) -> PageExtraction {
    let document = Html::parse_document(html);
    source.extract_entries(&document)
}

fn value_of(element: ElementRef<'_>, field: &CompiledField) -> Option<String> {
    let raw = match &field.attr {
        Some(attr) => element.value().attr(attr)?.to_owned(),
        // Text nodes are space-joined so `<br>`-separated parts stay apart.
        None => element.text().collect::<Vec<_>>().join(" "),
    };
    let value = collapse_whitespace(&raw);
    (!value.is_empty()).then_some(value)
}

fn read_first(entry: ElementRef<'_>, field: &CompiledField) -> Option<String> {
    match &field.selector {
        Some(selector) => entry
            .select(selector)
            .find_map(|element| value_of(element, field)),
        None => value_of(entry, field),
    }
}

/// Values of every match, space-joined. Used for multi-element fields.
fn read_all(entry: ElementRef<'_>, field: &CompiledField) -> String {
    match &field.selector {
        Some(selector) => entry
            .select(selector)
            .filter_map(|element| value_of(element, field))
            .collect::<Vec<_>>()
            .join(" "),
        None => value_of(entry, field).unwrap_or_default(),
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
