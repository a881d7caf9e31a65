//! Lenient handling of document type declarations in feed bodies.
//!
//! Some publishers ship feeds with an internal DTD subset that declares their
//! own entities, which the XML parser would otherwise reject as undefined
//! references. Internal general entities are expanded here under a hard cap
//! on the work substitution may do, and the DOCTYPE is dropped before the
//! document reaches the feed parser. External entities are never resolved.

use crate::utils::error::FetchFailure;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Expansion budget for a single document. Every substituted reference costs
/// one unit plus the characters it stands for.
pub const DEFAULT_MAX_ENTITY_CHARACTERS: usize = 1024;

const MAX_NESTING_DEPTH: usize = 8;

const PREDEFINED: [&str; 5] = ["amp", "lt", "gt", "quot", "apos"];

// Only a DOCTYPE in the prolog counts; one quoted inside CDATA or a comment
// further down is content.
static DOCTYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)\A(?:\s*(?:<\?.*?\?>|<!--.*?-->))*\s*(?P<doctype><!DOCTYPE[^\[>]*(?:\[(?P<subset>.*?)\]\s*)?>)",
    )
    .unwrap()
});

static ENTITY_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<!ENTITY\s+(?P<name>[A-Za-z_][\w.\-]*)\s+(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')\s*>"#)
        .unwrap()
});

static ENTITY_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(?P<name>[A-Za-z_][\w.\-]*);").unwrap());

/// Sections the XML parser reads verbatim.
static LITERAL_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!\[CDATA\[.*?\]\]>|<!--.*?-->").unwrap());

/// Normalizes a raw feed body: strips a byte-order mark and anything before
/// the first tag, expands declared entities and removes the DOCTYPE.
pub fn prepare_document(body: &str, max_entity_characters: usize) -> Result<String, FetchFailure> {
    let body = body.strip_prefix('\u{FEFF}').unwrap_or(body);
    let body = match body.find('<') {
        Some(start) => &body[start..],
        None => body,
    };

    let Some(doctype) = DOCTYPE.captures(body) else {
        return Ok(body.to_string());
    };

    let declared: HashMap<String, String> = doctype
        .name("subset")
        .map(|subset| {
            ENTITY_DECL
                .captures_iter(subset.as_str())
                .map(|decl| {
                    let value = decl.name("dq").or_else(|| decl.name("sq"));
                    (
                        decl["name"].to_string(),
                        value.map(|v| v.as_str().to_string()).unwrap_or_default(),
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    let span = doctype.name("doctype").map(|m| m.range()).unwrap_or(0..0);
    let mut stripped = String::with_capacity(body.len());
    stripped.push_str(&body[..span.start]);
    stripped.push_str(&body[span.end..]);

    if declared.is_empty() {
        return Ok(stripped);
    }

    tracing::debug!("Expanding {} declared entities", declared.len());
    let mut expander = Expander {
        declared: &declared,
        resolved: HashMap::new(),
        limit: max_entity_characters,
        spent: 0,
    };
    expander.expand_document(&stripped)
}

#[derive(Clone)]
struct Resolved {
    value: String,
    /// References substituted while building `value`, counted as if every
    /// nested entity had been expanded in place.
    substitutions: usize,
}

struct Expander<'a> {
    declared: &'a HashMap<String, String>,
    resolved: HashMap<String, Resolved>,
    limit: usize,
    spent: usize,
}

impl Expander<'_> {
    fn expand_document(&mut self, text: &str) -> Result<String, FetchFailure> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for section in LITERAL_SECTION.find_iter(text) {
            self.substitute_into(&mut out, &text[last..section.start()], &mut Vec::new())?;
            out.push_str(section.as_str());
            last = section.end();
        }

        self.substitute_into(&mut out, &text[last..], &mut Vec::new())?;
        Ok(out)
    }

    /// Appends `text` to `out` with declared references replaced and returns
    /// the number of substitutions that stand behind it.
    fn substitute_into(
        &mut self,
        out: &mut String,
        text: &str,
        stack: &mut Vec<String>,
    ) -> Result<usize, FetchFailure> {
        let mut substitutions = 0usize;
        let mut last = 0;

        for reference in ENTITY_REF.captures_iter(text) {
            let whole = reference.get(0).map(|m| m.range()).unwrap_or(0..0);
            let name = reference.name("name").map(|m| m.as_str()).unwrap_or_default();
            out.push_str(&text[last..whole.start]);
            last = whole.end;

            if PREDEFINED.contains(&name) || !self.declared.contains_key(name) {
                out.push_str(&text[whole]);
                continue;
            }

            let entity = self.resolve(name, stack)?;
            let uses = entity.substitutions.saturating_add(1);
            self.charge(uses.saturating_add(entity.value.chars().count()))?;
            substitutions = substitutions.saturating_add(uses);
            out.push_str(&entity.value);
        }

        out.push_str(&text[last..]);
        Ok(substitutions)
    }

    /// Expands `name` once per document; later references reuse the result.
    fn resolve(&mut self, name: &str, stack: &mut Vec<String>) -> Result<Resolved, FetchFailure> {
        if let Some(entity) = self.resolved.get(name) {
            return Ok(entity.clone());
        }

        if stack.len() >= MAX_NESTING_DEPTH || stack.iter().any(|open| open == name) {
            return Err(FetchFailure::EntityReference {
                name: name.to_string(),
            });
        }

        let declared = self.declared;
        let raw = declared.get(name).map(String::as_str).unwrap_or_default();

        stack.push(name.to_string());
        let mut value = String::new();
        let substitutions = self.substitute_into(&mut value, raw, stack)?;
        stack.pop();

        let entity = Resolved {
            value,
            substitutions,
        };
        self.resolved.insert(name.to_string(), entity.clone());
        Ok(entity)
    }

    fn charge(&mut self, units: usize) -> Result<(), FetchFailure> {
        self.spent = self.spent.saturating_add(units);
        if self.spent > self.limit {
            return Err(FetchFailure::EntityExpansion { limit: self.limit });
        }
        Ok(())
    }
}
