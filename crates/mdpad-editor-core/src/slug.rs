//! URL-safe heading anchors, unique within one parse.

use std::collections::HashMap;

use smol_str::SmolStr;

/// Hands out unique slugs. The first occurrence of a title is unsuffixed,
/// later duplicates get `-2`, `-3`, ... Create one per parse.
#[derive(Debug, Default)]
pub struct SlugCounter {
    seen: HashMap<String, usize>,
}

impl SlugCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, title: &str) -> SmolStr {
        let base = slugify(title);
        let mut slug = base.clone();
        loop {
            let count = self.seen.entry(base.clone()).or_insert(0);
            *count += 1;
            if *count > 1 {
                slug = format!("{base}-{count}");
            }
            if slug == base || !self.seen.contains_key(&slug) {
                break;
            }
        }
        if slug != base {
            self.seen.insert(slug.clone(), 1);
        }
        SmolStr::new(slug)
    }
}

/// Lowercase, keep alphanumerics, turn whitespace and dashes into single
/// dashes, drop everything else.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut dash = false;
    for c in title.chars() {
        if c.is_alphanumeric() {
            if dash && !out.is_empty() {
                out.push('-');
            }
            dash = false;
            out.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            dash = true;
        }
    }
    if out.is_empty() {
        out.push_str("section");
    }
    out
}
