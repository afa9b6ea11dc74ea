//! Minimal patching of a live DOM subtree toward a freshly rendered one.
//!
//! Children are compared with two pointers: a forward scan and a backward scan
//! over deep-equal nodes bracket the changed middle, which is then patched by
//! clone-and-replace, removal or insertion. A single-line edit typically costs
//! one or two mutations regardless of document size. Replaced nodes lose their
//! event listeners.

use crate::dom::{DomError, DomNode};

/// Called once, right before the first mutation.
///
/// Browsers repair the native selection on every DOM mutation; dropping it up
/// front avoids that work. The caret is written back afterwards from the
/// cursor model.
pub trait SelectionHost {
    fn drop_selection(&mut self);
}

/// For callers with no native selection to manage.
impl SelectionHost for () {
    fn drop_selection(&mut self) {}
}

struct Guard<'a, S: SelectionHost> {
    host: &'a mut S,
    dropped: bool,
    mutations: usize,
}

impl<S: SelectionHost> Guard<'_, S> {
    fn before_mutation(&mut self) {
        if !self.dropped {
            self.host.drop_selection();
            self.dropped = true;
        }
        self.mutations += 1;
    }
}

/// Patch `live`'s children so they are node-for-node equal to `fresh`'s.
/// `fresh` is left untouched (its children are cloned). Returns the number of
/// DOM mutations performed.
pub fn reconcile<N: DomNode, S: SelectionHost>(
    fresh: &N,
    live: &N,
    selection: &mut S,
) -> Result<usize, DomError> {
    let f = fresh.children();
    let l = live.children();
    let mut guard = Guard {
        host: selection,
        dropped: false,
        mutations: 0,
    };

    let mut start = 0;
    while start < f.len() && start < l.len() && f[start].deep_equal(&l[start]) {
        start += 1;
    }
    if start == f.len() && start == l.len() {
        return Ok(0);
    }

    // First forward mismatch.
    if start < f.len() && start < l.len() {
        guard.before_mutation();
        live.replace_child(&f[start].clone_deep()?, &l[start])?;
        start += 1;
    }

    let mut f_end = f.len();
    let mut l_end = l.len();
    while f_end > start && l_end > start && f[f_end - 1].deep_equal(&l[l_end - 1]) {
        f_end -= 1;
        l_end -= 1;
    }
    // Node the middle range sits in front of.
    let mut anchor = l.get(l_end).cloned();

    // First backward mismatch.
    if f_end > start && l_end > start {
        guard.before_mutation();
        let replacement = f[f_end - 1].clone_deep()?;
        live.replace_child(&replacement, &l[l_end - 1])?;
        anchor = Some(replacement);
        f_end -= 1;
        l_end -= 1;
    }

    // Anything still paired in the middle is replaced in place.
    let paired = (f_end - start).min(l_end - start);
    for i in 0..paired {
        guard.before_mutation();
        live.replace_child(&f[start + i].clone_deep()?, &l[start + i])?;
    }
    let (f_mid, l_mid) = (start + paired, start + paired);

    for stale in &l[l_mid..l_end] {
        guard.before_mutation();
        live.remove_child(stale)?;
    }
    for missing in &f[f_mid..f_end] {
        guard.before_mutation();
        live.insert_before(&missing.clone_deep()?, anchor.as_ref())?;
    }

    tracing::debug!(target: "mdpad::reconcile", mutations = guard.mutations, "reconciled");
    Ok(guard.mutations)
}
