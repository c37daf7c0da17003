//! Page templates and the cache that serves them.
//!
//! A *generation* is one complete parse of every configured page. Readers
//! load the current generation through an [`ArcSwapOption`] and never block;
//! reparses are serialized by a mutex and published with a single swap, so a
//! reader sees either the whole old mapping or the whole new one.
//!
//! In production the first resolve parses and every later one reuses that
//! generation. In dev mode every resolve reparses, so template edits show up
//! on reload.

mod error;
mod funcs;
mod source;

pub use error::TemplateError;
pub use source::{DEFAULT_BASE, DEFAULT_INDEX, Layout, PageTemplate, TrustedFs};

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// Page name → parsed page, all from one parse.
#[derive(Debug)]
struct Generation {
    pages: FxHashMap<String, Arc<PageTemplate>>,
}

pub struct TemplateCache {
    fs: TrustedFs,
    layout: Layout,
    current: ArcSwapOption<Generation>,
    /// Held for the whole reparse-and-swap; counts generations built.
    reparse: Mutex<u64>,
}

impl TemplateCache {
    pub fn new(fs: TrustedFs, layout: Layout) -> Self {
        Self {
            fs,
            layout,
            current: ArcSwapOption::empty(),
            reparse: Mutex::new(0),
        }
    }

    /// Look up a page, parsing first when needed.
    ///
    /// A parse failure leaves the previous generation in place.
    pub fn resolve(&self, name: &str, dev_mode: bool) -> Result<Arc<PageTemplate>, TemplateError> {
        let generation = if dev_mode {
            self.reparse()?
        } else {
            self.current_or_parse()?
        };

        generation
            .pages
            .get(name)
            .cloned()
            .ok_or_else(|| TemplateError::NotFound(name.to_owned()))
    }

    /// Generations published so far.
    #[cfg(test)]
    fn generation(&self) -> u64 {
        *self.reparse.lock()
    }

    /// The generation readers currently see.
    #[cfg(test)]
    fn current_generation(&self) -> Option<Arc<Generation>> {
        self.current.load_full()
    }

    fn current_or_parse(&self) -> Result<Arc<Generation>, TemplateError> {
        if let Some(generation) = self.current.load_full() {
            return Ok(generation);
        }

        let mut count = self.reparse.lock();
        // Another caller may have finished the first parse while we waited.
        if let Some(generation) = self.current.load_full() {
            return Ok(generation);
        }
        self.parse_locked(&mut count)
    }

    fn reparse(&self) -> Result<Arc<Generation>, TemplateError> {
        let mut count = self.reparse.lock();
        self.parse_locked(&mut count)
    }

    fn parse_locked(&self, count: &mut u64) -> Result<Arc<Generation>, TemplateError> {
        let id = *count + 1;
        let mut pages = FxHashMap::default();
        for group in &self.layout.groups {
            let page = source::parse_page(&self.fs, &self.layout, group, id)?;
            pages.insert(group.clone(), Arc::new(page));
        }

        let generation = Arc::new(Generation { pages });
        self.current.store(Some(Arc::clone(&generation)));
        *count = id;
        crate::debug!("template"; "generation {id}: {} pages", generation.pages.len());
        Ok(generation)
    }
}

#[cfg(test)]
mod tests;
