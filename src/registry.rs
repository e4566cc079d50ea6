//! The handler registry: by-name, by-path, and by-regex dictionaries plus
//! the path→resolved-list cache, per the reader's handler resolution rules.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use regex::Regex;

use crate::context::ParseContext;
use crate::error::RtfResult;
use crate::token::Token;

/// A callable invoked once for a destination's open brace, once per
/// ordinary token while the destination is active, and once for its close
/// brace. `token.kind()` (`GroupOpen`/`GroupClose`/anything else)
/// distinguishes which of the three calls this is.
pub trait Handler: fmt::Debug {
    fn handle(
        &self,
        token: &Token,
        source: &str,
        offset: usize,
        ctx: &mut ParseContext,
    ) -> RtfResult<()>;
}

/// What a `register` call binds a handler to.
#[derive(Clone)]
pub enum Destination {
    /// Matches any frame whose control name equals this exactly.
    Name(String),
    /// Matches a frame whose full `;`-joined path equals this exactly.
    Path(String),
    /// Matches any frame whose path satisfies this pattern.
    Pattern(Regex),
}

impl Destination {
    fn dedup_key(&self) -> String {
        match self {
            Destination::Name(n) => format!("name:{n}"),
            Destination::Path(p) => format!("path:{p}"),
            Destination::Pattern(r) => format!("re:{}", r.as_str()),
        }
    }
}

/// `"fonttbl"` has no `;` and becomes a `Name`; `";rtf;fonttbl"` has one and
/// becomes an exact `Path`, per the destination-string contract.
impl From<&str> for Destination {
    fn from(s: &str) -> Self {
        if s.contains(';') {
            Destination::Path(s.to_string())
        } else {
            Destination::Name(s.to_string())
        }
    }
}

impl From<String> for Destination {
    fn from(s: String) -> Self {
        Destination::from(s.as_str())
    }
}

impl From<Regex> for Destination {
    fn from(r: Regex) -> Self {
        Destination::Pattern(r)
    }
}

type HandlerList = Vec<Rc<dyn Handler>>;

/// Owns the three registration dictionaries and the resolver cache.
#[derive(Default)]
pub struct HandlerRegistry {
    by_name: HashMap<String, HandlerList>,
    by_path: HashMap<String, HandlerList>,
    by_regex: Vec<(Regex, Rc<dyn Handler>)>,
    /// Every (destination, handler) pair ever registered, keyed so
    /// duplicate registrations can be ignored.
    registered: std::collections::HashSet<(String, usize)>,
    cache: RefCell<HashMap<String, HandlerList>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        HandlerRegistry::default()
    }

    /// Register `handler` against `destination`. Clears the resolver cache.
    /// A duplicate `(destination, handler)` pair (same destination, same
    /// handler by pointer identity) is ignored.
    pub fn register(&mut self, destination: impl Into<Destination>, handler: Rc<dyn Handler>) {
        let destination = destination.into();
        let ptr = Rc::as_ptr(&handler) as *const () as usize;
        let key = (destination.dedup_key(), ptr);
        if !self.registered.insert(key) {
            return;
        }

        match destination {
            Destination::Name(name) => {
                self.by_name.entry(name).or_default().push(handler);
            },
            Destination::Path(path) => {
                self.by_path.entry(path).or_default().push(handler);
            },
            Destination::Pattern(pattern) => {
                self.by_regex.push((pattern, handler));
            },
        }
        self.cache.borrow_mut().clear();
    }

    /// Resolve the ordered, deduplicated handler list for `(name, path)`,
    /// using and populating the cache.
    pub fn resolve(&self, name: &str, path: &str) -> HandlerList {
        if let Some(cached) = self.cache.borrow().get(path) {
            return cached.clone();
        }

        let mut merged: HandlerList = Vec::new();
        let mut seen: Vec<*const ()> = Vec::new();
        let mut push_unique = |h: &Rc<dyn Handler>, merged: &mut HandlerList| {
            let ptr = Rc::as_ptr(h) as *const ();
            if !seen.contains(&ptr) {
                seen.push(ptr);
                merged.push(Rc::clone(h));
            }
        };

        if let Some(handlers) = self.by_name.get(name) {
            for h in handlers {
                push_unique(h, &mut merged);
            }
        }
        if let Some(handlers) = self.by_path.get(path) {
            for h in handlers {
                push_unique(h, &mut merged);
            }
        }
        for (pattern, handler) in &self.by_regex {
            if pattern.is_match(path) {
                push_unique(handler, &mut merged);
            }
        }

        self.cache
            .borrow_mut()
            .insert(path.to_string(), merged.clone());
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct NoopHandler;
    impl Handler for NoopHandler {
        fn handle(
            &self,
            _token: &Token,
            _source: &str,
            _offset: usize,
            _ctx: &mut ParseContext,
        ) -> RtfResult<()> {
            Ok(())
        }
    }

    #[test]
    fn string_without_semicolon_is_a_name() {
        match Destination::from("fonttbl") {
            Destination::Name(n) => assert_eq!(n, "fonttbl"),
            _ => panic!("expected Name"),
        }
    }

    #[test]
    fn string_with_semicolon_is_a_path() {
        match Destination::from(";rtf;fonttbl") {
            Destination::Path(p) => assert_eq!(p, ";rtf;fonttbl"),
            _ => panic!("expected Path"),
        }
    }

    #[test]
    fn resolve_merges_name_path_and_regex_without_duplicates() {
        let mut registry = HandlerRegistry::new();
        let h: Rc<dyn Handler> = Rc::new(NoopHandler);
        registry.register("fonttbl", Rc::clone(&h));
        registry.register(";rtf;fonttbl", Rc::clone(&h));
        registry.register(Regex::new(r"^;rtf;fonttbl$").unwrap(), Rc::clone(&h));

        let resolved = registry.resolve("fonttbl", ";rtf;fonttbl");
        assert_eq!(resolved.len(), 1);
    }

    #[test]
    fn unresolved_path_caches_as_empty() {
        let registry = HandlerRegistry::new();
        let resolved = registry.resolve("nope", ";rtf;nope");
        assert!(resolved.is_empty());
        // Second call hits the cache path; still empty, still consistent.
        assert!(registry.resolve("nope", ";rtf;nope").is_empty());
    }

    #[test]
    fn registering_invalidates_cache() {
        let mut registry = HandlerRegistry::new();
        assert!(registry.resolve("fonttbl", ";rtf;fonttbl").is_empty());
        registry.register("fonttbl", Rc::new(NoopHandler) as Rc<dyn Handler>);
        assert_eq!(registry.resolve("fonttbl", ";rtf;fonttbl").len(), 1);
    }

    #[test]
    fn duplicate_registration_is_ignored() {
        let mut registry = HandlerRegistry::new();
        let h: Rc<dyn Handler> = Rc::new(NoopHandler);
        registry.register("fonttbl", Rc::clone(&h));
        registry.register("fonttbl", Rc::clone(&h));
        assert_eq!(registry.resolve("fonttbl", ";rtf;fonttbl").len(), 1);
    }
}
