//! Priority-ordered tokenizer storage.
//!
//! Entries are kept sorted by descending priority; equal priorities keep
//! registration order, so the first registered tokenizer wins a tie.

use std::cmp::Reverse;

use crate::error::ParserError;

pub struct Entry<T: ?Sized> {
    pub name: &'static str,
    pub priority: i32,
    seq: usize,
    pub tokenizer: Box<T>,
}

pub struct Registry<T: ?Sized> {
    entries: Vec<Entry<T>>,
    next_seq: usize,
}

impl<T: ?Sized> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<T: ?Sized> Registry<T> {
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Adds a tokenizer; names must be unique within the registry.
    pub fn register(
        &mut self,
        name: &'static str,
        tokenizer: Box<T>,
        priority: i32,
    ) -> Result<(), ParserError> {
        if self.contains(name) {
            return Err(ParserError::DuplicateTokenizer(name.to_string()));
        }
        self.entries.push(Entry {
            name,
            priority,
            seq: self.next_seq,
            tokenizer,
        });
        self.next_seq += 1;
        self.entries.sort_by_key(|e| (Reverse(e.priority), e.seq));
        Ok(())
    }

    pub fn unregister(&mut self, name: &str) -> Result<Box<T>, ParserError> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.name == name)
            .ok_or_else(|| ParserError::UnknownTokenizer(name.to_string()))?;
        Ok(self.entries.remove(idx).tokenizer)
    }

    /// Swaps the tokenizer registered as `name`, keeping its priority and
    /// position in the order.
    pub fn replace(
        &mut self,
        name: &str,
        new_name: &'static str,
        tokenizer: Box<T>,
    ) -> Result<(), ParserError> {
        if new_name != name && self.contains(new_name) {
            return Err(ParserError::DuplicateTokenizer(new_name.to_string()));
        }
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.name == name)
            .ok_or_else(|| ParserError::UnknownTokenizer(name.to_string()))?;
        entry.name = new_name;
        entry.tokenizer = tokenizer;
        Ok(())
    }

    /// Entries in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry<T>> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.name).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn registry(items: &[(&'static str, i32)]) -> Registry<str> {
        let mut r = Registry::default();
        for (name, priority) in items {
            r.register(*name, Box::from(*name), *priority).unwrap();
        }
        r
    }

    #[test]
    fn sorted_by_priority_then_registration() {
        let r = registry(&[("a", 1), ("b", 10), ("c", 1), ("d", 10)]);
        assert_eq!(r.names(), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut r = registry(&[("a", 1)]);
        let err = r.register("a", Box::from("again"), 5).unwrap_err();
        assert!(matches!(err, ParserError::DuplicateTokenizer(name) if name == "a"));
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn unregister_unknown_fails() {
        let mut r = registry(&[("a", 1)]);
        assert!(matches!(
            r.unregister("zzz"),
            Err(ParserError::UnknownTokenizer(_))
        ));
        assert!(r.unregister("a").is_ok());
        assert!(r.is_empty());
    }

    #[test]
    fn replace_keeps_slot() {
        let mut r = registry(&[("a", 5), ("b", 1)]);
        r.replace("a", "z", Box::from("zz")).unwrap();
        assert_eq!(r.names(), vec!["z", "b"]);
        assert_eq!(&*r.iter().next().unwrap().tokenizer, "zz");
    }
}
