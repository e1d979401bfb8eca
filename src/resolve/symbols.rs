use std::collections::HashMap;

use crate::scene::model::ObjectKind;

/// Entry for one declared scene object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Symbol {
    pub kind: ObjectKind,
    /// Position of the declaring statement within the block.
    pub index: usize,
    /// 1-based source line of the declaration.
    pub line: usize,
}

/// Names declared in one block, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    order: Vec<String>,
    by_name: HashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `name`; on a duplicate the existing entry is returned and the table is unchanged.
    pub fn declare(&mut self, name: &str, symbol: Symbol) -> Result<(), Symbol> {
        if let Some(existing) = self.by_name.get(name) {
            return Err(*existing);
        }
        self.order.push(name.to_string());
        self.by_name.insert(name.to_string(), symbol);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.by_name.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Symbol)> + '_ {
        self.order
            .iter()
            .filter_map(|name| self.by_name.get(name).map(|s| (name.as_str(), s)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resolve/symbols.rs"]
mod tests;
