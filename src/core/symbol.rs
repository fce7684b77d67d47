//
//  Copyright (C) 2022-2024  Chase Ruskin
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

//! Build-time symbol table. Consulted only by the semantic builder; the
//! simulator indirects through pre-resolved [`BusHandle`](super::bus::BusHandle)s
//! and never sees a string key.

use super::ast::Connection;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct BusSymbol {
    pub connection: Connection,
    pub size: usize,
    pub is_assigned: bool,
    pub is_read: bool,
    pub line: usize,
}

impl BusSymbol {
    pub fn new(connection: Connection, size: usize, is_assigned: bool, line: usize) -> Self {
        Self { connection, size, is_assigned, is_read: false, line }
    }
}

/// Per-component table: declared buses, in first-declaration order.
#[derive(Debug, Default)]
pub struct ComponentTable {
    order: Vec<String>,
    symbols: HashMap<String, BusSymbol>,
}

impl ComponentTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.symbols.contains_key(id)
    }

    pub fn insert(&mut self, id: impl Into<String>, symbol: BusSymbol) {
        let id = id.into();
        if !self.symbols.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.symbols.insert(id, symbol);
    }

    pub fn get(&self, id: &str) -> Option<&BusSymbol> {
        self.symbols.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut BusSymbol> {
        self.symbols.get_mut(id)
    }

    /// Declared bus ids in first-declaration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }
}

/// Top-level table: one [`ComponentTable`] per component id.
#[derive(Debug, Default)]
pub struct SymbolTable {
    components: HashMap<String, ComponentTable>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_component(&self, id: &str) -> bool {
        self.components.contains_key(id)
    }

    pub fn insert_component(&mut self, id: impl Into<String>, table: ComponentTable) {
        self.components.insert(id.into(), table);
    }

    pub fn component(&self, id: &str) -> Option<&ComponentTable> {
        self.components.get(id)
    }

    pub fn component_mut(&mut self, id: &str) -> Option<&mut ComponentTable> {
        self.components.get_mut(id)
    }

    pub fn components(&self) -> impl Iterator<Item = (&str, &ComponentTable)> {
        self.components.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn preserves_declaration_order() {
        let mut table = ComponentTable::new();
        table.insert("b", BusSymbol::new(Connection::Internal, 1, false, 1));
        table.insert("a", BusSymbol::new(Connection::Internal, 1, false, 2));
        assert_eq!(table.ids().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn reinserting_same_id_does_not_duplicate_order() {
        let mut table = ComponentTable::new();
        table.insert("a", BusSymbol::new(Connection::Internal, 1, false, 1));
        table.insert("a", BusSymbol::new(Connection::Internal, 1, true, 2));
        assert_eq!(table.ids().collect::<Vec<_>>(), vec!["a"]);
        assert!(table.get("a").unwrap().is_assigned);
    }
}
