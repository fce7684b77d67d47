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

//! Walks the AST, checking declaration/assignment/width rules, and builds
//! the IR-backed [`Component`] plus its [`SymbolTable`]. Deterministic and
//! order-preserving relative to source.

use super::ast::{self, Connection, Expr, Statement};
use super::bus::{Bus, BusValue};
use super::component::Component;
use super::ir::IrNode;
use super::symbol::{BusSymbol, ComponentTable, SymbolTable};
use crate::error::{SemanticalError, Warning};

pub struct Builder;

impl Builder {
    /// Elaborates a parsed [`ast::Module`] into its entry [`Component`], the
    /// full build-time [`SymbolTable`], and any validation warnings.
    pub fn build(module: &ast::Module) -> Result<(Component, SymbolTable, Vec<Warning>), SemanticalError> {
        if module.components.is_empty() {
            return Err(SemanticalError::new("module is empty"));
        }

        let mut symtab = SymbolTable::new();
        let entry = if module.components.len() == 1 {
            let comp_ast = &module.components[0];
            let (component, table) = Self::build_component(comp_ast)?;
            symtab.insert_component(comp_ast.id.clone(), table);
            component
        } else {
            let mut main_component = None;
            for comp_ast in &module.components {
                if symtab.contains_component(&comp_ast.id) {
                    return Err(SemanticalError::at(
                        comp_ast.line,
                        format!("component {:?} has already been declared", comp_ast.id),
                    ));
                }
                let (component, table) = Self::build_component(comp_ast)?;
                symtab.insert_component(comp_ast.id.clone(), table);
                if comp_ast.is_main {
                    if main_component.is_some() {
                        return Err(SemanticalError::at(
                            comp_ast.line,
                            format!("component {:?} cannot be main: only one main component is allowed", comp_ast.id),
                        ));
                    }
                    main_component = Some(component);
                }
            }
            main_component.ok_or_else(|| {
                SemanticalError::new("no main component found in a multi-component module")
            })?
        };

        let mut warnings = Vec::new();
        Self::collect_warnings(&symtab, &mut warnings);

        Ok((entry, symtab, warnings))
    }

    fn build_component(comp_ast: &ast::Component) -> Result<(Component, ComponentTable), SemanticalError> {
        let mut table = ComponentTable::new();

        // First pass: declaration pass.
        for stmt in &comp_ast.statements {
            if let Statement::Decl(decl) = stmt {
                if table.contains(&decl.id) {
                    return Err(SemanticalError::at(
                        decl.line,
                        format!("bus {:?} has already been declared", decl.id),
                    ));
                }
                if decl.assign.is_some() && decl.connection == Connection::Input {
                    return Err(SemanticalError::at(
                        decl.line,
                        format!("input bus {:?} cannot have an initializer", decl.id),
                    ));
                }
                let size = decl.dimension.as_ref().map(|d| d.value).unwrap_or(1);
                table.insert(
                    decl.id.clone(),
                    BusSymbol::new(decl.connection, size, decl.assign.is_some(), decl.line),
                );
            }
        }

        // Second pass: wiring pass, in source order.
        let mut component = Component::new(comp_ast.id.clone());
        for stmt in &comp_ast.statements {
            match stmt {
                Statement::Decl(decl) => Self::wire_decl(decl, &mut table, &mut component)?,
                Statement::Assign(assign) => Self::wire_assign(assign, &mut table, &mut component)?,
            }
        }

        for id in table.ids() {
            if table.get(id).unwrap().connection == Connection::Input {
                if let Some(h) = component.handle_of(id) {
                    component.inputs.push(h);
                }
            }
        }

        Self::build_influence_lists(&mut component);

        Ok((component, table))
    }

    fn wire_decl(
        decl: &ast::Decl,
        table: &mut ComponentTable,
        component: &mut Component,
    ) -> Result<(), SemanticalError> {
        let size = table.get(&decl.id).unwrap().size;
        let handle = component.add_bus(Bus::new(decl.id.clone(), size));

        if let Some(expr) = &decl.assign {
            let (node, width) = Self::build_expr(expr, table, component)?;
            if width != size {
                return Err(SemanticalError::at(
                    decl.line,
                    format!(
                        "assignment size ({}) does not match bus size ({}) for {:?}",
                        width, size, decl.id
                    ),
                ));
            }
            component.bus_mut(handle).assignment = Some(node);
        }
        Ok(())
    }

    fn wire_assign(
        assign: &ast::Assign,
        table: &mut ComponentTable,
        component: &mut Component,
    ) -> Result<(), SemanticalError> {
        let id = &assign.destiny.id;
        let symbol = table.get(id).cloned().ok_or_else(|| {
            SemanticalError::at(assign.destiny.line, format!("identifier {:?} has not been declared", id))
        })?;

        if symbol.is_assigned {
            return Err(SemanticalError::at(
                assign.destiny.line,
                format!("identifier {:?} already assigned", id),
            ));
        }
        if symbol.connection == Connection::Input {
            return Err(SemanticalError::at(
                assign.destiny.line,
                format!("input bus {:?} cannot be assigned", id),
            ));
        }

        let handle = component.handle_of(id).ok_or_else(|| {
            SemanticalError::at(
                assign.destiny.line,
                format!("identifier {:?} has not been declared before this assignment", id),
            )
        })?;

        table.get_mut(id).unwrap().is_assigned = true;

        let (node, width) = Self::build_expr(&assign.expr, table, component)?;
        if width != symbol.size {
            return Err(SemanticalError::at(
                assign.line,
                format!(
                    "assignment size ({}) does not match bus size ({}) for {:?}",
                    width, symbol.size, id
                ),
            ));
        }
        component.bus_mut(handle).assignment = Some(node);
        Ok(())
    }

    fn build_expr(
        expr: &Expr,
        table: &mut ComponentTable,
        component: &Component,
    ) -> Result<(IrNode, usize), SemanticalError> {
        match expr {
            Expr::Identifier(id) => {
                let symbol = table.get_mut(&id.id).ok_or_else(|| {
                    SemanticalError::at(id.line, format!("identifier {:?} has not been declared", id.id))
                })?;
                symbol.is_read = true;
                let size = symbol.size;
                let handle = component.handle_of(&id.id).ok_or_else(|| {
                    SemanticalError::at(
                        id.line,
                        format!("identifier {:?} has not been declared before this use", id.id),
                    )
                })?;
                Ok((IrNode::BusRef(handle), size))
            }
            Expr::BitField(bf) => Ok((IrNode::Const(BusValue::from_bit_string(&bf.value)), bf.size)),
            Expr::Not(inner, _) => {
                let (node, size) = Self::build_expr(inner, table, component)?;
                Ok((IrNode::Not(Box::new(node)), size))
            }
            Expr::And(l, r, line) => Self::build_binary(l, r, *line, table, component, IrNode::And),
            Expr::Or(l, r, line) => Self::build_binary(l, r, *line, table, component, IrNode::Or),
            Expr::Xor(l, r, line) => Self::build_binary(l, r, *line, table, component, IrNode::Xor),
            Expr::Nand(l, r, line) => Self::build_binary(l, r, *line, table, component, IrNode::Nand),
            Expr::Nor(l, r, line) => Self::build_binary(l, r, *line, table, component, IrNode::Nor),
            Expr::Xnor(l, r, line) => Self::build_binary(l, r, *line, table, component, IrNode::Xnor),
        }
    }

    fn build_binary(
        l: &Expr,
        r: &Expr,
        line: usize,
        table: &mut ComponentTable,
        component: &Component,
        make: fn(Box<IrNode>, Box<IrNode>) -> IrNode,
    ) -> Result<(IrNode, usize), SemanticalError> {
        let (l_node, l_size) = Self::build_expr(l, table, component)?;
        let (r_node, r_size) = Self::build_expr(r, table, component)?;
        if l_size != r_size {
            return Err(SemanticalError::at(
                line,
                format!(
                    "left and right expressions must be the same size (got {} and {})",
                    l_size, r_size
                ),
            ));
        }
        Ok((make(Box::new(l_node), Box::new(r_node)), l_size))
    }

    /// Step 6: for each bus `b` with assignment `E`, append `b` to
    /// `s.influence_list` for each `s` in `sensitivity(E)`.
    fn build_influence_lists(component: &mut Component) {
        let assignments: Vec<_> = component
            .buses()
            .iter()
            .enumerate()
            .map(|(i, b)| (i, b.assignment.clone()))
            .collect();

        for (i, assignment) in assignments {
            let Some(node) = assignment else { continue };
            let handle = super::bus::BusHandle(i);
            for sensed in node.sensitivity() {
                let list = &mut component.bus_mut(sensed).influence_list;
                if !list.contains(&handle) {
                    list.push(handle);
                }
            }
        }
    }

    fn collect_warnings(symtab: &SymbolTable, warnings: &mut Vec<Warning>) {
        for (comp_id, table) in symtab.components() {
            for id in table.ids() {
                let symbol = table.get(id).unwrap();
                if symbol.connection != Connection::Input && !symbol.is_assigned {
                    warnings.push(Warning {
                        component_id: comp_id.to_string(),
                        bus_id: id.to_string(),
                        message: "bus has not been assigned".to_string(),
                    });
                }
                if symbol.connection != Connection::Output && !symbol.is_read {
                    warnings.push(Warning {
                        component_id: comp_id.to_string(),
                        bus_id: id.to_string(),
                        message: "bus is never read".to_string(),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::lexer::Tokenize;
    use crate::core::parser::Parser;
    use crate::core::scanner::FloteTokenizer;

    fn build(src: &str) -> Result<(Component, SymbolTable, Vec<Warning>), SemanticalError> {
        let tokens = FloteTokenizer::tokenize(src).into_iter().map(|r| r.unwrap()).collect();
        let module = Parser::parse(tokens).unwrap();
        Builder::build(&module)
    }

    #[test]
    fn half_adder_builds_with_influence_lists() {
        let src = r#"
            comp half_adder {
                in bit a;
                in bit b;
                out bit s = a xor b;
                out bit c = a and b;
            }
        "#;
        let (component, _, warnings) = build(src).unwrap();
        assert!(warnings.is_empty());
        let a = component.handle_of("a").unwrap();
        let s = component.handle_of("s").unwrap();
        let c = component.handle_of("c").unwrap();
        assert!(component.bus(a).influence_list.contains(&s));
        assert!(component.bus(a).influence_list.contains(&c));
    }

    #[test]
    fn width_mismatch_on_declaration_is_semantical_error() {
        let src = r#"comp c { bit[4] x = "111"; }"#;
        let err = build(src).unwrap_err();
        assert_eq!(err.line, Some(1));
    }

    #[test]
    fn double_drive_is_semantical_error() {
        let src = r#"
            comp c {
                bit x = "1";
                x = "0";
            }
        "#;
        let err = build(src).unwrap_err();
        assert!(err.message.contains("already assigned"));
    }

    #[test]
    fn empty_module_is_semantical_error() {
        let module = ast::Module { components: vec![] };
        assert!(Builder::build(&module).is_err());
    }

    #[test]
    fn unread_output_and_unassigned_internal_warn() {
        let src = r#"
            comp c {
                in bit a;
                out bit unread = a;
                bit dangling;
            }
        "#;
        let (_, _, warnings) = build(src).unwrap();
        assert!(warnings.iter().any(|w| w.bus_id == "dangling" && w.message.contains("not been assigned")));
    }
}
