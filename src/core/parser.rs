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

//! Recursive-descent parser: token stream to [`Module`] AST.
//!
//! Grammar:
//! ```text
//! module     = { component } , EOF ;
//! component  = [ "main" ] , "comp" , ID , "{" , { statement } , "}" ;
//! statement  = decl | assign ;
//! decl       = [ "in" | "out" ] , "bit" , [ dim ] , ID , [ "=" , expr ] , ";" ;
//! dim        = "[" , DEC , "]" ;
//! assign     = ID , "=" , expr , ";" ;
//! expr       = term   , { ("or"  | "nor" ) , term   } ;
//! term       = factor , { ("xor" | "xnor") , factor } ;
//! factor     = primary, { ("and" | "nand") , primary } ;
//! primary    = "not" , primary | "(" , expr , ")" | ID | BIT_FIELD ;
//! ```

use super::ast::*;
use super::lexer::Token;
use super::scanner::{FloteToken, Keyword, Punctuation};
use std::fmt::Display;
use std::iter::Peekable;
use std::vec::IntoIter;

#[derive(Debug, PartialEq, thiserror::Error)]
pub struct SyntacticalError {
    pub line: usize,
    pub message: String,
}

impl Display for SyntacticalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "syntactical error at line {}: {}", self.line, self.message)
    }
}

impl SyntacticalError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self { line, message: message.into() }
    }
}

type Result<T> = std::result::Result<T, SyntacticalError>;

/// Drives a [`Peekable`] of tokens through the grammar above.
pub struct Parser {
    tokens: Peekable<IntoIter<Token<FloteToken>>>,
}

impl Parser {
    pub fn new(tokens: Vec<Token<FloteToken>>) -> Self {
        Self { tokens: tokens.into_iter().peekable() }
    }

    pub fn parse(tokens: Vec<Token<FloteToken>>) -> Result<Module> {
        Self::new(tokens).parse_module()
    }

    fn peek_type(&mut self) -> &FloteToken {
        self.tokens.peek().unwrap().as_type()
    }

    fn peek_line(&mut self) -> usize {
        self.tokens.peek().unwrap().locate().line()
    }

    fn advance(&mut self) -> Token<FloteToken> {
        self.tokens.next().unwrap()
    }

    fn check_kw(&mut self, kw: Keyword) -> bool {
        self.peek_type().as_keyword() == Some(&kw)
    }

    fn check_punct(&mut self, p: Punctuation) -> bool {
        self.peek_type() == &FloteToken::Punctuation(p)
    }

    /// Consumes and returns the next token if it is the keyword `kw`,
    /// otherwise raises a [`SyntacticalError`] citing what was expected.
    fn expect_kw(&mut self, kw: Keyword) -> Result<()> {
        if self.check_kw(kw) {
            self.advance();
            Ok(())
        } else {
            Err(SyntacticalError::new(
                self.peek_line(),
                format!("expected keyword \"{}\" but found {}", kw, self.peek_type()),
            ))
        }
    }

    fn expect_punct(&mut self, p: Punctuation) -> Result<()> {
        if self.check_punct(p) {
            self.advance();
            Ok(())
        } else {
            Err(SyntacticalError::new(
                self.peek_line(),
                format!("expected \"{}\" but found {}", p, self.peek_type()),
            ))
        }
    }

    fn expect_identifier(&mut self) -> Result<Identifier> {
        let line = self.peek_line();
        match self.peek_type().as_identifier() {
            Some(id) => {
                let id = id.to_string();
                self.advance();
                Ok(Identifier { id, line })
            }
            None => Err(SyntacticalError::new(
                line,
                format!("expected an identifier but found {}", self.peek_type()),
            )),
        }
    }

    fn expect_decimal(&mut self) -> Result<usize> {
        let line = self.peek_line();
        match self.peek_type() {
            FloteToken::Decimal(d) => {
                let d = *d;
                self.advance();
                Ok(d)
            }
            other => Err(SyntacticalError::new(
                line,
                format!("expected a decimal literal but found {}", other),
            )),
        }
    }

    fn parse_module(&mut self) -> Result<Module> {
        let mut components = Vec::new();
        while !self.peek_type().is_eof() {
            components.push(self.parse_component()?);
        }
        Ok(Module { components })
    }

    fn parse_component(&mut self) -> Result<Component> {
        let line = self.peek_line();
        let is_main = if self.check_kw(Keyword::Main) {
            self.advance();
            true
        } else {
            false
        };
        self.expect_kw(Keyword::Comp)?;
        let id = self.expect_identifier()?;
        self.expect_punct(Punctuation::BraceL)?;
        let mut statements = Vec::new();
        while !self.check_punct(Punctuation::BraceR) {
            statements.push(self.parse_statement()?);
        }
        self.expect_punct(Punctuation::BraceR)?;
        Ok(Component { id: id.id, is_main, statements, line })
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        let is_decl_lead = self.check_kw(Keyword::In)
            || self.check_kw(Keyword::Out)
            || self.check_kw(Keyword::Bit);
        if is_decl_lead {
            Ok(Statement::Decl(self.parse_decl()?))
        } else {
            Ok(Statement::Assign(self.parse_assign()?))
        }
    }

    fn parse_decl(&mut self) -> Result<Decl> {
        let line = self.peek_line();
        let connection = if self.check_kw(Keyword::In) {
            self.advance();
            Connection::Input
        } else if self.check_kw(Keyword::Out) {
            self.advance();
            Connection::Output
        } else {
            Connection::Internal
        };
        self.expect_kw(Keyword::Bit)?;
        let dimension = if self.check_punct(Punctuation::BracketL) {
            let dim_line = self.peek_line();
            self.advance();
            let size = self.expect_decimal()?;
            self.expect_punct(Punctuation::BracketR)?;
            Some(Size { value: size, line: dim_line })
        } else {
            None
        };
        let id = self.expect_identifier()?;
        let assign = if self.check_punct(Punctuation::Assign) {
            self.advance();
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect_punct(Punctuation::Semicolon)?;
        Ok(Decl { id: id.id, connection, dimension, assign, line })
    }

    fn parse_assign(&mut self) -> Result<Assign> {
        let destiny = self.expect_identifier()?;
        let line = destiny.line;
        self.expect_punct(Punctuation::Assign)?;
        let expr = self.parse_expr()?;
        self.expect_punct(Punctuation::Semicolon)?;
        Ok(Assign { destiny, expr, line })
    }

    /// `expr = term, { ("or" | "nor"), term }` — left-associative, lowest precedence.
    fn parse_expr(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_term()?;
        loop {
            if self.check_kw(Keyword::Or) {
                let line = self.peek_line();
                self.advance();
                let rhs = self.parse_term()?;
                lhs = Expr::Or(Box::new(lhs), Box::new(rhs), line);
            } else if self.check_kw(Keyword::Nor) {
                let line = self.peek_line();
                self.advance();
                let rhs = self.parse_term()?;
                lhs = Expr::Nor(Box::new(lhs), Box::new(rhs), line);
            } else {
                break;
            }
        }
        Ok(lhs)
    }

    /// `term = factor, { ("xor" | "xnor"), factor }`
    fn parse_term(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_factor()?;
        loop {
            if self.check_kw(Keyword::Xor) {
                let line = self.peek_line();
                self.advance();
                let rhs = self.parse_factor()?;
                lhs = Expr::Xor(Box::new(lhs), Box::new(rhs), line);
            } else if self.check_kw(Keyword::Xnor) {
                let line = self.peek_line();
                self.advance();
                let rhs = self.parse_factor()?;
                lhs = Expr::Xnor(Box::new(lhs), Box::new(rhs), line);
            } else {
                break;
            }
        }
        Ok(lhs)
    }

    /// `factor = primary, { ("and" | "nand"), primary }`
    fn parse_factor(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_primary()?;
        loop {
            if self.check_kw(Keyword::And) {
                let line = self.peek_line();
                self.advance();
                let rhs = self.parse_primary()?;
                lhs = Expr::And(Box::new(lhs), Box::new(rhs), line);
            } else if self.check_kw(Keyword::Nand) {
                let line = self.peek_line();
                self.advance();
                let rhs = self.parse_primary()?;
                lhs = Expr::Nand(Box::new(lhs), Box::new(rhs), line);
            } else {
                break;
            }
        }
        Ok(lhs)
    }

    /// `primary = "not", primary | "(", expr, ")" | ID | BIT_FIELD`
    fn parse_primary(&mut self) -> Result<Expr> {
        let line = self.peek_line();
        if self.check_kw(Keyword::Not) {
            self.advance();
            let inner = self.parse_primary()?;
            return Ok(Expr::Not(Box::new(inner), line));
        }
        if self.check_punct(Punctuation::ParenL) {
            self.advance();
            let inner = self.parse_expr()?;
            self.expect_punct(Punctuation::ParenR)?;
            return Ok(inner);
        }
        if let FloteToken::BitField(bits) = self.peek_type() {
            let bits = bits.clone();
            let size = bits.len();
            self.advance();
            return Ok(Expr::BitField(BitField { value: bits, size, line }));
        }
        if self.peek_type().as_identifier().is_some() {
            let id = self.expect_identifier()?;
            return Ok(Expr::Identifier(id));
        }
        Err(SyntacticalError::new(
            line,
            format!("expected an expression but found {}", self.peek_type()),
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::lexer::Tokenize;
    use crate::core::scanner::FloteTokenizer;

    fn tokenize(src: &str) -> Vec<Token<FloteToken>> {
        FloteTokenizer::tokenize(src)
            .into_iter()
            .map(|r| r.unwrap())
            .collect()
    }

    #[test]
    fn half_adder_shape() {
        let src = r#"
            comp half_adder {
                in bit a;
                in bit b;
                out bit s = a xor b;
                out bit c = a and b;
            }
        "#;
        let module = Parser::parse(tokenize(src)).unwrap();
        assert_eq!(module.components.len(), 1);
        let comp = &module.components[0];
        assert_eq!(comp.id, "half_adder");
        assert_eq!(comp.statements.len(), 4);
    }

    #[test]
    fn precedence_or_lowest_and_highest() {
        // x and y or z xor w  =>  ((x and y) or (z xor w))
        let src = r#"comp c { out bit r = x and y or z xor w; }"#;
        let module = Parser::parse(tokenize(src)).unwrap();
        let Statement::Decl(decl) = &module.components[0].statements[0] else { panic!() };
        match decl.assign.as_ref().unwrap() {
            Expr::Or(l, r, _) => {
                assert!(matches!(l.as_ref(), Expr::And(..)));
                assert!(matches!(r.as_ref(), Expr::Xor(..)));
            }
            other => panic!("expected Or at root, got {:?}", other),
        }
    }

    #[test]
    fn left_associative_same_precedence() {
        // a and b and c => (a and b) and c
        let src = r#"comp c { out bit r = a and b and c; }"#;
        let module = Parser::parse(tokenize(src)).unwrap();
        let Statement::Decl(decl) = &module.components[0].statements[0] else { panic!() };
        match decl.assign.as_ref().unwrap() {
            Expr::And(l, r, _) => {
                assert!(matches!(l.as_ref(), Expr::And(..)));
                assert!(matches!(r.as_ref(), Expr::Identifier(_)));
            }
            other => panic!("expected And at root, got {:?}", other),
        }
    }

    #[test]
    fn main_flag_and_parens() {
        let src = r#"main comp top { out bit r = not (a or b); }"#;
        let module = Parser::parse(tokenize(src)).unwrap();
        assert!(module.components[0].is_main);
    }

    #[test]
    fn missing_semicolon_is_syntactical_error() {
        let src = r#"comp c { out bit r = a }"#;
        let err = Parser::parse(tokenize(src)).unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn dimension_declaration() {
        let src = r#"comp c { bit[4] x = "1010"; }"#;
        let module = Parser::parse(tokenize(src)).unwrap();
        let Statement::Decl(decl) = &module.components[0].statements[0] else { panic!() };
        assert_eq!(decl.dimension.as_ref().unwrap().value, 4);
    }
}
