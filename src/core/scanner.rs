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

//! Lexical analysis for the flote hardware description language.

use super::lexer::{Token, TokenError, Tokenize, TrainCar};
use std::fmt::Display;
use std::str::FromStr;

pub mod char_set {
    pub const UNDERSCORE: char = '_';
    pub const DOUBLE_QUOTE: char = '"';
    pub const FWDSLASH: char = '/';

    pub fn is_letter(c: &char) -> bool {
        c.is_ascii_alphabetic()
    }

    pub fn is_digit(c: &char) -> bool {
        c.is_ascii_digit()
    }

    pub fn is_letter_or_digit_or_underscore(c: &char) -> bool {
        is_letter(c) || is_digit(c) || c == &UNDERSCORE
    }

    pub fn is_bit(c: &char) -> bool {
        c == &'0' || c == &'1'
    }

    /// Characters allowed to begin a word-like lexeme: letters, digits,
    /// underscore (identifiers never start with one, but this keeps the
    /// lead-char check simple and defers the distinction to classification)
    /// and the double quote that opens a bit-field literal.
    pub fn can_start_word(c: &char) -> bool {
        is_letter(c) || is_digit(c) || c == &UNDERSCORE || c == &DOUBLE_QUOTE
    }

    pub fn is_separator(c: &char) -> bool {
        c == &' ' || c == &'\t' || c == &'\r' || c == &'\n'
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Keyword {
    Main,
    Comp,
    In,
    Out,
    Bit,
    Not,
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Xnor,
}

impl FromStr for Keyword {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "main" => Self::Main,
            "comp" => Self::Comp,
            "in" => Self::In,
            "out" => Self::Out,
            "bit" => Self::Bit,
            "not" => Self::Not,
            "and" => Self::And,
            "or" => Self::Or,
            "xor" => Self::Xor,
            "nand" => Self::Nand,
            "nor" => Self::Nor,
            "xnor" => Self::Xnor,
            _ => return Err(()),
        })
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Main => "main",
            Self::Comp => "comp",
            Self::In => "in",
            Self::Out => "out",
            Self::Bit => "bit",
            Self::Not => "not",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Nand => "nand",
            Self::Nor => "nor",
            Self::Xnor => "xnor",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Punctuation {
    Semicolon,
    ParenL,
    ParenR,
    BraceL,
    BraceR,
    Assign,
    BracketL,
    BracketR,
    Minus,
}

impl Punctuation {
    /// Attempts to classify a single punctuation character.
    fn from_char(c: char) -> Option<Self> {
        Some(match c {
            ';' => Self::Semicolon,
            '(' => Self::ParenL,
            ')' => Self::ParenR,
            '{' => Self::BraceL,
            '}' => Self::BraceR,
            '=' => Self::Assign,
            '[' => Self::BracketL,
            ']' => Self::BracketR,
            '-' => Self::Minus,
            _ => return None,
        })
    }
}

impl Display for Punctuation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Semicolon => ";",
            Self::ParenL => "(",
            Self::ParenR => ")",
            Self::BraceL => "{",
            Self::BraceR => "}",
            Self::Assign => "=",
            Self::BracketL => "[",
            Self::BracketR => "]",
            Self::Minus => "-",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum FloteToken {
    Keyword(Keyword),
    Punctuation(Punctuation),
    Identifier(String),
    /// The inner `String` excludes the surrounding double quotes.
    BitField(String),
    Decimal(usize),
    Eof,
}

impl Display for FloteToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Keyword(k) => write!(f, "{}", k),
            Self::Punctuation(p) => write!(f, "{}", p),
            Self::Identifier(id) => write!(f, "{}", id),
            Self::BitField(bits) => write!(f, "\"{}\"", bits),
            Self::Decimal(d) => write!(f, "{}", d),
            Self::Eof => write!(f, "EOF"),
        }
    }
}

impl FloteToken {
    pub fn as_keyword(&self) -> Option<&Keyword> {
        match self {
            Self::Keyword(k) => Some(k),
            _ => None,
        }
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Self::Identifier(id) => Some(id.as_str()),
            _ => None,
        }
    }

    pub fn is_eof(&self) -> bool {
        self == &Self::Eof
    }
}

#[derive(Debug, PartialEq)]
pub enum LexicalError {
    InvalidCharacter(char),
    InvalidLexeme(String),
    LeadingZero(String),
    TooLarge(String),
}

impl std::error::Error for LexicalError {}

impl Display for LexicalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCharacter(c) => write!(f, "invalid character: \'{}\'", c),
            Self::InvalidLexeme(s) => write!(f, "invalid lexeme: {}", s),
            Self::LeadingZero(s) => write!(f, "decimal literal cannot have a leading zero: {}", s),
            Self::TooLarge(s) => write!(f, "decimal literal {} is too large", s),
        }
    }
}

/// Tokenizes flote source code into a stream of `FloteToken`s.
pub struct FloteTokenizer;

impl FloteTokenizer {
    /// Collects characters belonging to a word-like lexeme: any run of
    /// characters that is not whitespace or a punctuation symbol.
    fn scan_lexeme<T: Iterator<Item = char>>(train: &mut TrainCar<T>, lead: char) -> String {
        let mut lexeme = String::from(lead);
        while let Some(c) = train.peek() {
            if char_set::is_separator(c) || Punctuation::from_char(*c).is_some() {
                break;
            }
            lexeme.push(train.consume().unwrap());
        }
        lexeme
    }

    fn classify_word(lexeme: String) -> Result<FloteToken, LexicalError> {
        if let Ok(kw) = Keyword::from_str(&lexeme) {
            return Ok(FloteToken::Keyword(kw));
        }
        // identifier: [a-zA-Z][a-zA-Z0-9_]*
        let mut chars = lexeme.chars();
        if let Some(first) = chars.next() {
            if char_set::is_letter(&first) && chars.clone().all(|c| char_set::is_letter_or_digit_or_underscore(&c)) {
                return Ok(FloteToken::Identifier(lexeme));
            }
        }
        // bit_field: "[01]+"
        if lexeme.len() >= 3
            && lexeme.starts_with(char_set::DOUBLE_QUOTE)
            && lexeme.ends_with(char_set::DOUBLE_QUOTE)
        {
            let inner = &lexeme[1..lexeme.len() - 1];
            if !inner.is_empty() && inner.chars().all(|c| char_set::is_bit(&c)) {
                return Ok(FloteToken::BitField(inner.to_string()));
            }
        }
        // dec: 0 | [1-9][0-9]*
        if !lexeme.is_empty() && lexeme.chars().all(|c| char_set::is_digit(&c)) {
            if lexeme == "0" {
                return Ok(FloteToken::Decimal(0));
            }
            if !lexeme.starts_with('0') {
                return match lexeme.parse() {
                    Ok(d) => Ok(FloteToken::Decimal(d)),
                    Err(_) => Err(LexicalError::TooLarge(lexeme)),
                };
            }
            return Err(LexicalError::LeadingZero(lexeme));
        }
        Err(LexicalError::InvalidLexeme(lexeme))
    }

    fn skip_line_comment<T: Iterator<Item = char>>(train: &mut TrainCar<T>) {
        while let Some(c) = train.peek() {
            if c == &'\n' {
                break;
            }
            train.consume();
        }
    }
}

impl Tokenize for FloteTokenizer {
    type TokenType = FloteToken;
    type Err = LexicalError;

    fn tokenize(s: &str) -> Vec<Result<Token<Self::TokenType>, TokenError<Self::Err>>> {
        let mut train = TrainCar::new(s.chars());
        let mut tokens = Vec::new();

        while let Some(c) = train.consume() {
            if char_set::is_separator(&c) {
                continue;
            }
            if c == char_set::FWDSLASH && train.peek() == Some(&char_set::FWDSLASH) {
                Self::skip_line_comment(&mut train);
                continue;
            }
            let loc = train.locate().clone();
            if let Some(p) = Punctuation::from_char(c) {
                tokens.push(Ok(Token::new(FloteToken::Punctuation(p), loc)));
                continue;
            }
            if !char_set::can_start_word(&c) {
                tokens.push(Err(TokenError::new(LexicalError::InvalidCharacter(c), loc)));
                continue;
            }
            let lexeme = Self::scan_lexeme(&mut train, c);
            tokens.push(match Self::classify_word(lexeme) {
                Ok(tk) => Ok(Token::new(tk, loc)),
                Err(e) => Err(TokenError::new(e, loc)),
            });
        }
        let mut eof_loc = train.locate().clone();
        eof_loc.next_col();
        tokens.push(Ok(Token::new(FloteToken::Eof, eof_loc)));
        tokens
    }
}
