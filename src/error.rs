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

//! Error taxonomy for the elaboration pipeline and simulation kernel.

use crate::core::lexer::TokenError;
use crate::core::parser::SyntacticalError;
use crate::core::scanner::LexicalError;
use colored::Colorize;
use std::fmt::Display;

/// A semantic error raised while walking the AST (declaration conflicts,
/// width mismatches, bad module shape). Carries a line number when the
/// offending construct has one.
#[derive(Debug, PartialEq, thiserror::Error)]
pub struct SemanticalError {
    pub line: Option<usize>,
    pub message: String,
}

impl SemanticalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { line: None, message: message.into() }
    }

    pub fn at(line: usize, message: impl Into<String>) -> Self {
        Self { line: Some(line), message: message.into() }
    }
}

impl Display for SemanticalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "semantical error at line {}: {}", line, self.message),
            None => write!(f, "semantical error: {}", self.message),
        }
    }
}

/// A build-time failure surfaced by [`crate::elaborate`]/[`crate::elaborate_file`],
/// wrapping whichever phase produced it.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ElaborationError {
    #[error("{0}")]
    Lexical(String),
    #[error("{0}")]
    Syntactical(#[from] SyntacticalError),
    #[error("{0}")]
    Semantical(#[from] SemanticalError),
    #[error("failed to read source file {0:?}: {1}")]
    Io(String, String),
}

impl ElaborationError {
    /// Builds an [`ElaborationError::Lexical`] from a token error reported by
    /// the scanner, reporting only the first (propagation policy: the first
    /// error in a phase aborts the phase).
    pub fn from_lexical(err: &TokenError<LexicalError>) -> Self {
        Self::Lexical(format!("lexical error: {}", err))
    }
}

/// Errors raised by the testbench façade while applying stimulus or running
/// the stabilization kernel.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("bus {0:?} is not an input of this component")]
    NotAnInput(String),
    #[error("stimulus for bus {0:?} has width {1} but the bus is width {2}")]
    WidthMismatch(String, usize, usize),
    #[error("invalid bit-string stimulus {0:?} for bus {1:?}: expected only '0'/'1' characters")]
    InvalidBitString(String, String),
    #[error("stabilization did not converge within {0} iterations{1}")]
    IterationCapExceeded(usize, Hint),
}

/// Unifies every error kind the public API surfaces.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Elaboration(#[from] ElaborationError),
    #[error("{0}")]
    Simulation(#[from] SimulationError),
}

/// A short, colored remediation hint appended to some error messages, in the
/// same register as terminal diagnostics elsewhere in this crate.
#[derive(Debug, PartialEq)]
pub enum Hint {
    RaiseIterationCap,
    CheckForOscillation,
}

impl Display for Hint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::RaiseIterationCap => "consider raising the iteration cap in the simulation config",
            Self::CheckForOscillation => "this usually indicates a feedback loop with no stable fixed point",
        };
        write!(f, "\n\n{}: {}", "hint".green(), message)
    }
}

/// A non-fatal observation from the semantic builder's validation pass: a
/// bus that is never assigned or never read. Collected and surfaced to the
/// caller rather than raised, since an unread or unassigned bus does not
/// prevent elaboration from producing a usable component.
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub component_id: String,
    pub bus_id: String,
    pub message: String,
}

impl Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: component {:?}, bus {:?}: {}",
            "warning".yellow(),
            self.component_id,
            self.bus_id,
            self.message
        )
    }
}
