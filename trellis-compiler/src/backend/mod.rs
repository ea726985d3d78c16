//! Backends turning compile results into runtime values.
//!
//! The backend is picked once per compiler from [`CompilerConfig`](crate::CompilerConfig):
//! [`Interpreter`] evaluates statements directly, [`Generator`] first renders
//! them to source under a synthesized path.

mod code_builder;
mod generator;
mod interpreter;
mod value;

pub use code_builder::CodeBuilder;
pub use generator::{GeneratedSource, Generator, render};
pub use interpreter::Interpreter;
use trellis_manifest::Backend;
pub use value::Value;

use crate::{Result, compilers::CompileResult};

/// The backend selected for a compiler.
#[derive(Debug)]
pub enum Evaluator {
    Interpret(Interpreter),
    Generate(Generator),
}

impl Evaluator {
    pub fn new(backend: Backend) -> Self {
        match backend {
            Backend::Interpret => Self::Interpret(Interpreter),
            Backend::Generate => Self::Generate(Generator::new()),
        }
    }

    pub fn backend(&self) -> Backend {
        match self {
            Self::Interpret(_) => Backend::Interpret,
            Self::Generate(_) => Backend::Generate,
        }
    }

    /// Evaluate `result`. `path` names the generated source and is unused
    /// when interpreting.
    pub fn evaluate(&self, path: &str, result: &CompileResult) -> Result<Value> {
        match self {
            Self::Interpret(interpreter) => interpreter.interpret(result),
            Self::Generate(generator) => generator.generate(path, result),
        }
    }

    pub fn generated_sources(&self) -> Vec<GeneratedSource> {
        match self {
            Self::Interpret(_) => Vec::new(),
            Self::Generate(generator) => generator.sources(),
        }
    }

    pub fn clear(&self) {
        if let Self::Generate(generator) = self {
            generator.clear();
        }
    }
}
