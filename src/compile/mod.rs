pub(crate) mod codegen;
pub(crate) mod emit;
pub(crate) mod program;
