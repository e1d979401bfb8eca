pub(crate) mod block;
pub(crate) mod lexer;
pub(crate) mod line;
pub(crate) mod metadata;
