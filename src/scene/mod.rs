pub(crate) mod language;
pub(crate) mod model;
