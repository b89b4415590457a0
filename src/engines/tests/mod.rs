pub(crate) mod common;

mod early_warning;
mod therapeutic;
