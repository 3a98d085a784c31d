mod answers;
mod common;
mod intake;
mod outcomes;
mod transitions;
