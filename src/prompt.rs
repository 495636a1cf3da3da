use crate::conflict::Conflict;

/// Decision seam between the engine and whoever drives it. Engine code never
/// reads the terminal; it asks one of these questions and acts on the answer.
pub trait Prompter {
    fn confirm_reinstall(&mut self, name: &str, version: &str) -> bool;
    fn confirm_conflicts(&mut self, conflicts: &[Conflict]) -> bool;
    fn accept_component(&mut self, name: &str, directory: &str) -> bool;
    fn confirm_drifted_restore(&mut self) -> bool;
}
