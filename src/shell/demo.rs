/// Smoke sequence exercising every mutating verb, run before the interactive loop
/// when `--demo` is passed. On a tree that already holds these names the failing
/// steps are reported like any other error.
pub const DEMO_SCRIPT: &[&str] = &[
    "tree",
    "touch first_file",
    "tree",
    "mkdir testing_folder",
    "tree",
    "rmdir testing_folder",
    "tree",
    "mkdir testing_folder",
    "tree",
    "cd testing_folder",
    "tree",
    "mkdir testing_folder2",
    "tree",
    "cd testing_folder2",
    "tree",
    "cd ..",
    "cd ..",
    "touch testing_again",
    "rm testing_again",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::FileSystem;
    use crate::shell::Session;

    #[test]
    fn demo_on_fresh_tree_prints_no_errors() {
        let mut session = Session::new(FileSystem::new(), Vec::new(), false);
        session.run_script(DEMO_SCRIPT.iter().copied()).unwrap();

        let fs = session.filesystem();
        assert_eq!(fs.current(), fs.root());
        assert_eq!(
            fs.tree(),
            vec![
                " <directory>",
                "\tfirst_file",
                "\ttesting_folder <directory>",
                "\t\ttesting_folder2 <directory>",
            ]
        );
    }

    #[test]
    fn demo_twice_reports_conflicts_but_keeps_tree() {
        let mut session = Session::new(FileSystem::new(), Vec::new(), false);
        session.run_script(DEMO_SCRIPT.iter().copied()).unwrap();
        let first = session.filesystem().tree();

        session.run_script(DEMO_SCRIPT.iter().copied()).unwrap();

        assert_eq!(session.filesystem().tree(), first);
        assert_eq!(session.filesystem().current(), session.filesystem().root());
    }
}
