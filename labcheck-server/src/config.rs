use std::path::PathBuf;

/// File expected in every student directory, fed to the checker.
pub const DATA_FILE: &str = "node_sessions.xls";
/// File written next to the input with the captured checker output.
pub const RESULT_FILE: &str = "result.txt";
/// Checker scripts are named `{lab}_check.py` with the lab name lower-cased.
pub const SCRIPT_SUFFIX: &str = "_check.py";

/// Server wide paths, built once at startup from the cli arguments and
/// shared with every handler.
#[derive(Debug)]
pub struct ServerConfig {
    /// One subdirectory per lab, one subdirectory per student below that.
    pub data_root: PathBuf,
    /// One checker script per lab.
    pub scripts_root: PathBuf,
    /// Interpreter the checker scripts are run with.
    pub python: PathBuf,
}

impl ServerConfig {
    pub fn lab_dir(&self, lab: &str) -> PathBuf {
        self.data_root.join(lab)
    }

    pub fn checker_script(&self, lab: &str) -> PathBuf {
        self.scripts_root
            .join(format!("{}{SCRIPT_SUFFIX}", lab.to_lowercase()))
    }

    /// All paths taking part in one student's check.
    pub fn resolve(&self, lab: &str, student: &str) -> CheckerPaths {
        let student_dir = self.lab_dir(lab).join(student);
        CheckerPaths {
            script: self.checker_script(lab),
            data: student_dir.join(DATA_FILE),
            result: student_dir.join(RESULT_FILE),
        }
    }
}

/// Filesystem locations for one (lab, student) pair.
#[derive(Debug)]
pub struct CheckerPaths {
    pub script: PathBuf,
    pub data: PathBuf,
    pub result: PathBuf,
}

impl CheckerPaths {
    /// Both the checker script and the student's input file are present.
    /// Checked before any process is spawned.
    pub fn runnable(&self) -> bool {
        self.script.exists() && self.data.exists()
    }
}
