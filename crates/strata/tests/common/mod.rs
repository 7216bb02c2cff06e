use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestStack {
    pub root: TempDir,
}

impl TestStack {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn write_stack_file(&self, content: &str) {
        let path = self.root.path().join("strata.json");
        fs::write(path, content).unwrap();
    }

    #[allow(dead_code)]
    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    /// Command rooted in the temp dir with ambient strata env stripped
    pub fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::cargo_bin("strata").unwrap();
        cmd.current_dir(self.root.path());
        for var in [
            "STRATA_STACK",
            "STRATA_CONFIG_PATH",
            "STRATA_CONFIG_CODELOCATION",
            "STRATA_CONFIG_SQLPASSWORD",
        ] {
            cmd.env_remove(var);
        }
        cmd
    }
}
