/// Cargo build profile, which decides where the binary lands under `target/`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Debug,
    Release,
}

impl Profile {
    pub fn dir_name(self) -> &'static str {
        match self {
            Profile::Debug => "debug",
            Profile::Release => "release",
        }
    }

    /// Path of a built binary relative to the crate root
    pub fn binary_path(self, bin_name: &str) -> String {
        format!("target/{}/{}", self.dir_name(), bin_name)
    }
}
