use super::{Profile, shell_quote};

/// A `cargo` invocation rendered into the generated build script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CargoCommand {
    pub subcommand: String,
    pub profile: Profile,
    pub features: Vec<String>,
    pub no_default_features: bool,
    /// Extra flags from the module, passed through as shell fragments
    pub extra_args: Vec<String>,
}

impl CargoCommand {
    pub fn build() -> Self {
        Self {
            subcommand: "build".to_string(),
            profile: Profile::Debug,
            features: Vec::new(),
            no_default_features: false,
            extra_args: Vec::new(),
        }
    }

    pub fn with_release(mut self, release: bool) -> Self {
        self.profile = if release {
            Profile::Release
        } else {
            Profile::Debug
        };
        self
    }

    pub fn with_features(mut self, features: &[String]) -> Self {
        self.features.extend(features.iter().cloned());
        self
    }

    pub fn with_no_default_features(mut self, no_default: bool) -> Self {
        self.no_default_features = no_default;
        self
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.extra_args.extend(args);
        self
    }

    pub fn args(&self) -> Vec<String> {
        self.render_args(false)
    }

    /// Module features are quoted for the shell, extra args are not
    fn render_args(&self, for_shell: bool) -> Vec<String> {
        let mut args = vec![self.subcommand.clone()];

        if self.profile == Profile::Release {
            args.push("--release".to_string());
        }

        // single comma-separated list
        if !self.features.is_empty() {
            args.push("--features".to_string());
            let features = self.features.join(",");
            args.push(if for_shell {
                shell_quote(&features)
            } else {
                features
            });
        }

        if self.no_default_features {
            args.push("--no-default-features".to_string());
        }

        args.extend(self.extra_args.iter().cloned());
        args
    }

    pub fn to_shell_command(&self) -> String {
        let mut cmd = String::from("cargo");
        for arg in self.render_args(true) {
            cmd.push(' ');
            cmd.push_str(&arg);
        }
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_plain_build() {
        assert_eq!(CargoCommand::build().to_shell_command(), "cargo build");
    }

    #[test]
    fn test_full_build() {
        let cmd = CargoCommand::build()
            .with_release(true)
            .with_features(&strings(&["a", "b"]))
            .with_no_default_features(true)
            .with_args(strings(&["--locked"]));

        assert_eq!(
            cmd.to_shell_command(),
            "cargo build --release --features a,b --no-default-features --locked"
        );
    }

    #[test]
    fn test_features_render_as_single_flag() {
        let cmd = CargoCommand::build().with_features(&strings(&["json", "tls"]));
        let args = cmd.args();
        assert_eq!(args.iter().filter(|a| *a == "--features").count(), 1);
        assert!(args.contains(&"json,tls".to_string()));
    }

    #[test]
    fn test_features_with_shell_metacharacters_are_quoted() {
        let cmd = CargoCommand::build().with_features(&strings(&["json;touch /tmp/x", "tls"]));
        assert_eq!(
            cmd.to_shell_command(),
            "cargo build --features 'json;touch /tmp/x,tls'"
        );
        assert!(cmd.args().contains(&"json;touch /tmp/x,tls".to_string()));

        let cmd = CargoCommand::build().with_features(&strings(&["serde derive"]));
        assert_eq!(cmd.to_shell_command(), "cargo build --features 'serde derive'");
    }

    #[test]
    fn test_extra_args_pass_through() {
        let cmd = CargoCommand::build().with_args(strings(&["--target x86_64-unknown-linux-musl"]));
        assert_eq!(
            cmd.to_shell_command(),
            "cargo build --target x86_64-unknown-linux-musl"
        );
    }

    #[test]
    fn test_debug_profile_by_flag() {
        let cmd = CargoCommand::build().with_release(false);
        assert_eq!(cmd.profile, Profile::Debug);
        assert!(!cmd.args().contains(&"--release".to_string()));
    }
}
