/// A chain of shell steps joined with `&&`, so the first failure stops the build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellScript {
    steps: Vec<String>,
}

impl ShellScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cd(self, dir: &str) -> Self {
        self.step(format!("cd {}", shell_quote(dir)))
    }

    pub fn step(mut self, step: impl Into<String>) -> Self {
        self.steps.push(step.into());
        self
    }

    pub fn copy(self, from: &str, to: &str) -> Self {
        self.step(format!("cp {} {}", shell_quote(from), shell_quote(to)))
    }

    pub fn make_executable(self, path: &str) -> Self {
        self.step(format!("chmod +x {}", shell_quote(path)))
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    pub fn render(&self) -> String {
        self.steps.join(" && ")
    }
}

/// Single-quotes a word when the shell would otherwise split or expand it
pub fn shell_quote(word: &str) -> String {
    let is_plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+,:=@%".contains(c));
    if is_plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}
