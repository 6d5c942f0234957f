//! Argument vector construction
//!
//! Build adapters assemble command lines from a mix of fixed flags,
//! optional flags, and caller-declared options. `ArgBuilder` only
//! emits arguments that are actually present.

/// Typed builder for child process argument vectors
#[derive(Debug, Default)]
pub struct ArgBuilder {
    args: Vec<String>,
}

impl ArgBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single argument
    pub fn push(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append every argument from an iterator
    pub fn push_all<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append the argument only when present
    pub fn push_opt(mut self, arg: Option<impl Into<String>>) -> Self {
        if let Some(arg) = arg {
            self.args.push(arg.into());
        }
        self
    }

    /// Append the arguments only when the condition holds
    pub fn push_if<I, S>(self, cond: bool, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if cond {
            self.push_all(args)
        } else {
            self
        }
    }

    /// Append `flag=value` only when the value is present
    pub fn push_kv(mut self, flag: &str, value: Option<impl AsRef<str>>) -> Self {
        if let Some(value) = value {
            self.args.push(format!("{}={}", flag, value.as_ref()));
        }
        self
    }

    pub fn build(self) -> Vec<String> {
        self.args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_only_present_flags() {
        let args = ArgBuilder::new()
            .push("--build")
            .push_opt(None::<String>)
            .push_opt(Some("dir"))
            .push_if(false, ["--target", "install"])
            .push_kv("-DCMAKE_PREFIX_PATH", None::<&str>)
            .push_kv("-DCMAKE_INSTALL_PREFIX", Some("out"))
            .build();
        assert_eq!(args, vec!["--build", "dir", "-DCMAKE_INSTALL_PREFIX=out"]);
    }

    #[test]
    fn push_if_keeps_order() {
        let args = ArgBuilder::new()
            .push("make")
            .push_if(true, ["DESTDIR=/tmp/install", "install"])
            .build();
        assert_eq!(args, vec!["make", "DESTDIR=/tmp/install", "install"]);
    }
}
