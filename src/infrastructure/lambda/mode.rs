use std::fmt;

/// Set by the platform for every function process
pub const FUNCTION_NAME_ENV: &str = "AWS_LAMBDA_FUNCTION_NAME";

/// How the process was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationMode {
    /// Running inside the serverless platform, events arrive from the runtime API
    Triggered,
    /// Started from a shell or scheduler, performs one scheduled run and exits
    Direct,
}

impl InvocationMode {
    /// Read the platform marker from the environment
    pub fn detect() -> Self {
        Self::from_marker(std::env::var(FUNCTION_NAME_ENV).ok().as_deref())
    }

    /// A present, non-empty function name means triggered mode
    pub fn from_marker(function_name: Option<&str>) -> Self {
        match function_name {
            Some(name) if !name.is_empty() => Self::Triggered,
            _ => Self::Direct,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Triggered => "triggered",
            Self::Direct => "direct",
        }
    }
}

impl fmt::Display for InvocationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_marker() {
        assert_eq!(InvocationMode::from_marker(Some("spotswap")), InvocationMode::Triggered);
        assert_eq!(InvocationMode::from_marker(Some("")), InvocationMode::Direct);
        assert_eq!(InvocationMode::from_marker(None), InvocationMode::Direct);
    }

    #[test]
    fn test_detect_reads_environment() {
        temp_env::with_var(FUNCTION_NAME_ENV, Some("spotswap-prod"), || {
            assert_eq!(InvocationMode::detect(), InvocationMode::Triggered);
        });
        temp_env::with_var_unset(FUNCTION_NAME_ENV, || {
            assert_eq!(InvocationMode::detect(), InvocationMode::Direct);
        });
    }
}
