// Application constants (ADR: No magic values)
use std::time::Duration;

/// Grace period between SIGTERM and SIGKILL when terminating a child (5 seconds)
pub const GRACEFUL_TERMINATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Suffix for specs written by `pull`
pub const PULLED_SPEC_SUFFIX: &str = "-post.contentspec";

/// Default bundle directory, relative to the spec file
pub const DEFAULT_BUILD_DIR: &str = "assembly";

/// Placeholder replaced with the spec file name in the build command
pub const SPEC_PLACEHOLDER: &str = "{spec}";

/// Placeholder replaced with the target path in preview/editor commands
pub const PATH_PLACEHOLDER: &str = "{path}";

/// Environment variable exposing the spec file name to external tools
pub const SPEC_FILE_ENV: &str = "CSPRESS_SPEC_FILE";
