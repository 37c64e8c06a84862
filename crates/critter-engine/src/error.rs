use std::fmt;

/// Which setup step failed.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SetupErrorKind {
    /// Event loop or OS window could not be created.
    WindowCreationFailed,
    /// GPU surface, adapter or device could not be acquired.
    ContextLoaderFailed,
    /// A shader stage failed to compile, or the stages failed to link.
    ShaderBuildFailed,
    /// Static mesh data violates its own invariants (index out of range, ...).
    InvalidMesh,
}

impl SetupErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WindowCreationFailed => "window creation failed",
            Self::ContextLoaderFailed => "context loader failed",
            Self::ShaderBuildFailed => "shader build failed",
            Self::InvalidMesh => "invalid mesh",
        }
    }
}

/// A fatal setup failure.
///
/// Every step of startup (window, context, shader program, meshes) reports
/// through this type. Any `SetupError` terminates the process with
/// [`SetupError::EXIT_CODE`].
#[derive(Debug, Clone, PartialEq)]
pub struct SetupError {
    pub kind: SetupErrorKind,
    /// Name of the failing subsystem ("window", "gpu", "shader", "mesh:head", ...).
    pub subsystem: String,
    pub detail: String,
}

impl SetupError {
    /// Process exit status for setup failures (`-1` as an unsigned byte).
    pub const EXIT_CODE: u8 = 255;

    pub fn new(kind: SetupErrorKind, subsystem: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { kind, subsystem: subsystem.into(), detail: detail.into() }
    }

    pub fn window(detail: impl Into<String>) -> Self {
        Self::new(SetupErrorKind::WindowCreationFailed, "window", detail)
    }

    pub fn context(detail: impl Into<String>) -> Self {
        Self::new(SetupErrorKind::ContextLoaderFailed, "gpu", detail)
    }

    pub fn shader(stage: &str, detail: impl Into<String>) -> Self {
        Self::new(SetupErrorKind::ShaderBuildFailed, format!("shader:{stage}"), detail)
    }

    pub fn mesh(name: &str, detail: impl Into<String>) -> Self {
        Self::new(SetupErrorKind::InvalidMesh, format!("mesh:{name}"), detail)
    }
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.kind.as_str(), self.subsystem, self.detail)
    }
}

impl std::error::Error for SetupError {}

/// Finds the `SetupError` at the root of an `anyhow` chain, if any.
pub fn find_setup_error(err: &anyhow::Error) -> Option<&SetupError> {
    err.chain().find_map(|e| e.downcast_ref::<SetupError>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn display_names_kind_and_subsystem() {
        let e = SetupError::shader("vertex", "expected `;`");
        assert_eq!(e.to_string(), "shader build failed [shader:vertex]: expected `;`");
    }

    #[test]
    fn helpers_pick_the_right_kind() {
        assert_eq!(SetupError::window("x").kind, SetupErrorKind::WindowCreationFailed);
        assert_eq!(SetupError::context("x").kind, SetupErrorKind::ContextLoaderFailed);
        assert_eq!(SetupError::mesh("head", "x").subsystem, "mesh:head");
    }

    #[test]
    fn setup_error_survives_anyhow_context() {
        let res: anyhow::Result<()> =
            Err(SetupError::context("no adapter")).context("starting runtime");
        let err = res.unwrap_err();
        let found = find_setup_error(&err).unwrap();
        assert_eq!(found.kind, SetupErrorKind::ContextLoaderFailed);
    }

    #[test]
    fn unrelated_errors_have_no_setup_error() {
        let err = anyhow::anyhow!("plain failure");
        assert!(find_setup_error(&err).is_none());
    }
}
