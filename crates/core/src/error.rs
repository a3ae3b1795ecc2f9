use thiserror::Error;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors that can occur while turning Markdown into a syntax tree or HTML.
///
/// These carry enough detail for server-side diagnostics. Callers of the
/// public render entry points never see them directly.
#[derive(Debug, Error)]
pub enum MarkdownError {
    /// markdown-rs parser error surfaced through the adapter.
    #[error("Parse error at {location}: {message}")]
    Parse {
        /// Error message
        message: String,
        /// Source location
        location: SourceLocation,
    },
    /// A rendering stage failed in a way it could not degrade from.
    #[error("Render error in {stage}: {message}")]
    Stage {
        /// Name of the failing stage
        stage: &'static str,
        /// Error message
        message: String,
    },
    /// Internal logic error (unexpected state).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MarkdownError {
    /// Create a parse error with location
    pub fn parse_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::Parse {
            message: message.into(),
            location: SourceLocation::new(line, column),
        }
    }

    /// Create a stage error
    pub fn stage_error(stage: &'static str, message: impl Into<String>) -> Self {
        Self::Stage {
            stage,
            message: message.into(),
        }
    }
}

/// Non-fatal warnings that don't prevent rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// Directive opened but never closed before the end of the document
    UnclosedDirective {
        /// Source location of the opener
        location: SourceLocation,
        /// Directive name
        name: String,
    },
    /// A `:::` closer with no open directive to close
    StrayDirectiveCloser {
        /// Source location of the closer
        location: SourceLocation,
    },
    /// Code fence opened but never closed
    UnclosedCodeFence {
        /// Source location where the fence started
        location: SourceLocation,
        /// Fence marker character (backtick or tilde)
        marker: char,
    },
}

impl ParseWarning {
    /// Get the location of this warning
    pub fn location(&self) -> &SourceLocation {
        match self {
            ParseWarning::UnclosedDirective { location, .. } => location,
            ParseWarning::StrayDirectiveCloser { location } => location,
            ParseWarning::UnclosedCodeFence { location, .. } => location,
        }
    }
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseWarning::UnclosedDirective { location, name } => {
                write!(f, "Unclosed directive ':::{}' opened at {}", name, location)
            }
            ParseWarning::StrayDirectiveCloser { location } => {
                write!(f, "Directive closer without opener at {}", location)
            }
            ParseWarning::UnclosedCodeFence { location, marker } => {
                write!(f, "Unclosed code fence ({}) opened at {}", marker, location)
            }
        }
    }
}

/// Collection of non-fatal parse diagnostics
#[derive(Debug, Clone, Default)]
pub struct ParseDiagnostics {
    /// List of non-fatal warnings
    pub warnings: Vec<ParseWarning>,
}

impl ParseDiagnostics {
    /// Create a new empty diagnostics collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning to the diagnostics collection
    pub fn add_warning(&mut self, warning: ParseWarning) {
        self.warnings.push(warning);
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Emit every collected warning at debug level.
    pub fn log(&self) {
        for warning in &self.warnings {
            log::debug!("markdown: {}", warning);
        }
    }
}
