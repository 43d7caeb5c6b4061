use std::path::Path;

use miette::{Diagnostic, LabeledSpan, NamedSource};

/// A fatal error, optionally pointing into the plan file that caused it.
#[derive(Debug)]
pub struct ErrorReport {
    src: Option<NamedSource>,
    message: String,
    location: Option<LabeledSpan>,
}

impl Diagnostic for ErrorReport {
    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.src.as_ref().map(|x| x as _)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        self.location
            .as_ref()
            .map(|loc| Box::new(std::iter::once(loc.clone())) as _)
    }
}

impl std::fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ErrorReport {}

impl From<gb2312_font::Error> for ErrorReport {
    fn from(error: gb2312_font::Error) -> Self {
        ErrorReport::message(error.to_string())
    }
}

impl ErrorReport {
    pub fn message(message: impl Into<String>) -> Self {
        ErrorReport {
            src: None,
            message: message.into(),
            location: None,
        }
    }

    /// Reports a plan file that failed to parse, labelling the bad span.
    pub fn from_toml(error: &toml::de::Error, path: &Path, text: String) -> Self {
        let location = error.span().map(|span| {
            // zero length spans at the end of input would not be shown
            let len = span.len().max(1).min(text.len().saturating_sub(span.start));
            LabeledSpan::new(Some(error.message().to_string()), span.start, len)
        });
        ErrorReport {
            message: format!("failed to parse plan '{}'", path.display()),
            src: Some(NamedSource::new(path.to_string_lossy(), text)),
            location,
        }
    }

    #[cfg(test)]
    fn label(&self) -> Option<(&str, usize, usize)> {
        self.location
            .as_ref()
            .map(|loc| (loc.label().unwrap_or_default(), loc.offset(), loc.len()))
    }
}
