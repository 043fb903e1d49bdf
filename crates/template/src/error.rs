use thiserror::Error;

/// Errors that can occur while compiling or executing a template.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template parse error in '{template}' at line {line}: {message}")]
    Parse {
        template: String,
        line: usize,
        message: String,
    },

    #[error("Unresolved placeholder '{name}' in '{template}' at line {line}")]
    Unresolved {
        template: String,
        name: String,
        line: usize,
    },

    #[error("I/O error while writing template output: {0}")]
    Io(#[from] std::io::Error),
}

impl TemplateError {
    /// The identity of the template the error occurred in, if known.
    pub fn template(&self) -> Option<&str> {
        match self {
            TemplateError::Parse { template, .. } | TemplateError::Unresolved { template, .. } => {
                Some(template)
            }
            TemplateError::Io(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_display_names_placeholder_and_template() {
        let err = TemplateError::Unresolved {
            template: "config/app.properties".to_string(),
            name: "db.url".to_string(),
            line: 4,
        };
        let message = err.to_string();
        assert!(message.contains("'db.url'"));
        assert!(message.contains("config/app.properties"));
        assert!(message.contains("line 4"));
        assert_eq!(err.template(), Some("config/app.properties"));
    }

    #[test]
    fn test_io_error_has_no_template() {
        let err = TemplateError::from(std::io::Error::other("broken pipe"));
        assert!(err.template().is_none());
        assert!(err.to_string().contains("broken pipe"));
    }
}
