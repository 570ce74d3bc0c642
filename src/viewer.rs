use crate::error::{DeskError, Result};

/// Which report, if any, the modal is showing. The document itself is left
/// to whatever external viewer the path is handed to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReportViewer {
    #[default]
    Closed,
    Open(String),
}

impl ReportViewer {
    pub fn open(&mut self, path: &str) -> Result<()> {
        let path = path.trim();
        if path.is_empty() {
            return Err(DeskError::EmptyReportPath);
        }
        *self = Self::Open(path.to_string());
        Ok(())
    }

    pub fn close(&mut self) {
        *self = Self::Closed;
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }

    pub fn current(&self) -> Option<&str> {
        match self {
            Self::Open(path) => Some(path),
            Self::Closed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_then_close() {
        let mut viewer = ReportViewer::default();
        assert!(!viewer.is_open());
        viewer.open("/reports/12.pdf").unwrap();
        assert!(viewer.is_open());
        assert_eq!(viewer.current(), Some("/reports/12.pdf"));
        viewer.close();
        assert_eq!(viewer, ReportViewer::Closed);
        assert_eq!(viewer.current(), None);
    }

    #[test]
    fn test_empty_path_is_rejected() {
        let mut viewer = ReportViewer::default();
        assert!(matches!(viewer.open(""), Err(DeskError::EmptyReportPath)));
        assert!(matches!(viewer.open("   "), Err(DeskError::EmptyReportPath)));
        assert!(!viewer.is_open());

        viewer.open("a.pdf").unwrap();
        assert!(viewer.open("").is_err());
        assert_eq!(viewer.current(), Some("a.pdf"));
    }

    #[test]
    fn test_reopen_replaces_path() {
        let mut viewer = ReportViewer::default();
        viewer.open("a.pdf").unwrap();
        viewer.open("b.pdf").unwrap();
        assert_eq!(viewer.current(), Some("b.pdf"));
    }
}
