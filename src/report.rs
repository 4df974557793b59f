//! Run tallies and how they map to the process exit status.

use std::fmt;

/// Counters accumulated while walking the source tree.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UploadReport {
    /// Every file visited.
    pub found: usize,
    /// Every successful `PUT`.
    pub uploaded: usize,
    /// Every file whose check or upload failed.
    pub failed: usize,
}

/// Overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    /// At least one file failed, regardless of how many uploaded.
    Failed,
    /// Files were found but all of them were skipped.
    NothingUploaded,
    NothingFound,
}

impl UploadReport {
    pub fn status(&self) -> RunStatus {
        if self.failed > 0 {
            RunStatus::Failed
        } else if self.uploaded == 0 && self.found > 0 {
            RunStatus::NothingUploaded
        } else if self.found == 0 {
            RunStatus::NothingFound
        } else {
            RunStatus::Success
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.status().exit_code()
    }

    /// Prints the summary line and, if the run was not clean, the verdict.
    pub fn print_summary(&self) {
        println!("\n{self}");
        if let Some(verdict) = self.status().verdict() {
            println!("{verdict}");
        }
    }
}

impl fmt::Display for UploadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Uploaded {} of {} file(s), {} failure(s)",
            self.uploaded, self.found, self.failed
        )
    }
}

impl RunStatus {
    pub fn exit_code(self) -> u8 {
        match self {
            RunStatus::Success => 0,
            RunStatus::NothingUploaded | RunStatus::NothingFound => 1,
            RunStatus::Failed => 2,
        }
    }

    pub fn verdict(self) -> Option<&'static str> {
        match self {
            RunStatus::Success => None,
            RunStatus::Failed => Some("FAIL: Error(s) occured"),
            RunStatus::NothingUploaded => Some("WARN: No files uploaded?"),
            RunStatus::NothingFound => Some("WARN: No files found?"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(found: usize, uploaded: usize, failed: usize) -> UploadReport {
        UploadReport {
            found,
            uploaded,
            failed,
        }
    }

    #[test]
    fn exit_codes_follow_priority_order() {
        assert_eq!(report(0, 0, 0).exit_code(), 1);
        assert_eq!(report(5, 0, 0).exit_code(), 1);
        assert_eq!(report(5, 3, 2).exit_code(), 2);
        assert_eq!(report(5, 5, 0).exit_code(), 0);
    }

    #[test]
    fn failures_dominate_even_when_nothing_uploaded() {
        assert_eq!(report(3, 0, 3).status(), RunStatus::Failed);
        assert_eq!(report(0, 0, 0).status(), RunStatus::NothingFound);
        assert_eq!(report(5, 0, 0).status(), RunStatus::NothingUploaded);
    }

    #[test]
    fn summary_line_matches_operational_format() {
        assert_eq!(
            report(10, 4, 1).to_string(),
            "Uploaded 4 of 10 file(s), 1 failure(s)"
        );
    }
}
