//! Script interpreter: command dispatch, device lifecycle, and reporting
//!
//! A session drives one device through a command stream. The first two
//! effective commands must establish the geometry (`diskCapacity`, then
//! `blockSize`); the device is built exactly once from them. Afterwards every
//! command produces `Report` values describing what happened, and per-command
//! failures are themselves reports: the session keeps going. Only syntax,
//! protocol, geometry, and I/O errors tear the run down.

use crate::catalog::FileId;
use crate::device::{Commit, Device};
use crate::dirs::{DirCreate, DirRegistry};
use crate::error::{LogdiskError, Result};
use crate::geometry::Geometry;
use crate::script::{Command, ScriptParser};
use crate::units::SizeUnit;
use serde::Serialize;
use std::fmt;
use std::io::BufRead;

/// One operator-facing event. `Display` renders the console line(s);
/// serialization carries the same data for machine consumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Report {
    DiskCapacitySet {
        size: u64,
        unit: SizeUnit,
    },
    BlockSizeSet {
        size: u64,
        unit: SizeUnit,
        blocks: u64,
    },
    DirectoryCreated {
        path: String,
    },
    DirectoryExists {
        path: String,
    },
    CurrentDirectory {
        path: String,
    },
    FileWritten {
        path: String,
        id: FileId,
        address: u64,
        size: u64,
        unit: SizeUnit,
    },
    FileDeleted {
        path: String,
        id: FileId,
        unit: SizeUnit,
    },
    FileRead {
        path: String,
        id: FileId,
        address: u64,
        size: u64,
        unit: SizeUnit,
    },
    CommandFailed {
        message: String,
    },
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::DiskCapacitySet { size, unit } => {
                write!(f, "Disk Size set to: {size}{unit}")
            }
            Report::BlockSizeSet { size, unit, blocks } => {
                write!(f, "Block Size set to: {size}{unit}\nNumber of Blocks: {blocks}")
            }
            Report::DirectoryCreated { path } => write!(f, "Created directory: {path}"),
            Report::DirectoryExists { path } => {
                write!(f, "Directory already exists: {path}")
            }
            Report::CurrentDirectory { path } => write!(f, "Current dir: {path}"),
            Report::FileWritten {
                path,
                id,
                address,
                size,
                unit,
            }
            | Report::FileRead {
                path,
                id,
                address,
                size,
                unit,
            } => {
                write!(f, "{path}, {id}, {address:#x}, {size}{unit}")
            }
            Report::FileDeleted { path, id, unit } => {
                write!(f, "{path}, {id}, DELETED, 0{unit}")
            }
            Report::CommandFailed { message } => {
                write!(f, "{message}\nSkipping to next command...")
            }
        }
    }
}

fn failed(message: impl Into<String>) -> Report {
    Report::CommandFailed {
        message: message.into(),
    }
}

/// Script interpreter owning the directory registry and, once geometry is
/// known, the device.
pub struct Session {
    parser: ScriptParser,
    dirs: DirRegistry,
    device: Option<Device>,
    pending_capacity: Option<(u64, SizeUnit)>,
}

impl Session {
    pub fn new() -> Self {
        Session {
            parser: ScriptParser::new(),
            dirs: DirRegistry::new(),
            device: None,
            pending_capacity: None,
        }
    }

    /// Whether the geometry handshake has completed.
    pub fn is_initialized(&self) -> bool {
        self.device.is_some()
    }

    pub fn device(&self) -> Option<&Device> {
        self.device.as_ref()
    }

    pub fn dirs(&self) -> &DirRegistry {
        &self.dirs
    }

    /// Parse and execute one script line. Blank and comment lines yield no
    /// reports. A fatal error aborts the whole run.
    pub fn execute_line(&mut self, line: &str) -> Result<Vec<Report>> {
        match self.parser.parse_line(line)? {
            Some(command) => self.execute(command),
            None => Ok(Vec::new()),
        }
    }

    /// Execute one parsed command.
    pub fn execute(&mut self, command: Command) -> Result<Vec<Report>> {
        let Some(device) = self.device.as_mut() else {
            return self.initialize(command);
        };

        let reports = match command {
            Command::DiskCapacity { .. } => {
                tracing::warn!("rejected late diskCapacity command");
                vec![failed("Error: Disk Capacity already set.")]
            }
            Command::BlockSize { .. } => {
                tracing::warn!("rejected late blockSize command");
                vec![failed("Error: Block Size already set.")]
            }
            Command::Mkdir { paths } => paths
                .iter()
                .map(|raw| match self.dirs.create(raw) {
                    DirCreate::Created(path) => Report::DirectoryCreated { path },
                    DirCreate::AlreadyExists(path) => Report::DirectoryExists { path },
                })
                .collect(),
            Command::Chdir { path } => match self.dirs.change(&path) {
                Ok(current) => vec![Report::CurrentDirectory {
                    path: current.to_string(),
                }],
                Err(LogdiskError::DirectoryNotFound(dir)) => {
                    vec![failed(format!("Directory doesn't exist: {dir}"))]
                }
                Err(err) => return Err(err),
            },
            Command::Write { path, size, unit } => {
                let resolved = self.dirs.resolve(&path);
                match device.commit_write(&resolved, size, unit) {
                    Ok(Commit::Written {
                        path,
                        id,
                        address,
                        size,
                        unit,
                    }) => vec![Report::FileWritten {
                        path,
                        id,
                        address,
                        size,
                        unit,
                    }],
                    Ok(Commit::Deleted { path, id, unit }) => {
                        vec![Report::FileDeleted { path, id, unit }]
                    }
                    Err(LogdiskError::FileNotFound(_)) => {
                        vec![failed("No such file exists to write.")]
                    }
                    Err(LogdiskError::WriteTooLarge { .. }) => {
                        vec![failed("Error: Cannot write files greater than disk capacity.")]
                    }
                    Err(LogdiskError::InsufficientSpace { .. }) => {
                        vec![failed("Not enough memory to write.")]
                    }
                    Err(err) => return Err(err),
                }
            }
            Command::Read { path } => {
                let resolved = self.dirs.resolve(&path);
                match device.lookup_read(&resolved) {
                    Ok(info) => vec![Report::FileRead {
                        path: info.path,
                        id: info.id,
                        address: info.address,
                        size: info.size,
                        unit: info.unit,
                    }],
                    Err(LogdiskError::FileNotFound(path)) => {
                        vec![failed(format!("File not found: {path}"))]
                    }
                    Err(err) => return Err(err),
                }
            }
        };
        Ok(reports)
    }

    /// Stream a whole script through the session, handing each report to
    /// `emit` as it is produced.
    pub fn run_script<R: BufRead>(
        &mut self,
        reader: R,
        mut emit: impl FnMut(&Report),
    ) -> Result<()> {
        for line in reader.lines() {
            let line = line?;
            for report in self.execute_line(&line)? {
                emit(&report);
            }
        }
        Ok(())
    }

    /// Geometry handshake: first `diskCapacity`, then `blockSize`, then the
    /// device exists. Any other command order is fatal.
    fn initialize(&mut self, command: Command) -> Result<Vec<Report>> {
        match self.pending_capacity {
            None => match command {
                Command::DiskCapacity { size, unit } => {
                    if size == 0 {
                        return Err(LogdiskError::ZeroCapacity);
                    }
                    self.pending_capacity = Some((size, unit));
                    Ok(vec![Report::DiskCapacitySet { size, unit }])
                }
                other => Err(LogdiskError::GeometryProtocol {
                    expected: "diskCapacity",
                    found: other.name().to_string(),
                }),
            },
            Some((capacity, capacity_unit)) => match command {
                Command::BlockSize { size, unit } => {
                    let geometry = Geometry::new(capacity, capacity_unit, size, unit)?;
                    let blocks = geometry.total_blocks();
                    self.device = Some(Device::new(geometry));
                    Ok(vec![Report::BlockSizeSet { size, unit, blocks }])
                }
                other => Err(LogdiskError::GeometryProtocol {
                    expected: "blockSize",
                    found: other.name().to_string(),
                }),
            },
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_session() -> Session {
        let mut session = Session::new();
        session.execute_line("diskCapacity(4MB)").unwrap();
        session.execute_line("blockSize(1MB)").unwrap();
        session
    }

    fn lines(session: &mut Session, line: &str) -> Vec<String> {
        session
            .execute_line(line)
            .unwrap()
            .iter()
            .map(|report| report.to_string())
            .collect()
    }

    #[test]
    fn test_geometry_handshake_reports() {
        let mut session = Session::new();
        assert_eq!(
            lines(&mut session, "diskCapacity(4MB)"),
            vec!["Disk Size set to: 4MB"]
        );
        assert_eq!(
            lines(&mut session, "blockSize(1MB)"),
            vec!["Block Size set to: 1MB\nNumber of Blocks: 4"]
        );
        assert!(session.is_initialized());
    }

    #[test]
    fn test_comments_allowed_during_handshake() {
        let mut session = Session::new();
        assert!(session.execute_line("# geometry first").unwrap().is_empty());
        session.execute_line("diskCapacity(4MB)").unwrap();
        assert!(session.execute_line("").unwrap().is_empty());
        session.execute_line("blockSize(1MB)").unwrap();
        assert!(session.is_initialized());
    }

    #[test]
    fn test_wrong_first_command_is_fatal() {
        let mut session = Session::new();
        let err = session.execute_line("mkdir(/a)").unwrap_err();
        assert!(matches!(
            err,
            LogdiskError::GeometryProtocol {
                expected: "diskCapacity",
                ..
            }
        ));
    }

    #[test]
    fn test_wrong_second_command_is_fatal() {
        let mut session = Session::new();
        session.execute_line("diskCapacity(4MB)").unwrap();
        let err = session.execute_line("diskCapacity(2MB)").unwrap_err();
        assert!(matches!(
            err,
            LogdiskError::GeometryProtocol {
                expected: "blockSize",
                ..
            }
        ));
    }

    #[test]
    fn test_zero_capacity_is_fatal_immediately() {
        let mut session = Session::new();
        assert!(matches!(
            session.execute_line("diskCapacity(0MB)"),
            Err(LogdiskError::ZeroCapacity)
        ));
    }

    #[test]
    fn test_bad_geometry_is_fatal_at_block_size() {
        let mut session = Session::new();
        session.execute_line("diskCapacity(4MB)").unwrap();
        assert!(matches!(
            session.execute_line("blockSize(3MB)"),
            Err(LogdiskError::UnalignedBlockSize { .. })
        ));
    }

    #[test]
    fn test_late_geometry_commands_are_skipped() {
        let mut session = init_session();
        assert_eq!(
            lines(&mut session, "diskCapacity(8MB)"),
            vec!["Error: Disk Capacity already set.\nSkipping to next command..."]
        );
        assert_eq!(
            lines(&mut session, "blockSize(2MB)"),
            vec!["Error: Block Size already set.\nSkipping to next command..."]
        );
        // The session is still alive.
        assert_eq!(
            lines(&mut session, "mkdir(/a)"),
            vec!["Created directory: /a/"]
        );
    }

    #[test]
    fn test_mkdir_reports_each_path() {
        let mut session = init_session();
        assert_eq!(
            lines(&mut session, "mkdir(/a, /b, /a)"),
            vec![
                "Created directory: /a/",
                "Created directory: /b/",
                "Directory already exists: /a/",
            ]
        );
    }

    #[test]
    fn test_chdir_flow() {
        let mut session = init_session();
        session.execute_line("mkdir(/a)").unwrap();
        assert_eq!(lines(&mut session, "chdir(/a)"), vec!["Current dir: /a/"]);
        assert_eq!(
            lines(&mut session, "chdir(/missing)"),
            vec!["Directory doesn't exist: /missing/\nSkipping to next command..."]
        );
        // Failed chdir leaves the current directory alone.
        assert_eq!(session.dirs().current(), "/a/");
    }

    #[test]
    fn test_write_and_read_report_lines() {
        let mut session = init_session();
        session.execute_line("mkdir(/a)").unwrap();
        session.execute_line("chdir(/a)").unwrap();
        assert_eq!(
            lines(&mut session, "write(f, 2MB)"),
            vec!["/a/f, 3, 0x0, 2MB"]
        );
        assert_eq!(
            lines(&mut session, "write(g, 1500KB)"),
            vec!["/a/g, 4, 0x200000, 2MB"]
        );
        assert_eq!(lines(&mut session, "read(f)"), vec!["/a/f, 3, 0x0, 2MB"]);
        assert_eq!(
            lines(&mut session, "read(/a/g)"),
            vec!["/a/g, 4, 0x200000, 2MB"]
        );
    }

    #[test]
    fn test_delete_report_line() {
        let mut session = init_session();
        session.execute_line("write(/f, 1MB)").unwrap();
        assert_eq!(
            lines(&mut session, "write(/f, 0)"),
            vec!["/f, 3, DELETED, 0MB"]
        );
        assert_eq!(
            lines(&mut session, "read(/f)"),
            vec!["File not found: /f\nSkipping to next command..."]
        );
    }

    #[test]
    fn test_write_failures_are_reported_not_fatal() {
        let mut session = init_session();
        assert_eq!(
            lines(&mut session, "write(/f, 0)"),
            vec!["No such file exists to write.\nSkipping to next command..."]
        );
        assert_eq!(
            lines(&mut session, "write(/f, 8MB)"),
            vec!["Error: Cannot write files greater than disk capacity.\nSkipping to next command..."]
        );
        session.execute_line("write(/f, 3MB)").unwrap();
        assert_eq!(
            lines(&mut session, "write(/g, 2MB)"),
            vec!["Not enough memory to write.\nSkipping to next command..."]
        );
        // Still operating.
        assert_eq!(
            lines(&mut session, "write(/g, 1MB)"),
            vec!["/g, 4, 0x300000, 1MB"]
        );
    }

    #[test]
    fn test_syntax_error_is_fatal_after_init() {
        let mut session = init_session();
        assert!(matches!(
            session.execute_line("write(/f 5MB)"),
            Err(LogdiskError::Syntax(_))
        ));
    }

    #[test]
    fn test_report_serialization_shape() {
        let report = Report::FileWritten {
            path: "/a/f".to_string(),
            id: FileId(3),
            address: 0x100000,
            size: 1,
            unit: SizeUnit::MB,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["event"], "file_written");
        assert_eq!(json["path"], "/a/f");
        assert_eq!(json["id"], 3);
        assert_eq!(json["address"], 0x100000);
        assert_eq!(json["size"], 1);
        assert_eq!(json["unit"], "MB");
    }

    #[test]
    fn test_run_script_streams_reports() {
        let script = "\
# demo
diskCapacity(4MB)
blockSize(1MB)
mkdir(/a)
chdir(/a)
write(f, 1MB)
read(f)
";
        let mut session = Session::new();
        let mut out = Vec::new();
        session
            .run_script(script.as_bytes(), |report| out.push(report.to_string()))
            .unwrap();
        assert_eq!(
            out,
            vec![
                "Disk Size set to: 4MB",
                "Block Size set to: 1MB\nNumber of Blocks: 4",
                "Created directory: /a/",
                "Current dir: /a/",
                "/a/f, 3, 0x0, 1MB",
                "/a/f, 3, 0x0, 1MB",
            ]
        );
    }
}
